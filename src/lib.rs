pub mod builder;
pub mod candidates;
pub mod changes;
pub mod drops;
pub mod engine;
pub mod enums;
pub mod error;
pub mod goal;
pub mod id;
pub mod interactions;
pub mod inventory;
pub mod modifier;
pub mod rates;
pub mod registry;
pub mod rng;
pub mod rollers;
pub mod skills;
pub mod solver;
pub mod state;
pub mod utils;
pub mod waitfor;
pub mod xp;

/// One simulation tick is 100 ms; every timing in the engine is an integer
/// number of ticks.
pub type Tick = i64;

pub const TICK_MS: i64 = 100;
pub const TICKS_PER_SECOND: i64 = 10;

/// Sentinel for "unreachable with current rates". Kept well below i64::MAX so
/// estimate sums cannot overflow.
pub const INF_TICKS: Tick = i64::MAX / 4;

// Re-export the types most callers want without digging through modules.
pub use builder::StateUpdateBuilder;
pub use changes::Changes;
pub use engine::{consume_ticks, consume_ticks_until};
pub use enums::{Currency, Skill};
pub use error::{SimError, SimResult};
pub use goal::Goal;
pub use id::Id;
pub use registry::Registries;
pub use rng::SimRng;
pub use solver::{solve, Plan, SolverLimits, SolverOutcome};
pub use state::GlobalState;
pub use waitfor::WaitFor;
