use crate::enums::{Currency, Skill};
use crate::id::Id;
use serde::{Deserialize, Serialize};

/// Typed fault values for user-initiated operations.
///
/// Errors during tick processing (full inventory, depleted inputs) are never
/// surfaced through this type; the engine reports them via
/// `Changes::dropped_items` and by clearing the activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimError {
    /// A non-stackable output needed a fresh slot and none was free.
    InventoryFull { item: Id },
    /// An action was started or completed without its inputs present.
    InsufficientInputs { action: Id, missing: Id },
    /// A purchase was attempted without enough GP.
    InsufficientGp { needed: i64, available: i64 },
    /// A purchase was attempted without enough of a secondary currency.
    InsufficientCurrency {
        currency: Currency,
        needed: i64,
        available: i64,
    },
    /// A user-initiated activity change while stunned.
    Stunned,
    /// The skill level does not meet the action's unlock requirement.
    LevelTooLow {
        skill: Skill,
        required: u32,
        current: u32,
    },
    /// A slayer area (or similar gated content) requirement is not met.
    RequirementUnmet(String),
    /// Unknown id, bad index, malformed input.
    InvalidArgument(String),
    /// A mastery token claim into a pool that cannot fit one more token.
    PoolFull { skill: Skill },
}

impl std::fmt::Display for SimError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimError::InventoryFull { item } => write!(f, "Inventory full: no slot for {}", item),
            SimError::InsufficientInputs { action, missing } => {
                write!(f, "Insufficient inputs for {}: missing {}", action, missing)
            }
            SimError::InsufficientGp { needed, available } => {
                write!(f, "Insufficient GP: need {}, have {}", needed, available)
            }
            SimError::InsufficientCurrency {
                currency,
                needed,
                available,
            } => write!(
                f,
                "Insufficient {}: need {}, have {}",
                currency, needed, available
            ),
            SimError::Stunned => write!(f, "Cannot act while stunned"),
            SimError::LevelTooLow {
                skill,
                required,
                current,
            } => write!(
                f,
                "{} level too low: need {}, have {}",
                skill, required, current
            ),
            SimError::RequirementUnmet(msg) => write!(f, "Requirement unmet: {}", msg),
            SimError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            SimError::PoolFull { skill } => {
                write!(f, "{} mastery pool cannot fit another token", skill)
            }
        }
    }
}

impl std::error::Error for SimError {}

pub type SimResult<T> = Result<T, SimError>;
