//! Per-skill subsystems: a `complete` handler applied when the foreground
//! progress bar fills, plus shared reward math (XP scaling, mastery amounts,
//! mastery token rolls).
//!
//! RNG consumption order inside a completion is part of the determinism
//! contract: output doubling first, then the action's drop tree, then the
//! mastery token roll. Refactors must preserve that order.

pub mod agility;
pub mod astrology;
pub mod combat;
pub mod cooking;
pub mod farming;
pub mod gathering;
pub mod mastery;
pub mod slayer;
pub mod thieving;

use crate::builder::StateUpdateBuilder;
use crate::enums::Skill;
use crate::id::Id;
use crate::modifier::ResolvedModifiers;
use crate::rng::SimRng;

/// What a completion handler decided about the foreground activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// Keep going; the engine resets progress and continues.
    Continue,
    /// The activity can no longer run (inputs gone, inventory full, node
    /// depleted); the engine clears it.
    Cleared,
    /// The player died during this completion.
    Died,
}

/// Dispatch a foreground completion to the owning subsystem.
pub fn complete_action(
    b: &mut StateUpdateBuilder,
    skill: Skill,
    action_id: &Id,
    rng: &mut SimRng,
) -> CompletionOutcome {
    match skill {
        Skill::Cooking => cooking::complete_active(b, action_id, rng),
        Skill::Thieving => thieving::complete(b, action_id, rng),
        Skill::Agility => agility::complete_lap(b, action_id, rng),
        Skill::Astrology => astrology::complete_study(b, action_id, rng),
        _ => gathering::complete(b, action_id, rng),
    }
}

/// Base XP scaled by the resolved `skillXP` percentage.
pub(crate) fn scaled_skill_xp(base_xp: i64, modifiers: &ResolvedModifiers) -> i64 {
    (base_xp as f64 * (1.0 + modifiers.skill_xp_pct() / 100.0)).round() as i64
}

/// Mastery XP per completion: four points per second of base action time,
/// scaled by the resolved `masteryXP` percentage.
pub(crate) fn mastery_xp_per_completion(
    base_ticks: crate::Tick,
    modifiers: &ResolvedModifiers,
) -> i64 {
    let base = base_ticks / 10 * 4;
    (base as f64 * (1.0 + modifiers.mastery_xp_pct() / 100.0)).round() as i64
}

/// Roll the per-completion mastery token drop. The rate grows with the
/// number of currently unlocked actions in the skill.
pub fn roll_mastery_token(
    b: &mut StateUpdateBuilder,
    skill: Skill,
    token: &Id,
    rng: &mut SimRng,
) {
    let unlocked = b.state().unlocked_actions(skill).len();
    let rate = (unlocked as f64 / 18_500.0).min(1.0);
    if rng.next_double() < rate {
        b.add_item_or_drop(token, 1);
    }
}
