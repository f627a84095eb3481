//! Agility: a cyclic course of built obstacles. Each lap step completes the
//! current obstacle, then rotates to the next built slot.

use super::{mastery_xp_per_completion, scaled_skill_xp, CompletionOutcome};
use crate::builder::StateUpdateBuilder;
use crate::enums::Skill;
use crate::id::Id;
use crate::modifier::{resolve_modifiers, ModifierAnchor};
use crate::rng::SimRng;
use crate::rollers;
use crate::state::ActiveActivity;

/// Build cost discount from repeated builds of the same obstacle.
pub fn build_discount(times_built: i64) -> f64 {
    (0.04 * times_built as f64).min(0.40)
}

/// Completing the current obstacle: grant rewards, advance the course
/// index, and retarget the foreground activity at the next obstacle.
pub fn complete_lap(
    b: &mut StateUpdateBuilder,
    obstacle_id: &Id,
    _rng: &mut SimRng,
) -> CompletionOutcome {
    let Some(def) = b.state().registries().obstacle(obstacle_id).cloned() else {
        return CompletionOutcome::Cleared;
    };
    let anchor = ModifierAnchor {
        skill: Some(Skill::Agility),
        action: Some(obstacle_id),
        category: None,
    };
    let modifiers = resolve_modifiers(b.state(), &anchor);

    b.add_skill_xp(Skill::Agility, scaled_skill_xp(def.xp, &modifiers));
    b.add_mastery_xp(
        Skill::Agility,
        obstacle_id,
        mastery_xp_per_completion(def.duration_ticks, &modifiers),
    );

    // Rotate to the next built slot (the course may have gaps).
    let built: Vec<Option<Id>> = b.state().agility.built.clone();
    let slots = built.len();
    if slots == 0 {
        return CompletionOutcome::Cleared;
    }
    let current = b.state().agility.current_obstacle_index;
    let mut next = None;
    for step in 1..=slots {
        let candidate = (current + step) % slots;
        if let Some(obstacle) = &built[candidate] {
            next = Some((candidate, obstacle.clone()));
            break;
        }
    }
    let Some((next_index, next_obstacle)) = next else {
        return CompletionOutcome::Cleared;
    };
    let Some(next_def) = b.state().registries().obstacle(&next_obstacle).cloned() else {
        return CompletionOutcome::Cleared;
    };

    b.state_mut().agility.current_obstacle_index = next_index;
    let next_anchor = ModifierAnchor {
        skill: Some(Skill::Agility),
        action: Some(&next_obstacle),
        category: None,
    };
    let next_modifiers = resolve_modifiers(b.state(), &next_anchor);
    let total = rollers::rolled_duration(next_def.duration_ticks, &next_modifiers);
    if let Some(ActiveActivity::Skill(activity)) = &mut b.state_mut().active_activity {
        activity.action = next_obstacle;
        activity.total_ticks = total;
    }
    CompletionOutcome::Continue
}
