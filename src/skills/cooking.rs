//! Cooking: three independent areas. The foreground recipe earns full XP
//! and mastery; the other two areas tick passively at a fifth of the speed
//! and earn nothing. A failed cook burns the input for a single XP point.

use super::{mastery_xp_per_completion, roll_mastery_token, scaled_skill_xp, CompletionOutcome};
use crate::builder::StateUpdateBuilder;
use crate::enums::{CookingArea, Skill};
use crate::id::Id;
use crate::modifier::{resolve_modifiers, ModifierAnchor};
use crate::rng::SimRng;
use crate::rollers;
use crate::Tick;

/// Passive areas need this many times the base progress per completion.
pub const PASSIVE_FACTOR: Tick = 5;

/// Inputs available for one more cook of this recipe?
pub fn can_run(state: &crate::state::GlobalState, action_id: &Id) -> bool {
    let Some(def) = state.registries().action(action_id) else {
        return false;
    };
    def.inputs
        .iter()
        .all(|(item, qty)| state.inventory.count_of(item) >= *qty)
}

/// Foreground completion of the active area's recipe.
pub fn complete_active(
    b: &mut StateUpdateBuilder,
    action_id: &Id,
    rng: &mut SimRng,
) -> CompletionOutcome {
    let Some(def) = b.state().registries().action(action_id).cloned() else {
        return CompletionOutcome::Cleared;
    };
    let anchor = ModifierAnchor::for_action(b.state(), action_id);
    let modifiers = resolve_modifiers(b.state(), &anchor);

    for (item, qty) in &def.inputs {
        if b.state().inventory.count_of(item) < *qty {
            return CompletionOutcome::Cleared;
        }
    }
    for (item, qty) in &def.inputs {
        if b.remove_item(item, *qty).is_err() {
            return CompletionOutcome::Cleared;
        }
    }

    let mastery_level = b.state().mastery_level(action_id);
    let success = rollers::roll_cooking_success(rng, mastery_level, &modifiers);

    let mut all_stored = true;
    if success {
        let doubled = rollers::roll_doubling(rng, modifiers.skill_item_doubling_chance());
        let multiplier = if doubled { 2 } else { 1 };
        for (item, qty) in &def.outputs {
            if !b.add_item_or_drop(item, qty * multiplier) {
                all_stored = false;
            }
        }
        b.add_skill_xp(Skill::Cooking, scaled_skill_xp(def.xp, &modifiers));
    } else {
        b.add_skill_xp(Skill::Cooking, 1);
    }
    b.add_mastery_xp(
        Skill::Cooking,
        action_id,
        mastery_xp_per_completion(def.base_ticks, &modifiers),
    );
    if let Some(token) = &def.mastery_token {
        roll_mastery_token(b, Skill::Cooking, token, rng);
    }

    if all_stored {
        CompletionOutcome::Continue
    } else {
        CompletionOutcome::Cleared
    }
}

/// Passive completion of a background area: consume inputs, produce the
/// plain output. No XP, no mastery, no success or doubling rolls, so the
/// RNG stream is untouched.
pub fn complete_passive(b: &mut StateUpdateBuilder, area: CookingArea) {
    let Some(recipe) = b.state().cooking.area(area).recipe.clone() else {
        return;
    };
    let Some(def) = b.state().registries().action(&recipe).cloned() else {
        return;
    };
    for (item, qty) in &def.inputs {
        if b.state().inventory.count_of(item) < *qty {
            return;
        }
    }
    for (item, qty) in &def.inputs {
        if b.remove_item(item, *qty).is_err() {
            return;
        }
    }
    for (item, qty) in &def.outputs {
        b.add_item_or_drop(item, *qty);
    }
}

/// Ticks until the given passive area completes, if it can progress.
pub fn passive_ticks_remaining(
    state: &crate::state::GlobalState,
    area: CookingArea,
) -> Option<Tick> {
    let area_state = state.cooking.area(area);
    let recipe = area_state.recipe.as_ref()?;
    let def = state.registries().action(recipe)?;
    if !can_run(state, recipe) {
        return None;
    }
    Some((def.base_ticks * PASSIVE_FACTOR - area_state.progress_ticks).max(1))
}
