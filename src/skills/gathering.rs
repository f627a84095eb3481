//! Generic producer/consumer completion shared by woodcutting, fishing,
//! mining, firemaking, runecrafting, smithing, fletching, crafting,
//! herblore, and summoning: consume inputs, roll doubled outputs, roll the
//! action's drop tree, grant XP and mastery, and keep mining node state.

use super::{mastery_xp_per_completion, roll_mastery_token, scaled_skill_xp, CompletionOutcome};
use crate::builder::StateUpdateBuilder;
use crate::id::Id;
use crate::modifier::{resolve_modifiers, ModifierAnchor};
use crate::rng::SimRng;
use crate::rollers;
use crate::state::MiningNodeState;

/// Whether the action could run one more iteration right now (inputs
/// present, mining node not depleted).
pub fn can_run(state: &crate::state::GlobalState, action_id: &Id) -> bool {
    let Some(def) = state.registries().action(action_id) else {
        return false;
    };
    for (item, qty) in &def.inputs {
        if state.inventory.count_of(item) < *qty {
            return false;
        }
    }
    if let Some(node) = &def.mining {
        let node_state = state.action_state(action_id).mining.unwrap_or_default();
        if node_state.is_respawning() || node_state.hp_lost >= node.node_hp {
            return false;
        }
    }
    true
}

pub fn complete(
    b: &mut StateUpdateBuilder,
    action_id: &Id,
    rng: &mut SimRng,
) -> CompletionOutcome {
    let Some(def) = b.state().registries().action(action_id).cloned() else {
        return CompletionOutcome::Cleared;
    };
    let anchor = ModifierAnchor::for_action(b.state(), action_id);
    let modifiers = resolve_modifiers(b.state(), &anchor);

    // Inputs are re-verified at every completion, not just at start.
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

    let mut all_stored = true;

    // Outputs, doubled as one batch on a single roll.
    if !def.outputs.is_empty() {
        let doubled = rollers::roll_doubling(rng, modifiers.skill_item_doubling_chance());
        let multiplier = if doubled { 2 } else { 1 };
        for (item, qty) in &def.outputs {
            if !b.add_item_or_drop(item, qty * multiplier) {
                all_stored = false;
            }
        }
    }

    // Skill-level drops (bird nests, gems).
    if let Some(drops) = &def.drops {
        let mut rolled = Vec::new();
        drops.roll(rng, &mut rolled);
        for (item, qty) in rolled {
            if !b.add_item_or_drop(&item, qty) {
                all_stored = false;
            }
        }
    }

    // Mining nodes lose 1 HP per extraction and deplete into a respawn.
    let mut node_depleted = false;
    if let Some(node_def) = &def.mining {
        let entry = b
            .state_mut()
            .action_states
            .entry(action_id.clone())
            .or_default();
        let node = entry.mining.get_or_insert_with(|| MiningNodeState {
            hp_lost: 0,
            respawn_ticks_remaining: None,
            regen_ticks_remaining: crate::engine::MINING_REGEN_INTERVAL_TICKS,
        });
        if node.hp_lost == 0 {
            // A fresh wound starts a fresh regen window.
            node.regen_ticks_remaining = crate::engine::MINING_REGEN_INTERVAL_TICKS;
        }
        node.hp_lost += 1;
        if node.hp_lost >= node_def.node_hp {
            node.respawn_ticks_remaining = Some(node_def.respawn_ticks);
            node_depleted = true;
        }
    }

    // Rewards fire atomically with the completion.
    b.add_skill_xp(def.skill, scaled_skill_xp(def.xp, &modifiers));
    b.add_mastery_xp(
        def.skill,
        action_id,
        mastery_xp_per_completion(def.base_ticks, &modifiers),
    );
    if let Some(token) = &def.mastery_token {
        roll_mastery_token(b, def.skill, token, rng);
    }

    if !all_stored || node_depleted {
        CompletionOutcome::Cleared
    } else {
        CompletionOutcome::Continue
    }
}
