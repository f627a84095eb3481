//! Astrology: studying a constellation grants XP and stardust; purchased
//! modifier levels feed the resolver.

use super::{mastery_xp_per_completion, scaled_skill_xp, CompletionOutcome};
use crate::builder::StateUpdateBuilder;
use crate::enums::Skill;
use crate::error::{SimError, SimResult};
use crate::id::Id;
use crate::modifier::{resolve_modifiers, ModifierAnchor};
use crate::rng::SimRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierKind {
    Standard,
    Unique,
}

pub fn complete_study(
    b: &mut StateUpdateBuilder,
    action_id: &Id,
    rng: &mut SimRng,
) -> CompletionOutcome {
    let Some(def) = b.state().registries().action(action_id).cloned() else {
        return CompletionOutcome::Cleared;
    };
    let anchor = ModifierAnchor::for_action(b.state(), action_id);
    let modifiers = resolve_modifiers(b.state(), &anchor);

    b.add_skill_xp(Skill::Astrology, scaled_skill_xp(def.xp, &modifiers));
    b.add_mastery_xp(
        Skill::Astrology,
        action_id,
        mastery_xp_per_completion(def.base_ticks, &modifiers),
    );
    if let Some(drops) = &def.drops {
        let mut rolled = Vec::new();
        drops.roll(rng, &mut rolled);
        for (item, qty) in rolled {
            b.add_item_or_drop(&item, qty);
        }
    }
    CompletionOutcome::Continue
}

/// Buy one level of a constellation modifier, spending stardust (standard)
/// or golden stardust (unique).
pub fn purchase_modifier(
    b: &mut StateUpdateBuilder,
    constellation_id: &Id,
    kind: ModifierKind,
    index: usize,
) -> SimResult<()> {
    let constellation = b
        .state()
        .registries()
        .constellation(constellation_id)
        .cloned()
        .ok_or_else(|| {
            SimError::InvalidArgument(format!("unknown constellation {}", constellation_id))
        })?;

    let defs = match kind {
        ModifierKind::Standard => &constellation.standard_modifiers,
        ModifierKind::Unique => &constellation.unique_modifiers,
    };
    let def = defs.get(index).ok_or_else(|| {
        SimError::InvalidArgument(format!(
            "constellation {} has no modifier at index {}",
            constellation_id, index
        ))
    })?;

    // Mastery gate: the constellation's study action carries the mastery.
    let study_action = Id::new(
        constellation_id.namespace(),
        format!("study_{}", constellation_id.local()),
    );
    let mastery_level = b.state().mastery_level(&study_action);
    if mastery_level < def.unlock_mastery_level {
        return Err(SimError::RequirementUnmet(format!(
            "modifier unlocks at mastery level {}",
            def.unlock_mastery_level
        )));
    }

    let current_level = {
        let purchases = b
            .state()
            .astrology
            .purchased
            .get(constellation_id)
            .cloned()
            .unwrap_or_default();
        let levels = match kind {
            ModifierKind::Standard => &purchases.standard,
            ModifierKind::Unique => &purchases.unique,
        };
        levels.get(index).copied().unwrap_or(0)
    };
    if current_level >= def.max_count {
        return Err(SimError::InvalidArgument(format!(
            "modifier already at max count {}",
            def.max_count
        )));
    }

    let cost = def
        .stardust_costs
        .get(current_level as usize)
        .copied()
        .unwrap_or_else(|| def.stardust_costs.last().copied().unwrap_or(0));
    let dust = match kind {
        ModifierKind::Standard => Id::new(constellation_id.namespace(), "stardust"),
        ModifierKind::Unique => Id::new(constellation_id.namespace(), "golden_stardust"),
    };
    if b.state().inventory.count_of(&dust) < cost {
        return Err(SimError::InsufficientInputs {
            action: constellation_id.clone(),
            missing: dust,
        });
    }
    b.remove_item(&dust, cost)?;

    let purchases = b
        .state_mut()
        .astrology
        .purchased
        .entry(constellation_id.clone())
        .or_default();
    let levels = match kind {
        ModifierKind::Standard => &mut purchases.standard,
        ModifierKind::Unique => &mut purchases.unique,
    };
    if levels.len() <= index {
        levels.resize(index + 1, 0);
    }
    levels[index] += 1;
    Ok(())
}
