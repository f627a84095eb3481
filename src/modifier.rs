//! Modifier entries, scope filtering, and the resolver that folds every
//! contributing source into one flat `name -> value` map.
//!
//! Resolution is pure: the same `(state, anchor)` always produces the same
//! map. All contributions are additive; consumers interpret each named value
//! (percentages, flat milliseconds, flat points) at the point of use.

use crate::enums::Skill;
use crate::id::Id;
use crate::state::{ActiveActivity, CombatContext, GlobalState};
use crate::xp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reserved modifier names the engine consults directly.
pub mod names {
    /// Percentage change to action duration (negative is faster).
    pub const SKILL_INTERVAL: &str = "skillInterval";
    /// Flat change to action duration, in milliseconds.
    pub const FLAT_SKILL_INTERVAL: &str = "flatSkillInterval";
    /// Percentage change to skill XP per completion.
    pub const SKILL_XP: &str = "skillXP";
    /// Percentage change to mastery XP per completion.
    pub const MASTERY_XP: &str = "masteryXP";
    /// Percent chance to double rolled item outputs.
    pub const SKILL_ITEM_DOUBLING_CHANCE: &str = "skillItemDoublingChance";
    /// Percent chance a cook succeeds regardless of the success roll.
    pub const PERFECT_COOK_CHANCE: &str = "perfectCookChance";
    /// Flat percentage-point negation of slayer area effects.
    pub const FLAT_SLAYER_AREA_EFFECT_NEGATION: &str = "flatSlayerAreaEffectNegation";
    /// Flat bonus to thieving stealth.
    pub const THIEVING_STEALTH: &str = "thievingStealth";
    /// Percentage bonus to farming harvest quantity.
    pub const FARMING_YIELD: &str = "farmingYield";
    /// Flat bonus to the player's combat max hit.
    pub const FLAT_MAX_HIT: &str = "flatMaxHit";
    /// Flat bonus to the player's attack accuracy rating.
    pub const FLAT_ACCURACY: &str = "flatAccuracy";
    /// Flat bonus to the player's evasion rating.
    pub const FLAT_EVASION: &str = "flatEvasion";
    /// Percentage reduction of shop purchase costs.
    pub const SHOP_COST_REDUCTION: &str = "shopCostReduction";
}

/// Where a modifier entry applies. Absent fields do not constrain; present
/// fields AND together.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModifierScope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill: Option<Skill>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Id>,
}

impl ModifierScope {
    pub fn global() -> Self {
        Self::default()
    }

    pub fn for_skill(skill: Skill) -> Self {
        Self {
            skill: Some(skill),
            ..Self::default()
        }
    }

    pub fn for_action(action: Id) -> Self {
        Self {
            action: Some(action),
            ..Self::default()
        }
    }

    pub fn for_category(category: Id) -> Self {
        Self {
            category: Some(category),
            ..Self::default()
        }
    }

    pub fn is_global(&self) -> bool {
        self.skill.is_none() && self.action.is_none() && self.category.is_none()
    }

    pub fn matches(&self, anchor: &ModifierAnchor) -> bool {
        if let Some(skill) = self.skill {
            if anchor.skill != Some(skill) {
                return false;
            }
        }
        if let Some(action) = &self.action {
            if anchor.action != Some(action) {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if anchor.category != Some(category) {
                return false;
            }
        }
        true
    }
}

/// One scoped contribution to a named modifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierEntry {
    pub value: f64,
    #[serde(default, skip_serializing_if = "ModifierScope::is_global")]
    pub scope: ModifierScope,
}

/// A named modifier with one or more scoped entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierDef {
    pub name: String,
    pub entries: Vec<ModifierEntry>,
}

impl ModifierDef {
    /// A single globally-scoped entry.
    pub fn global(name: &str, value: f64) -> Self {
        Self {
            name: name.to_string(),
            entries: vec![ModifierEntry {
                value,
                scope: ModifierScope::global(),
            }],
        }
    }

    pub fn scoped(name: &str, value: f64, scope: ModifierScope) -> Self {
        Self {
            name: name.to_string(),
            entries: vec![ModifierEntry { value, scope }],
        }
    }
}

/// What a resolution is anchored to: the action being considered, or a
/// bare skill, or nothing (purely global contributions).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ModifierAnchor<'a> {
    pub skill: Option<Skill>,
    pub action: Option<&'a Id>,
    pub category: Option<&'a Id>,
}

impl<'a> ModifierAnchor<'a> {
    pub fn global() -> Self {
        Self::default()
    }

    pub fn for_skill(skill: Skill) -> Self {
        Self {
            skill: Some(skill),
            ..Self::default()
        }
    }

    /// Anchor on a registered skill action; skill and category come from the
    /// action's definition.
    pub fn for_action(state: &'a GlobalState, action: &'a Id) -> Self {
        match state.registries().action(action) {
            Some(def) => Self {
                skill: Some(def.skill),
                action: Some(action),
                category: def.category.as_ref(),
            },
            None => Self {
                skill: None,
                action: Some(action),
                category: None,
            },
        }
    }
}

/// Flat resolved map consulted by the engine at every decision point.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResolvedModifiers(BTreeMap<String, f64>);

impl ResolvedModifiers {
    /// Unknown names resolve to 0 and are treated as absent.
    pub fn get(&self, name: &str) -> f64 {
        self.0.get(name).copied().unwrap_or(0.0)
    }

    pub fn add(&mut self, name: &str, value: f64) {
        *self.0.entry(name.to_string()).or_insert(0.0) += value;
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn skill_interval_pct(&self) -> f64 {
        self.get(names::SKILL_INTERVAL)
    }

    pub fn flat_skill_interval_ms(&self) -> f64 {
        self.get(names::FLAT_SKILL_INTERVAL)
    }

    pub fn skill_xp_pct(&self) -> f64 {
        self.get(names::SKILL_XP)
    }

    pub fn mastery_xp_pct(&self) -> f64 {
        self.get(names::MASTERY_XP)
    }

    pub fn skill_item_doubling_chance(&self) -> f64 {
        self.get(names::SKILL_ITEM_DOUBLING_CHANCE)
    }

    pub fn perfect_cook_chance(&self) -> f64 {
        self.get(names::PERFECT_COOK_CHANCE)
    }

    pub fn flat_slayer_area_effect_negation(&self) -> f64 {
        self.get(names::FLAT_SLAYER_AREA_EFFECT_NEGATION)
    }

    pub fn thieving_stealth(&self) -> f64 {
        self.get(names::THIEVING_STEALTH)
    }

    pub fn farming_yield_pct(&self) -> f64 {
        self.get(names::FARMING_YIELD)
    }

    pub fn flat_max_hit(&self) -> f64 {
        self.get(names::FLAT_MAX_HIT)
    }

    pub fn flat_accuracy(&self) -> f64 {
        self.get(names::FLAT_ACCURACY)
    }

    pub fn flat_evasion(&self) -> f64 {
        self.get(names::FLAT_EVASION)
    }

    pub fn shop_cost_reduction_pct(&self) -> f64 {
        self.get(names::SHOP_COST_REDUCTION)
    }
}

fn accumulate(
    acc: &mut ResolvedModifiers,
    def: &ModifierDef,
    anchor: &ModifierAnchor,
    multiplicity: f64,
) {
    if multiplicity == 0.0 {
        return;
    }
    for entry in &def.entries {
        if entry.scope.matches(anchor) {
            acc.add(&def.name, entry.value * multiplicity);
        }
    }
}

/// Fold every modifier source in the state into a flat map, filtered by the
/// anchor's scope.
///
/// Sources: shop purchases, mastery-level bonuses and pool checkpoints of the
/// anchor skill, astrology purchases, built agility obstacles, equipment,
/// active buffs, and (last, so negation can read the fold so far) slayer area
/// effects for the current combat.
pub fn resolve_modifiers(state: &GlobalState, anchor: &ModifierAnchor) -> ResolvedModifiers {
    let reg = state.registries();
    let mut acc = ResolvedModifiers::default();

    // Shop purchases apply once per purchase.
    for (purchase_id, count) in state.shop_state.purchases.iter() {
        if let Some(entry) = reg.shop_entry(purchase_id) {
            for def in &entry.modifiers {
                accumulate(&mut acc, def, anchor, *count as f64);
            }
        }
    }

    // Mastery-level bonuses keyed on the anchor action's mastery level.
    if let Some(skill) = anchor.skill {
        let mastery_level = anchor
            .action
            .map(|a| state.mastery_level(a))
            .unwrap_or(0);
        for bonus in reg.mastery_bonuses(skill) {
            if bonus.auto_scope_to_action && anchor.action.is_none() {
                continue;
            }
            if mastery_level < bonus.trigger_level {
                continue;
            }
            let multiplicity = match (bonus.level_scaling_slope, bonus.level_scaling_max) {
                (Some(slope), max) if slope > 0 => {
                    let capped = mastery_level.min(max.unwrap_or(xp::MAX_MASTERY_LEVEL));
                    ((capped - bonus.trigger_level) / slope + 1) as f64
                }
                _ => 1.0,
            };
            for def in &bonus.modifiers {
                accumulate(&mut acc, def, anchor, multiplicity);
            }
        }

        // Pool checkpoints grant skill-wide bundles once reached.
        let pool = state.skill_state(skill).mastery_pool_xp;
        let cap = xp::max_mastery_pool_xp(reg.actions_for_skill(skill).len());
        for checkpoint in reg.pool_checkpoints(skill) {
            if (pool as f64) >= checkpoint.fraction * cap as f64 {
                for def in &checkpoint.modifiers {
                    accumulate(&mut acc, def, anchor, 1.0);
                }
            }
        }
    }

    // Astrology constellation purchases apply once per purchased level.
    for (constellation_id, purchases) in state.astrology.purchased.iter() {
        if let Some(constellation) = reg.constellation(constellation_id) {
            for (idx, &level) in purchases.standard.iter().enumerate() {
                if let Some(def) = constellation.standard_modifiers.get(idx) {
                    for m in &def.modifiers {
                        accumulate(&mut acc, m, anchor, level as f64);
                    }
                }
            }
            for (idx, &level) in purchases.unique.iter().enumerate() {
                if let Some(def) = constellation.unique_modifiers.get(idx) {
                    for m in &def.modifiers {
                        accumulate(&mut acc, m, anchor, level as f64);
                    }
                }
            }
        }
    }

    // Built agility obstacles.
    for obstacle_id in state.agility.built.iter().flatten() {
        if let Some(obstacle) = reg.obstacle(obstacle_id) {
            for def in &obstacle.modifiers {
                accumulate(&mut acc, def, anchor, 1.0);
            }
        }
    }

    // Equipped items.
    for item_id in state.equipment.slots.values() {
        if let Some(item) = reg.item(item_id) {
            for def in &item.modifiers {
                accumulate(&mut acc, def, anchor, 1.0);
            }
        }
    }

    // Active conditional buffs (potions, food effects).
    for buff in &state.active_buffs {
        for def in &buff.modifiers {
            accumulate(&mut acc, def, anchor, 1.0);
        }
    }

    // Slayer area effects for the current combat, last so the negation read
    // below sees every other source.
    if let Some(ActiveActivity::Combat(combat)) = &state.active_activity {
        if let CombatContext::SlayerArea { area, .. } = &combat.context {
            if let Some(area_def) = reg.slayer_area(area) {
                let negation = acc.flat_slayer_area_effect_negation().clamp(0.0, 100.0);
                let strength = (100.0 - negation) / 100.0;
                for def in &area_def.effect_modifiers {
                    accumulate(&mut acc, def, anchor, strength);
                }
            }
        }
    }

    acc
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action_id(name: &str) -> Id {
        Id::new("demo", name)
    }

    #[test]
    fn test_global_scope_matches_everything() {
        let scope = ModifierScope::global();
        assert!(scope.matches(&ModifierAnchor::global()));
        assert!(scope.matches(&ModifierAnchor::for_skill(Skill::Mining)));
    }

    #[test]
    fn test_skill_scope_requires_matching_skill() {
        let scope = ModifierScope::for_skill(Skill::Woodcutting);
        assert!(scope.matches(&ModifierAnchor::for_skill(Skill::Woodcutting)));
        assert!(!scope.matches(&ModifierAnchor::for_skill(Skill::Fishing)));
        assert!(!scope.matches(&ModifierAnchor::global()));
    }

    #[test]
    fn test_action_scope_requires_matching_action() {
        let tree = action_id("normal_tree");
        let oak = action_id("oak_tree");
        let scope = ModifierScope::for_action(tree.clone());
        let anchor = ModifierAnchor {
            skill: Some(Skill::Woodcutting),
            action: Some(&tree),
            category: None,
        };
        assert!(scope.matches(&anchor));
        let other = ModifierAnchor {
            skill: Some(Skill::Woodcutting),
            action: Some(&oak),
            category: None,
        };
        assert!(!scope.matches(&other));
    }

    #[test]
    fn test_combined_scope_ands_together() {
        let tree = action_id("normal_tree");
        let scope = ModifierScope {
            skill: Some(Skill::Woodcutting),
            action: Some(tree.clone()),
            category: None,
        };
        let wrong_skill = ModifierAnchor {
            skill: Some(Skill::Fishing),
            action: Some(&tree),
            category: None,
        };
        assert!(!scope.matches(&wrong_skill));
    }

    #[test]
    fn test_resolved_values_sum() {
        let mut resolved = ResolvedModifiers::default();
        resolved.add(names::SKILL_INTERVAL, -5.0);
        resolved.add(names::SKILL_INTERVAL, -3.0);
        assert_eq!(resolved.skill_interval_pct(), -8.0);
        assert_eq!(resolved.get("unknownModifier"), 0.0);
    }
}
