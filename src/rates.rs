//! The rate estimator: projects per-tick XP, item, and GP rates from the
//! current state and foreground activity. Pure expected-value math over the
//! definitions; the solver leans on it for every wait estimate.

use crate::enums::Skill;
use crate::id::Id;
use crate::modifier::{resolve_modifiers, ModifierAnchor};
use crate::rollers;
use crate::skills::{combat, thieving};
use crate::state::{ActiveActivity, GlobalState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rates {
    pub direct_gp_per_tick: f64,
    pub item_flows_per_tick: BTreeMap<Id, f64>,
    pub xp_per_tick_by_skill: BTreeMap<Skill, f64>,
    pub mastery_xp_per_tick: f64,
    /// Distinct new item types entering the inventory per tick; drives
    /// inventory-pressure estimates.
    pub item_types_per_tick: f64,
}

impl Rates {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn xp_rate(&self, skill: Skill) -> f64 {
        self.xp_per_tick_by_skill.get(&skill).copied().unwrap_or(0.0)
    }

    pub fn flow(&self, item: &Id) -> f64 {
        self.item_flows_per_tick.get(item).copied().unwrap_or(0.0)
    }

    fn add_flow(&mut self, item: &Id, per_tick: f64) {
        *self.item_flows_per_tick.entry(item.clone()).or_insert(0.0) += per_tick;
    }
}

/// Project rates for the current foreground activity. No activity means
/// empty rates.
pub fn estimate_rates(state: &GlobalState) -> Rates {
    match &state.active_activity {
        None => Rates::empty(),
        Some(ActiveActivity::Skill(activity)) => match activity.skill {
            Skill::Agility => agility_rates(state, &activity.action),
            Skill::Thieving => thieving_rates(state, &activity.action),
            Skill::Cooking => cooking_rates(state, &activity.action),
            _ => gathering_rates(state, &activity.action),
        },
        Some(ActiveActivity::Combat(activity)) => combat_rates(state, activity),
    }
}

fn gathering_rates(state: &GlobalState, action_id: &Id) -> Rates {
    let Some(def) = state.registries().action(action_id) else {
        return Rates::empty();
    };
    let anchor = ModifierAnchor::for_action(state, action_id);
    let modifiers = resolve_modifiers(state, &anchor);
    let d = rollers::rolled_duration(def.base_ticks, &modifiers) as f64;

    let mut rates = Rates::empty();
    let xp = crate::skills::scaled_skill_xp(def.xp, &modifiers) as f64;
    rates.xp_per_tick_by_skill.insert(def.skill, xp / d);
    rates.mastery_xp_per_tick =
        crate::skills::mastery_xp_per_completion(def.base_ticks, &modifiers) as f64 / d;

    let doubling_multiplier = 1.0 + modifiers.skill_item_doubling_chance() / 100.0;
    let mut new_types = 0.0;
    for (item, qty) in &def.outputs {
        rates.add_flow(item, *qty as f64 * doubling_multiplier / d);
        if !state.inventory.contains(item) {
            new_types += 1.0;
        }
    }
    if let Some(drops) = &def.drops {
        for (item, expected) in drops.expected_items() {
            rates.add_flow(&item, expected / d);
            if !state.inventory.contains(&item) {
                new_types += 1.0;
            }
        }
    }
    for (item, qty) in &def.inputs {
        rates.add_flow(item, -(*qty as f64) / d);
    }
    rates.item_types_per_tick = new_types / d;
    rates
}

fn cooking_rates(state: &GlobalState, action_id: &Id) -> Rates {
    let Some(def) = state.registries().action(action_id) else {
        return Rates::empty();
    };
    let anchor = ModifierAnchor::for_action(state, action_id);
    let modifiers = resolve_modifiers(state, &anchor);
    let d = rollers::rolled_duration(def.base_ticks, &modifiers) as f64;

    let mastery_level = state.mastery_level(action_id);
    let success = (rollers::cooking_success_chance(mastery_level)
        + modifiers.perfect_cook_chance() / 100.0)
        .min(1.0);

    let mut rates = Rates::empty();
    let full_xp = crate::skills::scaled_skill_xp(def.xp, &modifiers) as f64;
    rates
        .xp_per_tick_by_skill
        .insert(Skill::Cooking, (success * full_xp + (1.0 - success)) / d);
    rates.mastery_xp_per_tick =
        crate::skills::mastery_xp_per_completion(def.base_ticks, &modifiers) as f64 / d;

    let doubling_multiplier = 1.0 + modifiers.skill_item_doubling_chance() / 100.0;
    let mut new_types = 0.0;
    for (item, qty) in &def.outputs {
        rates.add_flow(item, success * *qty as f64 * doubling_multiplier / d);
        if !state.inventory.contains(item) {
            new_types += 1.0;
        }
    }
    for (item, qty) in &def.inputs {
        rates.add_flow(item, -(*qty as f64) / d);
    }
    rates.item_types_per_tick = new_types / d;
    rates
}

fn thieving_rates(state: &GlobalState, action_id: &Id) -> Rates {
    let Some(def) = state.registries().action(action_id) else {
        return Rates::empty();
    };
    let Some(thieving_def) = &def.thieving else {
        return Rates::empty();
    };
    let anchor = ModifierAnchor::for_action(state, action_id);
    let modifiers = resolve_modifiers(state, &anchor);
    let d = rollers::rolled_duration(def.base_ticks, &modifiers) as f64;

    let stealth = rollers::thieving_stealth(
        state.skill_level(Skill::Thieving),
        state.mastery_level(action_id),
    ) + modifiers.thieving_stealth() as i64;
    let p = rollers::thieving_success_chance(stealth, thieving_def.perception);

    // A failed attempt costs the stun on top of the action time.
    let cycle = d + (1.0 - p) * thieving::STUN_TICKS as f64;

    let mut rates = Rates::empty();
    let xp = crate::skills::scaled_skill_xp(def.xp, &modifiers) as f64;
    rates
        .xp_per_tick_by_skill
        .insert(Skill::Thieving, p * xp / cycle);
    rates.mastery_xp_per_tick =
        p * crate::skills::mastery_xp_per_completion(def.base_ticks, &modifiers) as f64 / cycle;
    let mean_gp = (thieving_def.gp_min + thieving_def.gp_max) as f64 / 2.0;
    rates.direct_gp_per_tick = p * mean_gp / cycle;
    rates
}

fn agility_rates(state: &GlobalState, obstacle_id: &Id) -> Rates {
    let Some(def) = state.registries().obstacle(obstacle_id) else {
        return Rates::empty();
    };
    let anchor = ModifierAnchor {
        skill: Some(Skill::Agility),
        action: Some(obstacle_id),
        category: None,
    };
    let modifiers = resolve_modifiers(state, &anchor);
    let d = rollers::rolled_duration(def.duration_ticks, &modifiers) as f64;

    let mut rates = Rates::empty();
    rates.xp_per_tick_by_skill.insert(
        Skill::Agility,
        crate::skills::scaled_skill_xp(def.xp, &modifiers) as f64 / d,
    );
    rates.mastery_xp_per_tick =
        crate::skills::mastery_xp_per_completion(def.duration_ticks, &modifiers) as f64 / d;
    rates
}

fn combat_rates(state: &GlobalState, activity: &crate::state::CombatActivity) -> Rates {
    let monster_id = activity.context.current_monster_id();
    let Some(monster) = state.registries().monster(monster_id) else {
        return Rates::empty();
    };
    let anchor = ModifierAnchor::for_skill(activity.style.xp_skill());
    let modifiers = resolve_modifiers(state, &anchor);
    let stats = combat::player_stats(state, &modifiers);

    let hit_chance = if stats.accuracy <= 0.0 {
        0.0
    } else {
        stats.accuracy / (stats.accuracy + monster.evasion.max(0.0))
    };
    let mean_hit = (1 + stats.max_hit) as f64 / 2.0;
    let damage_per_tick = hit_chance * mean_hit / combat::PLAYER_ATTACK_INTERVAL_TICKS as f64;
    if damage_per_tick <= 0.0 {
        return Rates::empty();
    }
    let kill_ticks = monster.hp as f64 / damage_per_tick + combat::MONSTER_SPAWN_TICKS as f64;

    let mut rates = Rates::empty();
    let style_xp = crate::skills::scaled_skill_xp(monster.xp, &modifiers) as f64;
    rates
        .xp_per_tick_by_skill
        .insert(activity.style.xp_skill(), style_xp / kill_ticks);
    rates.xp_per_tick_by_skill.insert(
        Skill::Hitpoints,
        (monster.xp / 3).max(1) as f64 / kill_ticks,
    );
    if state.slayer_task.is_some() {
        // Rough credit: slayer XP lands in lumps at task completion.
        rates
            .xp_per_tick_by_skill
            .entry(Skill::Slayer)
            .or_insert(0.0);
    }
    let mut new_types = 0.0;
    if let Some(drops) = &monster.drops {
        for (item, expected) in drops.expected_items() {
            rates.add_flow(&item, expected / kill_ticks);
            if !state.inventory.contains(&item) {
                new_types += 1.0;
            }
        }
    }
    rates.item_types_per_tick = new_types / kill_ticks;
    rates
}
