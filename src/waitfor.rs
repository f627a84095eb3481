//! Wait conditions: predicates over the state with tick estimates under the
//! current rates. The solver's wait and macro steps are expressed in these.

use crate::goal::{ticks_to_close, Goal};
use crate::id::Id;
use crate::interactions::SellPolicy;
use crate::rates::Rates;
use crate::state::GlobalState;
use crate::{Skill, Tick, INF_TICKS};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WaitFor {
    /// GP on hand plus sellable inventory value reaches `amount`.
    EffectiveCredits {
        amount: i64,
        #[serde(default)]
        policy: SellPolicy,
    },
    SkillXp { skill: Skill, xp: i64 },
    MasteryXp { action: Id, xp: i64 },
    /// Absolute inventory count reaches `count`.
    InventoryAtLeast { item: Id, count: i64 },
    /// Inventory count reaches `start + delta`.
    InventoryDelta { item: Id, delta: i64, start: i64 },
    /// Used-slot fraction reaches `fraction`.
    InventoryThreshold { fraction: f64 },
    InventoryFull,
    /// The action's inputs have run dry.
    InputsDepleted { action: Id },
    /// Every input of the action is present.
    InputsAvailable { action: Id },
    /// Every input of the action has at least `count` units.
    SufficientInputs { action: Id, count: i64 },
    AnyOf { conditions: Vec<WaitFor> },
    Goal { goal: Goal },
}

impl WaitFor {
    pub fn is_satisfied(&self, state: &GlobalState) -> bool {
        match self {
            WaitFor::EffectiveCredits { amount, policy } => {
                policy.effective_credits(state) >= *amount
            }
            WaitFor::SkillXp { skill, xp } => state.skill_xp(*skill) >= *xp,
            WaitFor::MasteryXp { action, xp } => state.mastery_xp(action) >= *xp,
            WaitFor::InventoryAtLeast { item, count } => {
                state.inventory.count_of(item) >= *count
            }
            WaitFor::InventoryDelta { item, delta, start } => {
                state.inventory.count_of(item) >= start + delta
            }
            WaitFor::InventoryThreshold { fraction } => {
                state.inventory.fill_fraction() >= *fraction
            }
            WaitFor::InventoryFull => state.inventory.is_full(),
            WaitFor::InputsDepleted { action } => match state.registries().action(action) {
                Some(def) => def
                    .inputs
                    .iter()
                    .any(|(item, qty)| state.inventory.count_of(item) < *qty),
                None => true,
            },
            WaitFor::InputsAvailable { action } => match state.registries().action(action) {
                Some(def) => def
                    .inputs
                    .iter()
                    .all(|(item, qty)| state.inventory.count_of(item) >= *qty),
                None => false,
            },
            WaitFor::SufficientInputs { action, count } => {
                match state.registries().action(action) {
                    Some(def) => def
                        .inputs
                        .iter()
                        .all(|(item, qty)| state.inventory.count_of(item) >= qty * count),
                    None => false,
                }
            }
            WaitFor::AnyOf { conditions } => conditions.iter().any(|c| c.is_satisfied(state)),
            WaitFor::Goal { goal } => goal.is_satisfied(state),
        }
    }

    /// Ticks until satisfied at the given rates: 0 when already satisfied,
    /// `INF_TICKS` when unreachable.
    pub fn estimate_ticks(&self, state: &GlobalState, rates: &Rates) -> Tick {
        if self.is_satisfied(state) {
            return 0;
        }
        match self {
            WaitFor::EffectiveCredits { amount, policy } => {
                let deficit = (*amount - policy.effective_credits(state)) as f64;
                // Value accrues from direct GP and sellable item inflows.
                let mut rate = rates.direct_gp_per_tick;
                for (item, flow) in &rates.item_flows_per_tick {
                    if *flow > 0.0 && !policy.keep.contains(item) {
                        if let Some(def) = state.registries().item(item) {
                            rate += flow * def.sell_price as f64;
                        }
                    }
                }
                ticks_to_close(deficit, rate)
            }
            WaitFor::SkillXp { skill, xp } => {
                let deficit = (*xp - state.skill_xp(*skill)) as f64;
                ticks_to_close(deficit, rates.xp_rate(*skill))
            }
            WaitFor::MasteryXp { action, xp } => {
                let deficit = (*xp - state.mastery_xp(action)) as f64;
                ticks_to_close(deficit, rates.mastery_xp_per_tick)
            }
            WaitFor::InventoryAtLeast { item, count } => {
                let deficit = (*count - state.inventory.count_of(item)) as f64;
                ticks_to_close(deficit, rates.flow(item))
            }
            WaitFor::InventoryDelta { item, delta, start } => {
                let deficit = (start + delta - state.inventory.count_of(item)) as f64;
                ticks_to_close(deficit, rates.flow(item))
            }
            WaitFor::InventoryThreshold { fraction } => {
                let target = (fraction * state.inventory.capacity() as f64).ceil();
                let deficit = target - state.inventory.used_slots() as f64;
                ticks_to_close(deficit, rates.item_types_per_tick)
            }
            WaitFor::InventoryFull => {
                let deficit = state.inventory.free_slots() as f64;
                ticks_to_close(deficit, rates.item_types_per_tick)
            }
            WaitFor::InputsDepleted { action } => match state.registries().action(action) {
                Some(def) => def
                    .inputs
                    .iter()
                    .map(|(item, qty)| {
                        let consumption = -rates.flow(item);
                        if consumption <= 0.0 {
                            return INF_TICKS;
                        }
                        let held = state.inventory.count_of(item);
                        // Depleted once fewer than one iteration's worth remains.
                        let surplus = (held - (qty - 1)) as f64;
                        ticks_to_close(surplus, consumption)
                    })
                    .min()
                    .unwrap_or(INF_TICKS),
                None => 0,
            },
            WaitFor::InputsAvailable { action } => match state.registries().action(action) {
                Some(def) => def
                    .inputs
                    .iter()
                    .map(|(item, qty)| {
                        let deficit = (*qty - state.inventory.count_of(item)) as f64;
                        ticks_to_close(deficit, rates.flow(item))
                    })
                    .max()
                    .unwrap_or(0),
                None => INF_TICKS,
            },
            WaitFor::SufficientInputs { action, count } => {
                match state.registries().action(action) {
                    Some(def) => def
                        .inputs
                        .iter()
                        .map(|(item, qty)| {
                            let deficit =
                                (qty * count - state.inventory.count_of(item)) as f64;
                            ticks_to_close(deficit, rates.flow(item))
                        })
                        .max()
                        .unwrap_or(0),
                    None => INF_TICKS,
                }
            }
            WaitFor::AnyOf { conditions } => conditions
                .iter()
                .map(|c| c.estimate_ticks(state, rates))
                .min()
                .unwrap_or(INF_TICKS),
            WaitFor::Goal { goal } => goal.estimate_ticks(state, rates),
        }
    }

    /// Scalar progress value for reporting.
    pub fn progress(&self, state: &GlobalState) -> i64 {
        match self {
            WaitFor::EffectiveCredits { policy, .. } => policy.effective_credits(state),
            WaitFor::SkillXp { skill, .. } => state.skill_xp(*skill),
            WaitFor::MasteryXp { action, .. } => state.mastery_xp(action),
            WaitFor::InventoryAtLeast { item, .. } | WaitFor::InventoryDelta { item, .. } => {
                state.inventory.count_of(item)
            }
            WaitFor::InventoryThreshold { .. } | WaitFor::InventoryFull => {
                state.inventory.used_slots() as i64
            }
            WaitFor::InputsDepleted { action }
            | WaitFor::InputsAvailable { action }
            | WaitFor::SufficientInputs { action, .. } => {
                match state.registries().action(action) {
                    Some(def) => def
                        .inputs
                        .iter()
                        .map(|(item, _)| state.inventory.count_of(item))
                        .min()
                        .unwrap_or(0),
                    None => 0,
                }
            }
            WaitFor::AnyOf { conditions } => conditions
                .iter()
                .map(|c| c.progress(state))
                .max()
                .unwrap_or(0),
            WaitFor::Goal { goal } => goal.remaining(state) as i64,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            WaitFor::EffectiveCredits { amount, .. } => format!("until {} effective GP", amount),
            WaitFor::SkillXp { skill, xp } => format!("until {} XP in {}", xp, skill),
            WaitFor::MasteryXp { action, xp } => format!("until {} mastery XP on {}", xp, action),
            WaitFor::InventoryAtLeast { item, count } => format!("until {} x{}", item, count),
            WaitFor::InventoryDelta { item, delta, .. } => format!("until +{} {}", delta, item),
            WaitFor::InventoryThreshold { fraction } => {
                format!("until inventory {:.0}% full", fraction * 100.0)
            }
            WaitFor::InventoryFull => "until inventory full".to_string(),
            WaitFor::InputsDepleted { action } => format!("until {} runs out of inputs", action),
            WaitFor::InputsAvailable { action } => format!("until {} has inputs", action),
            WaitFor::SufficientInputs { action, count } => {
                format!("until {} has {} runs of inputs", action, count)
            }
            WaitFor::AnyOf { conditions } => {
                let parts: Vec<String> = conditions.iter().map(|c| c.describe()).collect();
                parts.join(" or ")
            }
            WaitFor::Goal { goal } => goal.describe(),
        }
    }
}
