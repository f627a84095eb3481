//! Typed goal predicates the solver plans toward.

use crate::enums::Skill;
use crate::rates::Rates;
use crate::state::GlobalState;
use crate::xp;
use crate::{Tick, INF_TICKS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Goal {
    ReachGp { amount: i64 },
    ReachSkillLevel { skill: Skill, level: u32 },
    MultiSkill { levels: BTreeMap<Skill, u32> },
}

/// Ticks to close a deficit at a rate; 0 when already closed, infinite when
/// the rate cannot close it.
pub(crate) fn ticks_to_close(deficit: f64, rate_per_tick: f64) -> Tick {
    if deficit <= 0.0 {
        return 0;
    }
    if rate_per_tick <= 0.0 {
        return INF_TICKS;
    }
    (deficit / rate_per_tick).ceil() as Tick
}

impl Goal {
    pub fn multi_skill(levels: impl IntoIterator<Item = (Skill, u32)>) -> Self {
        Goal::MultiSkill {
            levels: levels.into_iter().collect(),
        }
    }

    pub fn is_satisfied(&self, state: &GlobalState) -> bool {
        match self {
            Goal::ReachGp { amount } => state.gp >= *amount,
            Goal::ReachSkillLevel { skill, level } => state.skill_level(*skill) >= *level,
            Goal::MultiSkill { levels } => levels
                .iter()
                .all(|(skill, level)| state.skill_level(*skill) >= *level),
        }
    }

    /// Scalar distance to the goal, for progress reporting: GP short, or
    /// total XP short across subgoals.
    pub fn remaining(&self, state: &GlobalState) -> f64 {
        match self {
            Goal::ReachGp { amount } => (*amount - state.gp).max(0) as f64,
            Goal::ReachSkillLevel { skill, level } => {
                (xp::start_xp_for_level(*level) - state.skill_xp(*skill)).max(0) as f64
            }
            Goal::MultiSkill { levels } => levels
                .iter()
                .map(|(skill, level)| {
                    (xp::start_xp_for_level(*level) - state.skill_xp(*skill)).max(0) as f64
                })
                .sum(),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Goal::ReachGp { amount } => format!("Reach {} GP", amount),
            Goal::ReachSkillLevel { skill, level } => format!("Reach {} level {}", skill, level),
            Goal::MultiSkill { levels } => {
                let parts: Vec<String> = levels
                    .iter()
                    .map(|(skill, level)| format!("{} {}", skill, level))
                    .collect();
                format!("Reach {}", parts.join(", "))
            }
        }
    }

    /// The skills this goal directly cares about. GP goals name no skill;
    /// the candidate enumerator adds earner skills itself.
    pub fn relevant_skills(&self) -> Vec<Skill> {
        match self {
            Goal::ReachGp { .. } => Vec::new(),
            Goal::ReachSkillLevel { skill, .. } => vec![*skill],
            Goal::MultiSkill { levels } => levels.keys().copied().collect(),
        }
    }

    /// Ticks to satisfaction under the given rates; `INF_TICKS` when the
    /// rates cannot get there.
    pub fn estimate_ticks(&self, state: &GlobalState, rates: &Rates) -> Tick {
        match self {
            Goal::ReachGp { amount } => {
                let deficit = (*amount - state.gp).max(0) as f64;
                // GP arrives directly and through sellable item flows.
                let mut rate = rates.direct_gp_per_tick;
                for (item, flow) in &rates.item_flows_per_tick {
                    if *flow > 0.0 {
                        if let Some(def) = state.registries().item(item) {
                            rate += flow * def.sell_price as f64;
                        }
                    }
                }
                ticks_to_close(deficit, rate)
            }
            Goal::ReachSkillLevel { skill, level } => {
                let deficit = (xp::start_xp_for_level(*level) - state.skill_xp(*skill)).max(0);
                ticks_to_close(deficit as f64, rates.xp_rate(*skill))
            }
            Goal::MultiSkill { levels } => {
                let mut total: Tick = 0;
                for (skill, level) in levels {
                    let deficit =
                        (xp::start_xp_for_level(*level) - state.skill_xp(*skill)).max(0);
                    if deficit == 0 {
                        continue;
                    }
                    let t = ticks_to_close(deficit as f64, rates.xp_rate(*skill));
                    if t >= INF_TICKS {
                        return INF_TICKS;
                    }
                    total += t;
                }
                total
            }
        }
    }

    /// Stable identity string for cache keys.
    pub fn cache_key(&self) -> String {
        match self {
            Goal::ReachGp { amount } => format!("gp:{}", amount),
            Goal::ReachSkillLevel { skill, level } => format!("level:{}:{}", skill, level),
            Goal::MultiSkill { levels } => {
                let parts: Vec<String> = levels
                    .iter()
                    .map(|(skill, level)| format!("{}:{}", skill, level))
                    .collect();
                format!("multi:{}", parts.join(","))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registries;
    use std::sync::Arc;

    fn state() -> GlobalState {
        GlobalState::empty(Arc::new(Registries::demo()))
    }

    #[test]
    fn test_reach_gp_goal() {
        let goal = Goal::ReachGp { amount: 100 };
        let state = state();
        assert!(!goal.is_satisfied(&state));
        assert_eq!(goal.remaining(&state), 100.0);
        let rich = state.with_gp(100);
        assert!(goal.is_satisfied(&rich));
        assert_eq!(goal.remaining(&rich), 0.0);
    }

    #[test]
    fn test_multi_skill_requires_all() {
        let goal = Goal::multi_skill([(Skill::Woodcutting, 10), (Skill::Fishing, 10)]);
        let state = state().with_skill_level(Skill::Woodcutting, 10);
        assert!(!goal.is_satisfied(&state));
        let state = state.with_skill_level(Skill::Fishing, 10);
        assert!(goal.is_satisfied(&state));
    }

    #[test]
    fn test_estimate_unreachable_without_rates() {
        let goal = Goal::ReachSkillLevel {
            skill: Skill::Mining,
            level: 20,
        };
        let state = state();
        assert_eq!(goal.estimate_ticks(&state, &Rates::empty()), INF_TICKS);
    }

    #[test]
    fn test_estimate_zero_when_satisfied() {
        let goal = Goal::ReachGp { amount: 0 };
        assert_eq!(goal.estimate_ticks(&state(), &Rates::empty()), 0);
    }

    #[test]
    fn test_cache_key_stable() {
        let a = Goal::multi_skill([(Skill::Fishing, 50), (Skill::Woodcutting, 50)]);
        let b = Goal::multi_skill([(Skill::Woodcutting, 50), (Skill::Fishing, 50)]);
        assert_eq!(a.cache_key(), b.cache_key(), "BTreeMap ordering makes keys stable");
    }
}
