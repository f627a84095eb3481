//! Candidate enumeration and the capability cache.
//!
//! Given `(state, goal)` the enumerator produces the player decisions worth
//! considering: activities to switch to, shop upgrades to buy, a sell
//! policy, watch conditions for replan boundaries, and train-until-boundary
//! macros. Enumeration is memoized by a capability-equivalence key so states
//! that differ only in irrelevant details share the work. The currently
//! active action is deliberately not part of the key; it is filtered out of
//! the switch list at lookup time instead.

use crate::enums::{AttackStyle, Skill};
use crate::goal::Goal;
use crate::id::Id;
use crate::interactions::SellPolicy;
use crate::modifier::ResolvedModifiers;
use crate::registry::{ActionDef, MonsterDef};
use crate::skills::combat;
use crate::state::GlobalState;
use crate::waitfor::WaitFor;
use crate::xp;
use std::collections::{BTreeSet, HashMap};

/// What a macro trains through: a skill action, or fighting a monster with
/// the style that feeds the goal skill.
#[derive(Debug, Clone, PartialEq)]
pub enum MacroActivity {
    SkillAction(Id),
    Combat { monster: Id, style: AttackStyle },
}

/// A compound "train this skill until the next boundary" candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct MacroCandidate {
    pub skill: Skill,
    pub activity: MacroActivity,
    /// Coarse ranking signal; base XP per base tick.
    pub expected_xp_rate: f64,
}

impl MacroCandidate {
    /// The id identifying the trained activity: the action id, or the
    /// monster id for combat macros.
    pub fn key_id(&self) -> &Id {
        match &self.activity {
            MacroActivity::SkillAction(action) => action,
            MacroActivity::Combat { monster, .. } => monster,
        }
    }

    pub fn describe(&self) -> String {
        match &self.activity {
            MacroActivity::SkillAction(action) => format!("Train {} via {}", self.skill, action),
            MacroActivity::Combat { monster, .. } => {
                format!("Train {} fighting {}", self.skill, monster)
            }
        }
    }
}

pub type WatchList = Vec<WaitFor>;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Candidates {
    pub switch_to_activities: Vec<Id>,
    pub buy_upgrades: Vec<Id>,
    pub sell_policy: SellPolicy,
    pub should_emit_sell_candidate: bool,
    pub watch: WatchList,
    pub macros: Vec<MacroCandidate>,
}

/// Equivalence class over states: everything that could change the
/// candidate set, in small stable buckets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CandidateCacheKey {
    /// Discretized fill level, 0..=4.
    pub inventory_bucket: u8,
    /// Goal-relevant skills (plus producers for consumers) and their levels.
    pub skill_levels: Vec<(Skill, u32)>,
    /// Purchases per relevant skill's upgrade ladder.
    pub upgrade_tiers: Vec<(Skill, u32)>,
    pub goal_key: String,
}

impl CandidateCacheKey {
    pub fn for_state(state: &GlobalState, goal: &Goal) -> Self {
        let skills = relevant_skills(state, goal);
        let skill_levels = skills
            .iter()
            .map(|s| (*s, state.skill_level(*s)))
            .collect();
        let upgrade_tiers = skills
            .iter()
            .map(|s| {
                let owned = state
                    .registries()
                    .shop_ladder(*s)
                    .iter()
                    .map(|e| state.shop_state.purchase_count(&e.id) as u32)
                    .sum();
                (*s, owned)
            })
            .collect();
        Self {
            inventory_bucket: (state.inventory.fill_fraction() * 4.0).floor().min(4.0) as u8,
            skill_levels,
            upgrade_tiers,
            goal_key: goal.cache_key(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CandidateCache {
    entries: HashMap<CandidateCacheKey, Candidates>,
    pub hits: u64,
    pub misses: u64,
}

impl CandidateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch (or compute) the candidates for this state's capability class,
    /// with the active action filtered out of the switch list.
    pub fn get(&mut self, state: &GlobalState, goal: &Goal) -> Candidates {
        let key = CandidateCacheKey::for_state(state, goal);
        let base = match self.entries.get(&key) {
            Some(cached) => {
                self.hits += 1;
                cached.clone()
            }
            None => {
                self.misses += 1;
                let computed = enumerate_candidates(state, goal);
                self.entries.insert(key, computed.clone());
                computed
            }
        };
        let mut filtered = base;
        if let Some(active) = state
            .active_activity
            .as_ref()
            .and_then(|a| a.action_id())
            .cloned()
        {
            // Switching to the already-active action is a no-op; macros keep
            // it so a plan can train through consecutive boundaries.
            filtered.switch_to_activities.retain(|a| a != &active);
        }
        filtered
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Goal-relevant skills, augmented with the producer skills feeding any
/// consumer skill in the set (cooking pulls in fishing, firemaking pulls in
/// woodcutting), and with the GP earners for pure GP goals.
pub fn relevant_skills(state: &GlobalState, goal: &Goal) -> Vec<Skill> {
    let mut set: BTreeSet<Skill> = goal.relevant_skills().into_iter().collect();

    if set.is_empty() {
        // GP goal: any unlocked skill that earns GP directly or produces
        // sellable output is a candidate earner.
        for skill in Skill::ALL {
            if skill.is_combat() {
                continue;
            }
            let earns = state.unlocked_actions(skill).iter().any(|a| {
                a.thieving.is_some()
                    || a.outputs.iter().any(|(item, _)| {
                        state
                            .registries()
                            .item(item)
                            .map(|def| def.sell_price > 0)
                            .unwrap_or(false)
                    })
            });
            if earns {
                set.insert(skill);
            }
        }
    }

    // Producers for consumers: a skill whose actions output another skill's
    // inputs joins the set.
    let consumers: Vec<Skill> = set.iter().copied().collect();
    for consumer in consumers {
        for action in state.registries().actions_for_skill(consumer) {
            for (input, _) in &action.inputs {
                for producer_action in state.registries().actions.values() {
                    if producer_action.skill != consumer
                        && producer_action.outputs.iter().any(|(out, _)| out == input)
                    {
                        set.insert(producer_action.skill);
                    }
                }
            }
        }
    }

    set.into_iter().collect()
}

fn base_xp_rate(def: &ActionDef) -> f64 {
    if def.base_ticks <= 0 {
        return 0.0;
    }
    def.xp as f64 / def.base_ticks as f64
}

/// The attack style that routes kill XP into the goal skill. Hitpoints
/// earns from every style, so any one works.
fn style_for(skill: Skill) -> AttackStyle {
    match skill {
        Skill::Strength => AttackStyle::Aggressive,
        Skill::Defence => AttackStyle::Defensive,
        _ => AttackStyle::Accurate,
    }
}

/// Expected kill XP per tick against a monster with the player's current
/// stats (no modifier stack; this is a ranking signal, not a promise).
fn monster_xp_rate(state: &GlobalState, monster: &MonsterDef) -> f64 {
    let stats = combat::player_stats(state, &ResolvedModifiers::default());
    if stats.accuracy <= 0.0 {
        return 0.0;
    }
    let hit_chance = stats.accuracy / (stats.accuracy + monster.evasion.max(0.0));
    let damage_per_tick =
        hit_chance * (1 + stats.max_hit) as f64 / 2.0 / combat::PLAYER_ATTACK_INTERVAL_TICKS as f64;
    if damage_per_tick <= 0.0 {
        return 0.0;
    }
    let kill_ticks = monster.hp as f64 / damage_per_tick + combat::MONSTER_SPAWN_TICKS as f64;
    monster.xp as f64 / kill_ticks
}

/// Melee combat trains these; the demo bundle has no ranged/magic/prayer
/// trainers.
fn trains_by_fighting(skill: Skill) -> bool {
    matches!(
        skill,
        Skill::Attack | Skill::Strength | Skill::Defence | Skill::Hitpoints
    )
}

fn base_gp_rate(state: &GlobalState, def: &ActionDef) -> f64 {
    if def.base_ticks <= 0 {
        return 0.0;
    }
    let mut gp_per_completion = 0.0;
    if let Some(thieving) = &def.thieving {
        gp_per_completion += (thieving.gp_min + thieving.gp_max) as f64 / 2.0;
    }
    for (item, qty) in &def.outputs {
        if let Some(item_def) = state.registries().item(item) {
            gp_per_completion += (item_def.sell_price * qty) as f64;
        }
    }
    for (item, qty) in &def.inputs {
        if let Some(item_def) = state.registries().item(item) {
            gp_per_completion -= (item_def.sell_price * qty) as f64;
        }
    }
    gp_per_completion / def.base_ticks as f64
}

/// Build the candidate set from scratch for this capability class.
pub fn enumerate_candidates(state: &GlobalState, goal: &Goal) -> Candidates {
    let skills = relevant_skills(state, goal);
    let gp_goal = matches!(goal, Goal::ReachGp { .. });

    let mut candidates = Candidates::default();

    // Keep the inputs of every relevant consumer action when selling.
    let mut keep: BTreeSet<Id> = BTreeSet::new();
    for skill in &skills {
        for action in state.unlocked_actions(*skill) {
            for (item, _) in &action.inputs {
                keep.insert(item.clone());
            }
        }
    }
    candidates.sell_policy = SellPolicy { keep };

    for skill in &skills {
        // Combat skills train by fighting monsters, not through the action
        // tables; surface the best target as a macro.
        if trains_by_fighting(*skill) {
            let best_monster = state
                .registries()
                .monsters
                .values()
                .max_by(|a, b| {
                    monster_xp_rate(state, a)
                        .partial_cmp(&monster_xp_rate(state, b))
                        .unwrap_or(std::cmp::Ordering::Equal)
                        .then_with(|| b.id.cmp(&a.id))
                });
            if let Some(monster) = best_monster {
                candidates.macros.push(MacroCandidate {
                    skill: *skill,
                    activity: MacroActivity::Combat {
                        monster: monster.id.clone(),
                        style: style_for(*skill),
                    },
                    expected_xp_rate: monster_xp_rate(state, monster),
                });
            }
            continue;
        }

        let unlocked = state.unlocked_actions(*skill);
        if unlocked.is_empty() {
            continue;
        }

        // The best action by the goal's currency, plus the newest unlock
        // (often the same action).
        let best = unlocked.iter().copied().max_by(|a, b| {
            let (ra, rb) = if gp_goal {
                (base_gp_rate(state, a), base_gp_rate(state, b))
            } else {
                (base_xp_rate(a), base_xp_rate(b))
            };
            ra.partial_cmp(&rb)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.id.cmp(&a.id))
        });
        let newest = unlocked.last().copied();
        for action in [best, newest].into_iter().flatten() {
            // Consumers without inputs on hand are not startable switches.
            let startable = action
                .inputs
                .iter()
                .all(|(item, qty)| state.inventory.count_of(item) >= *qty);
            if !startable {
                continue;
            }
            if !candidates.switch_to_activities.contains(&action.id) {
                candidates.switch_to_activities.push(action.id.clone());
                candidates.macros.push(MacroCandidate {
                    skill: *skill,
                    activity: MacroActivity::SkillAction(action.id.clone()),
                    expected_xp_rate: base_xp_rate(action),
                });
            }
        }

        // Next unlock in this skill is a replan boundary worth watching.
        let level = state.skill_level(*skill);
        if let Some(next) = state
            .registries()
            .actions_for_skill(*skill)
            .iter()
            .find(|a| a.level_required > level)
        {
            candidates.watch.push(WaitFor::SkillXp {
                skill: *skill,
                xp: xp::start_xp_for_level(next.level_required),
            });
        }

        // Affordable (or nearly affordable) upgrades in this skill's ladder.
        let credits = candidates.sell_policy.effective_credits(state);
        for entry in state.registries().shop_ladder(*skill) {
            if let Some(max) = entry.max_purchases {
                if state.shop_state.purchase_count(&entry.id) >= max {
                    continue;
                }
            }
            let prior_owned = entry.tier == 0
                || state
                    .registries()
                    .shop_ladder(*skill)
                    .iter()
                    .filter(|e| e.tier == entry.tier - 1)
                    .any(|e| state.shop_state.purchase_count(&e.id) > 0);
            if !prior_owned {
                continue;
            }
            if entry.cost_gp <= credits {
                candidates.buy_upgrades.push(entry.id.clone());
            } else if entry.cost_gp <= credits.saturating_mul(2).max(1_000) {
                // Soon affordable: watch for the credits boundary.
                candidates.watch.push(WaitFor::EffectiveCredits {
                    amount: entry.cost_gp,
                    policy: candidates.sell_policy.clone(),
                });
            }
            // Only the first un-owned rung of the ladder matters.
            break;
        }
    }

    candidates.should_emit_sell_candidate =
        gp_goal && candidates.sell_policy.sellable_value(state) > 0;

    candidates
}

/// Headroom factor on base rates for the solver heuristic: generous enough
/// to sit above any achievable modifier stack, tight enough to guide.
const OPTIMISM: f64 = 1.5;

/// Optimistic per-skill XP rate bound for the solver heuristic: the best
/// base rate across every action of the skill, locked or not. Combat
/// skills bound on the best monster under end-game damage output.
pub fn optimistic_xp_rate(state: &GlobalState, skill: Skill) -> f64 {
    if trains_by_fighting(skill) {
        return optimistic_combat_xp_rate(state) * OPTIMISM;
    }
    state
        .registries()
        .actions_for_skill(skill)
        .iter()
        .map(|a| base_xp_rate(a))
        .fold(0.0, f64::max)
        * OPTIMISM
}

/// Kill XP per tick assuming level-120 damage output; an upper bound no
/// reachable modifier stack exceeds.
fn optimistic_combat_xp_rate(state: &GlobalState) -> f64 {
    let max_hit = 1 + xp::MAX_LEVEL as i64 / 5 + 10;
    let damage_per_tick = max_hit as f64 / combat::PLAYER_ATTACK_INTERVAL_TICKS as f64;
    state
        .registries()
        .monsters
        .values()
        .map(|m| {
            let kill_ticks =
                m.hp as f64 / damage_per_tick + combat::MONSTER_SPAWN_TICKS as f64;
            m.xp as f64 / kill_ticks
        })
        .fold(0.0, f64::max)
}

/// Optimistic GP rate bound across every skill, for GP goal heuristics.
pub fn optimistic_gp_rate(state: &GlobalState) -> f64 {
    state
        .registries()
        .actions
        .values()
        .map(|a| base_gp_rate(state, a))
        .fold(0.0, f64::max)
        * OPTIMISM
}

/// Upgrades purchasable right now for the goal-relevant skills: the first
/// un-owned rung of each ladder whose cost fits the effective credits.
///
/// The cached candidate set is enumerated per capability class, which does
/// not track GP, so affordability is always re-derived from the live state
/// at expansion time.
pub fn affordable_upgrades(state: &GlobalState, goal: &Goal) -> Vec<Id> {
    let mut upgrades = Vec::new();
    for skill in relevant_skills(state, goal) {
        for entry in state.registries().shop_ladder(skill) {
            if let Some(max) = entry.max_purchases {
                if state.shop_state.purchase_count(&entry.id) >= max {
                    continue;
                }
            }
            let prior_owned = entry.tier == 0
                || state
                    .registries()
                    .shop_ladder(skill)
                    .iter()
                    .filter(|e| e.tier == entry.tier - 1)
                    .any(|e| state.shop_state.purchase_count(&e.id) > 0);
            if !prior_owned {
                continue;
            }
            if entry.cost_gp <= SellPolicy::default().effective_credits(state) {
                upgrades.push(entry.id.clone());
            }
            // Only the first un-owned rung of the ladder matters.
            break;
        }
    }
    upgrades
}
