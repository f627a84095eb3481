//! The goal solver: best-first search over `(state, plan)` nodes.
//!
//! Nodes expand through the capability cache's candidates: switching
//! activities, buying upgrades, selling, and train-until-boundary macros. A
//! macro child is produced by simulating the segment forward until a replan
//! boundary fires; the boundary state becomes the child node. Costs are
//! simulated ticks; the heuristic is the goal's remaining distance under
//! optimistic rates, so cheap plans surface first.

use crate::builder::StateUpdateBuilder;
use crate::candidates::{
    self, CandidateCache, CandidateCacheKey, Candidates, MacroActivity, MacroCandidate,
};
use crate::changes::Changes;
use crate::engine::consume_ticks_until;
use crate::enums::Skill;
use crate::error::SimResult;
use crate::goal::{ticks_to_close, Goal};
use crate::id::Id;
use crate::interactions::{self, Interaction, SellPolicy};
use crate::rng::SimRng;
use crate::state::GlobalState;
use crate::utils::format_duration;
use crate::waitfor::WaitFor;
use crate::{xp, Tick, INF_TICKS};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::time::{Duration, Instant};

/// A macro segment never simulates past this horizon in one go (6 hours).
pub const SEGMENT_HORIZON_TICKS: Tick = 216_000;

/// Inventory fill fraction that counts as pressure.
pub const INVENTORY_PRESSURE_FRACTION: f64 = 0.9;

// --- Plan ------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlanStep {
    Interaction {
        interaction: Interaction,
    },
    Wait {
        ticks: Tick,
        until: WaitFor,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expected_action: Option<Id>,
    },
    Macro {
        description: String,
        ticks: Tick,
        until: WaitFor,
    },
}

impl PlanStep {
    pub fn ticks(&self) -> Tick {
        match self {
            PlanStep::Interaction { .. } => 0,
            PlanStep::Wait { ticks, .. } | PlanStep::Macro { ticks, .. } => *ticks,
        }
    }

    fn describe(&self) -> String {
        match self {
            PlanStep::Interaction { interaction } => interaction.describe(),
            PlanStep::Wait { ticks, until, .. } => {
                format!("Wait {} ({})", format_duration(*ticks), until.describe())
            }
            PlanStep::Macro {
                description, ticks, ..
            } => format!("{} for {}", description, format_duration(*ticks)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Plan {
    pub steps: Vec<PlanStep>,
    pub total_ticks: Tick,
    pub interaction_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<String>,
}

impl Plan {
    fn from_steps(steps: Vec<PlanStep>, diagnostics: Vec<String>) -> Self {
        let total_ticks = steps.iter().map(|s| s.ticks()).sum();
        let interaction_count = steps
            .iter()
            .filter(|s| matches!(s, PlanStep::Interaction { .. }))
            .count();
        Self {
            steps,
            total_ticks,
            interaction_count,
            diagnostics,
        }
    }

    /// Fold consecutive equivalent steps: waits on the same expected action
    /// merge, zero-tick waits disappear.
    pub fn compress(mut self) -> Self {
        let mut compressed: Vec<PlanStep> = Vec::with_capacity(self.steps.len());
        for step in self.steps.drain(..) {
            if step.ticks() == 0 && matches!(step, PlanStep::Wait { .. }) {
                continue;
            }
            let merged = match (compressed.last_mut(), &step) {
                (
                    Some(PlanStep::Wait {
                        ticks: prev_ticks,
                        until: prev_until,
                        expected_action: prev_action,
                    }),
                    PlanStep::Wait {
                        ticks,
                        until,
                        expected_action,
                    },
                ) if prev_action == expected_action
                    && std::mem::discriminant(prev_until) == std::mem::discriminant(until) =>
                {
                    *prev_ticks += *ticks;
                    *prev_until = until.clone();
                    true
                }
                _ => false,
            };
            if !merged {
                compressed.push(step);
            }
        }
        Plan::from_steps(compressed, self.diagnostics)
    }

    pub fn pretty_print(&self) -> String {
        let mut out = format!(
            "Plan: {} steps, {} total, {} interactions\n",
            self.steps.len(),
            format_duration(self.total_ticks),
            self.interaction_count
        );
        for (i, step) in self.steps.iter().enumerate() {
            out.push_str(&format!("  {}. {}\n", i + 1, step.describe()));
        }
        if !self.diagnostics.is_empty() {
            out.push_str("Diagnostics:\n");
            for line in &self.diagnostics {
                out.push_str(&format!("  - {}\n", line));
            }
        }
        out
    }
}

// --- Replan boundaries -----------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ReplanBoundary {
    GoalReached,
    UpgradeAffordable { amount: i64 },
    Unlock {
        skill: Skill,
        level: u32,
        unlocks: String,
    },
    InputsDepleted {
        action: Id,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        missing: Option<Id>,
    },
    HorizonCap { ticks: Tick },
    InventoryPressure { used: usize, total: usize },
    ReplanLimitExceeded,
    TimeBudgetExceeded,
    NodeLimitExceeded,
    SearchExhausted,
}

impl ReplanBoundary {
    /// Expected boundaries are normal planning structure; unexpected ones
    /// get diagnostic logging.
    pub fn is_expected(&self) -> bool {
        !matches!(
            self,
            ReplanBoundary::InventoryPressure { .. }
                | ReplanBoundary::ReplanLimitExceeded
                | ReplanBoundary::TimeBudgetExceeded
                | ReplanBoundary::NodeLimitExceeded
                | ReplanBoundary::SearchExhausted
        )
    }

    /// Whether the solver re-enumerates candidates from the boundary state.
    pub fn causes_replan(&self) -> bool {
        !matches!(
            self,
            ReplanBoundary::GoalReached
                | ReplanBoundary::ReplanLimitExceeded
                | ReplanBoundary::TimeBudgetExceeded
                | ReplanBoundary::NodeLimitExceeded
                | ReplanBoundary::SearchExhausted
        )
    }

    pub fn describe(&self) -> String {
        match self {
            ReplanBoundary::GoalReached => "goal reached".to_string(),
            ReplanBoundary::UpgradeAffordable { amount } => {
                format!("upgrade affordable at {} GP", amount)
            }
            ReplanBoundary::Unlock {
                skill,
                level,
                unlocks,
            } => format!("{} level {} unlocks {}", skill, level, unlocks),
            ReplanBoundary::InputsDepleted { action, missing } => match missing {
                Some(item) => format!("{} ran out of {}", action, item),
                None => format!("{} ran out of inputs", action),
            },
            ReplanBoundary::HorizonCap { ticks } => {
                format!("horizon cap after {}", format_duration(*ticks))
            }
            ReplanBoundary::InventoryPressure { used, total } => {
                format!("inventory pressure: {}/{} slots", used, total)
            }
            ReplanBoundary::ReplanLimitExceeded => "replan limit exceeded".to_string(),
            ReplanBoundary::TimeBudgetExceeded => "time budget exceeded".to_string(),
            ReplanBoundary::NodeLimitExceeded => "node limit exceeded".to_string(),
            ReplanBoundary::SearchExhausted => "search space exhausted".to_string(),
        }
    }
}

// --- Solver plumbing -------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SolverLimits {
    pub max_expanded_nodes: usize,
    pub max_replans: usize,
    pub time_budget: Option<Duration>,
}

impl Default for SolverLimits {
    fn default() -> Self {
        Self {
            max_expanded_nodes: 100_000,
            max_replans: 200,
            time_budget: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolverStats {
    pub expanded_nodes: usize,
    pub replans: usize,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

#[derive(Debug, Clone)]
pub struct Solution {
    pub plan: Plan,
    pub stats: SolverStats,
}

#[derive(Debug, Clone)]
pub struct SolverFailure {
    pub reason: ReplanBoundary,
    pub message: String,
    pub stats: SolverStats,
}

#[derive(Debug, Clone)]
pub enum SolverOutcome {
    Success(Solution),
    Failure(SolverFailure),
}

impl SolverOutcome {
    pub fn plan(&self) -> Option<&Plan> {
        match self {
            SolverOutcome::Success(solution) => Some(&solution.plan),
            SolverOutcome::Failure(_) => None,
        }
    }

    pub fn stats(&self) -> &SolverStats {
        match self {
            SolverOutcome::Success(solution) => &solution.stats,
            SolverOutcome::Failure(failure) => &failure.stats,
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    state: GlobalState,
    steps: Vec<PlanStep>,
    ticks: Tick,
}

/// Dominance-pruning signature: two nodes with the same capability class,
/// active action, and GP bucket are interchangeable for search purposes, so
/// only the cheapest is kept. Without this, boundary interleavings across
/// skills multiply combinatorially.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PruneKey {
    capability: CandidateCacheKey,
    active: Option<Id>,
    gp_bucket: i64,
}

impl PruneKey {
    fn for_state(state: &GlobalState, goal: &Goal) -> Self {
        Self {
            capability: CandidateCacheKey::for_state(state, goal),
            active: state
                .active_activity
                .as_ref()
                .and_then(|a| a.activity_key())
                .cloned(),
            gp_bucket: state.gp / 100,
        }
    }
}

struct SegmentResult {
    state: GlobalState,
    ticks: Tick,
    boundary: ReplanBoundary,
    until: WaitFor,
}

fn push_child(
    nodes: &mut Vec<Node>,
    heap: &mut BinaryHeap<Reverse<(Tick, u64, usize)>>,
    best_seen: &mut HashMap<PruneKey, Tick>,
    seq: &mut u64,
    goal: &Goal,
    node: Node,
) {
    let h = heuristic(&node.state, goal);
    if h >= INF_TICKS {
        return;
    }
    let key = PruneKey::for_state(&node.state, goal);
    match best_seen.get(&key) {
        Some(&seen) if seen <= node.ticks => return,
        _ => {
            best_seen.insert(key, node.ticks);
        }
    }
    *seq += 1;
    let f = node.ticks + h;
    nodes.push(node);
    heap.push(Reverse((f, *seq, nodes.len() - 1)));
}

/// Admissible-ish heuristic: remaining distance under generously optimistic
/// rates.
fn heuristic(state: &GlobalState, goal: &Goal) -> Tick {
    match goal {
        Goal::ReachGp { amount } => {
            let deficit = (*amount - state.gp).max(0) as f64;
            ticks_to_close(deficit, candidates::optimistic_gp_rate(state))
        }
        Goal::ReachSkillLevel { skill, level } => {
            let deficit = (xp::start_xp_for_level(*level) - state.skill_xp(*skill)).max(0) as f64;
            ticks_to_close(deficit, candidates::optimistic_xp_rate(state, *skill))
        }
        Goal::MultiSkill { levels } => {
            let mut total: Tick = 0;
            for (skill, level) in levels {
                let deficit =
                    (xp::start_xp_for_level(*level) - state.skill_xp(*skill)).max(0) as f64;
                let t = ticks_to_close(deficit, candidates::optimistic_xp_rate(state, *skill));
                if t >= INF_TICKS {
                    return INF_TICKS;
                }
                total += t;
            }
            total
        }
    }
}

/// Simulate one train-until-boundary macro from `state`. The stop condition
/// fires on: goal reached, any watch condition, the trained skill's next
/// unlock, activity clearance (inputs/death), inventory pressure, or the
/// horizon cap.
fn simulate_segment(
    state: GlobalState,
    mac: &MacroCandidate,
    goal: &Goal,
    watch: &[WaitFor],
    rng: &mut SimRng,
) -> SimResult<SegmentResult> {
    let already_active = state
        .active_activity
        .as_ref()
        .and_then(|a| a.activity_key())
        == Some(mac.key_id());
    let mut b = StateUpdateBuilder::new(state);
    if !already_active {
        match &mac.activity {
            MacroActivity::SkillAction(action) => interactions::start_action(&mut b, action)?,
            MacroActivity::Combat { monster, style } => {
                interactions::fight_monster(&mut b, monster, *style)?
            }
        }
    }

    let skill = mac.skill;
    let start_fill = b.state().inventory.fill_fraction();
    let level = b.state().skill_level(skill);
    let next_unlock = b
        .state()
        .registries()
        .actions_for_skill(skill)
        .iter()
        .find(|a| a.level_required > level)
        .map(|a| (a.level_required, a.name.clone()));
    let unlock_xp = next_unlock
        .as_ref()
        .map(|(required, _)| xp::start_xp_for_level(*required));

    // A watch condition already met when the segment begins is yesterday's
    // boundary; only conditions that BECOME true during the segment stop it.
    let active_watch: Vec<WaitFor> = watch
        .iter()
        .filter(|w| !w.is_satisfied(b.state()))
        .cloned()
        .collect();

    let goal_clone = goal.clone();
    let watch_owned = active_watch.clone();
    let stop = move |s: &GlobalState| {
        goal_clone.is_satisfied(s)
            || unlock_xp.map_or(false, |target| s.skill_xp(skill) >= target)
            || watch_owned.iter().any(|w| w.is_satisfied(s))
            || s.active_activity.is_none()
            || (s.inventory.fill_fraction() >= INVENTORY_PRESSURE_FRACTION
                && s.inventory.fill_fraction() > start_fill)
    };
    let ticks = consume_ticks_until(&mut b, rng, stop, SEGMENT_HORIZON_TICKS);
    let (end_state, _changes) = b.build();

    // Classify what stopped us, in priority order.
    let (boundary, until) = if goal.is_satisfied(&end_state) {
        (
            ReplanBoundary::GoalReached,
            WaitFor::Goal { goal: goal.clone() },
        )
    } else if let (Some(target), Some((required, name))) = (unlock_xp, next_unlock.clone()) {
        if end_state.skill_xp(skill) >= target {
            (
                ReplanBoundary::Unlock {
                    skill,
                    level: required,
                    unlocks: name,
                },
                WaitFor::SkillXp {
                    skill,
                    xp: target,
                },
            )
        } else {
            classify_non_unlock(&end_state, mac, &active_watch, ticks, start_fill)
        }
    } else {
        classify_non_unlock(&end_state, mac, &active_watch, ticks, start_fill)
    };

    Ok(SegmentResult {
        state: end_state,
        ticks,
        boundary,
        until,
    })
}

fn classify_non_unlock(
    end_state: &GlobalState,
    mac: &MacroCandidate,
    watch: &[WaitFor],
    ticks: Tick,
    start_fill: f64,
) -> (ReplanBoundary, WaitFor) {
    if let Some(hit) = watch.iter().find(|w| w.is_satisfied(end_state)) {
        let amount = match hit {
            WaitFor::EffectiveCredits { amount, .. } => *amount,
            _ => 0,
        };
        return (ReplanBoundary::UpgradeAffordable { amount }, hit.clone());
    }
    if end_state.active_activity.is_none() {
        // The activity ended on its own: inputs ran dry, the node depleted,
        // or (for combat) the player died and was respawned.
        let missing = end_state.registries().action(mac.key_id()).and_then(|def| {
            def.inputs
                .iter()
                .find(|(item, qty)| end_state.inventory.count_of(item) < *qty)
                .map(|(item, _)| item.clone())
        });
        return (
            ReplanBoundary::InputsDepleted {
                action: mac.key_id().clone(),
                missing,
            },
            WaitFor::InputsDepleted {
                action: mac.key_id().clone(),
            },
        );
    }
    let fill = end_state.inventory.fill_fraction();
    if fill >= INVENTORY_PRESSURE_FRACTION && fill > start_fill {
        return (
            ReplanBoundary::InventoryPressure {
                used: end_state.inventory.used_slots(),
                total: end_state.inventory.capacity(),
            },
            WaitFor::InventoryThreshold {
                fraction: INVENTORY_PRESSURE_FRACTION,
            },
        );
    }
    (
        ReplanBoundary::HorizonCap { ticks },
        WaitFor::SkillXp {
            skill: mac.skill,
            xp: end_state.skill_xp(mac.skill),
        },
    )
}

/// Solve for a plan that satisfies the goal in minimum simulated time.
pub fn solve(
    initial: &GlobalState,
    goal: &Goal,
    limits: &SolverLimits,
    seed: u64,
) -> SolverOutcome {
    let started = Instant::now();
    let mut rng = SimRng::seeded(seed);
    let mut cache = CandidateCache::new();
    let mut stats = SolverStats::default();
    let mut diagnostics: Vec<String> = Vec::new();

    if goal.is_satisfied(initial) {
        return SolverOutcome::Success(Solution {
            plan: Plan::default(),
            stats,
        });
    }

    let mut heap: BinaryHeap<Reverse<(Tick, u64, usize)>> = BinaryHeap::new();
    let mut nodes: Vec<Node> = Vec::new();
    let mut best_seen: HashMap<PruneKey, Tick> = HashMap::new();
    let mut seq: u64 = 0;

    nodes.push(Node {
        state: initial.clone(),
        steps: Vec::new(),
        ticks: 0,
    });
    heap.push(Reverse((heuristic(initial, goal), seq, 0)));

    let fail = |reason: ReplanBoundary, stats: SolverStats| {
        let message = reason.describe();
        log::warn!("solver failed: {} ({})", message, goal.describe());
        SolverOutcome::Failure(SolverFailure {
            reason,
            message,
            stats,
        })
    };

    while let Some(Reverse((_f, _seq, idx))) = heap.pop() {
        if let Some(budget) = limits.time_budget {
            if started.elapsed() > budget {
                stats.cache_hits = cache.hits;
                stats.cache_misses = cache.misses;
                return fail(ReplanBoundary::TimeBudgetExceeded, stats);
            }
        }
        if stats.expanded_nodes >= limits.max_expanded_nodes {
            stats.cache_hits = cache.hits;
            stats.cache_misses = cache.misses;
            return fail(ReplanBoundary::NodeLimitExceeded, stats);
        }

        let node = nodes[idx].clone();
        if goal.is_satisfied(&node.state) {
            stats.cache_hits = cache.hits;
            stats.cache_misses = cache.misses;
            let plan = Plan::from_steps(node.steps, diagnostics).compress();
            log::info!(
                "solver success: {} in {} ({} nodes, {} replans)",
                goal.describe(),
                format_duration(plan.total_ticks),
                stats.expanded_nodes,
                stats.replans
            );
            return SolverOutcome::Success(Solution { plan, stats });
        }
        stats.expanded_nodes += 1;

        let candidates: Candidates = cache.get(&node.state, goal);

        // Buy children: zero-tick interactions that improve rates. The
        // cached buy list is joined with live affordability, since the
        // capability class deliberately ignores GP.
        let mut buyable = candidates.buy_upgrades.clone();
        for purchase in candidates::affordable_upgrades(&node.state, goal) {
            if !buyable.contains(&purchase) {
                buyable.push(purchase);
            }
        }
        for purchase in &buyable {
            let mut b = StateUpdateBuilder::new(node.state.clone());
            let mut steps = node.steps.clone();
            let entry_cost = b
                .state()
                .registries()
                .shop_entry(purchase)
                .map(|e| e.cost_gp)
                .unwrap_or(0);
            if b.state().gp < entry_cost {
                let policy = candidates.sell_policy.clone();
                if policy.effective_credits(b.state()) < entry_cost {
                    continue;
                }
                if interactions::sell_items(&mut b, &policy).is_err() {
                    continue;
                }
                steps.push(PlanStep::Interaction {
                    interaction: Interaction::SellItems { policy },
                });
            }
            if interactions::buy_shop_item(&mut b, purchase).is_err() {
                continue;
            }
            steps.push(PlanStep::Interaction {
                interaction: Interaction::BuyShopItem {
                    purchase: purchase.clone(),
                },
            });
            let (state, _changes) = b.build();
            push_child(
                &mut nodes,
                &mut heap,
                &mut best_seen,
                &mut seq,
                goal,
                Node {
                    state,
                    steps,
                    ticks: node.ticks,
                },
            );
        }

        // Sell child for pure GP goals. The cached flag is re-checked against
        // this node's actual inventory; a same-class state with nothing to
        // sell must not spawn a zero-tick child of itself.
        if candidates.should_emit_sell_candidate
            && SellPolicy::default().sellable_value(&node.state) > 0
        {
            let mut b = StateUpdateBuilder::new(node.state.clone());
            let policy = SellPolicy::default();
            if interactions::sell_items(&mut b, &policy).is_ok() {
                let mut steps = node.steps.clone();
                steps.push(PlanStep::Interaction {
                    interaction: Interaction::SellItems { policy },
                });
                let (state, _changes) = b.build();
                push_child(
                    &mut nodes,
                    &mut heap,
                    &mut best_seen,
                    &mut seq,
                    goal,
                    Node {
                        state,
                        steps,
                        ticks: node.ticks,
                    },
                );
            }
        }

        // Macro children: switch and train until a replan boundary.
        for mac in &candidates.macros {
            if stats.replans >= limits.max_replans {
                stats.cache_hits = cache.hits;
                stats.cache_misses = cache.misses;
                return fail(ReplanBoundary::ReplanLimitExceeded, stats);
            }
            stats.replans += 1;

            let segment = match simulate_segment(
                node.state.clone(),
                mac,
                goal,
                &candidates.watch,
                &mut rng,
            ) {
                Ok(segment) => segment,
                Err(err) => {
                    log::debug!("macro '{}' rejected: {}", mac.describe(), err);
                    continue;
                }
            };
            if segment.ticks == 0 && segment.boundary != ReplanBoundary::GoalReached {
                continue;
            }
            if !segment.boundary.is_expected() {
                let line = format!(
                    "unexpected boundary during {}: {}",
                    mac.key_id(),
                    segment.boundary.describe()
                );
                log::warn!("{}", line);
                if !diagnostics.contains(&line) {
                    diagnostics.push(line);
                }
            }

            let mut steps = node.steps.clone();
            let already_active = node
                .state
                .active_activity
                .as_ref()
                .and_then(|a| a.activity_key())
                == Some(mac.key_id());
            if !already_active {
                let interaction = match &mac.activity {
                    MacroActivity::SkillAction(action) => Interaction::SwitchActivity {
                        action: action.clone(),
                    },
                    MacroActivity::Combat { monster, style } => Interaction::FightMonster {
                        monster: monster.clone(),
                        style: *style,
                    },
                };
                steps.push(PlanStep::Interaction { interaction });
            }
            steps.push(PlanStep::Wait {
                ticks: segment.ticks,
                until: segment.until.clone(),
                expected_action: Some(mac.key_id().clone()),
            });

            let child_ticks = node.ticks + segment.ticks;
            push_child(
                &mut nodes,
                &mut heap,
                &mut best_seen,
                &mut seq,
                goal,
                Node {
                    state: segment.state,
                    steps,
                    ticks: child_ticks,
                },
            );
        }
    }

    stats.cache_hits = cache.hits;
    stats.cache_misses = cache.misses;
    fail(ReplanBoundary::SearchExhausted, stats)
}

/// Replay a plan's steps against a state. Wait and macro steps consume
/// exactly their recorded ticks.
pub fn execute_plan(
    initial: &GlobalState,
    plan: &Plan,
    seed: u64,
) -> SimResult<(GlobalState, Changes)> {
    let mut b = StateUpdateBuilder::new(initial.clone());
    let mut rng = SimRng::seeded(seed);
    for step in &plan.steps {
        match step {
            PlanStep::Interaction { interaction } => {
                interactions::apply(&mut b, interaction, &mut rng)?;
            }
            PlanStep::Wait { ticks, .. } | PlanStep::Macro { ticks, .. } => {
                crate::engine::consume_ticks(&mut b, *ticks, &mut rng);
            }
        }
    }
    Ok(b.build())
}
