//! Goal solver: end-to-end planning, plan execution fidelity, capability
//! cache behaviour, and limit exhaustion.

mod common;

use common::{demo_state, id};
use idlesim::goal::Goal;
use idlesim::solver::{execute_plan, solve, PlanStep, ReplanBoundary, SolverLimits, SolverOutcome};
use idlesim::{Skill, INF_TICKS};

#[test]
fn test_trivial_goal_is_empty_plan() {
    let state = demo_state();
    let goal = Goal::ReachSkillLevel {
        skill: Skill::Woodcutting,
        level: 1,
    };
    match solve(&state, &goal, &SolverLimits::default(), 0) {
        SolverOutcome::Success(solution) => {
            assert!(solution.plan.steps.is_empty());
            assert_eq!(solution.plan.total_ticks, 0);
        }
        SolverOutcome::Failure(f) => panic!("trivial goal failed: {}", f.message),
    }
}

#[test]
fn test_single_skill_plan_executes_to_goal() {
    let state = demo_state();
    let goal = Goal::ReachSkillLevel {
        skill: Skill::Woodcutting,
        level: 5,
    };
    let solution = match solve(&state, &goal, &SolverLimits::default(), 42) {
        SolverOutcome::Success(solution) => solution,
        SolverOutcome::Failure(f) => panic!("solver failed: {}", f.message),
    };
    assert!(solution.plan.total_ticks > 0);
    assert!(solution.plan.interaction_count >= 1);

    let (end_state, _changes) = execute_plan(&state, &solution.plan, 42).unwrap();
    assert!(
        goal.is_satisfied(&end_state),
        "executing the plan must reach the goal"
    );
    assert_eq!(
        end_state.total_ticks_elapsed, solution.plan.total_ticks,
        "executed ticks must match the plan's accounting"
    );
}

/// Deep searches need headroom over the conservative default replan limit.
fn deep_limits() -> SolverLimits {
    SolverLimits {
        max_replans: 20_000,
        ..SolverLimits::default()
    }
}

#[test]
fn test_multi_skill_woodcutting_and_fishing_to_50() {
    let state = demo_state();
    let goal = Goal::multi_skill([(Skill::Woodcutting, 50), (Skill::Fishing, 50)]);
    let solution = match solve(&state, &goal, &deep_limits(), 7) {
        SolverOutcome::Success(solution) => solution,
        SolverOutcome::Failure(f) => panic!("solver failed: {}", f.message),
    };

    assert!(solution.plan.total_ticks > 0);
    assert!(
        solution.stats.expanded_nodes < 100_000,
        "expansion must stay sub-exponential, got {}",
        solution.stats.expanded_nodes
    );
    // Both skills must be trained somewhere in the plan.
    let trains = |action: &str| {
        solution.plan.steps.iter().any(|s| match s {
            PlanStep::Wait {
                expected_action: Some(a),
                ..
            } => a == &id(action),
            _ => false,
        })
    };
    assert!(
        trains("normal_tree") || trains("oak_tree") || trains("willow_tree"),
        "plan must cut trees"
    );
    assert!(
        trains("fish_shrimp") || trains("fish_trout"),
        "plan must fish"
    );
}

#[test]
fn test_expansion_scales_subexponentially() {
    let state = demo_state();
    let single = Goal::multi_skill([(Skill::Woodcutting, 50)]);
    let double = Goal::multi_skill([(Skill::Woodcutting, 50), (Skill::Fishing, 50)]);

    let nodes_of = |goal: &Goal| match solve(&state, goal, &deep_limits(), 3) {
        SolverOutcome::Success(solution) => solution.stats.expanded_nodes.max(1),
        SolverOutcome::Failure(f) => panic!("solver failed: {}", f.message),
    };
    let small = nodes_of(&single);
    let large = nodes_of(&double);
    assert!(
        large <= small * 10,
        "doubling goals must not 10x expansions: {} -> {}",
        small,
        large
    );
}

#[test]
fn test_combat_skill_goal_plans_monster_fights() {
    let state = demo_state();
    let goal = Goal::ReachSkillLevel {
        skill: Skill::Attack,
        level: 3,
    };
    let solution = match solve(&state, &goal, &SolverLimits::default(), 13) {
        SolverOutcome::Success(solution) => solution,
        SolverOutcome::Failure(f) => panic!("combat goal must be plannable: {}", f.message),
    };
    assert!(solution.plan.total_ticks > 0);
    assert!(
        solution.plan.steps.iter().any(|s| matches!(
            s,
            PlanStep::Interaction {
                interaction: idlesim::interactions::Interaction::FightMonster { .. }
            }
        )),
        "the plan must pick a monster to fight"
    );
}

#[test]
fn test_hitpoints_goal_is_plannable() {
    let state = demo_state();
    // Hitpoints starts at level 10; any combat training raises it.
    let goal = Goal::ReachSkillLevel {
        skill: Skill::Hitpoints,
        level: 11,
    };
    let solution = match solve(&state, &goal, &SolverLimits::default(), 19) {
        SolverOutcome::Success(solution) => solution,
        SolverOutcome::Failure(f) => panic!("hitpoints goal must be plannable: {}", f.message),
    };
    assert!(solution.plan.total_ticks > 0);
}

#[test]
fn test_gp_goal_sells_gathered_items() {
    let state = demo_state();
    let goal = Goal::ReachGp { amount: 200 };
    let solution = match solve(&state, &goal, &SolverLimits::default(), 11) {
        SolverOutcome::Success(solution) => solution,
        SolverOutcome::Failure(f) => panic!("solver failed: {}", f.message),
    };
    assert!(solution.plan.total_ticks > 0);
}

#[test]
fn test_node_limit_produces_distinct_failure() {
    let state = demo_state();
    let goal = Goal::ReachSkillLevel {
        skill: Skill::Woodcutting,
        level: 99,
    };
    let limits = SolverLimits {
        max_expanded_nodes: 2,
        ..SolverLimits::default()
    };
    match solve(&state, &goal, &limits, 0) {
        SolverOutcome::Failure(failure) => {
            assert_eq!(failure.reason, ReplanBoundary::NodeLimitExceeded);
            assert!(!failure.reason.is_expected());
            assert!(!failure.reason.causes_replan());
        }
        SolverOutcome::Success(_) => panic!("2-node budget cannot reach level 99"),
    }
}

#[test]
fn test_replan_limit_produces_distinct_failure() {
    let state = demo_state();
    let goal = Goal::ReachSkillLevel {
        skill: Skill::Woodcutting,
        level: 99,
    };
    let limits = SolverLimits {
        max_replans: 1,
        ..SolverLimits::default()
    };
    match solve(&state, &goal, &limits, 0) {
        SolverOutcome::Failure(failure) => {
            assert_eq!(failure.reason, ReplanBoundary::ReplanLimitExceeded);
        }
        SolverOutcome::Success(_) => panic!("1 replan cannot reach level 99"),
    }
}

#[test]
fn test_unsolvable_goal_fails_cleanly() {
    let state = demo_state();
    // Prayer has no actions in the demo bundle; its XP can never move.
    let goal = Goal::ReachSkillLevel {
        skill: Skill::Prayer,
        level: 2,
    };
    let limits = SolverLimits {
        max_expanded_nodes: 500,
        ..SolverLimits::default()
    };
    match solve(&state, &goal, &limits, 0) {
        SolverOutcome::Failure(_) => {}
        SolverOutcome::Success(s) => panic!("impossible goal produced a plan: {:?}", s.plan),
    }
}

#[test]
fn test_plan_compression_merges_waits() {
    use idlesim::solver::Plan;
    use idlesim::waitfor::WaitFor;
    let plan = Plan {
        steps: vec![
            PlanStep::Wait {
                ticks: 100,
                until: WaitFor::SkillXp {
                    skill: Skill::Woodcutting,
                    xp: 50,
                },
                expected_action: Some(id("normal_tree")),
            },
            PlanStep::Wait {
                ticks: 200,
                until: WaitFor::SkillXp {
                    skill: Skill::Woodcutting,
                    xp: 150,
                },
                expected_action: Some(id("normal_tree")),
            },
            PlanStep::Wait {
                ticks: 0,
                until: WaitFor::InventoryFull,
                expected_action: None,
            },
        ],
        total_ticks: 300,
        interaction_count: 0,
        diagnostics: Vec::new(),
    };
    let compressed = plan.compress();
    assert_eq!(compressed.steps.len(), 1, "same-action waits merge, zero-tick waits drop");
    assert_eq!(compressed.total_ticks, 300);
    match &compressed.steps[0] {
        PlanStep::Wait { ticks, .. } => assert_eq!(*ticks, 300),
        other => panic!("expected a wait, got {:?}", other),
    }
}

#[test]
fn test_pretty_print_formats_durations() {
    let state = demo_state();
    let goal = Goal::ReachSkillLevel {
        skill: Skill::Woodcutting,
        level: 5,
    };
    let solution = match solve(&state, &goal, &SolverLimits::default(), 1) {
        SolverOutcome::Success(solution) => solution,
        SolverOutcome::Failure(f) => panic!("solver failed: {}", f.message),
    };
    let printed = solution.plan.pretty_print();
    assert!(printed.starts_with("Plan:"));
    assert!(printed.contains("Switch to demo:normal_tree"));
}

#[test]
fn test_solver_is_deterministic() {
    let state = demo_state();
    let goal = Goal::multi_skill([(Skill::Woodcutting, 20)]);
    let a = solve(&state, &goal, &SolverLimits::default(), 5);
    let b = solve(&state, &goal, &SolverLimits::default(), 5);
    match (a, b) {
        (SolverOutcome::Success(sa), SolverOutcome::Success(sb)) => {
            assert_eq!(sa.plan, sb.plan);
            assert_eq!(sa.stats, sb.stats);
        }
        _ => panic!("both runs should succeed identically"),
    }
}

#[test]
fn test_inf_ticks_sentinel_is_safe_to_sum() {
    assert!(INF_TICKS.checked_mul(3).is_some(), "headroom for sums");
}
