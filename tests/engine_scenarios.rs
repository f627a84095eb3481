//! End-to-end tick engine scenarios: the baseline gathering loop, doubling,
//! backpressure, stun handling, mining node timers, passive cooking, and the
//! background-before-foreground tie-break.

mod common;

use common::{demo_builder, fill_inventory, id};
use idlesim::interactions;
use idlesim::modifier::names;
use idlesim::modifier::ModifierDef;
use idlesim::skills::cooking::PASSIVE_FACTOR;
use idlesim::state::{ActiveActivity, ActiveBuff, MiningNodeState};
use idlesim::xp;
use idlesim::{consume_ticks, Skill, SimRng};

#[test]
fn test_woodcutting_baseline_single_completion() {
    let mut b = demo_builder();
    interactions::start_action(&mut b, &id("normal_tree")).unwrap();
    let mut rng = SimRng::seeded(1);
    consume_ticks(&mut b, 30, &mut rng);
    let (state, changes) = b.build();

    assert_eq!(state.inventory.count_of(&id("normal_logs")), 1);
    assert_eq!(state.skill_xp(Skill::Woodcutting), 10);
    match &state.active_activity {
        Some(ActiveActivity::Skill(a)) => assert_eq!(a.progress_ticks, 0),
        other => panic!("activity should survive: {:?}", other),
    }
    assert_eq!(changes.ticks_consumed, 30);
    assert_eq!(changes.inventory_changes[&id("normal_logs")], 1);
}

#[test]
fn test_woodcutting_baseline_five_completions() {
    let mut b = demo_builder();
    interactions::start_action(&mut b, &id("normal_tree")).unwrap();
    let mut rng = SimRng::seeded(7);
    consume_ticks(&mut b, 150, &mut rng);
    let (state, _) = b.build();

    assert_eq!(state.inventory.count_of(&id("normal_logs")), 5);
    assert_eq!(state.skill_xp(Skill::Woodcutting), 50);
}

#[test]
fn test_partial_progress_carries_across_calls() {
    let mut b = demo_builder();
    interactions::start_action(&mut b, &id("normal_tree")).unwrap();
    let mut rng = SimRng::seeded(1);
    consume_ticks(&mut b, 20, &mut rng);
    match &b.state().active_activity {
        Some(ActiveActivity::Skill(a)) => assert_eq!(a.progress_ticks, 20),
        other => panic!("unexpected activity {:?}", other),
    }
    consume_ticks(&mut b, 10, &mut rng);
    let (state, _) = b.build();
    assert_eq!(state.inventory.count_of(&id("normal_logs")), 1);
    assert_eq!(state.skill_xp(Skill::Woodcutting), 10);
}

fn doubling_buff(chance: f64) -> ActiveBuff {
    ActiveBuff {
        id: id("doubling_potion"),
        modifiers: vec![ModifierDef::global(
            names::SKILL_ITEM_DOUBLING_CHANCE,
            chance,
        )],
        remaining_ticks: None,
    }
}

#[test]
fn test_doubling_at_100_percent_doubles_output() {
    let mut b = demo_builder();
    b.state_mut().active_buffs.push(doubling_buff(100.0));
    interactions::start_action(&mut b, &id("normal_tree")).unwrap();
    let mut rng = SimRng::seeded(1);
    consume_ticks(&mut b, 30, &mut rng);
    assert_eq!(b.state().inventory.count_of(&id("normal_logs")), 2);
}

#[test]
fn test_doubling_at_0_percent_single_output() {
    let mut b = demo_builder();
    b.state_mut().active_buffs.push(doubling_buff(0.0));
    interactions::start_action(&mut b, &id("normal_tree")).unwrap();
    let mut rng = SimRng::seeded(1);
    consume_ticks(&mut b, 30, &mut rng);
    assert_eq!(b.state().inventory.count_of(&id("normal_logs")), 1);
}

#[test]
fn test_inventory_full_drops_output_and_clears_activity() {
    let mut b = demo_builder();
    fill_inventory(&mut b);
    interactions::start_action(&mut b, &id("normal_tree")).unwrap();
    let mut rng = SimRng::seeded(1);
    // Completion rolls: doubling, nest chance, token; none should land.
    rng.force_doubles([0.9, 0.9, 0.9]);
    consume_ticks(&mut b, 30, &mut rng);
    let (state, changes) = b.build();

    assert!(state.active_activity.is_none(), "activity must be cleared");
    assert_eq!(changes.dropped_items[&id("normal_logs")], 1);
    assert_eq!(state.inventory.count_of(&id("normal_logs")), 0);
}

#[test]
fn test_cooking_success_at_high_mastery() {
    let mut b = demo_builder();
    b.add_item(&id("raw_shrimp"), 1).unwrap();
    // Mastery 50 pushes the success chance to 100%.
    b.state_mut()
        .action_states
        .entry(id("cook_shrimp"))
        .or_default()
        .mastery_xp = xp::start_xp_for_level(50);
    interactions::start_action(&mut b, &id("cook_shrimp")).unwrap();

    let mut rng = SimRng::seeded(1);
    // Worst-case success roll, then doubling and token rolls that miss.
    rng.force_doubles([0.99, 0.9, 0.9]);
    consume_ticks(&mut b, 10, &mut rng);
    let (state, _) = b.build();

    assert_eq!(state.inventory.count_of(&id("shrimp")), 1);
    assert_eq!(state.inventory.count_of(&id("raw_shrimp")), 0);
    // Full XP on success: base 10 plus the +5% mastery-level bonus active
    // at mastery 50.
    assert_eq!(state.skill_xp(Skill::Cooking), 11);
}

#[test]
fn test_cooking_failure_grants_one_xp() {
    let mut b = demo_builder();
    b.add_item(&id("raw_shrimp"), 1).unwrap();
    interactions::start_action(&mut b, &id("cook_shrimp")).unwrap();

    let mut rng = SimRng::seeded(1);
    // Mastery 0: success chance 0.70; 0.99 fails the cook.
    rng.force_doubles([0.99, 0.9]);
    consume_ticks(&mut b, 10, &mut rng);
    let (state, _) = b.build();

    assert_eq!(state.inventory.count_of(&id("shrimp")), 0);
    assert_eq!(state.inventory.count_of(&id("raw_shrimp")), 0, "input burned");
    assert_eq!(state.skill_xp(Skill::Cooking), 1);
}

#[test]
fn test_thieving_failure_damages_and_stuns() {
    let mut b = demo_builder();
    interactions::start_action(&mut b, &id("pickpocket_man")).unwrap();

    let mut rng = SimRng::seeded(1);
    // Stealth 41 vs perception 60: success at 0.88; 0.99 fails.
    rng.force_double(0.99);
    // Damage roll 1 + next_int(11): force 10 for 11 damage.
    rng.force_int(10);
    consume_ticks(&mut b, 30, &mut rng);

    assert_eq!(b.state().health.lost_hp, 11);
    assert_eq!(b.state().stunned.ticks_remaining, 30);
    assert_eq!(b.state().skill_xp(Skill::Thieving), 0, "no XP on failure");
    assert_eq!(b.state().gp, 0, "no GP on failure");

    // Stun freezes foreground progress but keeps counting down.
    consume_ticks(&mut b, 15, &mut rng);
    assert_eq!(b.state().stunned.ticks_remaining, 15);
    match &b.state().active_activity {
        Some(ActiveActivity::Skill(a)) => {
            assert_eq!(a.progress_ticks, 0, "foreground frozen while stunned")
        }
        other => panic!("unexpected activity {:?}", other),
    }

    // After the stun clears the countdown resumes.
    consume_ticks(&mut b, 15 + 30, &mut rng);
    assert!(!b.state().is_stunned());
}

#[test]
fn test_thieving_success_pays_gp_and_xp() {
    let mut b = demo_builder();
    interactions::start_action(&mut b, &id("pickpocket_man")).unwrap();
    let mut rng = SimRng::seeded(1);
    rng.force_double(0.0); // guaranteed success
    rng.force_int(9); // gp roll: 1 + 9 = 10
    rng.force_double(0.9); // no mastery token
    consume_ticks(&mut b, 30, &mut rng);

    assert_eq!(b.state().gp, 10);
    assert_eq!(b.state().skill_xp(Skill::Thieving), 8);
    assert!(b.state().mastery_xp(&id("pickpocket_man")) > 0);
}

#[test]
fn test_mining_node_depletes_and_respawns() {
    let mut b = demo_builder();
    interactions::start_action(&mut b, &id("copper_rock")).unwrap();
    let mut rng = SimRng::seeded(3);
    // Node HP 5: five completions (150 ticks) deplete it and clear the
    // activity; regen heals 1 HP per 100 ticks while damaged, so after the
    // heals at t=100, the fifth extraction leaves hp_lost at node max.
    consume_ticks(&mut b, 400, &mut rng);
    let (state, _) = b.build();

    let ore = state.inventory.count_of(&id("copper_ore"));
    assert!(ore >= 5, "node regen extends the run, got {} ore", ore);
    let node = state
        .action_state(&id("copper_rock"))
        .mining
        .expect("node state must exist");
    assert!(
        state.active_activity.is_none(),
        "depletion clears the activity"
    );
    // After depletion the respawn countdown runs in the background even
    // with no foreground activity.
    let respawning = node.respawn_ticks_remaining.is_some() || node.hp_lost == 0;
    assert!(respawning, "node should be respawning or already respawned");
}

#[test]
fn test_mining_respawn_completes_in_background() {
    let mut b = demo_builder();
    b.state_mut()
        .action_states
        .entry(id("copper_rock"))
        .or_default()
        .mining = Some(MiningNodeState {
        hp_lost: 5,
        respawn_ticks_remaining: Some(100),
        regen_ticks_remaining: 100,
    });
    let mut rng = SimRng::seeded(1);
    // No foreground activity at all; the respawn timer still runs.
    consume_ticks(&mut b, 100, &mut rng);
    let node = b.state().action_state(&id("copper_rock")).mining.unwrap();
    assert_eq!(node.respawn_ticks_remaining, None);
    assert_eq!(node.hp_lost, 0);
}

#[test]
fn test_heal_then_extract_tie_break() {
    let mut b = demo_builder();
    // Damaged node whose next regen heal lands exactly on the completion
    // tick. Background heal is observed first, then the extraction, so net
    // HP lost is unchanged.
    b.state_mut()
        .action_states
        .entry(id("copper_rock"))
        .or_default()
        .mining = Some(MiningNodeState {
        hp_lost: 2,
        respawn_ticks_remaining: None,
        regen_ticks_remaining: 30,
    });
    interactions::start_action(&mut b, &id("copper_rock")).unwrap();
    let mut rng = SimRng::seeded(1);
    rng.force_doubles([0.9, 0.9, 0.9]);
    consume_ticks(&mut b, 30, &mut rng);

    let node = b.state().action_state(&id("copper_rock")).mining.unwrap();
    assert_eq!(node.hp_lost, 2, "heal then hit leaves HP lost unchanged");
    assert_eq!(b.state().inventory.count_of(&id("copper_ore")), 1);
}

#[test]
fn test_passive_cooking_area_produces_without_xp() {
    let mut b = demo_builder();
    b.add_item(&id("raw_shrimp"), 20).unwrap();
    b.add_item(&id("raw_beef"), 10).unwrap();
    interactions::assign_cooking_recipe(
        &mut b,
        idlesim::enums::CookingArea::Furnace,
        Some(id("roast_beef")),
    )
    .unwrap();
    interactions::start_action(&mut b, &id("cook_shrimp")).unwrap();

    let mut rng = SimRng::seeded(11);
    // roast_beef: 20 base ticks, passive factor 5 = 100 ticks per passive
    // completion.
    assert_eq!(PASSIVE_FACTOR, 5);
    consume_ticks(&mut b, 100, &mut rng);
    let (state, _) = b.build();

    assert_eq!(state.inventory.count_of(&id("cooked_beef")), 1);
    assert_eq!(state.inventory.count_of(&id("raw_beef")), 9);
    assert_eq!(
        state.mastery_xp(&id("roast_beef")),
        0,
        "passive areas earn no mastery"
    );
}

#[test]
fn test_switching_away_clears_passive_progress_keeps_recipes() {
    let mut b = demo_builder();
    b.add_item(&id("raw_shrimp"), 20).unwrap();
    b.add_item(&id("raw_beef"), 10).unwrap();
    interactions::assign_cooking_recipe(
        &mut b,
        idlesim::enums::CookingArea::Furnace,
        Some(id("roast_beef")),
    )
    .unwrap();
    interactions::start_action(&mut b, &id("cook_shrimp")).unwrap();
    let mut rng = SimRng::seeded(11);
    consume_ticks(&mut b, 50, &mut rng);
    assert!(
        b.state()
            .cooking
            .area(idlesim::enums::CookingArea::Furnace)
            .progress_ticks
            > 0
    );

    interactions::start_action(&mut b, &id("normal_tree")).unwrap();
    let furnace = b.state().cooking.area(idlesim::enums::CookingArea::Furnace);
    assert_eq!(furnace.progress_ticks, 0, "passive progress wiped");
    assert_eq!(
        furnace.recipe,
        Some(id("roast_beef")),
        "assigned recipe survives"
    );
}

#[test]
fn test_firemaking_consumes_logs_until_depleted() {
    let mut b = demo_builder();
    b.add_item(&id("normal_logs"), 3).unwrap();
    interactions::start_action(&mut b, &id("burn_normal_logs")).unwrap();
    let mut rng = SimRng::seeded(5);
    consume_ticks(&mut b, 10_000, &mut rng);
    let (state, changes) = b.build();

    assert_eq!(state.inventory.count_of(&id("normal_logs")), 0);
    assert_eq!(state.skill_xp(Skill::Firemaking), 30);
    assert!(
        state.active_activity.is_none(),
        "activity clears when inputs run dry"
    );
    // 3 completions at 20 ticks; the engine stops consuming once idle.
    assert_eq!(changes.ticks_consumed, 60);
}

#[test]
fn test_no_activity_and_no_timers_is_a_noop() {
    let mut b = demo_builder();
    let mut rng = SimRng::seeded(1);
    consume_ticks(&mut b, 500, &mut rng);
    let (state, changes) = b.build();
    assert_eq!(changes.ticks_consumed, 0);
    assert_eq!(state.total_ticks_elapsed, 0);
    assert!(changes.is_empty());
}

#[test]
fn test_crop_growth_runs_in_background_of_foreground_skill() {
    let mut b = demo_builder();
    b.add_item(&id("potato_seeds"), 3).unwrap();
    interactions::apply(
        &mut b,
        &idlesim::interactions::Interaction::PlantCrop {
            plot: 0,
            crop: id("crop_potato"),
        },
        &mut SimRng::seeded(1),
    )
    .unwrap();
    interactions::start_action(&mut b, &id("normal_tree")).unwrap();

    let mut rng = SimRng::seeded(2);
    consume_ticks(&mut b, 6_000, &mut rng);
    let (state, _) = b.build();

    assert!(state.farming.plots[0].is_ready(), "crop grew in background");
    assert!(
        state.skill_xp(Skill::Woodcutting) >= 10 * (6_000 / 30),
        "foreground kept producing"
    );
}

#[test]
fn test_agility_laps_cycle_through_built_obstacles() {
    let mut b = demo_builder();
    b.add_gp(10_000);
    b.add_item(&id("normal_logs"), 40).unwrap();
    interactions::build_obstacle(&mut b, &id("cargo_net")).unwrap();
    interactions::build_obstacle(&mut b, &id("balance_beam")).unwrap();
    interactions::start_agility_course(&mut b).unwrap();

    let mut rng = SimRng::seeded(1);
    // Obstacles carry skillInterval -1% each; two built means -2% on a
    // 100-tick net (98) and a 150-tick beam (147).
    consume_ticks(&mut b, 98 + 147, &mut rng);
    let (state, _) = b.build();

    assert_eq!(state.skill_xp(Skill::Agility), 10 + 18);
    assert_eq!(state.agility.current_obstacle_index, 0, "lap wrapped");
}

#[test]
fn test_astrology_study_drops_stardust() {
    let mut b = demo_builder();
    interactions::start_action(&mut b, &id("study_deneb")).unwrap();
    let mut rng = SimRng::seeded(1);
    // Stardust chance roll, then the quantity roll.
    rng.force_double(0.1);
    rng.force_int(1); // quantity 1 + 1 = 2
    consume_ticks(&mut b, 30, &mut rng);
    let (state, _) = b.build();

    assert_eq!(state.skill_xp(Skill::Astrology), 8);
    assert_eq!(state.inventory.count_of(&id("stardust")), 2);
}
