// Property-Based Tests for Engine Invariants
//
// These tests use proptest to validate that fundamental simulation rules
// hold across thousands of randomly generated inputs.

mod common;

use common::{demo_builder, id};
use idlesim::interactions;
use idlesim::inventory::Inventory;
use idlesim::modifier::{names, ModifierDef, ModifierScope, ResolvedModifiers};
use idlesim::rollers;
use idlesim::state::ActiveBuff;
use idlesim::{consume_ticks, xp, Skill, SimRng};
use proptest::prelude::*;

// ============================================================================
// INVARIANT 1: XP curve
// ============================================================================

proptest! {
    /// Levels never decrease as XP grows.
    #[test]
    fn prop_level_monotonic(a in 0i64..20_000_000, b in 0i64..20_000_000) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(xp::level_for_xp(lo) <= xp::level_for_xp(hi));
    }

    /// The level table inverts exactly at its anchors.
    #[test]
    fn prop_level_table_inverts(level in 1u32..=120) {
        prop_assert_eq!(xp::level_for_xp(xp::start_xp_for_level(level)), level);
        if level > 1 {
            prop_assert_eq!(
                xp::level_for_xp(xp::start_xp_for_level(level) - 1),
                level - 1,
                "one XP below the threshold is the previous level"
            );
        }
    }
}

// ============================================================================
// INVARIANT 2: Inventory round-trips
// ============================================================================

proptest! {
    /// add then remove of the same quantity is the identity (when add fits).
    #[test]
    fn prop_inventory_add_remove_roundtrip(count in 1i64..10_000) {
        let mut inv = Inventory::default();
        inv.add(&id("normal_logs"), 3).unwrap();
        let before = inv.clone();
        inv.add(&id("normal_logs"), count).unwrap();
        inv.remove(&id("normal_logs"), count).unwrap();
        prop_assert_eq!(inv, before);
    }

    /// Slot accounting stays within capacity regardless of stacking order.
    #[test]
    fn prop_inventory_slots_bounded(items in proptest::collection::vec(0usize..8, 0..60)) {
        let mut inv = Inventory::default();
        for item_index in items {
            let item = idlesim::Id::new("demo", format!("thing_{}", item_index));
            let _ = inv.add(&item, 1);
            prop_assert!(inv.used_slots() <= inv.capacity());
        }
    }
}

// ============================================================================
// INVARIANT 3: Duration rolls
// ============================================================================

proptest! {
    /// Rolled durations never fall below one tick.
    #[test]
    fn prop_duration_at_least_one_tick(
        base in 1i64..5_000,
        interval_pct in -200.0f64..200.0,
        flat_ms in -60_000.0f64..60_000.0,
    ) {
        let mut mods = ResolvedModifiers::default();
        mods.add(names::SKILL_INTERVAL, interval_pct);
        mods.add(names::FLAT_SKILL_INTERVAL, flat_ms);
        prop_assert!(rollers::rolled_duration(base, &mods) >= 1);
    }
}

// ============================================================================
// INVARIANT 4: Modifier scoping
// ============================================================================

proptest! {
    /// An entry scoped to one skill never leaks into another skill's fold.
    #[test]
    fn prop_skill_scope_isolated(value in -50.0f64..50.0) {
        use idlesim::modifier::{resolve_modifiers, ModifierAnchor};
        let mut b = demo_builder();
        b.state_mut().active_buffs.push(ActiveBuff {
            id: id("test_buff"),
            modifiers: vec![ModifierDef::scoped(
                names::SKILL_XP,
                value,
                ModifierScope::for_skill(Skill::Woodcutting),
            )],
            remaining_ticks: None,
        });
        let state = b.state();
        let wc = resolve_modifiers(state, &ModifierAnchor::for_skill(Skill::Woodcutting));
        let fishing = resolve_modifiers(state, &ModifierAnchor::for_skill(Skill::Fishing));
        prop_assert_eq!(wc.skill_xp_pct(), value);
        prop_assert_eq!(fishing.skill_xp_pct(), 0.0, "scoped entry leaked");
    }
}

// ============================================================================
// INVARIANT 5: Engine determinism and conservation
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Identical seeds and budgets give identical outcomes.
    #[test]
    fn prop_engine_deterministic(seed in any::<u64>(), budget in 0i64..600) {
        let run = |seed: u64| {
            let mut b = demo_builder();
            interactions::start_action(&mut b, &id("normal_tree")).unwrap();
            let mut rng = SimRng::seeded(seed);
            consume_ticks(&mut b, budget, &mut rng);
            b.build()
        };
        let (state_a, changes_a) = run(seed);
        let (state_b, changes_b) = run(seed);
        prop_assert_eq!(state_a, state_b);
        prop_assert_eq!(changes_a, changes_b);
    }

    /// XP, GP, and inventory counts stay non-negative through any budget.
    #[test]
    fn prop_quantities_non_negative(seed in any::<u64>(), budget in 0i64..2_000) {
        let mut b = demo_builder();
        b.add_item(&id("normal_logs"), 10).unwrap();
        interactions::start_action(&mut b, &id("burn_normal_logs")).unwrap();
        let mut rng = SimRng::seeded(seed);
        consume_ticks(&mut b, budget, &mut rng);
        let (state, _) = b.build();
        prop_assert!(state.gp >= 0);
        for stack in state.inventory.stacks() {
            prop_assert!(stack.count >= 0);
        }
        for skill_state in state.skill_states.values() {
            prop_assert!(skill_state.xp >= 0);
            prop_assert!(skill_state.mastery_pool_xp >= 0);
        }
    }

    /// Over many completions, doubling converges on base * (1 + p).
    #[test]
    fn prop_doubling_converges(seed in 0u64..32) {
        let mut b = demo_builder();
        b.state_mut().active_buffs.push(ActiveBuff {
            id: id("doubling_potion"),
            modifiers: vec![ModifierDef::global(names::SKILL_ITEM_DOUBLING_CHANCE, 50.0)],
            remaining_ticks: None,
        });
        interactions::start_action(&mut b, &id("normal_tree")).unwrap();
        let mut rng = SimRng::seeded(seed);
        // 400 completions.
        consume_ticks(&mut b, 400 * 30, &mut rng);
        let logs = b.state().inventory.count_of(&id("normal_logs"));
        // Expectation 600; a 3-sigma band is roughly +/- 30.
        prop_assert!((520..=680).contains(&logs), "got {} logs", logs);
    }
}

// ============================================================================
// INVARIANT 6: Persistence round-trip under random state
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_state_roundtrips_after_simulation(seed in any::<u64>(), budget in 0i64..1_500) {
        let mut b = demo_builder();
        b.add_item(&id("raw_shrimp"), 30).unwrap();
        interactions::start_action(&mut b, &id("cook_shrimp")).unwrap();
        let mut rng = SimRng::seeded(seed);
        consume_ticks(&mut b, budget, &mut rng);
        let (state, _) = b.build();

        let json = state.to_json();
        let back = idlesim::GlobalState::from_json(state.registries_handle(), &json).unwrap();
        prop_assert_eq!(back, state);
    }
}
