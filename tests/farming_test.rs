//! Farming: plant/grow/harvest across the category rules (allotments scale
//! XP and yield, trees do not) plus compost effects.

mod common;

use common::{demo_builder, id};
use idlesim::interactions;
use idlesim::skills::farming;
use idlesim::{consume_ticks, SimError, Skill, SimRng};

#[test]
fn test_plant_allotment_consumes_seeds_and_grants_xp() {
    let mut b = demo_builder();
    b.add_item(&id("potato_seeds"), 5).unwrap();
    farming::plant_crop(&mut b, 0, &id("crop_potato")).unwrap();

    assert_eq!(b.state().inventory.count_of(&id("potato_seeds")), 2);
    assert_eq!(b.state().skill_xp(Skill::Farming), 8, "allotments pay on plant");
    assert!(b.state().farming.plots[0].is_growing());
}

#[test]
fn test_plant_tree_grants_no_xp() {
    let mut b = demo_builder();
    b.state_mut()
        .skill_states
        .entry(Skill::Farming)
        .or_default()
        .xp = idlesim::xp::start_xp_for_level(10);
    b.add_item(&id("oak_sapling"), 1).unwrap();
    let xp_before = b.state().skill_xp(Skill::Farming);
    // Plot 3 is the tree patch in the demo layout.
    farming::plant_crop(&mut b, 3, &id("crop_oak")).unwrap();
    assert_eq!(
        b.state().skill_xp(Skill::Farming),
        xp_before,
        "tree patches pay nothing on plant"
    );
}

#[test]
fn test_plant_rejects_wrong_category_and_level() {
    let mut b = demo_builder();
    b.add_item(&id("oak_sapling"), 1).unwrap();
    // Level 1 farmer cannot plant a level 10 tree.
    let err = farming::plant_crop(&mut b, 3, &id("crop_oak")).unwrap_err();
    assert!(matches!(err, SimError::LevelTooLow { .. }));

    b.add_item(&id("potato_seeds"), 3).unwrap();
    // Potatoes do not go in the tree patch.
    let err = farming::plant_crop(&mut b, 3, &id("crop_potato")).unwrap_err();
    assert!(matches!(err, SimError::InvalidArgument(_)));
}

#[test]
fn test_harvest_allotment_scales_xp_with_quantity() {
    let mut b = demo_builder();
    b.add_item(&id("potato_seeds"), 3).unwrap();
    farming::plant_crop(&mut b, 0, &id("crop_potato")).unwrap();
    let mut rng = SimRng::seeded(1);
    consume_ticks(&mut b, 6_000, &mut rng);
    assert!(b.state().farming.plots[0].is_ready());

    let xp_before = b.state().skill_xp(Skill::Farming);
    rng.force_double(0.0); // harvest success
    let quantity = farming::harvest_crop(&mut b, 0, &mut rng).unwrap();

    // base 5 x allotment multiplier 3.0 = 15.
    assert_eq!(quantity, 15);
    assert_eq!(b.state().inventory.count_of(&id("potato")), 15);
    assert_eq!(
        b.state().skill_xp(Skill::Farming) - xp_before,
        8 * 15,
        "allotment XP scales with harvested quantity"
    );
    assert!(b.state().farming.plots[0].is_empty());
}

#[test]
fn test_harvest_tree_grants_flat_xp() {
    let mut b = demo_builder();
    b.state_mut()
        .skill_states
        .entry(Skill::Farming)
        .or_default()
        .xp = idlesim::xp::start_xp_for_level(10);
    b.add_item(&id("oak_sapling"), 1).unwrap();
    farming::plant_crop(&mut b, 3, &id("crop_oak")).unwrap();
    let mut rng = SimRng::seeded(1);
    consume_ticks(&mut b, 24_000, &mut rng);

    let xp_before = b.state().skill_xp(Skill::Farming);
    rng.force_double(0.0);
    let quantity = farming::harvest_crop(&mut b, 3, &mut rng).unwrap();
    assert_eq!(quantity, 30, "tree multiplier is 1.0");
    assert_eq!(
        b.state().skill_xp(Skill::Farming) - xp_before,
        60,
        "tree XP does not scale with quantity"
    );
}

#[test]
fn test_harvest_failure_without_compost() {
    let mut b = demo_builder();
    b.add_item(&id("potato_seeds"), 3).unwrap();
    farming::plant_crop(&mut b, 0, &id("crop_potato")).unwrap();
    let mut rng = SimRng::seeded(1);
    consume_ticks(&mut b, 6_000, &mut rng);

    // Bare success chance is 0.5; 0.8 fails the roll.
    rng.force_double(0.8);
    let quantity = farming::harvest_crop(&mut b, 0, &mut rng).unwrap();
    assert_eq!(quantity, 0);
    assert_eq!(b.state().inventory.count_of(&id("potato")), 0);
    assert!(b.state().farming.plots[0].is_empty(), "failed plot still empties");
}

#[test]
fn test_compost_raises_success_chance() {
    let mut b = demo_builder();
    b.add_item(&id("potato_seeds"), 3).unwrap();
    b.add_item(&id("compost"), 2).unwrap();
    farming::plant_crop(&mut b, 0, &id("crop_potato")).unwrap();
    farming::apply_compost(&mut b, 0, &id("compost")).unwrap();
    farming::apply_compost(&mut b, 0, &id("compost")).unwrap();
    let mut rng = SimRng::seeded(1);
    consume_ticks(&mut b, 6_000, &mut rng);

    // Two composts at 20 each push success to 0.9; the 0.8 roll now passes.
    rng.force_double(0.8);
    let quantity = farming::harvest_crop(&mut b, 0, &mut rng).unwrap();
    assert!(quantity > 0, "compost turned the failing roll into a success");
}

#[test]
fn test_harvest_unready_plot_rejected() {
    let mut b = demo_builder();
    b.add_item(&id("potato_seeds"), 3).unwrap();
    farming::plant_crop(&mut b, 0, &id("crop_potato")).unwrap();
    let mut rng = SimRng::seeded(1);
    let err = farming::harvest_crop(&mut b, 0, &mut rng).unwrap_err();
    assert!(matches!(err, SimError::InvalidArgument(_)));
}

#[test]
fn test_interaction_dispatch_covers_farming() {
    let mut b = demo_builder();
    b.add_item(&id("potato_seeds"), 3).unwrap();
    let mut rng = SimRng::seeded(1);
    interactions::apply(
        &mut b,
        &interactions::Interaction::PlantCrop {
            plot: 0,
            crop: id("crop_potato"),
        },
        &mut rng,
    )
    .unwrap();
    consume_ticks(&mut b, 6_000, &mut rng);
    rng.force_double(0.0);
    interactions::apply(
        &mut b,
        &interactions::Interaction::HarvestCrop { plot: 0 },
        &mut rng,
    )
    .unwrap();
    assert!(b.state().inventory.count_of(&id("potato")) > 0);
}
