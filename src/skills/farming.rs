//! Farming: plots are pure background. Planting consumes seeds, growth is a
//! countdown, and harvesting rolls success against the applied compost.

use super::scaled_skill_xp;
use crate::builder::StateUpdateBuilder;
use crate::enums::Skill;
use crate::error::{SimError, SimResult};
use crate::id::Id;
use crate::modifier::{resolve_modifiers, ModifierAnchor};
use crate::rng::SimRng;

/// Plant a crop into an empty plot of its category. Grants the crop's base
/// XP immediately when the category says so (allotments do, trees do not).
pub fn plant_crop(b: &mut StateUpdateBuilder, plot_index: usize, crop_id: &Id) -> SimResult<()> {
    let crop = b
        .state()
        .registries()
        .crop(crop_id)
        .cloned()
        .ok_or_else(|| SimError::InvalidArgument(format!("unknown crop {}", crop_id)))?;
    let category = b
        .state()
        .registries()
        .farming_category(&crop.category)
        .cloned()
        .ok_or_else(|| {
            SimError::InvalidArgument(format!("unknown farming category {}", crop.category))
        })?;

    let level = b.state().skill_level(Skill::Farming);
    if level < crop.level_required {
        return Err(SimError::LevelTooLow {
            skill: Skill::Farming,
            required: crop.level_required,
            current: level,
        });
    }

    let plot = b
        .state()
        .farming
        .plots
        .get(plot_index)
        .cloned()
        .ok_or_else(|| SimError::InvalidArgument(format!("no plot at index {}", plot_index)))?;
    if plot.category != crop.category {
        return Err(SimError::InvalidArgument(format!(
            "plot {} is {}, crop needs {}",
            plot_index, plot.category, crop.category
        )));
    }
    if !plot.is_empty() {
        return Err(SimError::InvalidArgument(format!(
            "plot {} already has a crop",
            plot_index
        )));
    }

    if b.state().inventory.count_of(&crop.seed) < crop.seed_quantity {
        return Err(SimError::InsufficientInputs {
            action: crop_id.clone(),
            missing: crop.seed.clone(),
        });
    }
    b.remove_item(&crop.seed, crop.seed_quantity)?;

    {
        let plot = &mut b.state_mut().farming.plots[plot_index];
        plot.crop = Some(crop_id.clone());
        plot.growth_ticks_remaining = Some(crop.growth_ticks);
        plot.compost.clear();
    }

    if category.give_xp_on_plant {
        let anchor = ModifierAnchor::for_skill(Skill::Farming);
        let modifiers = resolve_modifiers(b.state(), &anchor);
        b.add_skill_xp(Skill::Farming, scaled_skill_xp(crop.base_xp, &modifiers));
    }
    Ok(())
}

/// Apply a compost item to a growing or planted plot.
pub fn apply_compost(b: &mut StateUpdateBuilder, plot_index: usize, item: &Id) -> SimResult<()> {
    let def = b
        .state()
        .registries()
        .item(item)
        .cloned()
        .ok_or_else(|| SimError::InvalidArgument(format!("unknown item {}", item)))?;
    if def.compost_value.is_none() {
        return Err(SimError::InvalidArgument(format!("{} is not compost", item)));
    }
    match b.state().farming.plots.get(plot_index) {
        Some(plot) if plot.crop.is_some() => {}
        Some(_) => {
            return Err(SimError::InvalidArgument(format!(
                "plot {} has nothing planted",
                plot_index
            )))
        }
        None => {
            return Err(SimError::InvalidArgument(format!(
                "no plot at index {}",
                plot_index
            )))
        }
    }
    b.remove_item(item, 1)?;
    b.state_mut().farming.plots[plot_index].compost.push(item.clone());
    Ok(())
}

/// Harvest a ready plot. Success chance comes from compost; quantity from
/// the category multiplier and harvest bonuses. Either way the plot empties.
pub fn harvest_crop(
    b: &mut StateUpdateBuilder,
    plot_index: usize,
    rng: &mut SimRng,
) -> SimResult<i64> {
    let plot = b
        .state()
        .farming
        .plots
        .get(plot_index)
        .cloned()
        .ok_or_else(|| SimError::InvalidArgument(format!("no plot at index {}", plot_index)))?;
    let Some(crop_id) = plot.crop.clone().filter(|_| plot.is_ready()) else {
        return Err(SimError::InvalidArgument(format!(
            "plot {} is not ready to harvest",
            plot_index
        )));
    };
    let crop = b
        .state()
        .registries()
        .crop(&crop_id)
        .cloned()
        .ok_or_else(|| SimError::InvalidArgument(format!("unknown crop {}", crop_id)))?;
    let category = b
        .state()
        .registries()
        .farming_category(&crop.category)
        .cloned()
        .ok_or_else(|| {
            SimError::InvalidArgument(format!("unknown farming category {}", crop.category))
        })?;

    // Compost contributions: success from compost_value, quantity from
    // harvest bonuses.
    let mut compost_value = 0i64;
    let mut harvest_bonus_pct = 0.0;
    for compost_item in &plot.compost {
        if let Some(def) = b.state().registries().item(compost_item) {
            compost_value += def.compost_value.unwrap_or(0);
            harvest_bonus_pct += def.harvest_bonus_pct.unwrap_or(0.0);
        }
    }
    let anchor = ModifierAnchor::for_skill(Skill::Farming);
    let modifiers = resolve_modifiers(b.state(), &anchor);
    harvest_bonus_pct += modifiers.farming_yield_pct();

    // The plot empties whether or not the harvest succeeds.
    {
        let plot = &mut b.state_mut().farming.plots[plot_index];
        plot.crop = None;
        plot.growth_ticks_remaining = None;
        plot.compost.clear();
    }

    let success_chance = (0.5 + compost_value as f64 / 100.0).clamp(0.0, 1.0);
    if rng.next_double() >= success_chance {
        return Ok(0);
    }

    let quantity = (crop.base_quantity as f64
        * category.harvest_multiplier
        * (1.0 + harvest_bonus_pct / 100.0))
        .floor() as i64;
    let quantity = quantity.max(1);
    b.add_item_or_drop(&crop.product, quantity);

    let xp = if category.scale_xp_with_quantity {
        crop.base_xp * quantity
    } else {
        crop.base_xp
    };
    b.add_skill_xp(Skill::Farming, scaled_skill_xp(xp, &modifiers));
    Ok(quantity)
}
