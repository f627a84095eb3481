//! User-initiated operations: everything a player (or an executed plan
//! step) can do between ticks. Each operation validates, then mutates the
//! working state through the builder; failures are typed `SimError`s and
//! leave the state untouched.

use crate::builder::StateUpdateBuilder;
use crate::enums::{AttackStyle, CookingArea, EquipSlot, Skill};
use crate::error::{SimError, SimResult};
use crate::id::Id;
use crate::inventory::ItemStack;
use crate::modifier::{resolve_modifiers, ModifierAnchor};
use crate::rng::SimRng;
use crate::rollers;
use crate::skills::{agility, astrology, combat, farming, mastery, slayer};
use crate::state::{
    ActiveActivity, CombatActivity, CombatContext, CombatProgressState, GlobalState, SkillActivity,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which inventory items a liquidation keeps.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SellPolicy {
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub keep: BTreeSet<Id>,
}

impl SellPolicy {
    pub fn keeping(items: impl IntoIterator<Item = Id>) -> Self {
        Self {
            keep: items.into_iter().collect(),
        }
    }

    /// GP value of everything this policy would sell right now.
    pub fn sellable_value(&self, state: &GlobalState) -> i64 {
        state
            .inventory
            .stacks()
            .iter()
            .filter(|stack| !self.keep.contains(&stack.item))
            .filter_map(|stack| {
                state
                    .registries()
                    .item(&stack.item)
                    .map(|def| def.sell_price * stack.count)
            })
            .sum()
    }

    /// GP on hand plus what selling would raise.
    pub fn effective_credits(&self, state: &GlobalState) -> i64 {
        state.gp + self.sellable_value(state)
    }
}

/// Every user operation the engine and solver can issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Interaction {
    SwitchActivity { action: Id },
    StartAgilityCourse,
    FightMonster { monster: Id, style: AttackStyle },
    EnterDungeon { dungeon: Id, style: AttackStyle },
    EnterSlayerArea { area: Id, monster: Id, style: AttackStyle },
    StopActivity,
    BuyShopItem { purchase: Id },
    SellItems { policy: SellPolicy },
    EquipItem { item: Id },
    UnequipSlot { slot: EquipSlot },
    EquipFood { item: Id, count: i64 },
    EatFood,
    AssignCookingRecipe { area: CookingArea, recipe: Option<Id> },
    PlantCrop { plot: usize, crop: Id },
    HarvestCrop { plot: usize },
    ApplyCompost { plot: usize, item: Id },
    ClaimMasteryTokens { skill: Skill },
    StartSlayerTask { category: Id },
    BuildObstacle { obstacle: Id },
    PurchaseAstrologyModifier {
        constellation: Id,
        unique: bool,
        index: usize,
    },
}

impl Interaction {
    pub fn describe(&self) -> String {
        match self {
            Interaction::SwitchActivity { action } => format!("Switch to {}", action),
            Interaction::StartAgilityCourse => "Run the agility course".to_string(),
            Interaction::FightMonster { monster, .. } => format!("Fight {}", monster),
            Interaction::EnterDungeon { dungeon, .. } => format!("Enter {}", dungeon),
            Interaction::EnterSlayerArea { area, monster, .. } => {
                format!("Fight {} in {}", monster, area)
            }
            Interaction::StopActivity => "Stop current activity".to_string(),
            Interaction::BuyShopItem { purchase } => format!("Buy {}", purchase),
            Interaction::SellItems { .. } => "Sell inventory".to_string(),
            Interaction::EquipItem { item } => format!("Equip {}", item),
            Interaction::UnequipSlot { slot } => format!("Unequip {:?}", slot),
            Interaction::EquipFood { item, count } => format!("Equip {} x{}", item, count),
            Interaction::EatFood => "Eat food".to_string(),
            Interaction::AssignCookingRecipe { area, .. } => {
                format!("Assign recipe to {:?}", area)
            }
            Interaction::PlantCrop { plot, crop } => format!("Plant {} in plot {}", crop, plot),
            Interaction::HarvestCrop { plot } => format!("Harvest plot {}", plot),
            Interaction::ApplyCompost { plot, item } => {
                format!("Apply {} to plot {}", item, plot)
            }
            Interaction::ClaimMasteryTokens { skill } => {
                format!("Claim {} mastery tokens", skill)
            }
            Interaction::StartSlayerTask { category } => {
                format!("Roll slayer task ({})", category)
            }
            Interaction::BuildObstacle { obstacle } => format!("Build {}", obstacle),
            Interaction::PurchaseAstrologyModifier {
                constellation,
                index,
                ..
            } => format!("Buy {} modifier {}", constellation, index),
        }
    }
}

/// Dispatch one interaction against the builder.
pub fn apply(b: &mut StateUpdateBuilder, interaction: &Interaction, rng: &mut SimRng) -> SimResult<()> {
    ensure_not_stunned(b.state())?;
    match interaction {
        Interaction::SwitchActivity { action } => start_action(b, action),
        Interaction::StartAgilityCourse => start_agility_course(b),
        Interaction::FightMonster { monster, style } => fight_monster(b, monster, *style),
        Interaction::EnterDungeon { dungeon, style } => enter_dungeon(b, dungeon, *style),
        Interaction::EnterSlayerArea {
            area,
            monster,
            style,
        } => enter_slayer_area(b, area, monster, *style),
        Interaction::StopActivity => {
            b.clear_activity("user stop");
            Ok(())
        }
        Interaction::BuyShopItem { purchase } => buy_shop_item(b, purchase),
        Interaction::SellItems { policy } => sell_items(b, policy).map(|_| ()),
        Interaction::EquipItem { item } => equip_item(b, item),
        Interaction::UnequipSlot { slot } => unequip_slot(b, *slot),
        Interaction::EquipFood { item, count } => equip_food(b, item, *count),
        Interaction::EatFood => eat_food(b),
        Interaction::AssignCookingRecipe { area, recipe } => {
            assign_cooking_recipe(b, *area, recipe.clone())
        }
        Interaction::PlantCrop { plot, crop } => farming::plant_crop(b, *plot, crop),
        Interaction::HarvestCrop { plot } => farming::harvest_crop(b, *plot, rng).map(|_| ()),
        Interaction::ApplyCompost { plot, item } => farming::apply_compost(b, *plot, item),
        Interaction::ClaimMasteryTokens { skill } => mastery::claim_all(b, *skill).map(|_| ()),
        Interaction::StartSlayerTask { category } => slayer::start_task(b, category, rng),
        Interaction::BuildObstacle { obstacle } => build_obstacle(b, obstacle),
        Interaction::PurchaseAstrologyModifier {
            constellation,
            unique,
            index,
        } => astrology::purchase_modifier(
            b,
            constellation,
            if *unique {
                astrology::ModifierKind::Unique
            } else {
                astrology::ModifierKind::Standard
            },
            *index,
        ),
    }
}

fn ensure_not_stunned(state: &GlobalState) -> SimResult<()> {
    if state.is_stunned() {
        return Err(SimError::Stunned);
    }
    Ok(())
}

/// Start a skill action as the foreground activity. Duration is rolled once
/// here, not per completion.
pub fn start_action(b: &mut StateUpdateBuilder, action_id: &Id) -> SimResult<()> {
    ensure_not_stunned(b.state())?;
    let def = b
        .state()
        .registries()
        .action(action_id)
        .cloned()
        .ok_or_else(|| SimError::InvalidArgument(format!("unknown action {}", action_id)))?;

    let level = b.state().skill_level(def.skill);
    if level < def.level_required {
        return Err(SimError::LevelTooLow {
            skill: def.skill,
            required: def.level_required,
            current: level,
        });
    }
    for (item, qty) in &def.inputs {
        if b.state().inventory.count_of(item) < *qty {
            return Err(SimError::InsufficientInputs {
                action: action_id.clone(),
                missing: item.clone(),
            });
        }
    }
    if let Some(node_def) = &def.mining {
        let node = b.state().action_state(action_id).mining.unwrap_or_default();
        if node.is_respawning() || node.hp_lost >= node_def.node_hp {
            return Err(SimError::RequirementUnmet(format!(
                "{} is depleted",
                action_id
            )));
        }
    }

    b.clear_activity("switching activity");

    let anchor = ModifierAnchor::for_action(b.state(), action_id);
    let modifiers = resolve_modifiers(b.state(), &anchor);
    let total_ticks = rollers::rolled_duration(def.base_ticks, &modifiers);

    if let Some(area) = def.cooking_area {
        b.state_mut().cooking.area_mut(area).recipe = Some(action_id.clone());
    }

    b.state_mut().active_activity = Some(ActiveActivity::Skill(SkillActivity {
        skill: def.skill,
        action: action_id.clone(),
        progress_ticks: 0,
        total_ticks,
        selected_recipe: def.cooking_area.map(|_| action_id.clone()),
    }));
    Ok(())
}

/// Start lapping the agility course from the first built obstacle at or
/// after the saved course position.
pub fn start_agility_course(b: &mut StateUpdateBuilder) -> SimResult<()> {
    ensure_not_stunned(b.state())?;
    let built = b.state().agility.built.clone();
    let slots = built.len();
    if slots == 0 {
        return Err(SimError::InvalidArgument(
            "no agility obstacles built".to_string(),
        ));
    }
    let start = b.state().agility.current_obstacle_index % slots;
    let mut found = None;
    for step in 0..slots {
        let candidate = (start + step) % slots;
        if let Some(obstacle) = &built[candidate] {
            found = Some((candidate, obstacle.clone()));
            break;
        }
    }
    let Some((index, obstacle_id)) = found else {
        return Err(SimError::InvalidArgument(
            "no agility obstacles built".to_string(),
        ));
    };
    let def = b
        .state()
        .registries()
        .obstacle(&obstacle_id)
        .cloned()
        .ok_or_else(|| SimError::InvalidArgument(format!("unknown obstacle {}", obstacle_id)))?;

    b.clear_activity("switching activity");
    b.state_mut().agility.current_obstacle_index = index;
    let anchor = ModifierAnchor {
        skill: Some(Skill::Agility),
        action: Some(&obstacle_id),
        category: None,
    };
    let modifiers = resolve_modifiers(b.state(), &anchor);
    let total_ticks = rollers::rolled_duration(def.duration_ticks, &modifiers);
    b.state_mut().active_activity = Some(ActiveActivity::Skill(SkillActivity {
        skill: Skill::Agility,
        action: obstacle_id,
        progress_ticks: 0,
        total_ticks,
        selected_recipe: None,
    }));
    Ok(())
}

fn start_combat_with_context(
    b: &mut StateUpdateBuilder,
    context: CombatContext,
    style: AttackStyle,
) -> SimResult<()> {
    let monster_id = context.current_monster_id().clone();
    let monster = b
        .state()
        .registries()
        .monster(&monster_id)
        .cloned()
        .ok_or_else(|| SimError::InvalidArgument(format!("unknown monster {}", monster_id)))?;

    b.clear_activity("entering combat");
    b.state_mut().active_activity = Some(ActiveActivity::Combat(CombatActivity {
        context,
        progress: CombatProgressState {
            monster_hp: monster.hp,
            player_attack_ticks_remaining: combat::PLAYER_ATTACK_INTERVAL_TICKS,
            monster_attack_ticks_remaining: monster.attack_interval_ticks,
            spawn_ticks_remaining: None,
        },
        progress_ticks: 0,
        total_ticks: combat::PLAYER_ATTACK_INTERVAL_TICKS,
        style,
    }));
    Ok(())
}

pub fn fight_monster(b: &mut StateUpdateBuilder, monster: &Id, style: AttackStyle) -> SimResult<()> {
    ensure_not_stunned(b.state())?;
    start_combat_with_context(
        b,
        CombatContext::Monster {
            monster: monster.clone(),
        },
        style,
    )
}

pub fn enter_dungeon(b: &mut StateUpdateBuilder, dungeon: &Id, style: AttackStyle) -> SimResult<()> {
    ensure_not_stunned(b.state())?;
    let def = b
        .state()
        .registries()
        .dungeon(dungeon)
        .cloned()
        .ok_or_else(|| SimError::InvalidArgument(format!("unknown dungeon {}", dungeon)))?;
    if def.monster_ids.is_empty() {
        return Err(SimError::InvalidArgument(format!(
            "dungeon {} has no monsters",
            dungeon
        )));
    }
    start_combat_with_context(
        b,
        CombatContext::Dungeon {
            dungeon: dungeon.clone(),
            monster_ids: def.monster_ids,
            current_index: 0,
        },
        style,
    )
}

pub fn enter_slayer_area(
    b: &mut StateUpdateBuilder,
    area: &Id,
    monster: &Id,
    style: AttackStyle,
) -> SimResult<()> {
    ensure_not_stunned(b.state())?;
    let def = b
        .state()
        .registries()
        .slayer_area(area)
        .cloned()
        .ok_or_else(|| SimError::InvalidArgument(format!("unknown slayer area {}", area)))?;
    if !def.monsters.contains(monster) {
        return Err(SimError::InvalidArgument(format!(
            "{} does not live in {}",
            monster, area
        )));
    }
    let slayer_level = b.state().skill_level(Skill::Slayer);
    if slayer_level < def.level_required {
        return Err(SimError::RequirementUnmet(format!(
            "{} requires Slayer level {}",
            area, def.level_required
        )));
    }
    if let Some(required) = &def.item_required {
        let held = b.state().inventory.contains(required)
            || b.state().equipment.slots.values().any(|i| i == required);
        if !held {
            return Err(SimError::RequirementUnmet(format!(
                "{} requires {}",
                area, required
            )));
        }
    }
    start_combat_with_context(
        b,
        CombatContext::SlayerArea {
            area: area.clone(),
            monster: monster.clone(),
        },
        style,
    )
}

/// Buy a shop entry: tier gating, purchase cap, GP and currency costs with
/// the cost-reduction modifier applied.
pub fn buy_shop_item(b: &mut StateUpdateBuilder, purchase: &Id) -> SimResult<()> {
    let entry = b
        .state()
        .registries()
        .shop_entry(purchase)
        .cloned()
        .ok_or_else(|| SimError::InvalidArgument(format!("unknown shop entry {}", purchase)))?;

    let count = b.state().shop_state.purchase_count(purchase);
    if let Some(max) = entry.max_purchases {
        if count >= max {
            return Err(SimError::InvalidArgument(format!(
                "{} already purchased {} times",
                purchase, count
            )));
        }
    }
    if entry.tier > 0 {
        if let Some(skill) = entry.skill {
            let ladder = b.state().registries().shop_ladder(skill);
            let prior_owned = ladder
                .iter()
                .filter(|e| e.tier == entry.tier - 1)
                .any(|e| b.state().shop_state.purchase_count(&e.id) > 0);
            if !prior_owned {
                return Err(SimError::RequirementUnmet(format!(
                    "{} requires the tier {} upgrade first",
                    purchase,
                    entry.tier - 1
                )));
            }
        }
    }

    let modifiers = resolve_modifiers(b.state(), &ModifierAnchor::global());
    let reduction = modifiers.shop_cost_reduction_pct().clamp(0.0, 100.0);
    let cost_gp = (entry.cost_gp as f64 * (1.0 - reduction / 100.0)).floor() as i64;
    if cost_gp > 0 {
        b.spend_gp(cost_gp)?;
    }
    if let Some((currency, amount)) = entry.cost_currency {
        b.spend_currency(currency, amount)?;
    }
    *b.state_mut()
        .shop_state
        .purchases
        .entry(purchase.clone())
        .or_insert(0) += 1;
    Ok(())
}

/// Liquidate everything the policy allows. Returns GP raised.
pub fn sell_items(b: &mut StateUpdateBuilder, policy: &SellPolicy) -> SimResult<i64> {
    let stacks: Vec<ItemStack> = b.state().inventory.stacks().to_vec();
    let mut raised = 0;
    for stack in stacks {
        if policy.keep.contains(&stack.item) || stack.count == 0 {
            continue;
        }
        let Some(def) = b.state().registries().item(&stack.item).cloned() else {
            continue;
        };
        if def.sell_price <= 0 {
            continue;
        }
        b.remove_item(&stack.item, stack.count)?;
        let value = def.sell_price * stack.count;
        b.add_gp(value);
        raised += value;
    }
    Ok(raised)
}

pub fn equip_item(b: &mut StateUpdateBuilder, item: &Id) -> SimResult<()> {
    let def = b
        .state()
        .registries()
        .item(item)
        .cloned()
        .ok_or_else(|| SimError::InvalidArgument(format!("unknown item {}", item)))?;
    let slot = def
        .equip_slot
        .ok_or_else(|| SimError::InvalidArgument(format!("{} is not equippable", item)))?;
    if b.state().inventory.count_of(item) < 1 {
        return Err(SimError::InsufficientInputs {
            action: item.clone(),
            missing: item.clone(),
        });
    }
    // Swap out the previous occupant first so a full inventory fails cleanly.
    if let Some(previous) = b.state().equipment.slots.get(&slot).cloned() {
        if &previous != item && !b.state().inventory.can_add(&previous) {
            return Err(SimError::InventoryFull { item: previous });
        }
        b.state_mut().equipment.slots.remove(&slot);
        b.add_item(&previous, 1)?;
    }
    b.remove_item(item, 1)?;
    b.state_mut().equipment.slots.insert(slot, item.clone());
    Ok(())
}

pub fn unequip_slot(b: &mut StateUpdateBuilder, slot: EquipSlot) -> SimResult<()> {
    let Some(item) = b.state().equipment.slots.get(&slot).cloned() else {
        return Err(SimError::InvalidArgument(format!("{:?} slot is empty", slot)));
    };
    b.add_item(&item, 1)?;
    b.state_mut().equipment.slots.remove(&slot);
    Ok(())
}

pub fn equip_food(b: &mut StateUpdateBuilder, item: &Id, count: i64) -> SimResult<()> {
    let def = b
        .state()
        .registries()
        .item(item)
        .cloned()
        .ok_or_else(|| SimError::InvalidArgument(format!("unknown item {}", item)))?;
    if def.healing.is_none() {
        return Err(SimError::InvalidArgument(format!("{} is not food", item)));
    }
    if b.state().inventory.count_of(item) < count {
        return Err(SimError::InsufficientInputs {
            action: item.clone(),
            missing: item.clone(),
        });
    }
    b.remove_item(item, count)?;
    match b.state().equipment.food.clone() {
        Some(stack) if stack.item == *item => {
            b.state_mut().equipment.food = Some(ItemStack::new(item.clone(), stack.count + count));
        }
        Some(previous) => {
            // Swap: previous food returns to the inventory.
            b.state_mut().equipment.food = Some(ItemStack::new(item.clone(), count));
            b.add_item(&previous.item, previous.count)?;
        }
        None => {
            b.state_mut().equipment.food = Some(ItemStack::new(item.clone(), count));
        }
    }
    Ok(())
}

pub fn eat_food(b: &mut StateUpdateBuilder) -> SimResult<()> {
    let Some(stack) = b.state().equipment.food.clone() else {
        return Err(SimError::InvalidArgument("no food equipped".to_string()));
    };
    let healing = b
        .state()
        .registries()
        .item(&stack.item)
        .and_then(|def| def.healing)
        .unwrap_or(0);
    let health = &mut b.state_mut().health;
    health.lost_hp = (health.lost_hp - healing).max(0);
    let food = &mut b.state_mut().equipment.food;
    if let Some(stack) = food {
        stack.count -= 1;
        if stack.count <= 0 {
            *food = None;
        }
    }
    Ok(())
}

pub fn assign_cooking_recipe(
    b: &mut StateUpdateBuilder,
    area: CookingArea,
    recipe: Option<Id>,
) -> SimResult<()> {
    if let Some(recipe_id) = &recipe {
        let def = b
            .state()
            .registries()
            .action(recipe_id)
            .cloned()
            .ok_or_else(|| {
                SimError::InvalidArgument(format!("unknown recipe {}", recipe_id))
            })?;
        if def.cooking_area != Some(area) {
            return Err(SimError::InvalidArgument(format!(
                "{} does not cook in {:?}",
                recipe_id, area
            )));
        }
        let level = b.state().skill_level(Skill::Cooking);
        if level < def.level_required {
            return Err(SimError::LevelTooLow {
                skill: Skill::Cooking,
                required: def.level_required,
                current: level,
            });
        }
    }
    let area_state = b.state_mut().cooking.area_mut(area);
    area_state.recipe = recipe;
    area_state.progress_ticks = 0;
    Ok(())
}

/// Build an obstacle into its course slot, paying GP (with the escalating
/// rebuild discount) and items.
pub fn build_obstacle(b: &mut StateUpdateBuilder, obstacle: &Id) -> SimResult<()> {
    let def = b
        .state()
        .registries()
        .obstacle(obstacle)
        .cloned()
        .ok_or_else(|| SimError::InvalidArgument(format!("unknown obstacle {}", obstacle)))?;

    let times_built = b
        .state()
        .agility
        .build_counts
        .get(obstacle)
        .copied()
        .unwrap_or(0);
    let discount = agility::build_discount(times_built);
    let cost_gp = (def.build_cost_gp as f64 * (1.0 - discount)).floor() as i64;

    for (item, qty) in &def.build_cost_items {
        if b.state().inventory.count_of(item) < *qty {
            return Err(SimError::InsufficientInputs {
                action: obstacle.clone(),
                missing: item.clone(),
            });
        }
    }
    if cost_gp > 0 {
        b.spend_gp(cost_gp)?;
    }
    for (item, qty) in &def.build_cost_items {
        b.remove_item(item, *qty)?;
    }

    let agility_state = &mut b.state_mut().agility;
    if agility_state.built.len() <= def.slot {
        agility_state.built.resize(def.slot + 1, None);
    }
    agility_state.built[def.slot] = Some(obstacle.clone());
    *agility_state.build_counts.entry(obstacle.clone()).or_insert(0) += 1;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registries;
    use std::sync::Arc;

    fn builder() -> StateUpdateBuilder {
        StateUpdateBuilder::new(GlobalState::empty(Arc::new(Registries::demo())))
    }

    fn id(local: &str) -> Id {
        Id::new("demo", local)
    }

    #[test]
    fn test_start_action_rolls_duration_once() {
        let mut b = builder();
        start_action(&mut b, &id("normal_tree")).unwrap();
        match &b.state().active_activity {
            Some(ActiveActivity::Skill(a)) => {
                assert_eq!(a.skill, Skill::Woodcutting);
                assert_eq!(a.total_ticks, 30);
                assert_eq!(a.progress_ticks, 0);
            }
            other => panic!("expected skill activity, got {:?}", other),
        }
    }

    #[test]
    fn test_start_action_rejects_low_level() {
        let mut b = builder();
        let err = start_action(&mut b, &id("willow_tree")).unwrap_err();
        assert_eq!(
            err,
            SimError::LevelTooLow {
                skill: Skill::Woodcutting,
                required: 30,
                current: 1
            }
        );
    }

    #[test]
    fn test_start_action_rejects_missing_inputs() {
        let mut b = builder();
        let err = start_action(&mut b, &id("burn_normal_logs")).unwrap_err();
        assert!(matches!(err, SimError::InsufficientInputs { .. }));
    }

    #[test]
    fn test_stunned_rejects_activity_change() {
        let mut b = builder();
        b.state_mut().stunned.ticks_remaining = 10;
        let err = start_action(&mut b, &id("normal_tree")).unwrap_err();
        assert_eq!(err, SimError::Stunned);
    }

    #[test]
    fn test_buy_shop_item_enforces_tier_order() {
        let mut b = builder();
        b.add_gp(10_000);
        let err = buy_shop_item(&mut b, &id("steel_axe")).unwrap_err();
        assert!(matches!(err, SimError::RequirementUnmet(_)));
        buy_shop_item(&mut b, &id("iron_axe")).unwrap();
        buy_shop_item(&mut b, &id("steel_axe")).unwrap();
        assert_eq!(b.state().gp, 10_000 - 50 - 750);
    }

    #[test]
    fn test_buy_shop_item_respects_purchase_cap() {
        let mut b = builder();
        b.add_gp(1_000);
        buy_shop_item(&mut b, &id("iron_axe")).unwrap();
        let err = buy_shop_item(&mut b, &id("iron_axe")).unwrap_err();
        assert!(matches!(err, SimError::InvalidArgument(_)));
    }

    #[test]
    fn test_sell_items_honours_keep_list() {
        let mut b = builder();
        b.add_item(&id("oak_logs"), 10).unwrap();
        b.add_item(&id("bird_nest"), 1).unwrap();
        let policy = SellPolicy::keeping([id("bird_nest")]);
        let raised = sell_items(&mut b, &policy).unwrap();
        assert_eq!(raised, 50);
        assert_eq!(b.state().inventory.count_of(&id("bird_nest")), 1);
        assert_eq!(b.state().inventory.count_of(&id("oak_logs")), 0);
    }

    #[test]
    fn test_equip_swaps_previous_item_back() {
        let mut b = builder();
        b.add_item(&id("leather_gloves"), 1).unwrap();
        equip_item(&mut b, &id("leather_gloves")).unwrap();
        assert_eq!(b.state().inventory.count_of(&id("leather_gloves")), 0);
        assert_eq!(
            b.state().equipment.slots.get(&EquipSlot::Gloves),
            Some(&id("leather_gloves"))
        );
        unequip_slot(&mut b, EquipSlot::Gloves).unwrap();
        assert_eq!(b.state().inventory.count_of(&id("leather_gloves")), 1);
    }

    #[test]
    fn test_eat_food_heals_and_consumes() {
        let mut b = builder();
        b.add_item(&id("shrimp"), 3).unwrap();
        equip_food(&mut b, &id("shrimp"), 3).unwrap();
        b.state_mut().health.lost_hp = 40;
        eat_food(&mut b).unwrap();
        assert_eq!(b.state().health.lost_hp, 10);
        assert_eq!(b.state().equipment.food.as_ref().map(|f| f.count), Some(2));
    }

    #[test]
    fn test_build_obstacle_discount_caps() {
        assert_eq!(agility::build_discount(0), 0.0);
        assert!((agility::build_discount(5) - 0.20).abs() < 1e-12);
        assert!((agility::build_discount(50) - 0.40).abs() < 1e-12);
    }
}
