//! Read-only data registries: items, actions, monsters, shop entries,
//! mastery bonuses, slayer content, farming crops, astrology constellations,
//! and agility obstacles. Loaded once into an immutable bundle shared by
//! reference across every simulation; the engine never mutates them.

use crate::drops::{Droppable, WeightedEntry};
use crate::enums::{CookingArea, Currency, EquipSlot, Skill};
use crate::id::Id;
use crate::modifier::{names, ModifierDef, ModifierScope};
use crate::Tick;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn is_false(v: &bool) -> bool {
    !*v
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub sell_price: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compost_value: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub harvest_bonus_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equip_slot: Option<EquipSlot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub healing: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<ModifierDef>,
}

/// Thieving-specific fields of an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThievingDef {
    pub perception: i64,
    pub max_hit: i64,
    pub gp_min: i64,
    pub gp_max: i64,
}

/// Mining-specific fields of an action: the node the action extracts from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiningNodeDef {
    pub node_hp: i64,
    pub respawn_ticks: Tick,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDef {
    pub id: Id,
    pub name: String,
    pub skill: Skill,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Id>,
    #[serde(default)]
    pub level_required: u32,
    pub base_ticks: Tick,
    pub xp: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<(Id, i64)>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<(Id, i64)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drops: Option<Droppable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mastery_token: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooking_area: Option<CookingArea>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thieving: Option<ThievingDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mining: Option<MiningNodeDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterDef {
    pub id: Id,
    pub name: String,
    pub hp: i64,
    pub max_hit: i64,
    pub accuracy: f64,
    pub evasion: f64,
    pub attack_interval_ticks: Tick,
    pub xp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drops: Option<Droppable>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonDef {
    pub id: Id,
    pub name: String,
    pub monster_ids: Vec<Id>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopEntry {
    pub id: Id,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill: Option<Skill>,
    #[serde(default)]
    pub cost_gp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_currency: Option<(Currency, i64)>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<ModifierDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_purchases: Option<i64>,
    /// Position within the skill's upgrade ladder; tier N requires N prior
    /// purchases in the same ladder.
    #[serde(default)]
    pub tier: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasteryBonus {
    pub modifiers: Vec<ModifierDef>,
    pub trigger_level: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level_scaling_slope: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level_scaling_max: Option<u32>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub auto_scope_to_action: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolCheckpoint {
    pub fraction: f64,
    pub modifiers: Vec<ModifierDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlayerCategory {
    pub id: Id,
    pub name: String,
    pub monsters: Vec<Id>,
    pub kills_min: i64,
    pub kills_max: i64,
    #[serde(default)]
    pub roll_cost_gp: i64,
    pub xp_reward: i64,
    pub currency_reward: (Currency, i64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlayerArea {
    pub id: Id,
    pub name: String,
    pub monsters: Vec<Id>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effect_modifiers: Vec<ModifierDef>,
    #[serde(default)]
    pub level_required: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_required: Option<Id>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmingCategoryDef {
    pub id: Id,
    pub name: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub give_xp_on_plant: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub scale_xp_with_quantity: bool,
    pub harvest_multiplier: f64,
    pub plots: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropDef {
    pub id: Id,
    pub name: String,
    pub category: Id,
    pub seed: Id,
    pub seed_quantity: i64,
    #[serde(default)]
    pub level_required: u32,
    pub growth_ticks: Tick,
    pub base_xp: i64,
    pub base_quantity: i64,
    pub product: Id,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AstrologyModifierDef {
    pub modifiers: Vec<ModifierDef>,
    pub max_count: u32,
    #[serde(default)]
    pub unlock_mastery_level: u32,
    /// Stardust cost of buying level N+1 when N levels are owned.
    pub stardust_costs: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constellation {
    pub id: Id,
    pub name: String,
    pub skills: Vec<Skill>,
    pub study_ticks: Tick,
    pub study_xp: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub standard_modifiers: Vec<AstrologyModifierDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unique_modifiers: Vec<AstrologyModifierDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleDef {
    pub id: Id,
    pub name: String,
    pub slot: usize,
    pub duration_ticks: Tick,
    pub xp: i64,
    #[serde(default)]
    pub build_cost_gp: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub build_cost_items: Vec<(Id, i64)>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<ModifierDef>,
}

/// The full read-only bundle, keyed by namespaced ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Registries {
    pub items: BTreeMap<Id, ItemDef>,
    pub actions: BTreeMap<Id, ActionDef>,
    pub monsters: BTreeMap<Id, MonsterDef>,
    pub dungeons: BTreeMap<Id, DungeonDef>,
    pub shop: BTreeMap<Id, ShopEntry>,
    pub mastery_bonuses: BTreeMap<Skill, Vec<MasteryBonus>>,
    pub pool_checkpoints: BTreeMap<Skill, Vec<PoolCheckpoint>>,
    pub slayer_categories: BTreeMap<Id, SlayerCategory>,
    pub slayer_areas: BTreeMap<Id, SlayerArea>,
    pub farming_categories: BTreeMap<Id, FarmingCategoryDef>,
    pub crops: BTreeMap<Id, CropDef>,
    pub constellations: BTreeMap<Id, Constellation>,
    pub obstacles: BTreeMap<Id, ObstacleDef>,
}

impl Registries {
    pub fn item(&self, id: &Id) -> Option<&ItemDef> {
        self.items.get(id)
    }

    pub fn action(&self, id: &Id) -> Option<&ActionDef> {
        self.actions.get(id)
    }

    pub fn monster(&self, id: &Id) -> Option<&MonsterDef> {
        self.monsters.get(id)
    }

    pub fn dungeon(&self, id: &Id) -> Option<&DungeonDef> {
        self.dungeons.get(id)
    }

    pub fn shop_entry(&self, id: &Id) -> Option<&ShopEntry> {
        self.shop.get(id)
    }

    pub fn mastery_bonuses(&self, skill: Skill) -> &[MasteryBonus] {
        self.mastery_bonuses
            .get(&skill)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn pool_checkpoints(&self, skill: Skill) -> &[PoolCheckpoint] {
        self.pool_checkpoints
            .get(&skill)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn slayer_category(&self, id: &Id) -> Option<&SlayerCategory> {
        self.slayer_categories.get(id)
    }

    pub fn slayer_area(&self, id: &Id) -> Option<&SlayerArea> {
        self.slayer_areas.get(id)
    }

    pub fn farming_category(&self, id: &Id) -> Option<&FarmingCategoryDef> {
        self.farming_categories.get(id)
    }

    pub fn crop(&self, id: &Id) -> Option<&CropDef> {
        self.crops.get(id)
    }

    pub fn constellation(&self, id: &Id) -> Option<&Constellation> {
        self.constellations.get(id)
    }

    pub fn obstacle(&self, id: &Id) -> Option<&ObstacleDef> {
        self.obstacles.get(id)
    }

    /// All actions of a skill, in ascending unlock-level order.
    pub fn actions_for_skill(&self, skill: Skill) -> Vec<&ActionDef> {
        let mut actions: Vec<&ActionDef> =
            self.actions.values().filter(|a| a.skill == skill).collect();
        actions.sort_by_key(|a| (a.level_required, a.id.clone()));
        actions
    }

    /// Case-insensitive item name lookup.
    pub fn item_id_by_name(&self, name: &str) -> Option<Id> {
        self.items
            .values()
            .find(|i| i.name.eq_ignore_ascii_case(name))
            .map(|i| i.id.clone())
    }

    /// Case-insensitive action name lookup.
    pub fn action_id_by_name(&self, name: &str) -> Option<Id> {
        self.actions
            .values()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.id.clone())
    }

    /// Shop entries in a skill's upgrade ladder, ascending by tier.
    pub fn shop_ladder(&self, skill: Skill) -> Vec<&ShopEntry> {
        let mut entries: Vec<&ShopEntry> = self
            .shop
            .values()
            .filter(|e| e.skill == Some(skill))
            .collect();
        entries.sort_by_key(|e| (e.tier, e.id.clone()));
        entries
    }

    /// The per-skill mastery token item, if any action of the skill carries one.
    pub fn mastery_token_for(&self, skill: Skill) -> Option<Id> {
        self.actions
            .values()
            .find(|a| a.skill == skill && a.mastery_token.is_some())
            .and_then(|a| a.mastery_token.clone())
    }
}

// --- Demo bundle -----------------------------------------------------------
//
// A compact dataset exercising every subsystem; used by the test suites and
// the CLI. Everything lives in the `demo` namespace.

fn id(local: &str) -> Id {
    Id::new("demo", local)
}

fn plain_item(local: &str, name: &str, sell_price: i64) -> ItemDef {
    ItemDef {
        id: id(local),
        name: name.to_string(),
        sell_price,
        compost_value: None,
        harvest_bonus_pct: None,
        equip_slot: None,
        healing: None,
        modifiers: Vec::new(),
    }
}

impl Registries {
    /// The demo bundle: a handful of entries per subsystem, enough to drive
    /// the full engine and solver without the production data files.
    pub fn demo() -> Self {
        let mut reg = Registries::default();

        // -- Items ----------------------------------------------------------
        for item in [
            plain_item("normal_logs", "Normal Logs", 1),
            plain_item("oak_logs", "Oak Logs", 5),
            plain_item("willow_logs", "Willow Logs", 10),
            plain_item("raw_shrimp", "Raw Shrimp", 1),
            plain_item("raw_trout", "Raw Trout", 5),
            plain_item("copper_ore", "Copper Ore", 2),
            plain_item("iron_ore", "Iron Ore", 6),
            plain_item("bird_nest", "Bird Nest", 350),
            plain_item("sapphire", "Sapphire", 200),
            plain_item("emerald", "Emerald", 400),
            plain_item("raw_beef", "Raw Beef", 2),
            plain_item("leather", "Leather", 10),
            plain_item("bones", "Bones", 5),
            plain_item("potato", "Potato", 2),
            plain_item("potato_seeds", "Potato Seeds", 1),
            plain_item("garden_herb", "Garden Herb", 40),
            plain_item("herb_seeds", "Herb Seeds", 10),
            plain_item("oak_sapling", "Oak Sapling", 50),
            plain_item("stardust", "Stardust", 20),
            plain_item("golden_stardust", "Golden Stardust", 100),
            plain_item("burnt_food", "Burnt Food", 0),
            plain_item("token_woodcutting", "Mastery Token (Woodcutting)", 0),
            plain_item("token_fishing", "Mastery Token (Fishing)", 0),
            plain_item("token_mining", "Mastery Token (Mining)", 0),
            plain_item("token_cooking", "Mastery Token (Cooking)", 0),
            plain_item("token_thieving", "Mastery Token (Thieving)", 0),
            plain_item("token_firemaking", "Mastery Token (Firemaking)", 0),
        ] {
            reg.items.insert(item.id.clone(), item);
        }

        let mut shrimp = plain_item("shrimp", "Shrimp", 2);
        shrimp.healing = Some(30);
        reg.items.insert(shrimp.id.clone(), shrimp);

        let mut trout = plain_item("trout", "Trout", 12);
        trout.healing = Some(100);
        reg.items.insert(trout.id.clone(), trout);

        let mut beef = plain_item("cooked_beef", "Cooked Beef", 8);
        beef.healing = Some(60);
        reg.items.insert(beef.id.clone(), beef);

        let mut soup = plain_item("potato_soup", "Potato Soup", 15);
        soup.healing = Some(80);
        reg.items.insert(soup.id.clone(), soup);

        let mut compost = plain_item("compost", "Compost", 1);
        compost.compost_value = Some(20);
        reg.items.insert(compost.id.clone(), compost);

        let mut gloves = plain_item("leather_gloves", "Leather Gloves", 50);
        gloves.equip_slot = Some(EquipSlot::Gloves);
        gloves.modifiers = vec![ModifierDef::global(names::THIEVING_STEALTH, 25.0)];
        reg.items.insert(gloves.id.clone(), gloves);

        let mut ring = plain_item("gold_ring", "Gold Ring", 200);
        ring.equip_slot = Some(EquipSlot::Ring);
        ring.modifiers = vec![ModifierDef::global(names::SKILL_XP, 2.0)];
        reg.items.insert(ring.id.clone(), ring);

        let mut sword = plain_item("bronze_sword", "Bronze Sword", 25);
        sword.equip_slot = Some(EquipSlot::Weapon);
        sword.modifiers = vec![ModifierDef::global(names::FLAT_MAX_HIT, 1.0)];
        reg.items.insert(sword.id.clone(), sword);

        // -- Woodcutting ----------------------------------------------------
        let nest_drop = Droppable::chance(0.005, Droppable::item(id("bird_nest")));
        for (local, name, level, ticks, xp, logs) in [
            ("normal_tree", "Normal Tree", 1, 30, 10, "normal_logs"),
            ("oak_tree", "Oak Tree", 15, 40, 15, "oak_logs"),
            ("willow_tree", "Willow Tree", 30, 50, 22, "willow_logs"),
        ] {
            reg.actions.insert(
                id(local),
                ActionDef {
                    id: id(local),
                    name: name.to_string(),
                    skill: Skill::Woodcutting,
                    category: None,
                    level_required: level,
                    base_ticks: ticks,
                    xp,
                    inputs: Vec::new(),
                    outputs: vec![(id(logs), 1)],
                    drops: Some(nest_drop.clone()),
                    mastery_token: Some(id("token_woodcutting")),
                    cooking_area: None,
                    thieving: None,
                    mining: None,
                },
            );
        }

        // -- Fishing --------------------------------------------------------
        for (local, name, level, ticks, xp, fish) in [
            ("fish_shrimp", "Shrimp Fishing", 1, 40, 10, "raw_shrimp"),
            ("fish_trout", "Trout Fishing", 20, 40, 50, "raw_trout"),
        ] {
            reg.actions.insert(
                id(local),
                ActionDef {
                    id: id(local),
                    name: name.to_string(),
                    skill: Skill::Fishing,
                    category: None,
                    level_required: level,
                    base_ticks: ticks,
                    xp,
                    inputs: Vec::new(),
                    outputs: vec![(id(fish), 1)],
                    drops: None,
                    mastery_token: Some(id("token_fishing")),
                    cooking_area: None,
                    thieving: None,
                    mining: None,
                },
            );
        }

        // -- Mining ---------------------------------------------------------
        let gem_table = Droppable::chance(
            0.01,
            Droppable::Table {
                entries: vec![
                    WeightedEntry {
                        weight: 3.0,
                        droppable: Droppable::item(id("sapphire")),
                    },
                    WeightedEntry {
                        weight: 1.0,
                        droppable: Droppable::item(id("emerald")),
                    },
                ],
            },
        );
        for (local, name, level, ticks, xp, ore, node_hp) in [
            ("copper_rock", "Copper Rock", 1, 30, 7, "copper_ore", 5),
            ("iron_rock", "Iron Rock", 15, 30, 14, "iron_ore", 5),
        ] {
            reg.actions.insert(
                id(local),
                ActionDef {
                    id: id(local),
                    name: name.to_string(),
                    skill: Skill::Mining,
                    category: None,
                    level_required: level,
                    base_ticks: ticks,
                    xp,
                    inputs: Vec::new(),
                    outputs: vec![(id(ore), 1)],
                    drops: Some(gem_table.clone()),
                    mastery_token: Some(id("token_mining")),
                    cooking_area: None,
                    thieving: None,
                    mining: Some(MiningNodeDef {
                        node_hp,
                        respawn_ticks: 100,
                    }),
                },
            );
        }

        // -- Firemaking -----------------------------------------------------
        for (local, name, level, ticks, xp, logs) in [
            ("burn_normal_logs", "Burn Normal Logs", 1, 20, 10, "normal_logs"),
            ("burn_oak_logs", "Burn Oak Logs", 15, 20, 30, "oak_logs"),
        ] {
            reg.actions.insert(
                id(local),
                ActionDef {
                    id: id(local),
                    name: name.to_string(),
                    skill: Skill::Firemaking,
                    category: None,
                    level_required: level,
                    base_ticks: ticks,
                    xp,
                    inputs: vec![(id(logs), 1)],
                    outputs: Vec::new(),
                    drops: None,
                    mastery_token: Some(id("token_firemaking")),
                    cooking_area: None,
                    thieving: None,
                    mining: None,
                },
            );
        }

        // -- Cooking --------------------------------------------------------
        let fire = id("area_fire");
        let furnace = id("area_furnace");
        let pot = id("area_pot");
        for (local, name, level, ticks, xp, raw, cooked, area, category) in [
            ("cook_shrimp", "Cook Shrimp", 1, 10, 10, "raw_shrimp", "shrimp", CookingArea::Fire, &fire),
            ("cook_trout", "Cook Trout", 15, 10, 30, "raw_trout", "trout", CookingArea::Fire, &fire),
            ("roast_beef", "Roast Beef", 1, 20, 15, "raw_beef", "cooked_beef", CookingArea::Furnace, &furnace),
            ("potato_soup", "Potato Soup", 10, 30, 40, "potato", "potato_soup", CookingArea::Pot, &pot),
        ] {
            reg.actions.insert(
                id(local),
                ActionDef {
                    id: id(local),
                    name: name.to_string(),
                    skill: Skill::Cooking,
                    category: Some(category.clone()),
                    level_required: level,
                    base_ticks: ticks,
                    xp,
                    inputs: vec![(id(raw), 1)],
                    outputs: vec![(id(cooked), 1)],
                    drops: None,
                    mastery_token: Some(id("token_cooking")),
                    cooking_area: Some(area),
                    thieving: None,
                    mining: None,
                },
            );
        }

        // -- Thieving -------------------------------------------------------
        for (local, name, level, ticks, xp, perception, max_hit, gp_min, gp_max) in [
            ("pickpocket_man", "Pickpocket Man", 1, 30, 8, 60, 11, 1, 20),
            ("pickpocket_farmer", "Pickpocket Farmer", 15, 30, 18, 90, 22, 10, 50),
        ] {
            reg.actions.insert(
                id(local),
                ActionDef {
                    id: id(local),
                    name: name.to_string(),
                    skill: Skill::Thieving,
                    category: None,
                    level_required: level,
                    base_ticks: ticks,
                    xp,
                    inputs: Vec::new(),
                    outputs: Vec::new(),
                    drops: None,
                    mastery_token: Some(id("token_thieving")),
                    cooking_area: None,
                    thieving: Some(ThievingDef {
                        perception,
                        max_hit,
                        gp_min,
                        gp_max,
                    }),
                    mining: None,
                },
            );
        }

        // -- Agility --------------------------------------------------------
        for (local, name, slot, ticks, xp, cost_gp) in [
            ("cargo_net", "Cargo Net", 0, 100, 10, 500),
            ("pipe_crawl", "Pipe Crawl", 0, 80, 8, 500),
            ("balance_beam", "Balance Beam", 1, 150, 18, 2_000),
        ] {
            reg.obstacles.insert(
                id(local),
                ObstacleDef {
                    id: id(local),
                    name: name.to_string(),
                    slot,
                    duration_ticks: ticks,
                    xp,
                    build_cost_gp: cost_gp,
                    build_cost_items: vec![(id("normal_logs"), 10)],
                    modifiers: vec![ModifierDef::global(names::SKILL_INTERVAL, -1.0)],
                },
            );
        }

        // -- Astrology ------------------------------------------------------
        reg.constellations.insert(
            id("deneb"),
            Constellation {
                id: id("deneb"),
                name: "Deneb".to_string(),
                skills: vec![Skill::Woodcutting, Skill::Firemaking],
                study_ticks: 30,
                study_xp: 8,
                standard_modifiers: vec![AstrologyModifierDef {
                    modifiers: vec![ModifierDef::scoped(
                        names::SKILL_XP,
                        1.0,
                        ModifierScope::for_skill(Skill::Woodcutting),
                    )],
                    max_count: 8,
                    unlock_mastery_level: 2,
                    stardust_costs: vec![2, 5, 10, 20, 40, 80, 160, 320],
                }],
                unique_modifiers: vec![AstrologyModifierDef {
                    modifiers: vec![ModifierDef::scoped(
                        names::SKILL_INTERVAL,
                        -1.0,
                        ModifierScope::for_skill(Skill::Woodcutting),
                    )],
                    max_count: 5,
                    unlock_mastery_level: 5,
                    stardust_costs: vec![1, 2, 4, 8, 16],
                }],
            },
        );
        reg.constellations.insert(
            id("ariel"),
            Constellation {
                id: id("ariel"),
                name: "Ariel".to_string(),
                skills: vec![Skill::Fishing],
                study_ticks: 30,
                study_xp: 8,
                standard_modifiers: vec![AstrologyModifierDef {
                    modifiers: vec![ModifierDef::scoped(
                        names::SKILL_XP,
                        1.0,
                        ModifierScope::for_skill(Skill::Fishing),
                    )],
                    max_count: 8,
                    unlock_mastery_level: 2,
                    stardust_costs: vec![2, 5, 10, 20, 40, 80, 160, 320],
                }],
                unique_modifiers: Vec::new(),
            },
        );
        // Studying a constellation is itself an astrology action.
        let stardust_drop = Droppable::chance(0.4, Droppable::item_range(id("stardust"), 1, 3));
        for constellation in ["deneb", "ariel"] {
            let action = Id::new("demo", format!("study_{}", constellation));
            reg.actions.insert(
                action.clone(),
                ActionDef {
                    id: action.clone(),
                    name: format!("Study {}", constellation),
                    skill: Skill::Astrology,
                    category: None,
                    level_required: if constellation == "deneb" { 1 } else { 10 },
                    base_ticks: 30,
                    xp: 8,
                    inputs: Vec::new(),
                    outputs: Vec::new(),
                    drops: Some(stardust_drop.clone()),
                    mastery_token: None,
                    cooking_area: None,
                    thieving: None,
                    mining: None,
                },
            );
        }

        // -- Farming --------------------------------------------------------
        reg.farming_categories.insert(
            id("allotment"),
            FarmingCategoryDef {
                id: id("allotment"),
                name: "Allotment".to_string(),
                give_xp_on_plant: true,
                scale_xp_with_quantity: true,
                harvest_multiplier: 3.0,
                plots: 2,
            },
        );
        reg.farming_categories.insert(
            id("herb_patch"),
            FarmingCategoryDef {
                id: id("herb_patch"),
                name: "Herb Patch".to_string(),
                give_xp_on_plant: true,
                scale_xp_with_quantity: true,
                harvest_multiplier: 2.0,
                plots: 1,
            },
        );
        reg.farming_categories.insert(
            id("tree_patch"),
            FarmingCategoryDef {
                id: id("tree_patch"),
                name: "Tree Patch".to_string(),
                give_xp_on_plant: false,
                scale_xp_with_quantity: false,
                harvest_multiplier: 1.0,
                plots: 1,
            },
        );
        reg.crops.insert(
            id("crop_potato"),
            CropDef {
                id: id("crop_potato"),
                name: "Potato".to_string(),
                category: id("allotment"),
                seed: id("potato_seeds"),
                seed_quantity: 3,
                level_required: 1,
                growth_ticks: 6_000,
                base_xp: 8,
                base_quantity: 5,
                product: id("potato"),
            },
        );
        reg.crops.insert(
            id("crop_herb"),
            CropDef {
                id: id("crop_herb"),
                name: "Garden Herb".to_string(),
                category: id("herb_patch"),
                seed: id("herb_seeds"),
                seed_quantity: 2,
                level_required: 5,
                growth_ticks: 9_000,
                base_xp: 15,
                base_quantity: 4,
                product: id("garden_herb"),
            },
        );
        reg.crops.insert(
            id("crop_oak"),
            CropDef {
                id: id("crop_oak"),
                name: "Oak Tree".to_string(),
                category: id("tree_patch"),
                seed: id("oak_sapling"),
                seed_quantity: 1,
                level_required: 10,
                growth_ticks: 24_000,
                base_xp: 60,
                base_quantity: 30,
                product: id("oak_logs"),
            },
        );

        // -- Combat ---------------------------------------------------------
        let cow_drops = Droppable::Table {
            entries: vec![
                WeightedEntry {
                    weight: 4.0,
                    droppable: Droppable::item(id("raw_beef")),
                },
                WeightedEntry {
                    weight: 2.0,
                    droppable: Droppable::item(id("leather")),
                },
                WeightedEntry {
                    weight: 1.0,
                    droppable: Droppable::item(id("bones")),
                },
            ],
        };
        for (local, name, hp, max_hit, accuracy, evasion, interval, xp) in [
            ("cow", "Cow", 30, 3, 30.0, 20.0, 25, 30),
            ("goblin", "Goblin", 15, 2, 25.0, 15.0, 20, 15),
            ("plant", "Plant", 10, 1, 10.0, 5.0, 30, 8),
        ] {
            reg.monsters.insert(
                id(local),
                MonsterDef {
                    id: id(local),
                    name: name.to_string(),
                    hp,
                    max_hit,
                    accuracy,
                    evasion,
                    attack_interval_ticks: interval,
                    xp,
                    drops: Some(cow_drops.clone()),
                },
            );
        }
        reg.dungeons.insert(
            id("farmlands"),
            DungeonDef {
                id: id("farmlands"),
                name: "Farmlands".to_string(),
                monster_ids: vec![id("plant"), id("goblin"), id("cow")],
            },
        );

        // -- Slayer ---------------------------------------------------------
        reg.slayer_categories.insert(
            id("easy"),
            SlayerCategory {
                id: id("easy"),
                name: "Easy".to_string(),
                monsters: vec![id("plant"), id("goblin"), id("cow")],
                kills_min: 5,
                kills_max: 15,
                roll_cost_gp: 0,
                xp_reward: 200,
                currency_reward: (Currency::SlayerCoins, 10),
            },
        );
        reg.slayer_categories.insert(
            id("normal"),
            SlayerCategory {
                id: id("normal"),
                name: "Normal".to_string(),
                monsters: vec![id("goblin"), id("cow")],
                kills_min: 15,
                kills_max: 40,
                roll_cost_gp: 200,
                xp_reward: 800,
                currency_reward: (Currency::SlayerCoins, 40),
            },
        );
        reg.slayer_areas.insert(
            id("penumbra"),
            SlayerArea {
                id: id("penumbra"),
                name: "Penumbra".to_string(),
                monsters: vec![id("goblin"), id("cow")],
                effect_modifiers: vec![ModifierDef::global(names::FLAT_EVASION, -10.0)],
                level_required: 5,
                item_required: None,
            },
        );

        // -- Shop -----------------------------------------------------------
        for (local, name, skill, cost, tier, interval) in [
            ("iron_axe", "Iron Axe", Skill::Woodcutting, 50, 0, -5.0),
            ("steel_axe", "Steel Axe", Skill::Woodcutting, 750, 1, -5.0),
            ("black_axe", "Black Axe", Skill::Woodcutting, 2_500, 2, -5.0),
            ("iron_pickaxe", "Iron Pickaxe", Skill::Mining, 50, 0, -5.0),
            ("steel_pickaxe", "Steel Pickaxe", Skill::Mining, 750, 1, -5.0),
            ("iron_rod", "Iron Fishing Rod", Skill::Fishing, 50, 0, -5.0),
            ("steel_rod", "Steel Fishing Rod", Skill::Fishing, 750, 1, -5.0),
        ] {
            reg.shop.insert(
                id(local),
                ShopEntry {
                    id: id(local),
                    name: name.to_string(),
                    skill: Some(skill),
                    cost_gp: cost,
                    cost_currency: None,
                    modifiers: vec![ModifierDef::scoped(
                        names::SKILL_INTERVAL,
                        interval,
                        ModifierScope::for_skill(skill),
                    )],
                    max_purchases: Some(1),
                    tier,
                },
            );
        }
        reg.shop.insert(
            id("cooking_gloves"),
            ShopEntry {
                id: id("cooking_gloves"),
                name: "Cooking Gloves".to_string(),
                skill: Some(Skill::Cooking),
                cost_gp: 1_000,
                cost_currency: None,
                modifiers: vec![ModifierDef::scoped(
                    names::PERFECT_COOK_CHANCE,
                    10.0,
                    ModifierScope::for_skill(Skill::Cooking),
                )],
                max_purchases: Some(1),
                tier: 0,
            },
        );
        reg.shop.insert(
            id("slayer_scroll"),
            ShopEntry {
                id: id("slayer_scroll"),
                name: "Slayer Scroll".to_string(),
                skill: Some(Skill::Slayer),
                cost_gp: 0,
                cost_currency: Some((Currency::SlayerCoins, 50)),
                modifiers: vec![ModifierDef::global(
                    names::FLAT_SLAYER_AREA_EFFECT_NEGATION,
                    25.0,
                )],
                max_purchases: Some(4),
                tier: 0,
            },
        );

        // -- Mastery bonuses ------------------------------------------------
        for skill in [
            Skill::Woodcutting,
            Skill::Fishing,
            Skill::Mining,
            Skill::Cooking,
            Skill::Thieving,
            Skill::Firemaking,
        ] {
            reg.mastery_bonuses.insert(
                skill,
                vec![MasteryBonus {
                    modifiers: vec![ModifierDef::scoped(
                        names::SKILL_XP,
                        1.0,
                        ModifierScope::for_skill(skill),
                    )],
                    trigger_level: 10,
                    level_scaling_slope: Some(10),
                    level_scaling_max: Some(99),
                    auto_scope_to_action: true,
                }],
            );
            reg.pool_checkpoints.insert(
                skill,
                vec![
                    PoolCheckpoint {
                        fraction: 0.10,
                        modifiers: vec![ModifierDef::scoped(
                            names::MASTERY_XP,
                            5.0,
                            ModifierScope::for_skill(skill),
                        )],
                    },
                    PoolCheckpoint {
                        fraction: 0.25,
                        modifiers: vec![ModifierDef::scoped(
                            names::SKILL_INTERVAL,
                            -3.0,
                            ModifierScope::for_skill(skill),
                        )],
                    },
                ],
            );
        }

        reg
    }
}
