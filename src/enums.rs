use serde::{Deserialize, Serialize};

/// Every player-visible skill. Combat sub-skills are modeled individually so
/// XP routing by attack style stays a plain match.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum Skill {
    Woodcutting,
    Fishing,
    Mining,
    Firemaking,
    Cooking,
    Thieving,
    Farming,
    Agility,
    Astrology,
    Slayer,
    Runecrafting,
    Smithing,
    Fletching,
    Crafting,
    Herblore,
    Summoning,
    Attack,
    Strength,
    Defence,
    Hitpoints,
    Ranged,
    Magic,
    Prayer,
}

impl Skill {
    pub const ALL: [Skill; 23] = [
        Skill::Woodcutting,
        Skill::Fishing,
        Skill::Mining,
        Skill::Firemaking,
        Skill::Cooking,
        Skill::Thieving,
        Skill::Farming,
        Skill::Agility,
        Skill::Astrology,
        Skill::Slayer,
        Skill::Runecrafting,
        Skill::Smithing,
        Skill::Fletching,
        Skill::Crafting,
        Skill::Herblore,
        Skill::Summoning,
        Skill::Attack,
        Skill::Strength,
        Skill::Defence,
        Skill::Hitpoints,
        Skill::Ranged,
        Skill::Magic,
        Skill::Prayer,
    ];

    pub fn is_combat(&self) -> bool {
        matches!(
            self,
            Skill::Attack
                | Skill::Strength
                | Skill::Defence
                | Skill::Hitpoints
                | Skill::Ranged
                | Skill::Magic
                | Skill::Prayer
        )
    }

    /// Non-combat skills track per-action mastery and a mastery pool.
    pub fn has_mastery(&self) -> bool {
        !self.is_combat() && *self != Skill::Slayer
    }

    pub fn name(&self) -> &'static str {
        match self {
            Skill::Woodcutting => "Woodcutting",
            Skill::Fishing => "Fishing",
            Skill::Mining => "Mining",
            Skill::Firemaking => "Firemaking",
            Skill::Cooking => "Cooking",
            Skill::Thieving => "Thieving",
            Skill::Farming => "Farming",
            Skill::Agility => "Agility",
            Skill::Astrology => "Astrology",
            Skill::Slayer => "Slayer",
            Skill::Runecrafting => "Runecrafting",
            Skill::Smithing => "Smithing",
            Skill::Fletching => "Fletching",
            Skill::Crafting => "Crafting",
            Skill::Herblore => "Herblore",
            Skill::Summoning => "Summoning",
            Skill::Attack => "Attack",
            Skill::Strength => "Strength",
            Skill::Defence => "Defence",
            Skill::Hitpoints => "Hitpoints",
            Skill::Ranged => "Ranged",
            Skill::Magic => "Magic",
            Skill::Prayer => "Prayer",
        }
    }
}

impl std::fmt::Display for Skill {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Secondary currencies. GP is tracked directly on the state and is not a
/// `Currency` variant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum Currency {
    SlayerCoins,
    RaidCoins,
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Currency::SlayerCoins => f.write_str("Slayer Coins"),
            Currency::RaidCoins => f.write_str("Raid Coins"),
        }
    }
}

/// Equipment slots an item can occupy.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum EquipSlot {
    Head,
    Body,
    Legs,
    Boots,
    Gloves,
    Weapon,
    Shield,
    Amulet,
    Ring,
    Cape,
}

/// The three independent cooking areas. The foreground area earns XP; the
/// other two tick passively at a fifth of the speed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum CookingArea {
    Fire,
    Furnace,
    Pot,
}

impl CookingArea {
    pub const ALL: [CookingArea; 3] = [CookingArea::Fire, CookingArea::Furnace, CookingArea::Pot];
}

/// Attack style chosen when starting combat; decides which combat skill the
/// kill XP lands in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "camelCase")]
pub enum AttackStyle {
    #[default]
    Accurate,
    Aggressive,
    Defensive,
}

impl AttackStyle {
    pub fn xp_skill(&self) -> Skill {
        match self {
            AttackStyle::Accurate => Skill::Attack,
            AttackStyle::Aggressive => Skill::Strength,
            AttackStyle::Defensive => Skill::Defence,
        }
    }
}
