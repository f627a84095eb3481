//! Combat: two interleaved countdowns. The player swing is the foreground
//! completion; the monster swing and respawn timer are background events.

use super::{scaled_skill_xp, CompletionOutcome};
use crate::builder::StateUpdateBuilder;
use crate::enums::Skill;
use crate::modifier::{resolve_modifiers, ModifierAnchor, ResolvedModifiers};
use crate::rng::SimRng;
use crate::rollers;
use crate::state::{ActiveActivity, CombatActivity};
use crate::Tick;

pub const PLAYER_ATTACK_INTERVAL_TICKS: Tick = 24;
pub const MONSTER_SPAWN_TICKS: Tick = 30;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerStats {
    pub accuracy: f64,
    pub evasion: f64,
    pub max_hit: i64,
}

/// Combat ratings derived from levels plus flat equipment bonuses.
pub fn player_stats(state: &crate::state::GlobalState, modifiers: &ResolvedModifiers) -> PlayerStats {
    PlayerStats {
        accuracy: 10.0 + state.skill_level(Skill::Attack) as f64 + modifiers.flat_accuracy(),
        evasion: 10.0 + state.skill_level(Skill::Defence) as f64 + modifiers.flat_evasion(),
        max_hit: 1
            + state.skill_level(Skill::Strength) as i64 / 5
            + modifiers.flat_max_hit() as i64,
    }
}

fn current_combat(b: &StateUpdateBuilder) -> Option<CombatActivity> {
    match &b.state().active_activity {
        Some(ActiveActivity::Combat(combat)) => Some(combat.clone()),
        _ => None,
    }
}

fn store_combat(b: &mut StateUpdateBuilder, combat: CombatActivity) {
    b.state_mut().active_activity = Some(ActiveActivity::Combat(combat));
}

/// The player's swing: the foreground completion of a combat activity.
pub fn player_swing(b: &mut StateUpdateBuilder, rng: &mut SimRng) -> CompletionOutcome {
    let Some(mut combat) = current_combat(b) else {
        return CompletionOutcome::Cleared;
    };
    if combat.progress.spawn_ticks_remaining.is_some() {
        // Nothing to hit yet; the swing timer restarts once the foe spawns.
        return CompletionOutcome::Continue;
    }
    let monster_id = combat.context.current_monster_id().clone();
    let Some(monster) = b.state().registries().monster(&monster_id).cloned() else {
        return CompletionOutcome::Cleared;
    };

    let anchor = ModifierAnchor::for_skill(combat.style.xp_skill());
    let modifiers = resolve_modifiers(b.state(), &anchor);
    let stats = player_stats(b.state(), &modifiers);

    if rollers::roll_hit(rng, stats.accuracy, monster.evasion) {
        let damage = rollers::roll_damage(rng, stats.max_hit).min(combat.progress.monster_hp);
        combat.progress.monster_hp -= damage;
    }
    combat.progress.player_attack_ticks_remaining = PLAYER_ATTACK_INTERVAL_TICKS;
    combat.progress_ticks = 0;
    combat.total_ticks = PLAYER_ATTACK_INTERVAL_TICKS;

    if combat.progress.monster_hp <= 0 {
        // Kill rewards: style XP, a third to Hitpoints, drops, slayer credit.
        b.add_skill_xp(
            combat.style.xp_skill(),
            scaled_skill_xp(monster.xp, &modifiers),
        );
        b.add_skill_xp(Skill::Hitpoints, (monster.xp / 3).max(1));
        super::slayer::on_monster_kill(b, &monster_id);
        if let Some(drops) = &monster.drops {
            let mut rolled = Vec::new();
            drops.roll(rng, &mut rolled);
            for (item, qty) in rolled {
                b.add_item_or_drop(&item, qty);
            }
        }
        combat.context.advance();
        combat.progress.spawn_ticks_remaining = Some(MONSTER_SPAWN_TICKS);
    }

    store_combat(b, combat);
    CompletionOutcome::Continue
}

/// The monster's swing, fired as a background event. Returns true if the
/// player died.
pub fn monster_swing(b: &mut StateUpdateBuilder, rng: &mut SimRng) -> bool {
    let Some(mut combat) = current_combat(b) else {
        return false;
    };
    if combat.progress.spawn_ticks_remaining.is_some() {
        return false;
    }
    let monster_id = combat.context.current_monster_id().clone();
    let Some(monster) = b.state().registries().monster(&monster_id).cloned() else {
        return false;
    };

    let anchor = ModifierAnchor::for_skill(combat.style.xp_skill());
    let modifiers = resolve_modifiers(b.state(), &anchor);
    let stats = player_stats(b.state(), &modifiers);

    let mut died = false;
    if rollers::roll_hit(rng, monster.accuracy, stats.evasion) {
        let damage = rollers::roll_damage(rng, monster.max_hit);
        died = b.apply_damage(damage);
    }
    combat.progress.monster_attack_ticks_remaining = monster.attack_interval_ticks;
    store_combat(b, combat);
    died
}

/// Bring the next monster in: full HP, both countdowns reset.
pub fn spawn_monster(b: &mut StateUpdateBuilder) {
    let Some(mut combat) = current_combat(b) else {
        return;
    };
    let monster_id = combat.context.current_monster_id().clone();
    let Some(monster) = b.state().registries().monster(&monster_id).cloned() else {
        return;
    };
    combat.progress.monster_hp = monster.hp;
    combat.progress.monster_attack_ticks_remaining = monster.attack_interval_ticks;
    combat.progress.player_attack_ticks_remaining = PLAYER_ATTACK_INTERVAL_TICKS;
    combat.progress.spawn_ticks_remaining = None;
    combat.progress_ticks = 0;
    combat.total_ticks = PLAYER_ATTACK_INTERVAL_TICKS;
    store_combat(b, combat);
}
