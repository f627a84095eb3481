//! The tick engine: advances a working state through discrete 100 ms ticks,
//! driving one foreground activity and every background subsystem in
//! parallel by stepping to the next event breakpoint and advancing all
//! timers by that interval at once.
//!
//! Ordering within a breakpoint is fixed: stun, buffs, mining regen, mining
//! respawn, crop growth, passive cooking, combat spawn/monster swing, then
//! the foreground completion last. If a background event and the foreground
//! completion land on the same tick, the background event is observed first.

use crate::builder::StateUpdateBuilder;
use crate::enums::{CookingArea, Skill};
use crate::id::Id;
use crate::rng::SimRng;
use crate::skills::{self, cooking, combat, CompletionOutcome};
use crate::state::{ActiveActivity, GlobalState};
use crate::{Tick, TICK_MS};

/// Damaged mining nodes heal 1 HP each time this interval elapses.
pub const MINING_REGEN_INTERVAL_TICKS: Tick = 100;

/// Advance the builder's state by up to `ticks`. Returns early only when the
/// player dies or there is nothing at all to advance.
pub fn consume_ticks(b: &mut StateUpdateBuilder, ticks: Tick, rng: &mut SimRng) {
    consume_ticks_until(b, rng, |_| false, ticks);
}

/// Condition-guarded variant: the stop condition is evaluated after every
/// breakpoint, and the function returns as soon as it is true. Returns the
/// number of ticks actually consumed.
pub fn consume_ticks_until<F>(
    b: &mut StateUpdateBuilder,
    rng: &mut SimRng,
    mut stop_condition: F,
    max_ticks: Tick,
) -> Tick
where
    F: FnMut(&GlobalState) -> bool,
{
    let mut consumed: Tick = 0;
    while consumed < max_ticks {
        let remaining = max_ticks - consumed;
        let Some(dt) = next_breakpoint(b.state(), remaining) else {
            break;
        };

        let halt = advance_breakpoint(b, dt, rng);

        consumed += dt;
        b.state_mut().total_ticks_elapsed += dt;
        b.state_mut().updated_at += dt * TICK_MS;
        b.changes_mut().ticks_consumed += dt;

        if halt || stop_condition(b.state()) {
            break;
        }
    }
    consumed
}

/// The minimum of every pending timer, bounded by the remaining budget.
/// `None` means there is no foreground activity and no background timer:
/// the engine has nothing to do.
fn next_breakpoint(state: &GlobalState, remaining: Tick) -> Option<Tick> {
    let mut next: Option<Tick> = None;
    let mut consider = |ticks: Tick| {
        let ticks = ticks.max(1);
        next = Some(match next {
            Some(current) => current.min(ticks),
            None => ticks,
        });
    };

    if state.stunned.is_stunned() {
        consider(state.stunned.ticks_remaining);
    }

    for buff in &state.active_buffs {
        if let Some(t) = buff.remaining_ticks {
            consider(t);
        }
    }

    for action_state in state.action_states.values() {
        if let Some(node) = &action_state.mining {
            if let Some(t) = node.respawn_ticks_remaining {
                consider(t);
            } else if node.hp_lost > 0 {
                consider(node.regen_ticks_remaining);
            }
        }
    }

    for plot in &state.farming.plots {
        if let Some(t) = plot.growth_ticks_remaining {
            consider(t);
        }
    }

    match &state.active_activity {
        Some(ActiveActivity::Skill(activity)) => {
            if !state.stunned.is_stunned() {
                consider(activity.total_ticks - activity.progress_ticks);
            }
            if activity.skill == Skill::Cooking {
                let active_area = state
                    .registries()
                    .action(&activity.action)
                    .and_then(|def| def.cooking_area);
                for area in CookingArea::ALL {
                    if Some(area) == active_area {
                        continue;
                    }
                    if let Some(t) = cooking::passive_ticks_remaining(state, area) {
                        consider(t);
                    }
                }
            }
        }
        Some(ActiveActivity::Combat(activity)) => {
            if let Some(t) = activity.progress.spawn_ticks_remaining {
                consider(t);
            } else {
                consider(activity.progress.monster_attack_ticks_remaining);
                if !state.stunned.is_stunned() {
                    consider(activity.progress.player_attack_ticks_remaining);
                }
            }
        }
        None => {}
    }

    next.map(|t| t.min(remaining))
}

/// Advance every subsystem by `dt` and fire whatever landed on this
/// breakpoint, in the fixed order. Returns true if the engine must halt
/// (player death).
fn advance_breakpoint(b: &mut StateUpdateBuilder, dt: Tick, rng: &mut SimRng) -> bool {
    // 1. Stun, before deciding whether the foreground may progress.
    let was_stunned = b.state().stunned.is_stunned();
    if was_stunned {
        let stun = &mut b.state_mut().stunned;
        stun.ticks_remaining = (stun.ticks_remaining - dt).max(0);
    }

    // 2. Conditional buffs expire.
    for buff in &mut b.state_mut().active_buffs {
        if let Some(t) = &mut buff.remaining_ticks {
            *t -= dt;
        }
    }
    b.state_mut()
        .active_buffs
        .retain(|buff| buff.remaining_ticks.map_or(true, |t| t > 0));

    // 3 & 4. Mining node regen, then respawn.
    advance_mining_nodes(b, dt);

    // 5. Crop growth.
    for plot in &mut b.state_mut().farming.plots {
        if let Some(t) = &mut plot.growth_ticks_remaining {
            *t -= dt;
            if *t <= 0 {
                plot.growth_ticks_remaining = None;
            }
        }
    }

    // 6. Passive cooking areas (only while cooking is the foreground).
    advance_passive_cooking(b, dt);

    // 7. Combat background: respawn timer, then the monster's swing. A
    // swing timer must not advance across the breakpoint that spawned the
    // monster, so the pending flag is read before the spawn fires.
    let spawn_was_pending = matches!(
        &b.state().active_activity,
        Some(ActiveActivity::Combat(c)) if c.progress.spawn_ticks_remaining.is_some()
    );
    if advance_combat_background(b, dt, rng) {
        handle_death(b);
        return true;
    }

    // 8. Foreground completion fires last.
    advance_foreground(b, dt, rng, was_stunned, spawn_was_pending)
}

fn advance_mining_nodes(b: &mut StateUpdateBuilder, dt: Tick) {
    let mining_ids: Vec<Id> = b
        .state()
        .action_states
        .iter()
        .filter(|(_, s)| s.mining.is_some())
        .map(|(id, _)| id.clone())
        .collect();
    for id in mining_ids {
        let Some(action_state) = b.state_mut().action_states.get_mut(&id) else {
            continue;
        };
        let Some(node) = &mut action_state.mining else {
            continue;
        };
        if let Some(t) = &mut node.respawn_ticks_remaining {
            *t -= dt;
            if *t <= 0 {
                node.respawn_ticks_remaining = None;
                node.hp_lost = 0;
                node.regen_ticks_remaining = MINING_REGEN_INTERVAL_TICKS;
            }
        } else if node.hp_lost > 0 {
            node.regen_ticks_remaining -= dt;
            if node.regen_ticks_remaining <= 0 {
                node.hp_lost -= 1;
                node.regen_ticks_remaining = MINING_REGEN_INTERVAL_TICKS;
            }
        }
    }
}

fn advance_passive_cooking(b: &mut StateUpdateBuilder, dt: Tick) {
    let Some(ActiveActivity::Skill(activity)) = &b.state().active_activity else {
        return;
    };
    if activity.skill != Skill::Cooking {
        return;
    }
    let active_area = b
        .state()
        .registries()
        .action(&activity.action)
        .and_then(|def| def.cooking_area);

    for area in CookingArea::ALL {
        if Some(area) == active_area {
            continue;
        }
        let Some(recipe) = b.state().cooking.area(area).recipe.clone() else {
            continue;
        };
        let Some(def) = b.state().registries().action(&recipe).cloned() else {
            continue;
        };
        if !cooking::can_run(b.state(), &recipe) {
            continue;
        }
        let target = def.base_ticks * cooking::PASSIVE_FACTOR;
        let area_state = b.state_mut().cooking.area_mut(area);
        area_state.progress_ticks += dt;
        if area_state.progress_ticks >= target {
            area_state.progress_ticks = 0;
            cooking::complete_passive(b, area);
        }
    }
}

/// Returns true if the player died to a monster swing.
fn advance_combat_background(b: &mut StateUpdateBuilder, dt: Tick, rng: &mut SimRng) -> bool {
    let (spawn, monster_timer) = match &b.state().active_activity {
        Some(ActiveActivity::Combat(activity)) => (
            activity.progress.spawn_ticks_remaining,
            activity.progress.monster_attack_ticks_remaining,
        ),
        _ => return false,
    };

    if let Some(spawn) = spawn {
        let remaining = spawn - dt;
        if remaining <= 0 {
            combat::spawn_monster(b);
        } else if let Some(ActiveActivity::Combat(activity)) = &mut b.state_mut().active_activity {
            activity.progress.spawn_ticks_remaining = Some(remaining);
        }
        return false;
    }

    let monster_timer = monster_timer - dt;
    if monster_timer <= 0 {
        // monster_swing resets the timer itself.
        combat::monster_swing(b, rng)
    } else {
        if let Some(ActiveActivity::Combat(activity)) = &mut b.state_mut().active_activity {
            activity.progress.monster_attack_ticks_remaining = monster_timer;
        }
        false
    }
}

/// Advance the foreground countdown and fire its completion. Returns true
/// if the engine must halt.
fn advance_foreground(
    b: &mut StateUpdateBuilder,
    dt: Tick,
    rng: &mut SimRng,
    was_stunned: bool,
    spawn_was_pending: bool,
) -> bool {
    match b.state().active_activity.clone() {
        Some(ActiveActivity::Skill(mut activity)) => {
            if was_stunned {
                return false;
            }
            activity.progress_ticks += dt;
            if activity.progress_ticks < activity.total_ticks {
                if let Some(ActiveActivity::Skill(stored)) = &mut b.state_mut().active_activity {
                    stored.progress_ticks = activity.progress_ticks;
                }
                return false;
            }

            // Completion: rewards fire atomically, progress wraps to 0.
            let outcome = skills::complete_action(b, activity.skill, &activity.action, rng);
            if let Some(ActiveActivity::Skill(stored)) = &mut b.state_mut().active_activity {
                stored.progress_ticks = 0;
            }
            match outcome {
                CompletionOutcome::Died => {
                    handle_death(b);
                    true
                }
                CompletionOutcome::Cleared => {
                    b.clear_activity("cannot continue");
                    false
                }
                CompletionOutcome::Continue => {
                    // The next iteration needs its inputs up front.
                    if !can_start_next_iteration(b.state(), activity.skill, &activity.action) {
                        b.clear_activity("inputs depleted");
                    }
                    false
                }
            }
        }
        Some(ActiveActivity::Combat(activity)) => {
            if was_stunned || spawn_was_pending || activity.progress.spawn_ticks_remaining.is_some()
            {
                return false;
            }
            let player_timer = activity.progress.player_attack_ticks_remaining - dt;
            if player_timer > 0 {
                if let Some(ActiveActivity::Combat(stored)) = &mut b.state_mut().active_activity {
                    stored.progress.player_attack_ticks_remaining = player_timer;
                    stored.progress_ticks = stored.total_ticks - player_timer;
                }
                return false;
            }
            // player_swing resets the swing timer itself.
            matches!(combat::player_swing(b, rng), CompletionOutcome::Died)
        }
        None => false,
    }
}

fn can_start_next_iteration(state: &GlobalState, skill: Skill, action: &Id) -> bool {
    match skill {
        Skill::Cooking => cooking::can_run(state, action),
        Skill::Agility | Skill::Astrology | Skill::Thieving => true,
        _ => crate::skills::gathering::can_run(state, action),
    }
}

/// Death: clear the foreground, restore HP to full. Not a user-visible
/// error; the engine just stops the current batch.
fn handle_death(b: &mut StateUpdateBuilder) {
    log::debug!("player died; clearing activity and restoring HP");
    b.restore_full_hp();
    b.clear_activity("player died");
}
