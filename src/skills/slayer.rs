//! Slayer: the task is a standalone entity that persists independently of
//! the current combat activity. Kills of the task monster advance it; the
//! final kill pays out and clears the task while combat continues.

use crate::builder::StateUpdateBuilder;
use crate::enums::Skill;
use crate::error::{SimError, SimResult};
use crate::id::Id;
use crate::rng::SimRng;
use crate::state::SlayerTask;

/// Credit a monster kill against the active task, if it matches.
pub fn on_monster_kill(b: &mut StateUpdateBuilder, monster_id: &Id) {
    let Some(mut task) = b.state().slayer_task.clone() else {
        return;
    };
    if &task.monster != monster_id {
        return;
    }
    task.kills_completed += 1;
    if task.kills_completed < task.kills_required {
        b.state_mut().slayer_task = Some(task);
        return;
    }

    // Task complete: pay out and clear. Combat keeps running.
    if let Some(category) = b.state().registries().slayer_category(&task.category).cloned() {
        b.add_skill_xp(Skill::Slayer, category.xp_reward);
        b.add_currency(category.currency_reward.0, category.currency_reward.1);
    }
    log::info!(
        "slayer task complete: {} x{}",
        task.monster,
        task.kills_required
    );
    *b.state_mut()
        .slayer_task_completions
        .entry(task.category.clone())
        .or_insert(0) += 1;
    b.state_mut().slayer_task = None;
}

/// Roll a new task from a category, paying the roll cost. Replaces any
/// existing task.
pub fn start_task(b: &mut StateUpdateBuilder, category_id: &Id, rng: &mut SimRng) -> SimResult<()> {
    let category = b
        .state()
        .registries()
        .slayer_category(category_id)
        .cloned()
        .ok_or_else(|| {
            SimError::InvalidArgument(format!("unknown slayer category {}", category_id))
        })?;
    if category.monsters.is_empty() {
        return Err(SimError::InvalidArgument(format!(
            "slayer category {} has no monsters",
            category_id
        )));
    }
    if category.roll_cost_gp > 0 {
        b.spend_gp(category.roll_cost_gp)?;
    }
    let monster = category.monsters[rng.next_int(category.monsters.len() as i64) as usize].clone();
    let kills_required = rng.uniform_int(category.kills_min, category.kills_max);
    b.state_mut().slayer_task = Some(SlayerTask {
        category: category_id.clone(),
        monster,
        kills_required,
        kills_completed: 0,
    });
    Ok(())
}
