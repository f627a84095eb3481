//! `StateUpdateBuilder`: the single mutable owner of a working state copy.
//!
//! Builders are short-lived. Engine passes, subsystem handlers, and user
//! operations all mutate the working copy through the builder so every
//! reward and cost lands in the `Changes` log exactly once; `build` then
//! emits the final immutable state plus the log.

use crate::changes::Changes;
use crate::enums::{Currency, Skill};
use crate::error::{SimError, SimResult};
use crate::id::Id;
use crate::state::GlobalState;
use crate::xp;

#[derive(Debug, Clone)]
pub struct StateUpdateBuilder {
    state: GlobalState,
    changes: Changes,
}

impl StateUpdateBuilder {
    pub fn new(state: GlobalState) -> Self {
        Self {
            state,
            changes: Changes::default(),
        }
    }

    pub fn state(&self) -> &GlobalState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GlobalState {
        &mut self.state
    }

    pub fn changes(&self) -> &Changes {
        &self.changes
    }

    pub fn changes_mut(&mut self) -> &mut Changes {
        &mut self.changes
    }

    pub fn build(self) -> (GlobalState, Changes) {
        (self.state, self.changes)
    }

    // -- Inventory ---------------------------------------------------------

    /// Add items, failing with `InventoryFull` if a fresh slot is needed and
    /// none is free.
    pub fn add_item(&mut self, item: &Id, count: i64) -> SimResult<()> {
        self.state.inventory.add(item, count)?;
        self.changes.record_inventory(item, count);
        Ok(())
    }

    /// Add items if they fit; route them to `dropped_items` otherwise.
    /// Returns whether the items were stored.
    pub fn add_item_or_drop(&mut self, item: &Id, count: i64) -> bool {
        match self.state.inventory.add(item, count) {
            Ok(()) => {
                self.changes.record_inventory(item, count);
                true
            }
            Err(_) => {
                self.changes.record_dropped(item, count);
                false
            }
        }
    }

    pub fn remove_item(&mut self, item: &Id, count: i64) -> SimResult<()> {
        self.state.inventory.remove(item, count)?;
        self.changes.record_inventory(item, -count);
        Ok(())
    }

    // -- Progression -------------------------------------------------------

    /// Grant final (already modifier-scaled) skill XP and track any level
    /// change it caused.
    pub fn add_skill_xp(&mut self, skill: Skill, amount: i64) {
        if amount <= 0 {
            return;
        }
        let before = self.state.skill_level(skill);
        self.state.skill_states.entry(skill).or_default().xp += amount;
        self.changes.record_skill_xp(skill, amount);
        let after = self.state.skill_level(skill);
        if after != before {
            self.changes.record_level_change(skill, before, after);
        }
    }

    /// Grant mastery XP to an action; a fraction feeds the skill's pool,
    /// saturating at the pool cap.
    pub fn add_mastery_xp(&mut self, skill: Skill, action: &Id, amount: i64) {
        if amount <= 0 {
            return;
        }
        self.state
            .action_states
            .entry(action.clone())
            .or_default()
            .mastery_xp += amount;
        let pool_feed = (amount as f64 * xp::POOL_FEED_FRACTION).round() as i64;
        self.add_mastery_pool_xp(skill, pool_feed);
    }

    /// Add directly to a skill's mastery pool, clamped to the cap.
    pub fn add_mastery_pool_xp(&mut self, skill: Skill, amount: i64) {
        if amount <= 0 {
            return;
        }
        let cap = self.state.max_mastery_pool_xp(skill);
        let entry = self.state.skill_states.entry(skill).or_default();
        entry.mastery_pool_xp = (entry.mastery_pool_xp + amount).min(cap);
    }

    // -- Money -------------------------------------------------------------

    pub fn add_gp(&mut self, amount: i64) {
        self.state.gp += amount;
        self.changes.gp_change += amount;
    }

    pub fn spend_gp(&mut self, amount: i64) -> SimResult<()> {
        if self.state.gp < amount {
            return Err(SimError::InsufficientGp {
                needed: amount,
                available: self.state.gp,
            });
        }
        self.state.gp -= amount;
        self.changes.gp_change -= amount;
        Ok(())
    }

    pub fn add_currency(&mut self, currency: Currency, amount: i64) {
        *self.state.currencies.entry(currency).or_insert(0) += amount;
        self.changes.record_currency(currency, amount);
    }

    pub fn spend_currency(&mut self, currency: Currency, amount: i64) -> SimResult<()> {
        let available = self.state.currency(currency);
        if available < amount {
            return Err(SimError::InsufficientCurrency {
                currency,
                needed: amount,
                available,
            });
        }
        *self.state.currencies.entry(currency).or_insert(0) -= amount;
        self.changes.record_currency(currency, -amount);
        Ok(())
    }

    // -- Health & activity -------------------------------------------------

    /// Apply damage to the player. Returns true if the player died.
    pub fn apply_damage(&mut self, amount: i64) -> bool {
        self.state.health.lost_hp += amount;
        self.state.current_hp() == 0
    }

    pub fn restore_full_hp(&mut self) {
        self.state.health.lost_hp = 0;
    }

    /// Drop the foreground activity. Switching away from cooking wipes all
    /// passive area progress (assigned recipes survive).
    pub fn clear_activity(&mut self, reason: &str) {
        if let Some(activity) = self.state.active_activity.take() {
            log::debug!("clearing activity ({:?}): {}", activity.action_id(), reason);
            if let crate::state::ActiveActivity::Skill(skill_activity) = &activity {
                if skill_activity.skill == Skill::Cooking {
                    self.state.cooking.clear_all_progress();
                }
            }
        }
    }
}
