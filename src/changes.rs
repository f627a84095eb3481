//! The mutation log a `StateUpdateBuilder` accumulates while the engine
//! runs. Callers read it to summarize what a batch of ticks produced without
//! diffing two full states.

use crate::enums::{Currency, Skill};
use crate::id::Id;
use crate::Tick;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn is_zero(v: &i64) -> bool {
    *v == 0
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Changes {
    /// Net inventory delta per item (consumed inputs are negative).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub inventory_changes: BTreeMap<Id, i64>,
    /// Skill XP gained per skill.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub skill_xp_changes: BTreeMap<Skill, i64>,
    /// Items that could not fit in a full inventory and were lost.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dropped_items: BTreeMap<Id, i64>,
    /// Secondary currencies gained.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub currencies_gained: BTreeMap<Currency, i64>,
    /// Net GP delta.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub gp_change: i64,
    /// Skills whose level moved: `(start_level, end_level)`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub skill_level_changes: BTreeMap<Skill, (u32, u32)>,
    /// Ticks actually consumed by the engine (may be less than requested on
    /// death or when a stop condition fires).
    #[serde(default, skip_serializing_if = "is_zero")]
    pub ticks_consumed: Tick,
}

impl Changes {
    pub fn is_empty(&self) -> bool {
        self.inventory_changes.is_empty()
            && self.skill_xp_changes.is_empty()
            && self.dropped_items.is_empty()
            && self.currencies_gained.is_empty()
            && self.gp_change == 0
            && self.skill_level_changes.is_empty()
            && self.ticks_consumed == 0
    }

    pub fn record_inventory(&mut self, item: &Id, delta: i64) {
        let entry = self.inventory_changes.entry(item.clone()).or_insert(0);
        *entry += delta;
        if *entry == 0 {
            self.inventory_changes.remove(item);
        }
    }

    pub fn record_dropped(&mut self, item: &Id, count: i64) {
        *self.dropped_items.entry(item.clone()).or_insert(0) += count;
    }

    pub fn record_skill_xp(&mut self, skill: Skill, xp: i64) {
        *self.skill_xp_changes.entry(skill).or_insert(0) += xp;
    }

    pub fn record_currency(&mut self, currency: Currency, amount: i64) {
        *self.currencies_gained.entry(currency).or_insert(0) += amount;
    }

    pub fn record_level_change(&mut self, skill: Skill, start: u32, end: u32) {
        self.skill_level_changes
            .entry(skill)
            .and_modify(|e| e.1 = end)
            .or_insert((start, end));
    }
}
