//! Bank-style inventory: an ordered sequence of stacks with a fixed number
//! of slots. Stacks of the same item id always collapse into one slot; a new
//! item id needs a free slot or the add fails.

use crate::error::{SimError, SimResult};
use crate::id::Id;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CAPACITY: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: Id,
    pub count: i64,
}

impl ItemStack {
    pub fn new(item: Id, count: i64) -> Self {
        Self { item, count }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    slots: Vec<ItemStack>,
    capacity: usize,
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl Inventory {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn used_slots(&self) -> usize {
        self.slots.len()
    }

    pub fn free_slots(&self) -> usize {
        self.capacity - self.slots.len()
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() >= self.capacity
    }

    pub fn fill_fraction(&self) -> f64 {
        if self.capacity == 0 {
            return 1.0;
        }
        self.slots.len() as f64 / self.capacity as f64
    }

    pub fn stacks(&self) -> &[ItemStack] {
        &self.slots
    }

    /// Whether `n` of `item` could be added right now.
    pub fn can_add(&self, item: &Id) -> bool {
        self.slots.iter().any(|s| &s.item == item) || !self.is_full()
    }

    /// Add `n` of `item`. Stacks onto an existing slot if the item is
    /// present; otherwise claims a free slot. A zero add with the item
    /// absent reserves a slot.
    pub fn add(&mut self, item: &Id, n: i64) -> SimResult<()> {
        debug_assert!(n >= 0, "inventory counts are non-negative");
        if let Some(slot) = self.slots.iter_mut().find(|s| &s.item == item) {
            slot.count += n;
            return Ok(());
        }
        if self.is_full() {
            return Err(SimError::InventoryFull { item: item.clone() });
        }
        self.slots.push(ItemStack::new(item.clone(), n));
        Ok(())
    }

    /// Remove `n` of `item`. Removing the last unit clears the slot.
    pub fn remove(&mut self, item: &Id, n: i64) -> SimResult<()> {
        debug_assert!(n >= 0, "inventory counts are non-negative");
        let idx = self
            .slots
            .iter()
            .position(|s| &s.item == item)
            .ok_or_else(|| SimError::InvalidArgument(format!("{} not in inventory", item)))?;
        if self.slots[idx].count < n {
            return Err(SimError::InvalidArgument(format!(
                "cannot remove {} of {}: only {} held",
                n, item, self.slots[idx].count
            )));
        }
        self.slots[idx].count -= n;
        if self.slots[idx].count == 0 {
            self.slots.remove(idx);
        }
        Ok(())
    }

    pub fn count_of(&self, item: &Id) -> i64 {
        self.slots
            .iter()
            .find(|s| &s.item == item)
            .map(|s| s.count)
            .unwrap_or(0)
    }

    /// Count by qualified `"ns:local"` string.
    pub fn count_by_id(&self, qualified: &str) -> i64 {
        match Id::parse(qualified) {
            Ok(id) => self.count_of(&id),
            Err(_) => 0,
        }
    }

    pub fn contains(&self, item: &Id) -> bool {
        self.count_of(item) > 0
    }
}
