// Shared fixtures; not every suite uses every helper.
#![allow(dead_code)]

use idlesim::{GlobalState, Registries, StateUpdateBuilder};
use std::sync::Arc;

/// Fresh empty state over the demo registry bundle.
pub fn demo_state() -> GlobalState {
    GlobalState::empty(Arc::new(Registries::demo()))
}

pub fn demo_builder() -> StateUpdateBuilder {
    StateUpdateBuilder::new(demo_state())
}

pub fn id(local: &str) -> idlesim::Id {
    idlesim::Id::new("demo", local)
}

/// Fill every free inventory slot with distinct junk items so the next new
/// item type cannot be stored.
pub fn fill_inventory(b: &mut StateUpdateBuilder) {
    let free = b.state().inventory.free_slots();
    for i in 0..free {
        let filler = idlesim::Id::new("demo", format!("filler_{}", i));
        b.state_mut()
            .inventory
            .add(&filler, 1)
            .expect("filler should fit");
    }
}
