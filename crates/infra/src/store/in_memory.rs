use std::sync::{PoisonError, RwLock};

use stockroom_inventory::InventoryState;

use super::r#trait::{InventoryStore, StoreError};

/// In-memory store for tests/dev. State is lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryInventoryStore {
    state: RwLock<InventoryState>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: InventoryState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }
}

impl InventoryStore for InMemoryInventoryStore {
    fn load(&self) -> Result<InventoryState, StoreError> {
        // Commits swap the whole value, so a poisoned lock still guards a consistent state.
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Ok(state.clone())
    }

    fn commit(&self, state: &InventoryState) -> Result<(), StoreError> {
        let mut slot = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *slot = state.clone();
        Ok(())
    }
}
