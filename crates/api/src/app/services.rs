//! Service wiring shared by all handlers.

use std::sync::Arc;

use stockroom_infra::{
    InventoryService,
    store::{InMemoryInventoryStore, InventoryStore},
};

/// Handles shared by every request.
pub struct AppServices {
    pub inventory: InventoryService<Arc<dyn InventoryStore>>,
}

impl AppServices {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self {
            inventory: InventoryService::new(store),
        }
    }

    /// Services backed by a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryInventoryStore::new()))
    }
}
