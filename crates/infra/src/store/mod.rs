//! Inventory persistence boundary.
//!
//! Stores load and commit the whole [`InventoryState`] as one unit of work, so a
//! transfer's debit, credit and transfer record always land together.
//!
//! [`InventoryState`]: stockroom_inventory::InventoryState

pub mod document;
pub mod in_memory;
pub mod json_file;
pub mod r#trait;

pub use document::InventoryDocument;
pub use in_memory::InMemoryInventoryStore;
pub use json_file::{DOCUMENT_FILE_NAME, JsonFileInventoryStore};
pub use r#trait::{InventoryStore, StoreError};
