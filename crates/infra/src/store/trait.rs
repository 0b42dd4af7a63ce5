use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use stockroom_inventory::InventoryState;

/// Storage errors.
///
/// None of these are business rejections; they mean the state could not be
/// read or written at all.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to (de)serialize inventory document: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored data violates a ledger or collection invariant.
    #[error("stored inventory is corrupt: {0}")]
    Corrupt(String),
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Unit-of-work repository for the full inventory state.
///
/// `commit` must be all-or-nothing: after a failed commit, `load` returns the
/// previously committed state.
pub trait InventoryStore: Send + Sync {
    fn load(&self) -> Result<InventoryState, StoreError>;

    fn commit(&self, state: &InventoryState) -> Result<(), StoreError>;
}

impl<S> InventoryStore for Arc<S>
where
    S: InventoryStore + ?Sized,
{
    fn load(&self) -> Result<InventoryState, StoreError> {
        (**self).load()
    }

    fn commit(&self, state: &InventoryState) -> Result<(), StoreError> {
        (**self).commit(state)
    }
}
