//! File-backed store: the whole inventory as one JSON document.
//!
//! Commits write a temp file next to the target, fsync it, then rename it over
//! the document, so readers only ever see a complete commit.

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use stockroom_inventory::InventoryState;

use super::document::InventoryDocument;
use super::r#trait::{InventoryStore, StoreError};

pub const DOCUMENT_FILE_NAME: &str = "inventory.json";

#[derive(Debug, Clone)]
pub struct JsonFileInventoryStore {
    path: PathBuf,
}

impl JsonFileInventoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<dir>/inventory.json`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(DOCUMENT_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_atomic(&self, bytes: &[u8]) -> Result<(), StoreError> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).map_err(|e| StoreError::io(&parent, e))?;

        let file_name = self
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or(DOCUMENT_FILE_NAME);
        let tmp = parent.join(format!(".{file_name}.tmp.{}", std::process::id()));
        {
            let mut f = fs::File::create(&tmp).map_err(|e| StoreError::io(&tmp, e))?;
            f.write_all(bytes).map_err(|e| StoreError::io(&tmp, e))?;
            f.sync_all().map_err(|e| StoreError::io(&tmp, e))?;
        }
        fs::rename(&tmp, &self.path).map_err(|e| StoreError::io(&self.path, e))?;
        if let Ok(dir) = fs::File::open(&parent) {
            let _ = dir.sync_all();
        }
        Ok(())
    }
}

impl InventoryStore for JsonFileInventoryStore {
    fn load(&self) -> Result<InventoryState, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no inventory document yet; starting empty");
                return Ok(InventoryState::new());
            }
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };
        let doc: InventoryDocument = serde_json::from_str(&raw)?;
        InventoryState::try_from(doc)
    }

    fn commit(&self, state: &InventoryState) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(&InventoryDocument::from(state))?;
        self.write_atomic(&bytes)
    }
}
