//! Process configuration read from the environment.
//!
//! | variable               | default        | meaning                                  |
//! |------------------------|----------------|------------------------------------------|
//! | `STOCKROOM_BIND_ADDR`  | `0.0.0.0:8080` | HTTP listen address                      |
//! | `STOCKROOM_DATA_DIR`   | unset          | directory holding `inventory.json`       |
//!
//! Without a data directory the service runs on an in-memory store and loses
//! its state on exit.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::store::{DOCUMENT_FILE_NAME, InMemoryInventoryStore, InventoryStore, JsonFileInventoryStore};

pub const BIND_ADDR_VAR: &str = "STOCKROOM_BIND_ADDR";
pub const DATA_DIR_VAR: &str = "STOCKROOM_DATA_DIR";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    InMemory,
    JsonFile { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub storage: StorageConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (used by tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_addr = lookup(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr
            .trim()
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                key: BIND_ADDR_VAR,
                reason: format!("{raw_addr:?}: {e}"),
            })?;

        let storage = match lookup(DATA_DIR_VAR) {
            Some(dir) if dir.trim().is_empty() => {
                return Err(ConfigError::Invalid {
                    key: DATA_DIR_VAR,
                    reason: "must not be empty when set".to_string(),
                });
            }
            Some(dir) => StorageConfig::JsonFile {
                path: PathBuf::from(dir.trim()).join(DOCUMENT_FILE_NAME),
            },
            None => StorageConfig::InMemory,
        };

        Ok(Self { bind_addr, storage })
    }

    /// Open the store selected by this config.
    pub fn open_store(&self) -> Arc<dyn InventoryStore> {
        match &self.storage {
            StorageConfig::InMemory => {
                tracing::warn!(
                    "{DATA_DIR_VAR} not set; using in-memory store (state is lost on exit)"
                );
                Arc::new(InMemoryInventoryStore::new())
            }
            StorageConfig::JsonFile { path } => {
                tracing::info!(path = %path.display(), "using json file store");
                Arc::new(JsonFileInventoryStore::new(path.clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_to_in_memory_on_port_8080() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.storage, StorageConfig::InMemory);
    }

    #[test]
    fn data_dir_selects_json_file_store() {
        let config = AppConfig::from_lookup(lookup(&[
            (BIND_ADDR_VAR, "127.0.0.1:9000"),
            (DATA_DIR_VAR, "/var/lib/stockroom"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(
            config.storage,
            StorageConfig::JsonFile {
                path: PathBuf::from("/var/lib/stockroom/inventory.json")
            }
        );
    }

    #[test]
    fn rejects_bad_bind_addr() {
        let err = AppConfig::from_lookup(lookup(&[(BIND_ADDR_VAR, "not-an-addr")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: BIND_ADDR_VAR, .. }));
    }

    #[test]
    fn rejects_blank_data_dir() {
        let err = AppConfig::from_lookup(lookup(&[(DATA_DIR_VAR, "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: DATA_DIR_VAR, .. }));
    }

    #[test]
    fn opened_json_store_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            bind_addr: DEFAULT_BIND_ADDR.parse().unwrap(),
            storage: StorageConfig::JsonFile {
                path: dir.path().join(DOCUMENT_FILE_NAME),
            },
        };

        let state = config.open_store().load().unwrap();
        assert!(state.products.is_empty());
    }
}
