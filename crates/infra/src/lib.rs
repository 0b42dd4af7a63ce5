//! Infrastructure layer: storage adapters, operation pipeline, configuration.

pub mod config;
pub mod service;
pub mod store;

pub use config::{AppConfig, ConfigError, StorageConfig};
pub use service::{InventoryService, ServiceError, ServiceResult};
