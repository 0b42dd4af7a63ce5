//! `stockroom-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod table;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{ProductId, SequentialId, StockRecordId, TransferId, WarehouseId};
pub use table::{IdSequence, Table};
