//! Inventory domain module.
//!
//! This crate contains business rules for inventory, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage): the catalog of
//! products and warehouses, the stock ledger, the transfer engine, and stock
//! health classification.

pub mod catalog;
pub mod health;
pub mod ledger;
pub mod state;
pub mod stock;
pub mod transfer;

pub use catalog::{Product, ProductDraft, ProductPatch, Warehouse, WarehouseDraft, WarehousePatch};
pub use health::{InventoryOverview, OverviewRow, StockHealth, StockHealthReport, StockHealthRow};
pub use ledger::{DebitOutcome, LedgerError, StockLedger};
pub use state::InventoryState;
pub use stock::{StockDraft, StockLine, StockPatch, StockRecord};
pub use transfer::{Transfer, TransferEngine, TransferError, TransferRequest};
