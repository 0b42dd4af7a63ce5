//! On-disk layout: one JSON document holding every collection.

use serde::{Deserialize, Serialize};

use stockroom_core::{IdSequence, Table};
use stockroom_inventory::{InventoryState, Product, StockLedger, StockRecord, Transfer, Warehouse};

use super::r#trait::StoreError;

/// Next id per collection. Missing entries are rebuilt from the stored ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sequences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub products: Option<IdSequence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warehouses: Option<IdSequence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<IdSequence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfers: Option<IdSequence>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryDocument {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub warehouses: Vec<Warehouse>,
    #[serde(default)]
    pub stock: Vec<StockRecord>,
    #[serde(default)]
    pub transfers: Vec<Transfer>,
    #[serde(default)]
    pub sequences: Sequences,
}

impl From<&InventoryState> for InventoryDocument {
    fn from(state: &InventoryState) -> Self {
        Self {
            products: state.products.to_vec(),
            warehouses: state.warehouses.to_vec(),
            stock: state.ledger.records().cloned().collect(),
            transfers: state.transfers.to_vec(),
            sequences: Sequences {
                products: Some(state.products.sequence()),
                warehouses: Some(state.warehouses.sequence()),
                stock: Some(state.ledger.sequence()),
                transfers: Some(state.transfers.sequence()),
            },
        }
    }
}

impl TryFrom<InventoryDocument> for InventoryState {
    type Error = StoreError;

    fn try_from(doc: InventoryDocument) -> Result<Self, Self::Error> {
        let corrupt = |e: stockroom_core::DomainError| StoreError::Corrupt(e.to_string());
        Ok(InventoryState {
            products: Table::from_rows(doc.products, doc.sequences.products).map_err(corrupt)?,
            warehouses: Table::from_rows(doc.warehouses, doc.sequences.warehouses)
                .map_err(corrupt)?,
            ledger: StockLedger::from_records(doc.stock, doc.sequences.stock).map_err(corrupt)?,
            transfers: Table::from_rows(doc.transfers, doc.sequences.transfers)
                .map_err(corrupt)?,
        })
    }
}
