//! Stock records: one ledger row per (product, warehouse) pair.

use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, Entity, ProductId, StockRecordId, WarehouseId};

/// Quantity of one product held at one warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRecord {
    pub id: StockRecordId,
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
    pub quantity: u64,
}

impl StockRecord {
    pub fn pair(&self) -> (ProductId, WarehouseId) {
        (self.product_id, self.warehouse_id)
    }
}

impl Entity for StockRecord {
    type Id = StockRecordId;
    const KIND: &'static str = "stock record";

    fn id(&self) -> StockRecordId {
        self.id
    }
}

/// Input for opening a stock record directly (stock-in, manual correction).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockDraft {
    pub product_id: i64,
    pub warehouse_id: i64,
    pub quantity: i64,
}

/// Partial stock record update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockPatch {
    pub product_id: Option<i64>,
    pub warehouse_id: Option<i64>,
    pub quantity: Option<i64>,
}

/// Validated stock record fields.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StockLine {
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
    pub quantity: u64,
}

impl StockDraft {
    pub fn validate(self) -> DomainResult<StockLine> {
        Ok(StockLine {
            product_id: ProductId::try_from(self.product_id)?,
            warehouse_id: WarehouseId::try_from(self.warehouse_id)?,
            quantity: non_negative(self.quantity)?,
        })
    }
}

impl StockPatch {
    pub fn apply_to(self, current: &StockRecord) -> DomainResult<StockLine> {
        Ok(StockLine {
            product_id: match self.product_id {
                Some(raw) => ProductId::try_from(raw)?,
                None => current.product_id,
            },
            warehouse_id: match self.warehouse_id {
                Some(raw) => WarehouseId::try_from(raw)?,
                None => current.warehouse_id,
            },
            quantity: match self.quantity {
                Some(raw) => non_negative(raw)?,
                None => current.quantity,
            },
        })
    }
}

fn non_negative(quantity: i64) -> DomainResult<u64> {
    u64::try_from(quantity).map_err(|_| DomainError::validation("quantity must be >= 0"))
}
