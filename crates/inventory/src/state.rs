//! The full inventory state: catalog, ledger and transfer log together.
//!
//! This is the unit the storage layer loads and commits. Every mutation here
//! either succeeds completely or leaves `self` untouched.

use chrono::{DateTime, Utc};

use stockroom_core::{DomainError, DomainResult, ProductId, StockRecordId, Table, WarehouseId};

use crate::catalog::{Product, ProductDraft, ProductPatch, Warehouse, WarehouseDraft, WarehousePatch};
use crate::health::{InventoryOverview, OverviewRow, StockHealthReport, StockHealthRow};
use crate::ledger::StockLedger;
use crate::stock::{StockDraft, StockPatch, StockRecord};
use crate::transfer::{Transfer, TransferEngine};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct InventoryState {
    pub products: Table<Product>,
    pub warehouses: Table<Warehouse>,
    pub ledger: StockLedger,
    pub transfers: Table<Transfer>,
}

impl InventoryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transfer_engine(&mut self) -> TransferEngine<'_> {
        TransferEngine::new(&mut self.ledger, &mut self.transfers)
    }

    pub fn create_product(&mut self, draft: ProductDraft) -> DomainResult<Product> {
        let valid = draft.validate()?;
        Ok(self.products.insert_new(|id| valid.with_id(id))?.clone())
    }

    pub fn update_product(&mut self, id: ProductId, patch: ProductPatch) -> DomainResult<Product> {
        let updated = patch.apply_to(self.products.require(id)?)?;
        self.products.replace(updated.clone())?;
        Ok(updated)
    }

    pub fn delete_product(&mut self, id: ProductId) -> DomainResult<Product> {
        self.products
            .remove(id)
            .ok_or_else(|| DomainError::not_found(format!("product {id}")))
    }

    pub fn create_warehouse(&mut self, draft: WarehouseDraft) -> DomainResult<Warehouse> {
        let valid = draft.validate()?;
        Ok(self.warehouses.insert_new(|id| valid.with_id(id))?.clone())
    }

    pub fn update_warehouse(
        &mut self,
        id: WarehouseId,
        patch: WarehousePatch,
    ) -> DomainResult<Warehouse> {
        let updated = patch.apply_to(self.warehouses.require(id)?)?;
        self.warehouses.replace(updated.clone())?;
        Ok(updated)
    }

    pub fn delete_warehouse(&mut self, id: WarehouseId) -> DomainResult<Warehouse> {
        self.warehouses
            .remove(id)
            .ok_or_else(|| DomainError::not_found(format!("warehouse {id}")))
    }

    pub fn create_stock(&mut self, draft: StockDraft) -> DomainResult<StockRecord> {
        self.ledger.insert_record(draft.validate()?)
    }

    pub fn update_stock(&mut self, id: StockRecordId, patch: StockPatch) -> DomainResult<StockRecord> {
        let line = patch.apply_to(self.ledger.require(id)?)?;
        self.ledger.update_record(id, line)
    }

    pub fn delete_stock(&mut self, id: StockRecordId) -> DomainResult<StockRecord> {
        self.ledger.remove_record(id)
    }

    pub fn overview(&self) -> InventoryOverview {
        let items = self
            .products
            .iter()
            .map(|product| {
                let total_quantity = self.ledger.total_quantity(product.id);
                OverviewRow {
                    product: product.clone(),
                    total_quantity,
                    is_low_stock: total_quantity < product.reorder_point,
                }
            })
            .collect();

        let total_value = self
            .ledger
            .records()
            .filter_map(|r| {
                self.products
                    .get(r.product_id)
                    .map(|p| p.unit_cost * r.quantity as f64)
            })
            .sum();

        InventoryOverview {
            product_count: self.products.len(),
            warehouse_count: self.warehouses.len(),
            total_value,
            items,
        }
    }

    pub fn stock_health(&self, generated_at: DateTime<Utc>) -> StockHealthReport {
        StockHealthReport {
            generated_at,
            rows: self
                .products
                .iter()
                .map(|p| StockHealthRow::for_product(p, self.ledger.total_quantity(p.id)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::StockHealth;
    use crate::transfer::TransferRequest;

    fn product(state: &mut InventoryState, sku: &str, reorder_point: i64, unit_cost: f64) -> Product {
        state
            .create_product(ProductDraft {
                sku: sku.to_string(),
                name: format!("{sku} name"),
                category: "General".to_string(),
                unit_cost,
                reorder_point,
            })
            .unwrap()
    }

    fn warehouse(state: &mut InventoryState, code: &str) -> Warehouse {
        state
            .create_warehouse(WarehouseDraft {
                code: code.to_string(),
                name: format!("{code} warehouse"),
                location: "Somewhere".to_string(),
            })
            .unwrap()
    }

    fn stock(state: &mut InventoryState, p: &Product, w: &Warehouse, quantity: i64) -> StockRecord {
        state
            .create_stock(StockDraft {
                product_id: p.id.get() as i64,
                warehouse_id: w.id.get() as i64,
                quantity,
            })
            .unwrap()
    }

    #[test]
    fn overview_totals_and_value() {
        let mut state = InventoryState::new();
        let bolt = product(&mut state, "BOLT", 10, 0.5);
        let nut = product(&mut state, "NUT", 2, 0.25);
        let a = warehouse(&mut state, "A");
        let b = warehouse(&mut state, "B");
        stock(&mut state, &bolt, &a, 4);
        stock(&mut state, &bolt, &b, 4);
        stock(&mut state, &nut, &a, 8);

        let overview = state.overview();
        assert_eq!(overview.product_count, 2);
        assert_eq!(overview.warehouse_count, 2);
        assert!((overview.total_value - 6.0).abs() < 1e-9);
        assert_eq!(overview.items[0].total_quantity, 8);
        assert!(overview.items[0].is_low_stock);
        assert!(!overview.items[1].is_low_stock);
    }

    #[test]
    fn health_report_follows_transfers() {
        let mut state = InventoryState::new();
        let bolt = product(&mut state, "BOLT", 10, 1.0);
        let a = warehouse(&mut state, "A");
        let b = warehouse(&mut state, "B");
        stock(&mut state, &bolt, &a, 6);

        state
            .transfer_engine()
            .create(TransferRequest {
                product_id: bolt.id,
                quantity: 6,
                sending_warehouse_id: a.id,
                receiving_warehouse_id: b.id,
            })
            .unwrap();

        let report = state.stock_health(Utc::now());
        let row = &report.rows[0];
        assert_eq!(row.total_quantity, 6);
        assert_eq!(row.classification, StockHealth::Low);
        assert_eq!(row.recommended_order_qty, 14);
    }

    #[test]
    fn deleting_catalog_entries_leaves_stock_alone() {
        let mut state = InventoryState::new();
        let bolt = product(&mut state, "BOLT", 1, 1.0);
        let a = warehouse(&mut state, "A");
        stock(&mut state, &bolt, &a, 3);

        state.delete_product(bolt.id).unwrap();
        state.delete_warehouse(a.id).unwrap();

        assert_eq!(state.ledger.total_quantity(bolt.id), 3);
        assert!(state.delete_product(bolt.id).is_err());
        assert_eq!(state.overview().total_value, 0.0);
    }

    #[test]
    fn stock_update_cannot_create_duplicate_pair() {
        let mut state = InventoryState::new();
        let bolt = product(&mut state, "BOLT", 1, 1.0);
        let a = warehouse(&mut state, "A");
        let b = warehouse(&mut state, "B");
        stock(&mut state, &bolt, &a, 3);
        let second = stock(&mut state, &bolt, &b, 1);

        let err = state
            .update_stock(
                second.id,
                StockPatch {
                    warehouse_id: Some(a.id.get() as i64),
                    ..StockPatch::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }
}
