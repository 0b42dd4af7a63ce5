//! Inventory operation pipeline (application-level orchestration).
//!
//! Every mutating operation runs the same pipeline under the write side of a
//! process-wide lock:
//!
//! ```text
//! load state -> validate + mutate (pure domain) -> commit state
//! ```
//!
//! A rejected operation never reaches `commit`, and a failed commit leaves the
//! store at its previous state, so no caller ever observes half a transfer.
//! Reads take the read side of the same lock and never see an in-flight
//! mutation.

use std::sync::{PoisonError, RwLock};

use chrono::Utc;
use thiserror::Error;

use stockroom_core::{DomainError, ProductId, StockRecordId, TransferId, WarehouseId};
use stockroom_inventory::{
    InventoryOverview, InventoryState, Product, ProductDraft, ProductPatch, StockDraft,
    StockHealthReport, StockPatch, StockRecord, Transfer, TransferError, TransferRequest,
    Warehouse, WarehouseDraft, WarehousePatch,
};

use crate::store::{InventoryStore, StoreError};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

pub struct InventoryService<S> {
    store: S,
    gate: RwLock<()>,
}

impl<S> InventoryService<S>
where
    S: InventoryStore,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            gate: RwLock::new(()),
        }
    }

    fn read<R>(&self, f: impl FnOnce(&InventoryState) -> R) -> ServiceResult<R> {
        let _guard = self.gate.read().unwrap_or_else(PoisonError::into_inner);
        let state = self.store.load()?;
        Ok(f(&state))
    }

    fn mutate<R, E>(&self, f: impl FnOnce(&mut InventoryState) -> Result<R, E>) -> ServiceResult<R>
    where
        ServiceError: From<E>,
    {
        let _guard = self.gate.write().unwrap_or_else(PoisonError::into_inner);
        let mut state = self.store.load()?;
        let out = f(&mut state)?;
        self.store.commit(&state)?;
        Ok(out)
    }

    // -------------------------
    // Products
    // -------------------------

    pub fn list_products(&self) -> ServiceResult<Vec<Product>> {
        self.read(|s| s.products.to_vec())
    }

    pub fn get_product(&self, id: ProductId) -> ServiceResult<Product> {
        self.read(|s| s.products.require(id).cloned())?
            .map_err(ServiceError::from)
    }

    pub fn create_product(&self, draft: ProductDraft) -> ServiceResult<Product> {
        let product = self.mutate(|s| s.create_product(draft))?;
        tracing::info!(product_id = %product.id, sku = %product.sku, "product created");
        Ok(product)
    }

    pub fn update_product(&self, id: ProductId, patch: ProductPatch) -> ServiceResult<Product> {
        self.mutate(|s| s.update_product(id, patch))
    }

    pub fn delete_product(&self, id: ProductId) -> ServiceResult<Product> {
        let product = self.mutate(|s| s.delete_product(id))?;
        tracing::info!(product_id = %id, "product deleted");
        Ok(product)
    }

    /// Total quantity of a product across all warehouses (0 when it holds none).
    pub fn total_quantity(&self, id: ProductId) -> ServiceResult<u64> {
        self.read(|s| s.ledger.total_quantity(id))
    }

    // -------------------------
    // Warehouses
    // -------------------------

    pub fn list_warehouses(&self) -> ServiceResult<Vec<Warehouse>> {
        self.read(|s| s.warehouses.to_vec())
    }

    pub fn get_warehouse(&self, id: WarehouseId) -> ServiceResult<Warehouse> {
        self.read(|s| s.warehouses.require(id).cloned())?
            .map_err(ServiceError::from)
    }

    pub fn create_warehouse(&self, draft: WarehouseDraft) -> ServiceResult<Warehouse> {
        let warehouse = self.mutate(|s| s.create_warehouse(draft))?;
        tracing::info!(warehouse_id = %warehouse.id, code = %warehouse.code, "warehouse created");
        Ok(warehouse)
    }

    pub fn update_warehouse(
        &self,
        id: WarehouseId,
        patch: WarehousePatch,
    ) -> ServiceResult<Warehouse> {
        self.mutate(|s| s.update_warehouse(id, patch))
    }

    pub fn delete_warehouse(&self, id: WarehouseId) -> ServiceResult<Warehouse> {
        let warehouse = self.mutate(|s| s.delete_warehouse(id))?;
        tracing::info!(warehouse_id = %id, "warehouse deleted");
        Ok(warehouse)
    }

    // -------------------------
    // Stock records
    // -------------------------

    pub fn list_stock(&self) -> ServiceResult<Vec<StockRecord>> {
        self.read(|s| s.ledger.records().cloned().collect())
    }

    pub fn get_stock(&self, id: StockRecordId) -> ServiceResult<StockRecord> {
        self.read(|s| s.ledger.require(id).cloned())?
            .map_err(ServiceError::from)
    }

    pub fn find_stock(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
    ) -> ServiceResult<Option<StockRecord>> {
        self.read(|s| s.ledger.find_record(product_id, warehouse_id).cloned())
    }

    pub fn create_stock(&self, draft: StockDraft) -> ServiceResult<StockRecord> {
        let record = self.mutate(|s| s.create_stock(draft))?;
        tracing::info!(
            stock_id = %record.id,
            product_id = %record.product_id,
            warehouse_id = %record.warehouse_id,
            quantity = record.quantity,
            "stock record opened"
        );
        Ok(record)
    }

    pub fn update_stock(&self, id: StockRecordId, patch: StockPatch) -> ServiceResult<StockRecord> {
        self.mutate(|s| s.update_stock(id, patch))
    }

    pub fn delete_stock(&self, id: StockRecordId) -> ServiceResult<StockRecord> {
        self.mutate(|s| s.delete_stock(id))
    }

    // -------------------------
    // Transfers
    // -------------------------

    pub fn list_transfers(&self) -> ServiceResult<Vec<Transfer>> {
        self.read(|s| s.transfers.to_vec())
    }

    pub fn get_transfer(&self, id: TransferId) -> ServiceResult<Transfer> {
        self.read(|s| s.transfers.get(id).cloned())?
            .ok_or(ServiceError::Transfer(TransferError::TransferNotFound(id)))
    }

    pub fn create_transfer(&self, request: TransferRequest) -> ServiceResult<Transfer> {
        match self.mutate(|s| s.transfer_engine().create(request)) {
            Ok(transfer) => {
                tracing::info!(
                    transfer_id = %transfer.id,
                    product_id = %transfer.product_id,
                    quantity = transfer.quantity,
                    from = %transfer.sending_warehouse_id,
                    to = %transfer.receiving_warehouse_id,
                    "transfer committed"
                );
                Ok(transfer)
            }
            Err(e) => {
                tracing::warn!(
                    product_id = %request.product_id,
                    quantity = request.quantity,
                    from = %request.sending_warehouse_id,
                    to = %request.receiving_warehouse_id,
                    "transfer rejected: {e}"
                );
                Err(e)
            }
        }
    }

    /// Delete a transfer and reverse its ledger effect.
    pub fn delete_transfer(&self, id: TransferId) -> ServiceResult<Transfer> {
        match self.mutate(|s| s.transfer_engine().delete(id)) {
            Ok(transfer) => {
                tracing::info!(
                    transfer_id = %id,
                    product_id = %transfer.product_id,
                    quantity = transfer.quantity,
                    "transfer reversed"
                );
                Ok(transfer)
            }
            Err(e @ ServiceError::Transfer(TransferError::ReversalFailed { .. })) => {
                tracing::error!(transfer_id = %id, "ledger diverged from transfer log: {e}");
                Err(e)
            }
            Err(e) => {
                tracing::warn!(transfer_id = %id, "transfer delete rejected: {e}");
                Err(e)
            }
        }
    }

    // -------------------------
    // Reporting
    // -------------------------

    pub fn overview(&self) -> ServiceResult<InventoryOverview> {
        self.read(|s| s.overview())
    }

    pub fn stock_health(&self) -> ServiceResult<StockHealthReport> {
        self.read(|s| s.stock_health(Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::store::{InMemoryInventoryStore, JsonFileInventoryStore};

    fn stock_draft(product_id: i64, warehouse_id: i64, quantity: i64) -> StockDraft {
        StockDraft {
            product_id,
            warehouse_id,
            quantity,
        }
    }

    fn request(product: i64, quantity: i64, from: i64, to: i64) -> TransferRequest {
        TransferRequest::from_raw(product, quantity, from, to).unwrap()
    }

    fn pid(id: u64) -> ProductId {
        ProductId::new(id).unwrap()
    }

    fn wid(id: u64) -> WarehouseId {
        WarehouseId::new(id).unwrap()
    }

    /// Store wrapper whose commits can be switched to fail.
    struct FlakyStore {
        inner: InMemoryInventoryStore,
        fail_commits: AtomicBool,
    }

    impl InventoryStore for FlakyStore {
        fn load(&self) -> Result<InventoryState, StoreError> {
            self.inner.load()
        }

        fn commit(&self, state: &InventoryState) -> Result<(), StoreError> {
            if self.fail_commits.load(Ordering::SeqCst) {
                return Err(StoreError::io(
                    "flaky",
                    std::io::Error::other("disk full"),
                ));
            }
            self.inner.commit(state)
        }
    }

    #[test]
    fn transfer_and_reverse_through_service() {
        let service = InventoryService::new(InMemoryInventoryStore::new());
        service.create_stock(stock_draft(1, 1, 10)).unwrap();

        let transfer = service.create_transfer(request(1, 10, 1, 2)).unwrap();
        assert!(service.find_stock(pid(1), wid(1)).unwrap().is_none());
        assert_eq!(service.find_stock(pid(1), wid(2)).unwrap().unwrap().quantity, 10);
        assert_eq!(service.list_transfers().unwrap(), vec![transfer.clone()]);

        service.delete_transfer(transfer.id).unwrap();
        assert_eq!(service.find_stock(pid(1), wid(1)).unwrap().unwrap().quantity, 10);
        assert!(service.find_stock(pid(1), wid(2)).unwrap().is_none());
        assert!(service.list_transfers().unwrap().is_empty());
        assert!(matches!(
            service.get_transfer(transfer.id),
            Err(ServiceError::Transfer(TransferError::TransferNotFound(_)))
        ));
    }

    #[test]
    fn rejected_transfer_leaves_store_unchanged() {
        let store = Arc::new(InMemoryInventoryStore::new());
        let service = InventoryService::new(store.clone());
        service.create_stock(stock_draft(1, 1, 10)).unwrap();
        let before = store.load().unwrap();

        let err = service.create_transfer(request(1, 11, 1, 2)).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Transfer(TransferError::InsufficientStock { .. })
        ));
        assert_eq!(store.load().unwrap(), before);
    }

    #[test]
    fn stock_past_the_product_total_limit_is_refused_and_transfers_still_conserve() {
        let store = Arc::new(InMemoryInventoryStore::new());
        let service = InventoryService::new(store.clone());
        let big = i64::MAX as u64;
        service.create_stock(stock_draft(1, 1, i64::MAX)).unwrap();
        service.create_stock(stock_draft(1, 2, i64::MAX)).unwrap();
        let before = store.load().unwrap();

        let err = service.create_stock(stock_draft(1, 3, i64::MAX)).unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::Validation(_))));
        assert_eq!(store.load().unwrap(), before);
        assert_eq!(service.total_quantity(pid(1)).unwrap(), 2 * big);

        let transfer = service.create_transfer(request(1, i64::MAX, 2, 1)).unwrap();
        assert_eq!(service.find_stock(pid(1), wid(1)).unwrap().unwrap().quantity, 2 * big);
        assert_eq!(service.total_quantity(pid(1)).unwrap(), 2 * big);

        service.delete_transfer(transfer.id).unwrap();
        assert_eq!(service.find_stock(pid(1), wid(1)).unwrap().unwrap().quantity, big);
        assert_eq!(service.find_stock(pid(1), wid(2)).unwrap().unwrap().quantity, big);
    }

    #[test]
    fn failed_commit_applies_nothing() {
        let store = Arc::new(FlakyStore {
            inner: InMemoryInventoryStore::new(),
            fail_commits: AtomicBool::new(false),
        });
        let service = InventoryService::new(store.clone());
        service.create_stock(stock_draft(1, 1, 10)).unwrap();
        let before = store.load().unwrap();

        store.fail_commits.store(true, Ordering::SeqCst);
        let err = service.create_transfer(request(1, 4, 1, 2)).unwrap_err();
        assert!(matches!(err, ServiceError::Store(_)));
        assert_eq!(store.load().unwrap(), before);
        assert_eq!(service.total_quantity(pid(1)).unwrap(), 10);
    }

    #[test]
    fn reversal_failure_surfaces_after_stock_was_removed() {
        let service = InventoryService::new(InMemoryInventoryStore::new());
        service.create_stock(stock_draft(1, 1, 10)).unwrap();
        let transfer = service.create_transfer(request(1, 3, 1, 2)).unwrap();

        let receiver = service.find_stock(pid(1), wid(2)).unwrap().unwrap();
        service.delete_stock(receiver.id).unwrap();

        let err = service.delete_transfer(transfer.id).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Transfer(TransferError::ReversalFailed { .. })
        ));
        assert_eq!(service.list_transfers().unwrap().len(), 1);
    }

    #[test]
    fn concurrent_transfers_never_double_spend() {
        let service = Arc::new(InventoryService::new(InMemoryInventoryStore::new()));
        service.create_stock(stock_draft(1, 1, 10)).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let service = service.clone();
                std::thread::spawn(move || service.create_transfer(request(1, 3, 1, 2 + (i % 3))))
            })
            .collect();
        let succeeded = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|r| r.is_ok())
            .count();

        assert_eq!(succeeded, 3);
        assert_eq!(service.total_quantity(pid(1)).unwrap(), 10);
        assert_eq!(service.find_stock(pid(1), wid(1)).unwrap().unwrap().quantity, 1);
    }

    #[test]
    fn state_survives_reopening_the_json_store() {
        let dir = tempfile::tempdir().unwrap();
        {
            let service = InventoryService::new(JsonFileInventoryStore::in_dir(dir.path()));
            service.create_stock(stock_draft(9, 1, 5)).unwrap();
            service.create_stock(stock_draft(9, 2, 2)).unwrap();
            service.create_transfer(request(9, 5, 1, 2)).unwrap();
        }

        let service = InventoryService::new(JsonFileInventoryStore::in_dir(dir.path()));
        assert!(service.find_stock(pid(9), wid(1)).unwrap().is_none());
        assert_eq!(service.find_stock(pid(9), wid(2)).unwrap().unwrap().quantity, 7);
        assert_eq!(service.list_transfers().unwrap().len(), 1);
    }

    #[test]
    fn health_report_classifies_catalog() {
        let service = InventoryService::new(InMemoryInventoryStore::new());
        service
            .create_product(ProductDraft {
                sku: "A".to_string(),
                name: "Alpha".to_string(),
                category: "C".to_string(),
                unit_cost: 1.0,
                reorder_point: 5,
            })
            .unwrap();

        let report = service.stock_health().unwrap();
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].recommended_order_qty, 10);
    }
}
