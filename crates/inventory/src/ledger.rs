//! The stock ledger: authoritative (product, warehouse) → quantity mapping.
//!
//! The ledger owns every rule about how stock records change:
//!
//! - at most one record exists per (product, warehouse) pair
//! - quantities never go negative
//! - a product's total across all warehouses always fits in a `u64`
//! - a debit that drains a record to exactly zero removes the record
//!   (compaction); zero rows are never fabricated by a credit
//!
//! The ledger has no rollback. Callers that pair a debit with a credit must
//! validate before mutating (see [`crate::transfer::TransferEngine`]).

use std::collections::BTreeMap;

use thiserror::Error;

use stockroom_core::{
    DomainError, DomainResult, IdSequence, ProductId, StockRecordId, Table, WarehouseId,
};

use crate::stock::{StockLine, StockRecord};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error(
        "insufficient stock for product {product_id} at warehouse {warehouse_id} \
         (requested {requested}, available {available})"
    )]
    InsufficientStock {
        product_id: ProductId,
        warehouse_id: WarehouseId,
        requested: u64,
        /// Zero when no record exists for the pair.
        available: u64,
    },

    #[error(
        "crediting {amount} of product {product_id} at warehouse {warehouse_id} \
         would exceed the largest representable quantity"
    )]
    QuantityOverflow {
        product_id: ProductId,
        warehouse_id: WarehouseId,
        amount: u64,
    },

    /// No id left to open a new record with.
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// What a successful debit left behind.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DebitOutcome {
    /// The record still holds `remaining` units.
    Kept { remaining: u64 },
    /// The record reached zero and was removed.
    Compacted,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StockLedger {
    records: Table<StockRecord>,
    by_pair: BTreeMap<(ProductId, WarehouseId), StockRecordId>,
}

impl StockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the ledger from stored records, enforcing the one-record-per-pair invariant.
    pub fn from_records(
        records: impl IntoIterator<Item = StockRecord>,
        sequence: Option<IdSequence>,
    ) -> DomainResult<Self> {
        let records = Table::from_rows(records, sequence)?;
        let mut by_pair = BTreeMap::new();
        let mut totals: BTreeMap<ProductId, u64> = BTreeMap::new();
        for record in records.iter() {
            if record.product_id.get() == 0 || record.warehouse_id.get() == 0 {
                return Err(DomainError::invalid_id(format!(
                    "stock record {} references a non-positive id",
                    record.id
                )));
            }
            if by_pair.insert(record.pair(), record.id).is_some() {
                return Err(DomainError::invariant(format!(
                    "more than one stock record for product {} at warehouse {}",
                    record.product_id, record.warehouse_id
                )));
            }
            let total = totals.entry(record.product_id).or_insert(0);
            *total = total.checked_add(record.quantity).ok_or_else(|| {
                DomainError::invariant(format!(
                    "total quantity of product {} overflows",
                    record.product_id
                ))
            })?;
        }
        Ok(Self { records, by_pair })
    }

    pub fn find_record(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
    ) -> Option<&StockRecord> {
        let id = self.by_pair.get(&(product_id, warehouse_id))?;
        self.records.get(*id)
    }

    /// Sum of the product's quantity across every warehouse (0 when it has no records).
    ///
    /// Every write path keeps this within `u64`; the fold saturates rather than
    /// wrapping if that were ever broken.
    pub fn total_quantity(&self, product_id: ProductId) -> u64 {
        self.records
            .iter()
            .filter(|r| r.product_id == product_id)
            .fold(0u64, |acc, r| acc.saturating_add(r.quantity))
    }

    /// Room left before the product's total would overflow.
    pub fn headroom(&self, product_id: ProductId) -> u64 {
        u64::MAX - self.total_quantity(product_id)
    }

    /// Check that `credit(product_id, warehouse_id, amount)` would succeed, without
    /// changing anything.
    pub fn check_credit(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
        amount: u64,
    ) -> Result<(), LedgerError> {
        if amount == 0 {
            return Ok(());
        }
        if amount > self.headroom(product_id) {
            return Err(LedgerError::QuantityOverflow {
                product_id,
                warehouse_id,
                amount,
            });
        }
        if self.find_record(product_id, warehouse_id).is_none() && self.sequence().is_exhausted() {
            return Err(DomainError::invariant("stock record id sequence exhausted").into());
        }
        Ok(())
    }

    /// Add `amount` to the pair's record, opening one if absent.
    ///
    /// A zero credit is a no-op and never opens an empty record. A credit that
    /// would push the product's total past `u64::MAX` fails and changes nothing.
    pub fn credit(
        &mut self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
        amount: u64,
    ) -> Result<(), LedgerError> {
        self.check_credit(product_id, warehouse_id, amount)?;
        if amount == 0 {
            return Ok(());
        }

        if let Some(id) = self.by_pair.get(&(product_id, warehouse_id)).copied() {
            if let Some(record) = self.records.get_mut(id) {
                record.quantity += amount;
                return Ok(());
            }
        }

        let id = self
            .records
            .insert_new(|id| StockRecord {
                id,
                product_id,
                warehouse_id,
                quantity: amount,
            })?
            .id;
        self.by_pair.insert((product_id, warehouse_id), id);
        Ok(())
    }

    /// Remove `amount` from the pair's record, compacting it away at zero.
    pub fn debit(
        &mut self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
        amount: u64,
    ) -> Result<DebitOutcome, LedgerError> {
        let insufficient = |available| LedgerError::InsufficientStock {
            product_id,
            warehouse_id,
            requested: amount,
            available,
        };

        let id = self
            .by_pair
            .get(&(product_id, warehouse_id))
            .copied()
            .ok_or_else(|| insufficient(0))?;
        let record = self.records.get_mut(id).ok_or_else(|| insufficient(0))?;
        if record.quantity < amount {
            return Err(insufficient(record.quantity));
        }

        record.quantity -= amount;
        if record.quantity > 0 {
            return Ok(DebitOutcome::Kept {
                remaining: record.quantity,
            });
        }

        self.records.remove(id);
        self.by_pair.remove(&(product_id, warehouse_id));
        Ok(DebitOutcome::Compacted)
    }

    pub fn get(&self, id: StockRecordId) -> Option<&StockRecord> {
        self.records.get(id)
    }

    pub fn require(&self, id: StockRecordId) -> DomainResult<&StockRecord> {
        self.records.require(id)
    }

    /// Records in ascending id order.
    pub fn records(&self) -> impl Iterator<Item = &StockRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn sequence(&self) -> IdSequence {
        self.records.sequence()
    }

    /// Open a record directly (single-record CRUD path).
    pub fn insert_record(&mut self, line: StockLine) -> DomainResult<StockRecord> {
        let pair = (line.product_id, line.warehouse_id);
        if let Some(existing) = self.by_pair.get(&pair) {
            return Err(DomainError::conflict(format!(
                "stock record {existing} already holds product {} at warehouse {}",
                line.product_id, line.warehouse_id
            )));
        }
        if line.quantity > self.headroom(line.product_id) {
            return Err(quantity_too_large(line));
        }
        let record = self
            .records
            .insert_new(|id| StockRecord {
                id,
                product_id: line.product_id,
                warehouse_id: line.warehouse_id,
                quantity: line.quantity,
            })?
            .clone();
        self.by_pair.insert(pair, record.id);
        Ok(record)
    }

    /// Overwrite a record's fields (single-record CRUD path).
    pub fn update_record(&mut self, id: StockRecordId, line: StockLine) -> DomainResult<StockRecord> {
        let existing = self.records.require(id)?;
        let current = existing.pair();
        let held_by_product = if existing.product_id == line.product_id {
            existing.quantity
        } else {
            0
        };
        if line.quantity > self.headroom(line.product_id) + held_by_product {
            return Err(quantity_too_large(line));
        }
        let pair = (line.product_id, line.warehouse_id);
        if pair != current {
            if let Some(other) = self.by_pair.get(&pair) {
                return Err(DomainError::conflict(format!(
                    "stock record {other} already holds product {} at warehouse {}",
                    line.product_id, line.warehouse_id
                )));
            }
        }

        let updated = StockRecord {
            id,
            product_id: line.product_id,
            warehouse_id: line.warehouse_id,
            quantity: line.quantity,
        };
        self.records.replace(updated.clone())?;
        self.by_pair.remove(&current);
        self.by_pair.insert(pair, id);
        Ok(updated)
    }

    pub fn remove_record(&mut self, id: StockRecordId) -> DomainResult<StockRecord> {
        let record = self
            .records
            .remove(id)
            .ok_or_else(|| DomainError::not_found(format!("stock record {id}")))?;
        self.by_pair.remove(&record.pair());
        Ok(record)
    }
}

fn quantity_too_large(line: StockLine) -> DomainError {
    DomainError::validation(format!(
        "quantity {} would push the total of product {} past {}",
        line.quantity,
        line.product_id,
        u64::MAX
    ))
}
