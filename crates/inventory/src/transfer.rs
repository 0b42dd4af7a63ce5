//! Transfer engine: moving quantity between two warehouses' stock records.
//!
//! A transfer is a debit of the sending record paired with a credit of the
//! receiving record, plus a persisted [`Transfer`]. Deleting the transfer applies
//! the exact inverse. Both directions validate everything up front, so once the
//! first ledger write happens no failure path remains:
//!
//! ```text
//! create: same-warehouse? -> zero qty? -> source exists? -> enough stock?
//!         -> receiver can take qty? -> debit sender -> credit receiver
//!         -> record transfer
//! delete: transfer exists? -> receiver holds qty? -> sender can take qty?
//!         -> debit receiver -> credit sender -> drop transfer
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use stockroom_core::{DomainError, Entity, ProductId, Table, TransferId, WarehouseId};

use crate::ledger::{LedgerError, StockLedger};

/// A committed movement of stock between two warehouses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    pub id: TransferId,
    pub product_id: ProductId,
    pub quantity: u64,
    pub sending_warehouse_id: WarehouseId,
    pub receiving_warehouse_id: WarehouseId,
}

impl Entity for Transfer {
    type Id = TransferId;
    const KIND: &'static str = "transfer";

    fn id(&self) -> TransferId {
        self.id
    }
}

/// A structurally valid transfer request (positive ids, non-negative quantity).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub product_id: ProductId,
    pub quantity: u64,
    pub sending_warehouse_id: WarehouseId,
    pub receiving_warehouse_id: WarehouseId,
}

impl TransferRequest {
    /// Parse raw client numbers into a request.
    pub fn from_raw(
        product_id: i64,
        quantity: i64,
        sending_warehouse_id: i64,
        receiving_warehouse_id: i64,
    ) -> Result<Self, TransferError> {
        let quantity = u64::try_from(quantity)
            .map_err(|_| TransferError::invalid("quantity must not be negative"))?;
        Ok(Self {
            product_id: ProductId::try_from(product_id)?,
            quantity,
            sending_warehouse_id: WarehouseId::try_from(sending_warehouse_id)?,
            receiving_warehouse_id: WarehouseId::try_from(receiving_warehouse_id)?,
        })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// Structurally invalid request; rejected before touching the ledger.
    #[error("invalid transfer: {0}")]
    InvalidTransfer(String),

    #[error("no stock of product {product_id} at sending warehouse {warehouse_id}")]
    SourceNotFound {
        product_id: ProductId,
        warehouse_id: WarehouseId,
    },

    #[error(
        "insufficient stock of product {product_id} at warehouse {warehouse_id} \
         (requested {requested}, available {available})"
    )]
    InsufficientStock {
        product_id: ProductId,
        warehouse_id: WarehouseId,
        requested: u64,
        available: u64,
    },

    #[error("transfer {0} not found")]
    TransferNotFound(TransferId),

    /// The ledger no longer holds what the transfer credited: ledger and
    /// transfer log have diverged.
    #[error("transfer {transfer_id} cannot be reversed: {reason}")]
    ReversalFailed {
        transfer_id: TransferId,
        reason: String,
    },
}

impl TransferError {
    fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidTransfer(msg.into())
    }
}

impl From<DomainError> for TransferError {
    fn from(err: DomainError) -> Self {
        Self::InvalidTransfer(err.to_string())
    }
}

impl From<LedgerError> for TransferError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientStock {
                product_id,
                warehouse_id,
                requested,
                available,
            } => Self::InsufficientStock {
                product_id,
                warehouse_id,
                requested,
                available,
            },
            other => Self::InvalidTransfer(other.to_string()),
        }
    }
}

/// Runs transfers against a ledger and the transfer log.
///
/// The engine borrows both collections for the duration of one operation; the
/// caller decides how that borrow is serialized and persisted.
#[derive(Debug)]
pub struct TransferEngine<'a> {
    ledger: &'a mut StockLedger,
    log: &'a mut Table<Transfer>,
}

impl<'a> TransferEngine<'a> {
    pub fn new(ledger: &'a mut StockLedger, log: &'a mut Table<Transfer>) -> Self {
        Self { ledger, log }
    }

    /// Move `request.quantity` from the sending to the receiving warehouse.
    pub fn create(&mut self, request: TransferRequest) -> Result<Transfer, TransferError> {
        let TransferRequest {
            product_id,
            quantity,
            sending_warehouse_id: from,
            receiving_warehouse_id: to,
        } = request;

        if from == to {
            return Err(TransferError::invalid(
                "sending and receiving warehouse must differ",
            ));
        }
        if quantity == 0 {
            return Err(TransferError::invalid("quantity must be greater than zero"));
        }

        let available = self
            .ledger
            .find_record(product_id, from)
            .map(|r| r.quantity)
            .ok_or(TransferError::SourceNotFound {
                product_id,
                warehouse_id: from,
            })?;
        if quantity > available {
            return Err(TransferError::InsufficientStock {
                product_id,
                warehouse_id: from,
                requested: quantity,
                available,
            });
        }

        // The debit frees exactly `quantity` of headroom, so only the receiving
        // record itself and id availability can still fail the credit.
        let receiver = self.ledger.find_record(product_id, to).map(|r| r.quantity);
        match receiver {
            Some(held) if held.checked_add(quantity).is_none() => {
                return Err(TransferError::invalid(format!(
                    "warehouse {to} cannot hold {quantity} more of product {product_id}"
                )));
            }
            None if self.ledger.sequence().is_exhausted() => {
                return Err(TransferError::invalid("no stock record ids left"));
            }
            _ => {}
        }
        if self.log.sequence().is_exhausted() {
            return Err(TransferError::invalid("no transfer ids left"));
        }

        self.ledger.debit(product_id, from, quantity)?;
        self.ledger.credit(product_id, to, quantity)?;

        let transfer = self.log.insert_new(|id| Transfer {
            id,
            product_id,
            quantity,
            sending_warehouse_id: from,
            receiving_warehouse_id: to,
        })?;
        Ok(transfer.clone())
    }

    /// Delete a transfer and undo its ledger effect.
    pub fn delete(&mut self, transfer_id: TransferId) -> Result<Transfer, TransferError> {
        let transfer = self
            .log
            .get(transfer_id)
            .cloned()
            .ok_or(TransferError::TransferNotFound(transfer_id))?;

        let held = self
            .ledger
            .find_record(transfer.product_id, transfer.receiving_warehouse_id)
            .map(|r| r.quantity);
        match held {
            None => {
                return Err(TransferError::ReversalFailed {
                    transfer_id,
                    reason: format!(
                        "warehouse {} holds no stock of product {}",
                        transfer.receiving_warehouse_id, transfer.product_id
                    ),
                });
            }
            Some(held) if held < transfer.quantity => {
                return Err(TransferError::ReversalFailed {
                    transfer_id,
                    reason: format!(
                        "warehouse {} holds {held} of product {}, transfer credited {}",
                        transfer.receiving_warehouse_id, transfer.product_id, transfer.quantity
                    ),
                });
            }
            Some(_) => {}
        }

        let sender = self
            .ledger
            .find_record(transfer.product_id, transfer.sending_warehouse_id)
            .map(|r| r.quantity);
        match sender {
            Some(held) if held.checked_add(transfer.quantity).is_none() => {
                return Err(TransferError::ReversalFailed {
                    transfer_id,
                    reason: format!(
                        "warehouse {} cannot take back {} of product {}",
                        transfer.sending_warehouse_id, transfer.quantity, transfer.product_id
                    ),
                });
            }
            None if self.ledger.sequence().is_exhausted() => {
                return Err(TransferError::ReversalFailed {
                    transfer_id,
                    reason: "no stock record ids left".to_string(),
                });
            }
            _ => {}
        }

        self.ledger
            .debit(
                transfer.product_id,
                transfer.receiving_warehouse_id,
                transfer.quantity,
            )
            .map_err(|e| TransferError::ReversalFailed {
                transfer_id,
                reason: e.to_string(),
            })?;
        self.ledger
            .credit(
                transfer.product_id,
                transfer.sending_warehouse_id,
                transfer.quantity,
            )
            .map_err(|e| TransferError::ReversalFailed {
                transfer_id,
                reason: e.to_string(),
            })?;
        self.log.remove(transfer_id);

        Ok(transfer)
    }
}
