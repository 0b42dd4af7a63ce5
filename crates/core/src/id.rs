//! Strongly-typed identifiers used across the domain.
//!
//! Every collection is keyed by a positive integer allocated from its own
//! sequence, so ids are `u64` newtypes rather than UUIDs.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a product.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(u64);

/// Identifier of a warehouse.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WarehouseId(u64);

/// Identifier of a stock record (one ledger row).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StockRecordId(u64);

/// Identifier of a transfer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransferId(u64);

/// Identifiers that can be minted from a collection sequence.
pub trait SequentialId: Copy + Ord + core::hash::Hash + core::fmt::Debug + core::fmt::Display {
    fn from_raw(raw: u64) -> Self;

    fn raw(&self) -> u64;
}

macro_rules! impl_positive_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Build an identifier, rejecting zero.
            pub fn new(raw: u64) -> Result<Self, DomainError> {
                if raw == 0 {
                    return Err(DomainError::invalid_id(concat!($name, " must be positive")));
                }
                Ok(Self(raw))
            }

            pub fn get(&self) -> u64 {
                self.0
            }
        }

        impl SequentialId for $t {
            fn from_raw(raw: u64) -> Self {
                Self(raw)
            }

            fn raw(&self) -> u64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl TryFrom<i64> for $t {
            type Error = DomainError;

            fn try_from(value: i64) -> Result<Self, Self::Error> {
                match u64::try_from(value) {
                    Ok(raw) if raw > 0 => Ok(Self(raw)),
                    _ => Err(DomainError::invalid_id(format!(
                        "{} must be positive (got {})",
                        $name, value
                    ))),
                }
            }
        }

        impl From<$t> for u64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = s
                    .parse::<u64>()
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Self::new(raw)
            }
        }
    };
}

impl_positive_newtype!(ProductId, "ProductId");
impl_positive_newtype!(WarehouseId, "WarehouseId");
impl_positive_newtype!(StockRecordId, "StockRecordId");
impl_positive_newtype!(TransferId, "TransferId");
