//! Products and warehouses: the catalog the ledger joins against.
//!
//! Drafts and patches carry raw client input (signed numbers, untrimmed
//! strings); `validate` turns them into values that can be stored.

use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, Entity, ProductId, WarehouseId};

/// A sellable product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub sku: String,
    pub name: String,
    pub category: String,
    pub unit_cost: f64,
    pub reorder_point: u64,
}

impl Entity for Product {
    type Id = ProductId;
    const KIND: &'static str = "product";

    fn id(&self) -> ProductId {
        self.id
    }
}

/// Input for creating a product.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub sku: String,
    pub name: String,
    pub category: String,
    pub unit_cost: f64,
    pub reorder_point: i64,
}

/// Partial product update; absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub unit_cost: Option<f64>,
    pub reorder_point: Option<i64>,
}

/// Validated product fields, waiting for an id.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidProduct {
    sku: String,
    name: String,
    category: String,
    unit_cost: f64,
    reorder_point: u64,
}

impl ValidProduct {
    pub fn with_id(self, id: ProductId) -> Product {
        Product {
            id,
            sku: self.sku,
            name: self.name,
            category: self.category,
            unit_cost: self.unit_cost,
            reorder_point: self.reorder_point,
        }
    }
}

impl ProductDraft {
    pub fn validate(self) -> DomainResult<ValidProduct> {
        let sku = required("sku", self.sku)?;
        let name = required("name", self.name)?;
        let category = required("category", self.category)?;
        if !self.unit_cost.is_finite() || self.unit_cost < 0.0 {
            return Err(DomainError::validation("unitCost must be a number >= 0"));
        }
        let reorder_point = u64::try_from(self.reorder_point)
            .map_err(|_| DomainError::validation("reorderPoint must be >= 0"))?;
        Ok(ValidProduct {
            sku,
            name,
            category,
            unit_cost: self.unit_cost,
            reorder_point,
        })
    }
}

impl ProductPatch {
    /// Merge the patch over `current` and validate the result.
    pub fn apply_to(self, current: &Product) -> DomainResult<Product> {
        let draft = ProductDraft {
            sku: self.sku.unwrap_or_else(|| current.sku.clone()),
            name: self.name.unwrap_or_else(|| current.name.clone()),
            category: self.category.unwrap_or_else(|| current.category.clone()),
            unit_cost: self.unit_cost.unwrap_or(current.unit_cost),
            reorder_point: match self.reorder_point {
                Some(v) => v,
                None => i64::try_from(current.reorder_point).unwrap_or(i64::MAX),
            },
        };
        Ok(draft.validate()?.with_id(current.id))
    }
}

/// A physical stock location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Warehouse {
    pub id: WarehouseId,
    pub code: String,
    pub name: String,
    pub location: String,
}

impl Entity for Warehouse {
    type Id = WarehouseId;
    const KIND: &'static str = "warehouse";

    fn id(&self) -> WarehouseId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseDraft {
    pub code: String,
    pub name: String,
    pub location: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarehousePatch {
    pub code: Option<String>,
    pub name: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidWarehouse {
    code: String,
    name: String,
    location: String,
}

impl ValidWarehouse {
    pub fn with_id(self, id: WarehouseId) -> Warehouse {
        Warehouse {
            id,
            code: self.code,
            name: self.name,
            location: self.location,
        }
    }
}

impl WarehouseDraft {
    pub fn validate(self) -> DomainResult<ValidWarehouse> {
        Ok(ValidWarehouse {
            code: required("code", self.code)?,
            name: required("name", self.name)?,
            location: required("location", self.location)?,
        })
    }
}

impl WarehousePatch {
    pub fn apply_to(self, current: &Warehouse) -> DomainResult<Warehouse> {
        let draft = WarehouseDraft {
            code: self.code.unwrap_or_else(|| current.code.clone()),
            name: self.name.unwrap_or_else(|| current.name.clone()),
            location: self.location.unwrap_or_else(|| current.location.clone()),
        };
        Ok(draft.validate()?.with_id(current.id))
    }
}

fn required(field: &str, value: String) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}
