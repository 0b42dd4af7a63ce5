//! Stock health: classification of per-product totals against reorder points.
//!
//! Read-only consumer of the ledger. Produces the dashboard overview and the
//! reorder report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::ProductId;

use crate::catalog::Product;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockHealth {
    Critical,
    Low,
    Adequate,
    Overstock,
}

impl StockHealth {
    pub fn classify(total_quantity: u64, reorder_point: u64) -> Self {
        if total_quantity == 0 {
            Self::Critical
        } else if total_quantity < reorder_point {
            Self::Low
        } else if total_quantity <= reorder_point.saturating_mul(2) {
            Self::Adequate
        } else {
            Self::Overstock
        }
    }

    pub fn needs_reorder(self) -> bool {
        matches!(self, Self::Critical | Self::Low)
    }

    /// Units to order to bring the product back to twice its reorder point.
    pub fn recommended_order_quantity(self, total_quantity: u64, reorder_point: u64) -> u64 {
        if self.needs_reorder() {
            reorder_point.saturating_mul(2).saturating_sub(total_quantity)
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockHealthRow {
    pub product_id: ProductId,
    pub sku: String,
    pub name: String,
    pub reorder_point: u64,
    pub total_quantity: u64,
    pub classification: StockHealth,
    pub recommended_order_qty: u64,
}

impl StockHealthRow {
    pub fn for_product(product: &Product, total_quantity: u64) -> Self {
        let classification = StockHealth::classify(total_quantity, product.reorder_point);
        Self {
            product_id: product.id,
            sku: product.sku.clone(),
            name: product.name.clone(),
            reorder_point: product.reorder_point,
            total_quantity,
            classification,
            recommended_order_qty: classification
                .recommended_order_quantity(total_quantity, product.reorder_point),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockHealthReport {
    pub generated_at: DateTime<Utc>,
    pub rows: Vec<StockHealthRow>,
}

/// Dashboard row: the product plus its stock across all warehouses.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewRow {
    #[serde(flatten)]
    pub product: Product,
    pub total_quantity: u64,
    pub is_low_stock: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryOverview {
    pub product_count: usize,
    pub warehouse_count: usize,
    /// Σ unit cost × quantity over stock whose product is in the catalog.
    pub total_value: f64,
    pub items: Vec<OverviewRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_boundaries() {
        assert_eq!(StockHealth::classify(0, 10), StockHealth::Critical);
        assert_eq!(StockHealth::classify(0, 0), StockHealth::Critical);
        assert_eq!(StockHealth::classify(9, 10), StockHealth::Low);
        assert_eq!(StockHealth::classify(10, 10), StockHealth::Adequate);
        assert_eq!(StockHealth::classify(20, 10), StockHealth::Adequate);
        assert_eq!(StockHealth::classify(21, 10), StockHealth::Overstock);
        assert_eq!(StockHealth::classify(1, 0), StockHealth::Overstock);
    }

    #[test]
    fn reorder_recommendation_only_for_critical_and_low() {
        assert_eq!(StockHealth::Critical.recommended_order_quantity(0, 10), 20);
        assert_eq!(StockHealth::Low.recommended_order_quantity(4, 10), 16);
        assert_eq!(StockHealth::Adequate.recommended_order_quantity(12, 10), 0);
        assert_eq!(StockHealth::Overstock.recommended_order_quantity(50, 10), 0);
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&StockHealth::Overstock).unwrap();
        assert_eq!(json, "\"overstock\"");
    }
}
