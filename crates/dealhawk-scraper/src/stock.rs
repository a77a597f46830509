//! Stock assessment from the product page's quantity dropdown.
//!
//! The marketplace caps the dropdown at the purchasable quantity, so its
//! largest option doubles as a stock estimate. Pages without a dropdown
//! are assumed purchasable with at least one unit.

use serde::{Deserialize, Serialize};

use crate::markup::ProductPage;

/// Quantity at or below which stock is reported as low.
const LOW_STOCK_THRESHOLD: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    Available,
    LowStock,
    OutOfStock,
    /// The product page could not be fetched or parsed.
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockReport {
    pub status: StockStatus,
    pub quantity: Option<u32>,
}

impl StockStatus {
    /// Stable string form, matching the serialized representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            StockStatus::Available => "available",
            StockStatus::LowStock => "low_stock",
            StockStatus::OutOfStock => "out_of_stock",
            StockStatus::Unknown => "unknown",
        }
    }
}

impl StockReport {
    /// Report for a product whose page was unavailable.
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            status: StockStatus::Unknown,
            quantity: None,
        }
    }
}

/// Derives a stock report from a parsed product page.
#[must_use]
pub fn assess_stock(page: &ProductPage) -> StockReport {
    match page.max_quantity() {
        // No dropdown: the page sells in single units; assume minimum stock.
        None => StockReport {
            status: StockStatus::Available,
            quantity: Some(1),
        },
        Some(0) => StockReport {
            status: StockStatus::OutOfStock,
            quantity: Some(0),
        },
        Some(quantity) if quantity <= LOW_STOCK_THRESHOLD => StockReport {
            status: StockStatus::LowStock,
            quantity: Some(quantity),
        },
        Some(quantity) => StockReport {
            status: StockStatus::Available,
            quantity: Some(quantity),
        },
    }
}
