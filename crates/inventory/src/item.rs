use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, Entity, ItemId, SupplierId};

/// Threshold applied to new items when the operator does not pick one.
pub const DEFAULT_THRESHOLD: i64 = 10;

fn default_threshold() -> i64 {
    DEFAULT_THRESHOLD
}

/// An inventory item as listed by `/items/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: ItemId,
    pub name: String,
    pub sku: String,
    #[serde(default)]
    pub description: String,
    pub quantity: i64,
    pub price: Decimal,
    #[serde(default)]
    pub supplier: Option<SupplierId>,
    /// Read-only, resolved by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier_name: Option<String>,
    #[serde(default = "default_threshold")]
    pub threshold: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<NaiveDate>,
    /// Server-computed low-stock flag, when the backend sends one.
    #[serde(
        rename = "is_low_stock",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub low_stock_flag: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Display status of an item's stock level.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StockStatus {
    Low,
    InStock,
}

impl StockStatus {
    pub fn label(&self) -> &'static str {
        match self {
            StockStatus::Low => "Low Stock",
            StockStatus::InStock => "In Stock",
        }
    }
}

impl InventoryItem {
    /// Whether the item is below its reorder threshold.
    ///
    /// The backend's flag wins when present; otherwise `quantity < threshold`.
    pub fn is_low_stock(&self) -> bool {
        self.low_stock_flag.unwrap_or(self.quantity < self.threshold)
    }

    pub fn stock_status(&self) -> StockStatus {
        if self.is_low_stock() {
            StockStatus::Low
        } else {
            StockStatus::InStock
        }
    }

    /// Value of the stock on hand (`price * quantity`).
    pub fn stock_value(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

impl Entity for InventoryItem {
    type Id = ItemId;

    fn id(&self) -> ItemId {
        self.id
    }
}

/// Create/update body for `/items/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub name: String,
    pub sku: String,
    pub description: String,
    pub quantity: i64,
    pub price: Decimal,
    pub supplier: Option<SupplierId>,
    pub threshold: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<NaiveDate>,
}

impl Default for ItemDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            sku: String::new(),
            description: String::new(),
            quantity: 0,
            price: Decimal::ZERO,
            supplier: None,
            threshold: DEFAULT_THRESHOLD,
            expiration_date: None,
        }
    }
}

impl From<&InventoryItem> for ItemDraft {
    fn from(item: &InventoryItem) -> Self {
        Self {
            name: item.name.clone(),
            sku: item.sku.clone(),
            description: item.description.clone(),
            quantity: item.quantity,
            price: item.price,
            supplier: item.supplier,
            threshold: item.threshold,
            expiration_date: item.expiration_date,
        }
    }
}

impl ItemDraft {
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if self.sku.trim().is_empty() {
            return Err(DomainError::validation("sku cannot be empty"));
        }
        if self.quantity < 0 {
            return Err(DomainError::validation("quantity cannot be negative"));
        }
        if self.price < Decimal::ZERO {
            return Err(DomainError::validation("price cannot be negative"));
        }
        if self.threshold < 0 {
            return Err(DomainError::validation("threshold cannot be negative"));
        }
        if self.supplier.is_none() {
            return Err(DomainError::validation("a supplier must be selected"));
        }
        Ok(())
    }
}
