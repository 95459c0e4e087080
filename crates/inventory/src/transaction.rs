use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, Entity, ItemId, TransactionId};

/// Direction of a stock movement.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TransactionType {
    #[default]
    #[serde(rename = "IN")]
    In,
    #[serde(rename = "OUT")]
    Out,
}

impl TransactionType {
    /// Wire value (`IN` / `OUT`).
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::In => "IN",
            TransactionType::Out => "OUT",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TransactionType::In => "Stock In",
            TransactionType::Out => "Stock Out",
        }
    }
}

impl core::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "IN" => Ok(TransactionType::In),
            "OUT" => Ok(TransactionType::Out),
            other => Err(DomainError::validation(format!(
                "transaction type must be IN or OUT, got {other:?}"
            ))),
        }
    }
}

/// A stock movement as listed by `/transactions/`.
///
/// The backend applies the movement to the item's quantity when the
/// transaction is created; clients never compute that locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockTransaction {
    pub id: TransactionId,
    pub item: ItemId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,
    pub transaction_type: TransactionType,
    pub quantity: i64,
    #[serde(default)]
    pub notes: String,
    #[serde(default, alias = "transaction_date", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl Entity for StockTransaction {
    type Id = TransactionId;

    fn id(&self) -> TransactionId {
        self.id
    }
}

/// Create body for `/transactions/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDraft {
    pub item: Option<ItemId>,
    pub quantity: i64,
    pub transaction_type: TransactionType,
    pub notes: String,
}

impl TransactionDraft {
    pub fn validate(&self) -> DomainResult<()> {
        if self.item.is_none() {
            return Err(DomainError::validation("an item must be selected"));
        }
        if self.quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        Ok(())
    }
}
