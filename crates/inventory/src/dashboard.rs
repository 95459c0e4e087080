use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::transaction::StockTransaction;

/// Aggregates returned by `/items/dashboard_stats/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub total_items: u64,
    #[serde(default)]
    pub low_stock_items: u64,
    #[serde(default)]
    pub total_stock_value: Decimal,
    #[serde(default)]
    pub recent_transactions: Vec<StockTransaction>,
}

impl DashboardStats {
    /// Total stock value as shown on the dashboard card, e.g. `$1234.50`.
    pub fn total_value_display(&self) -> String {
        format!("${:.2}", self.total_stock_value)
    }

    pub fn recent_activity(&self) -> usize {
        self.recent_transactions.len()
    }
}
