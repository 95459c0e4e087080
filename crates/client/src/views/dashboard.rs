use stockroom_inventory::DashboardStats;

use crate::error::ApiError;
use crate::table::TextTable;

use super::{format_timestamp, ViewContext};

/// Summary cards plus the recent-transactions table.
pub struct DashboardView {
    ctx: ViewContext,
    stats: DashboardStats,
    last_error: Option<ApiError>,
}

impl DashboardView {
    pub fn new(ctx: ViewContext) -> Self {
        Self {
            ctx,
            stats: DashboardStats::default(),
            last_error: None,
        }
    }

    pub fn stats(&self) -> &DashboardStats {
        &self.stats
    }

    pub fn last_error(&self) -> Option<&ApiError> {
        self.last_error.as_ref()
    }

    pub async fn mount(&mut self) {
        match self.ctx.api().dashboard_stats().await {
            Ok(stats) => {
                self.stats = stats;
                self.last_error = None;
            }
            Err(e) => {
                tracing::error!(error = %e, "Error fetching dashboard stats");
                self.last_error = Some(e);
            }
        }
    }

    /// `(title, value)` pairs in display order.
    pub fn cards(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Total Items", self.stats.total_items.to_string()),
            ("Low Stock Items", self.stats.low_stock_items.to_string()),
            ("Total Value", self.stats.total_value_display()),
            ("Recent Activity", self.stats.recent_activity().to_string()),
        ]
    }

    pub fn recent_table(&self) -> TextTable {
        let mut table = TextTable::new(["Date", "Item", "Type", "Quantity"]);
        for tx in &self.stats.recent_transactions {
            table.push_row(vec![
                format_timestamp(tx.created_at),
                tx.item_name.clone().unwrap_or_else(|| tx.item.to_string()),
                tx.transaction_type.label().to_string(),
                tx.quantity.to_string(),
            ]);
        }
        table
    }
}
