//! Inventory records as exchanged with the backend.
//!
//! This crate contains the wire/domain types for items, suppliers, stock
//! movements and dashboard statistics, plus the validated drafts used as
//! create/update bodies (no IO, no HTTP).

pub mod dashboard;
pub mod item;
pub mod supplier;
pub mod transaction;

pub use dashboard::DashboardStats;
pub use item::{InventoryItem, ItemDraft, StockStatus, DEFAULT_THRESHOLD};
pub use supplier::{Supplier, SupplierDraft};
pub use transaction::{StockTransaction, TransactionDraft, TransactionType};
