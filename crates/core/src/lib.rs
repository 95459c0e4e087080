//! `stockroom-core`: shared building blocks for the inventory client.
//!
//! This crate holds **pure** primitives (no IO, no HTTP).

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{ItemId, SupplierId, TransactionId, UserId};
