//! Entity trait: server-assigned identity for listed records.

/// Entity marker + minimal interface.
///
/// Every record the backend lists (items, suppliers, transactions) carries a
/// backend-assigned identifier. View collections look rows up by it when a
/// record is selected for edit/delete.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}
