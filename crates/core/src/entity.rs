//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Every stored record is an entity: its key never changes, all other fields
/// may be replaced by an update.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
