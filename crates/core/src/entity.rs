//! Entity trait: identity + continuity across state changes.

use crate::id::SequentialId;

/// Entity marker + minimal interface.
pub trait Entity: Clone {
    /// Strongly-typed entity identifier.
    type Id: SequentialId;

    /// Human-readable collection name, used in error messages.
    const KIND: &'static str;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}
