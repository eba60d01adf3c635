//! Strongly-typed identifiers.

use std::fmt;

/// Identifies an entity within a snapshot.
///
/// Entities are dense indices into the per-entity strided views:
/// `EntityId(n)` addresses the n-th sub-view of every strided view in
/// the schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for EntityId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

impl EntityId {
    /// The entity index as a `usize`, for slice addressing.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identifies a view within a schema.
///
/// Views are registered in schema order and assigned sequential IDs.
/// `ViewId(n)` corresponds to the n-th definition handed to the layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub u32);

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ViewId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Monotonically increasing tick counter.
///
/// Incremented by the producer loop each time a snapshot is published.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickId(pub u64);

impl fmt::Display for TickId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TickId {
    /// The next tick in sequence.
    pub fn next(self) -> TickId {
        TickId(self.0 + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_display_and_index() {
        let id = EntityId::from(7);
        assert_eq!(id.to_string(), "7");
        assert_eq!(id.index(), 7);
    }

    #[test]
    fn tick_id_next_increments() {
        assert_eq!(TickId(0).next(), TickId(1));
        assert_eq!(TickId(41).next(), TickId(42));
    }

    #[test]
    fn view_id_ordering_follows_inner() {
        assert!(ViewId(1) < ViewId(2));
    }
}
