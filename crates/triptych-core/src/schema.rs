//! View definitions: the schema both sides of a channel agree on.
//!
//! A schema is an ordered list of `(ViewId, ViewDef)` pairs. The layout
//! crate turns a schema into concrete byte offsets by running the
//! allocation sequence in definition order; because the sequence is the
//! same on both sides, the offsets agree without ever being transmitted.

use crate::element::ElemKind;

/// Shape of a view's storage within a buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewShape {
    /// One contiguous array with one element per entity.
    Flat,
    /// A structure-of-arrays view: one `stride`-wide sub-view per entity,
    /// consecutively packed (e.g. stride 3 for positions, 16 for matrices).
    Strided {
        /// Elements per entity.
        stride: u32,
    },
}

impl ViewShape {
    /// Storage elements this shape requires per entity.
    pub fn components(self) -> u32 {
        match self {
            Self::Flat => 1,
            Self::Strided { stride } => stride,
        }
    }
}

/// Definition of a view registered in a schema.
///
/// The view's element length is `capacity × shape.components()`, where
/// capacity is the entity count the schema is laid out for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewDef {
    /// Human-readable name for debugging.
    pub name: String,
    /// Element kind of the view's storage.
    pub elem: ElemKind,
    /// Flat or strided per-entity shape.
    pub shape: ViewShape,
}

impl ViewDef {
    /// A flat view: one element of `elem` per entity.
    pub fn flat(name: impl Into<String>, elem: ElemKind) -> Self {
        Self {
            name: name.into(),
            elem,
            shape: ViewShape::Flat,
        }
    }

    /// A strided view: `stride` elements of `elem` per entity.
    pub fn strided(name: impl Into<String>, elem: ElemKind, stride: u32) -> Self {
        Self {
            name: name.into(),
            elem,
            shape: ViewShape::Strided { stride },
        }
    }

    /// Total element count for `capacity` entities.
    ///
    /// Widened to `u64`: the count is exact for every capacity/stride
    /// combination, so an oversized schema is caught by the layout
    /// step's capacity check instead of wrapping here.
    pub fn total_len(&self, capacity: u32) -> u64 {
        u64::from(capacity) * u64::from(self.shape.components())
    }

    /// Total byte footprint for `capacity` entities, excluding alignment
    /// padding (padding depends on the preceding allocation).
    ///
    /// `None` when the byte count does not fit in `u64`.
    pub fn total_bytes(&self, capacity: u32) -> Option<u64> {
        self.total_len(capacity)
            .checked_mul(self.elem.size_bytes() as u64)
    }
}
