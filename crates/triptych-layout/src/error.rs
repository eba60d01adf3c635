//! Layout-specific error types.

use std::error::Error;
use std::fmt;

use triptych_core::{ElemKind, ViewId};

/// Errors that can occur while laying out views.
///
/// All of these are configuration errors: they surface at setup time,
/// before the channel enters steady-state operation, and are not
/// recoverable at runtime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayoutError {
    /// The region capacity cannot hold the requested allocation.
    CapacityExceeded {
        /// Number of bytes requested (including alignment padding).
        requested: usize,
        /// Total capacity of the region in bytes.
        capacity: usize,
    },
    /// A typed handle was requested with an element type that does not
    /// match the view's declared kind.
    ElemMismatch {
        /// The kind the caller asked for.
        expected: ElemKind,
        /// The kind the view was declared with.
        actual: ElemKind,
    },
    /// A `ViewId` that is not registered in the table.
    UnknownView {
        /// The unrecognised view.
        view: ViewId,
    },
    /// The same `ViewId` appeared twice in a schema.
    DuplicateView {
        /// The repeated view.
        view: ViewId,
    },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded {
                requested,
                capacity,
            } => {
                write!(
                    f,
                    "layout capacity exceeded: requested {requested} bytes, capacity {capacity} bytes"
                )
            }
            Self::ElemMismatch { expected, actual } => {
                write!(f, "element kind mismatch: requested {expected}, view holds {actual}")
            }
            Self::UnknownView { view } => {
                write!(f, "unknown view: {view}")
            }
            Self::DuplicateView { view } => {
                write!(f, "duplicate view in schema: {view}")
            }
        }
    }
}

impl Error for LayoutError {}
