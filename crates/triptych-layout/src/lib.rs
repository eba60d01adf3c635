//! Deterministic bump layout of typed views for Triptych buffers.
//!
//! A [`Cursor`] partitions a fixed byte capacity into a sequence of
//! aligned, non-overlapping typed views. Handles are plain offset
//! descriptors, never borrowed slices: the producer and consumer of a
//! channel each resolve the same handle against their own side of the
//! shared regions.
//!
//! # Determinism contract
//!
//! Given two cursors of equal capacity, issuing the exact same ordered
//! sequence of [`Cursor::alloc`] / [`Cursor::alloc_strided`] calls on
//! each yields handles at byte-identical offsets. This is the only
//! mechanism by which the two sides of a channel agree on where a view
//! lives — offsets are reconstructed from the shared schema, never
//! transmitted.
//!
//! The cursor is single-threaded setup machinery: it is consumed fully
//! while building a [`ViewTable`] and not used afterward. There is no
//! deallocation.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod cursor;
pub mod error;
pub mod handle;
pub mod table;

pub use cursor::Cursor;
pub use error::LayoutError;
pub use handle::{RawHandle, StridedHandle, ViewHandle};
pub use table::{required_capacity, ViewEntry, ViewTable};
