//! Core types for the Triptych snapshot channel.
//!
//! This crate holds the vocabulary shared by the layout and channel
//! crates: strongly-typed IDs, the closed set of element kinds with
//! their (size, alignment) pairs, and the view schema types from which
//! both sides of a channel independently derive identical buffer
//! layouts.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod element;
pub mod id;
pub mod schema;

pub use element::{ElemKind, Element};
pub use id::{EntityId, TickId, ViewId};
pub use schema::{ViewDef, ViewShape};
