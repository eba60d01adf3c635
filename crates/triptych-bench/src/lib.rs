//! Benchmark profiles for the Triptych snapshot channel.
//!
//! Provides pre-built schemas sized like the motivating application:
//!
//! - [`transform_profile`]: the full renderable transform schema at a
//!   given entity count
//! - [`scalar_profile`]: a single flat f32 view, the smallest useful
//!   payload

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use triptych_core::{ElemKind, ViewDef, ViewId};
use triptych_engine::transform::renderable_defs;
use triptych_layout::required_capacity;

/// The renderable transform schema plus its byte footprint at
/// `capacity` entities.
pub fn transform_profile(capacity: u32) -> (Vec<(ViewId, ViewDef)>, usize) {
    let defs = renderable_defs();
    let bytes = required_capacity(&defs, capacity).unwrap();
    (defs, bytes)
}

/// A single flat f32 view at `capacity` entities.
pub fn scalar_profile(capacity: u32) -> (Vec<(ViewId, ViewDef)>, usize) {
    let defs = vec![(ViewId(0), ViewDef::flat("value", ElemKind::F32))];
    let bytes = required_capacity(&defs, capacity).unwrap();
    (defs, bytes)
}
