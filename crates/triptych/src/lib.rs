//! Triptych: wait-free triple-buffered snapshot channels over shared memory.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Triptych sub-crates. For most users, adding `triptych` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use triptych::prelude::*;
//!
//! // Both sides agree on a schema; offsets are derived, never sent.
//! let defs = vec![
//!     (ViewId(0), ViewDef::strided("position", ElemKind::F32, 3)),
//!     (ViewId(1), ViewDef::flat("dirty", ElemKind::U8)),
//! ];
//! let capacity = 16; // entities
//! let bytes = required_capacity(&defs, capacity).unwrap();
//!
//! let mut cursor = Cursor::new(bytes);
//! let table = ViewTable::from_view_defs(&defs, capacity, &mut cursor).unwrap();
//! let position = table.strided::<f32>(ViewId(0)).unwrap();
//!
//! let (mut producer, mut consumer) = channel(bytes);
//!
//! // Producer side: write a snapshot, publish it.
//! producer.entity_view_mut(&position, 3).copy_from_slice(&[1.0, 2.0, 3.0]);
//! producer.publish();
//!
//! // Consumer side: adopt the latest snapshot, read it.
//! assert!(consumer.try_adopt_latest().is_fresh());
//! assert_eq!(consumer.entity_view(&position, 3), [1.0, 2.0, 3.0]);
//!
//! // Nothing new since: the previous snapshot stays readable.
//! assert!(!consumer.try_adopt_latest().is_fresh());
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the
//! prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `triptych-core` | IDs, element kinds, view definitions |
//! | [`layout`] | `triptych-layout` | Cursor allocator, handles, view tables |
//! | [`channel`] | `triptych-channel` | Regions, flags register, producer/consumer |
//! | [`engine`] | `triptych-engine` | Tick loop, frame pump, command ingress, transform schema |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types and IDs (`triptych-core`).
///
/// Element kinds, the sealed [`types::Element`] trait, and the schema
/// building blocks [`types::ViewDef`] / [`types::ViewShape`].
pub use triptych_core as types;

/// Deterministic layout of typed views (`triptych-layout`).
///
/// The [`layout::Cursor`] bump allocator, offset-descriptor handles,
/// and the schema-driven [`layout::ViewTable`].
pub use triptych_layout as layout;

/// The triple-buffered snapshot channel (`triptych-channel`).
///
/// [`channel::channel`] builds a fresh producer/consumer pair;
/// [`channel::resume`] rebuilds one over an existing
/// [`channel::BufferSet`].
pub use triptych_channel as channel;

/// Loop harness for the channel's two sides (`triptych-engine`).
///
/// The fixed-rate [`engine::TickLoop`], the presentation-paced
/// [`engine::FramePump`], and the canonical transform schema in
/// [`engine::transform`].
pub use triptych_engine as engine;

/// Common imports for typical Triptych usage.
///
/// ```rust
/// use triptych::prelude::*;
/// ```
///
/// This imports the most frequently used types: schema definitions,
/// the cursor and table, the channel constructors, and the loop
/// harness types.
pub mod prelude {
    // Core types
    pub use triptych_core::{ElemKind, Element, EntityId, TickId, ViewDef, ViewId, ViewShape};

    // Layout
    pub use triptych_layout::{
        required_capacity, Cursor, LayoutError, StridedHandle, ViewHandle, ViewTable,
    };

    // Channel
    pub use triptych_channel::{
        channel, resume, Adopt, BufferSet, ChannelError, Consumer, Producer,
    };

    // Engine
    pub use triptych_engine::{
        CommandSender, ConfigError, FramePump, LoopConfig, LoopMetrics, PumpMetrics, Simulate,
        SubmitError, TickLoop,
    };
}
