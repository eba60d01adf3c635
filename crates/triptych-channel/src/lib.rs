//! Wait-free triple-buffered snapshot channel.
//!
//! One producer hands versioned snapshots of structured state to one
//! consumer across three equally-sized shared regions and a single
//! atomic control word. Neither side ever blocks on the other, and the
//! consumer can never observe a torn snapshot.
//!
//! # Architecture
//!
//! ```text
//! Producer                    control word                   Consumer
//!    |                   ┌──────────────────┐                   |
//!    |  plain stores →   │ changed | t w r  │   ← Acquire load  |
//!    |  into write role  └──────────────────┘                   |
//!    | publish(): CAS write↔temp, set changed                   |
//!    |              try_adopt_latest(): CAS read↔temp, clear ───|
//!    |                                                          |
//!    └── region[w] ──────── region[t] (conveyor) ── region[r] ──┘
//! ```
//!
//! Buffer contents never move; only the role labels rotate. The
//! {read, write, temp} indices are a permutation of {0, 1, 2} at every
//! observable instant, so the producer's in-progress writes and the
//! consumer's in-progress reads always target disjoint regions. At
//! most one undelivered snapshot is buffered: publishing twice before
//! one adoption leaves only the most recent visible (freshest wins).
//!
//! Both sides resolve [`ViewHandle`](triptych_layout::ViewHandle)s from
//! `triptych-layout` against their current role's region; the handles
//! are derived independently on each side from a shared schema, never
//! transmitted.
//!
//! This is the one crate in the workspace that contains `unsafe` code,
//! confined to slice resolution in [`region`] and the claim-bypassing
//! raw constructor [`BufferSet::from_parts`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod channel;
pub mod error;
pub mod flags;
pub mod region;

pub use channel::{channel, resume, Adopt, BufferSet, Consumer, Producer};
pub use error::ChannelError;
pub use flags::Flags;
pub use region::{Region, SharedRegion};
