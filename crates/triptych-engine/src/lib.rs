//! Producer/consumer loop harness for the Triptych snapshot channel.
//!
//! The channel itself is cadence-agnostic; this crate supplies the two
//! loop skeletons that drive it:
//!
//! - [`TickLoop`] — the producer side: an unbounded fixed-rate loop
//!   that drains a bounded command channel, runs the application's
//!   [`Simulate`] step into the write view, publishes, and sleeps for
//!   whatever remains of the tick budget (re-entering immediately when
//!   behind schedule).
//! - [`FramePump`] — the consumer side: adopt-then-present, driven by
//!   the consumer context's own cadence (a display refresh callback in
//!   the motivating application), with a headless fixed-rate runner for
//!   tests and demos.
//!
//! Neither loop ever blocks on the other; the channel's freshest-wins
//! semantics absorb any rate mismatch.
//!
//! The [`transform`] module carries the canonical per-entity transform
//! schema (positions, quaternions, matrices) that the motivating
//! application ships through the channel.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod config;
pub mod ingress;
pub mod metrics;
pub mod pump;
pub mod tick;
pub mod transform;

pub use config::{ConfigError, LoopConfig};
pub use ingress::{CommandSender, SubmitError};
pub use metrics::{LoopMetrics, PumpMetrics};
pub use pump::FramePump;
pub use tick::{Simulate, TickLoop};
