//! Shared test fixtures for the Triptych workspace.

pub mod fixtures;

pub use fixtures::{stamped_channel, stamped_defs, StampedViews};
