//! Channel-specific error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur while constructing a channel.
///
/// These are configuration errors surfaced at setup time; steady-state
/// operation of the channel is infallible.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChannelError {
    /// The three regions of an adopted buffer set differ in length.
    ///
    /// Unequal regions would silently corrupt view resolution, so the
    /// constructor fails fast instead of deferring to the first read.
    MismatchedRegions {
        /// The observed byte lengths of the three regions.
        lengths: [usize; 3],
    },
    /// A producer or consumer derived from this buffer set is still
    /// live.
    ///
    /// Two live producers could resolve overlapping mutable slices
    /// over the same region, so a set can only be resumed after its
    /// previous halves are dropped.
    HalvesInUse,
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MismatchedRegions { lengths } => {
                write!(
                    f,
                    "buffer set regions differ in length: {} / {} / {} bytes",
                    lengths[0], lengths[1], lengths[2]
                )
            }
            Self::HalvesInUse => {
                write!(f, "a producer or consumer over this buffer set is still live")
            }
        }
    }
}

impl Error for ChannelError {}
