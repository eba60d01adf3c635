//! Bounded command ingress into the tick loop.
//!
//! Control traffic (spawn this, rotate that) flows from other threads
//! into the producer loop through a bounded crossbeam channel.
//! Submission never blocks: a full queue is reported to the caller
//! instead of stalling either loop.

use std::error::Error;
use std::fmt;

use crossbeam_channel::{Sender, TrySendError};

/// Error submitting a command batch to the tick loop.
#[derive(Debug, PartialEq, Eq)]
pub enum SubmitError {
    /// The tick loop has shut down.
    Shutdown,
    /// The command channel is full (back-pressure on control traffic;
    /// snapshot flow is unaffected).
    ChannelFull,
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shutdown => write!(f, "tick loop has shut down"),
            Self::ChannelFull => write!(f, "command channel full"),
        }
    }
}

impl Error for SubmitError {}

/// Handle for submitting command batches to a running [`TickLoop`].
///
/// Cloneable: any number of threads may submit. Batches are drained in
/// FIFO order at the start of each tick.
///
/// [`TickLoop`]: crate::tick::TickLoop
pub struct CommandSender<C> {
    tx: Sender<Vec<C>>,
}

impl<C> Clone for CommandSender<C> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<C> CommandSender<C> {
    pub(crate) fn new(tx: Sender<Vec<C>>) -> Self {
        Self { tx }
    }

    /// Submit a batch of commands for the next tick.
    pub fn submit(&self, commands: Vec<C>) -> Result<(), SubmitError> {
        self.tx.try_send(commands).map_err(|e| match e {
            TrySendError::Full(_) => SubmitError::ChannelFull,
            TrySendError::Disconnected(_) => SubmitError::Shutdown,
        })
    }
}
