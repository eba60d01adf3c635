//! Loop performance counters.
//!
//! Both loops keep simple cumulative counters, returned to the caller
//! when the loop hands its channel half back. Nothing here is shared
//! or atomic — each struct belongs to exactly one loop.

/// Counters kept by the producer-side [`TickLoop`](crate::tick::TickLoop).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoopMetrics {
    /// Ticks executed.
    pub ticks: u64,
    /// Snapshots published (one per tick).
    pub publishes: u64,
    /// Ticks whose processing exceeded the tick budget, causing an
    /// immediate re-entry instead of a sleep.
    pub overruns: u64,
    /// Command batches drained from the ingress channel.
    pub command_batches: u64,
    /// Wall-clock duration of the most recent tick, in microseconds.
    pub last_tick_us: u64,
}

/// Counters kept by the consumer-side [`FramePump`](crate::pump::FramePump).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PumpMetrics {
    /// Frames presented.
    pub frames: u64,
    /// Frames that adopted a freshly published snapshot.
    pub fresh: u64,
    /// Frames that re-presented the previous snapshot (no new data).
    pub reused: u64,
}
