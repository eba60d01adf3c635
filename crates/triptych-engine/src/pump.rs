//! The consumer side, paced by the presentation rate.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use triptych_channel::{Adopt, Consumer};

use crate::config::ConfigError;
use crate::metrics::PumpMetrics;

/// Drives a [`Consumer`] once per presentation frame.
///
/// Each frame adopts the latest published snapshot (if any) and hands
/// the consumer to a present callback. When no new snapshot has been
/// published since the last frame the callback still runs, against
/// the snapshot adopted previously; the `Adopt` argument tells the
/// callback which case it is in.
pub struct FramePump {
    consumer: Consumer,
    metrics: PumpMetrics,
}

impl FramePump {
    /// Wrap a consumer for frame-paced adoption.
    pub fn new(consumer: Consumer) -> Self {
        Self {
            consumer,
            metrics: PumpMetrics::default(),
        }
    }

    /// Adopt the latest snapshot and present one frame.
    pub fn pump(&mut self, mut present: impl FnMut(&Consumer, Adopt)) {
        let adopt = self.consumer.try_adopt_latest();
        self.metrics.frames += 1;
        match adopt {
            Adopt::Fresh => self.metrics.fresh += 1,
            Adopt::NoNewData => self.metrics.reused += 1,
        }
        present(&self.consumer, adopt);
    }

    /// Present frames at `refresh_hz` until shutdown.
    ///
    /// Headless counterpart of a display-driven frame callback: the
    /// same pump-then-present step, paced by sleeping out the frame
    /// budget. A frame that overruns re-enters immediately.
    pub fn run(
        mut self,
        refresh_hz: f64,
        shutdown: Arc<AtomicBool>,
        mut present: impl FnMut(&Consumer, Adopt),
    ) -> Result<(Consumer, PumpMetrics), ConfigError> {
        if !refresh_hz.is_finite() || refresh_hz <= 0.0 {
            return Err(ConfigError::InvalidTickRate { rate: refresh_hz });
        }
        let budget = std::time::Duration::from_secs_f64(1.0 / refresh_hz);

        while !shutdown.load(Ordering::Acquire) {
            let frame_start = Instant::now();
            self.pump(&mut present);
            if let Some(remaining) = budget.checked_sub(frame_start.elapsed()) {
                thread::sleep(remaining);
            }
        }

        Ok((self.consumer, self.metrics))
    }

    /// The pump's counters so far.
    pub fn metrics(&self) -> &PumpMetrics {
        &self.metrics
    }

    /// Direct access to the wrapped consumer.
    pub fn consumer(&self) -> &Consumer {
        &self.consumer
    }

    /// Unwrap the consumer, discarding the counters.
    pub fn into_consumer(self) -> Consumer {
        self.consumer
    }
}
