//! The fixed-rate producer loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crossbeam_channel::Receiver;

use triptych_channel::Producer;
use triptych_core::TickId;

use crate::config::{ConfigError, LoopConfig};
use crate::ingress::CommandSender;
use crate::metrics::LoopMetrics;

/// The application's per-tick state update.
///
/// Implementations write a complete snapshot into the producer's write
/// view each tick; the loop publishes it afterwards. The write view's
/// previous contents are whatever snapshot was written into that
/// region two publishes ago, so a step that only touches some views
/// must still leave every view it owns in a consistent state.
pub trait Simulate {
    /// Control commands this simulation accepts from other threads.
    type Command: Send;

    /// Advance the simulation by `dt` seconds and write the resulting
    /// snapshot through `writer`.
    fn tick(
        &mut self,
        writer: &mut Producer,
        commands: Vec<Self::Command>,
        tick: TickId,
        dt: f32,
    );
}

/// The producer side of a channel, driven at a fixed rate.
///
/// Owns the [`Producer`] and the simulation. Per tick: drain the
/// ingress channel, run [`Simulate::tick`], publish, then sleep for
/// the remaining budget. A tick that overruns its budget re-enters
/// immediately — the loop idles only when ahead of schedule, and that
/// idling is a scheduling delay, never a wait on the consumer.
pub struct TickLoop<S: Simulate> {
    producer: Producer,
    sim: S,
    cmd_rx: Receiver<Vec<S::Command>>,
    shutdown: Arc<AtomicBool>,
    config: LoopConfig,
    metrics: LoopMetrics,
    tick: TickId,
}

impl<S: Simulate> TickLoop<S> {
    /// Build a tick loop and its command ingress handle.
    ///
    /// The loop terminates when `shutdown` becomes true; the flag is
    /// shared so the owning context can stop the loop from outside.
    pub fn new(
        producer: Producer,
        sim: S,
        config: LoopConfig,
        shutdown: Arc<AtomicBool>,
    ) -> Result<(Self, CommandSender<S::Command>), ConfigError> {
        config.validate()?;
        let (tx, rx) = crossbeam_channel::bounded(config.max_ingress_queue);
        let tick_loop = Self {
            producer,
            sim,
            cmd_rx: rx,
            shutdown,
            config,
            metrics: LoopMetrics::default(),
            tick: TickId(0),
        };
        Ok((tick_loop, CommandSender::new(tx)))
    }

    /// Run until shutdown. Consumes self and returns the simulation,
    /// the producer half, and the loop's counters so the caller can
    /// recover them for teardown or reuse.
    pub fn run(mut self) -> (S, Producer, LoopMetrics) {
        let budget = self.config.tick_budget();
        let dt = self.config.dt();

        loop {
            if self.shutdown.load(Ordering::Acquire) {
                break;
            }

            let tick_start = Instant::now();

            let commands = self.drain_commands();
            self.tick = self.tick.next();
            self.sim.tick(&mut self.producer, commands, self.tick, dt);
            self.producer.publish();

            self.metrics.ticks += 1;
            self.metrics.publishes += 1;

            let elapsed = tick_start.elapsed();
            self.metrics.last_tick_us = elapsed.as_micros() as u64;
            match budget.checked_sub(elapsed) {
                Some(remaining) => thread::sleep(remaining),
                None => self.metrics.overruns += 1,
            }
        }

        (self.sim, self.producer, self.metrics)
    }

    /// Execute exactly one tick, without pacing or shutdown checks.
    ///
    /// Test seam: drives the same drain/step/publish path as [`run`]
    /// under the caller's control.
    ///
    /// [`run`]: TickLoop::run
    pub fn step(&mut self) {
        let dt = self.config.dt();
        let commands = self.drain_commands();
        self.tick = self.tick.next();
        self.sim.tick(&mut self.producer, commands, self.tick, dt);
        self.producer.publish();
        self.metrics.ticks += 1;
        self.metrics.publishes += 1;
    }

    fn drain_commands(&mut self) -> Vec<S::Command> {
        let mut commands = Vec::new();
        while let Ok(batch) = self.cmd_rx.try_recv() {
            self.metrics.command_batches += 1;
            commands.extend(batch);
        }
        commands
    }

    /// The loop's counters so far.
    pub fn metrics(&self) -> &LoopMetrics {
        &self.metrics
    }

    /// The most recently executed tick.
    pub fn current_tick(&self) -> TickId {
        self.tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triptych_channel::channel;
    use triptych_layout::{Cursor, ViewHandle};

    struct CounterSim {
        handle: ViewHandle<u32>,
        applied: Vec<u32>,
    }

    impl Simulate for CounterSim {
        type Command = u32;

        fn tick(&mut self, writer: &mut Producer, commands: Vec<u32>, tick: TickId, _dt: f32) {
            self.applied.extend(&commands);
            let view = writer.view_mut(self.handle);
            view[0] = tick.0 as u32;
            view[1] = self.applied.iter().sum();
        }
    }

    fn counter_loop() -> (TickLoop<CounterSim>, CommandSender<u32>, ViewHandle<u32>) {
        let mut cursor = Cursor::new(8);
        let handle = cursor.alloc::<u32>(2).unwrap();
        let (producer, _consumer) = channel(8);
        let sim = CounterSim {
            handle,
            applied: Vec::new(),
        };
        let shutdown = Arc::new(AtomicBool::new(false));
        let (tick_loop, sender) =
            TickLoop::new(producer, sim, LoopConfig::default(), shutdown).unwrap();
        (tick_loop, sender, handle)
    }

    #[test]
    fn step_advances_tick_and_publishes() {
        let (mut tick_loop, _sender, _) = counter_loop();
        tick_loop.step();
        tick_loop.step();
        assert_eq!(tick_loop.current_tick(), TickId(2));
        assert_eq!(tick_loop.metrics().publishes, 2);
    }

    #[test]
    fn commands_are_drained_before_the_step() {
        let (mut tick_loop, sender, _) = counter_loop();
        sender.submit(vec![5, 7]).unwrap();
        sender.submit(vec![1]).unwrap();
        tick_loop.step();
        assert_eq!(tick_loop.metrics().command_batches, 2);
        assert_eq!(tick_loop.sim.applied, vec![5, 7, 1]);
    }

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let mut cursor = Cursor::new(8);
        let handle = cursor.alloc::<u32>(2).unwrap();
        let (producer, _consumer) = channel(8);
        let sim = CounterSim {
            handle,
            applied: Vec::new(),
        };
        let config = LoopConfig {
            tick_rate_hz: 0.0,
            ..LoopConfig::default()
        };
        let result = TickLoop::new(producer, sim, config, Arc::new(AtomicBool::new(false)));
        assert!(matches!(result, Err(ConfigError::InvalidTickRate { .. })));
    }

    #[test]
    fn run_stops_on_shutdown_and_returns_parts() {
        let mut cursor = Cursor::new(8);
        let handle = cursor.alloc::<u32>(2).unwrap();
        let (producer, mut consumer) = channel(8);
        let sim = CounterSim {
            handle,
            applied: Vec::new(),
        };
        let shutdown = Arc::new(AtomicBool::new(false));
        let config = LoopConfig {
            tick_rate_hz: 1000.0,
            ..LoopConfig::default()
        };
        let (tick_loop, _sender) =
            TickLoop::new(producer, sim, config, Arc::clone(&shutdown)).unwrap();

        let handle_thread = thread::spawn(move || tick_loop.run());
        // Let it tick a few times, then stop it.
        thread::sleep(std::time::Duration::from_millis(20));
        shutdown.store(true, Ordering::Release);
        let (_sim, _producer, metrics) = handle_thread.join().unwrap();

        assert!(metrics.ticks > 0);
        assert_eq!(metrics.ticks, metrics.publishes);
        assert!(consumer.try_adopt_latest().is_fresh());
        assert!(consumer.view(handle)[0] > 0);
    }
}
