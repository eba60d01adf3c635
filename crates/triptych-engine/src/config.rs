//! Loop configuration, validation, and error types.

use std::error::Error;
use std::fmt;
use std::time::Duration;

/// Configuration for [`TickLoop`](crate::tick::TickLoop).
///
/// Validated at construction; all values are immutable after creation.
#[derive(Clone, Debug)]
pub struct LoopConfig {
    /// Target producer tick rate in Hz. Default: 60.
    ///
    /// The per-tick budget is `1 / tick_rate_hz`; a tick that runs over
    /// its budget re-enters immediately rather than accumulating debt.
    pub tick_rate_hz: f64,
    /// Capacity of the bounded command ingress channel. Default: 64.
    ///
    /// Submissions beyond this return
    /// [`SubmitError::ChannelFull`](crate::ingress::SubmitError) rather
    /// than blocking the submitting thread.
    pub max_ingress_queue: usize,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60.0,
            max_ingress_queue: 64,
        }
    }
}

impl LoopConfig {
    /// Check structural invariants, failing fast on nonsense values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tick_rate_hz.is_finite() || self.tick_rate_hz <= 0.0 {
            return Err(ConfigError::InvalidTickRate {
                rate: self.tick_rate_hz,
            });
        }
        if self.max_ingress_queue == 0 {
            return Err(ConfigError::ZeroIngressQueue);
        }
        Ok(())
    }

    /// The per-tick time budget.
    pub fn tick_budget(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate_hz)
    }

    /// The fixed timestep handed to the simulation, in seconds.
    pub fn dt(&self) -> f32 {
        (1.0 / self.tick_rate_hz) as f32
    }
}

/// Errors from [`LoopConfig::validate`].
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// The tick rate is not a positive finite number.
    InvalidTickRate {
        /// The offending rate.
        rate: f64,
    },
    /// The ingress queue capacity is zero, which would make command
    /// submission impossible.
    ZeroIngressQueue,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTickRate { rate } => {
                write!(f, "tick rate must be positive and finite (got {rate})")
            }
            Self::ZeroIngressQueue => {
                write!(f, "ingress queue capacity must be at least 1")
            }
        }
    }
}

impl Error for ConfigError {}
