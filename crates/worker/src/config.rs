//! Sync engine configuration and backoff schedule.

use incident_core::{Error, Result};
use std::time::Duration;

/// Sync engine configuration. Immutable once the engine is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Retries after the first failed fetch of a cycle
    pub max_retries: u32,
    /// Delay before the first retry
    pub initial_backoff: Duration,
    /// Upper bound on any single retry delay
    pub max_backoff: Duration,
    /// Time between cycle starts
    pub interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(16),
            interval: Duration::from_secs(60),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.initial_backoff.is_zero() {
            return Err(Error::config("initial_backoff must be greater than zero"));
        }
        if self.max_backoff < self.initial_backoff {
            return Err(Error::config(format!(
                "max_backoff ({:?}) must not be below initial_backoff ({:?})",
                self.max_backoff, self.initial_backoff
            )));
        }
        if self.interval.is_zero() {
            return Err(Error::config("interval must be greater than zero"));
        }
        Ok(())
    }

    /// Fetch attempts per cycle: the first try plus every retry.
    pub fn total_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before the 1-based `attempt`.
    ///
    /// `min(initial_backoff * 2^(attempt - 2), max_backoff)` for attempt >= 2,
    /// zero for the first attempt.
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        if attempt < 2 {
            return Duration::ZERO;
        }

        2u32.checked_pow(attempt - 2)
            .and_then(|factor| self.initial_backoff.checked_mul(factor))
            .map_or(self.max_backoff, |backoff| backoff.min(self.max_backoff))
    }
}
