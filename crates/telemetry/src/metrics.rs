//! Sync cycle metrics.
//!
//! One `SyncMetrics` is owned by each engine. Only the engine's background
//! task records into it; any number of observers take snapshots.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default)]
struct MetricsState {
    total_syncs: u64,
    successful_syncs: u64,
    failed_syncs: u64,
    last_sync_time: Option<DateTime<Utc>>,
    last_error: Option<String>,
    last_error_time: Option<DateTime<Utc>>,
}

/// Counters describing completed sync cycles.
///
/// All six fields live behind one lock so a snapshot never mixes values
/// from before and after an update.
#[derive(Debug, Default)]
pub struct SyncMetrics {
    state: RwLock<MetricsState>,
}

impl SyncMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one successful cycle, however many attempts it took.
    pub fn record_success(&self, at: DateTime<Utc>) {
        let mut state = self.state.write();
        state.total_syncs += 1;
        state.successful_syncs += 1;
        state.last_sync_time = Some(at);
    }

    /// Records one failed cycle after retries ran out.
    pub fn record_failure(&self, error: impl Into<String>, at: DateTime<Utc>) {
        let mut state = self.state.write();
        state.total_syncs += 1;
        state.failed_syncs += 1;
        state.last_sync_time = Some(at);
        state.last_error = Some(error.into());
        state.last_error_time = Some(at);
    }

    /// Takes a consistent point-in-time copy.
    pub fn snapshot(&self) -> SyncMetricsSnapshot {
        let state = self.state.read();
        SyncMetricsSnapshot {
            total_syncs: state.total_syncs,
            successful_syncs: state.successful_syncs,
            failed_syncs: state.failed_syncs,
            last_sync_time: state.last_sync_time,
            last_error: state.last_error.clone(),
            last_error_time: state.last_error_time,
        }
    }
}

/// A snapshot of sync metrics at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncMetricsSnapshot {
    pub total_syncs: u64,
    pub successful_syncs: u64,
    pub failed_syncs: u64,
    pub last_sync_time: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub last_error_time: Option<DateTime<Utc>>,
}

impl SyncMetricsSnapshot {
    /// Whether the most recent cycle was the failure recorded in `last_error`.
    pub fn last_cycle_failed(&self) -> bool {
        self.last_sync_time.is_some() && self.last_error_time == self.last_sync_time
    }
}
