//! Health derived from sync metrics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::metrics::SyncMetricsSnapshot;

/// A cycle older than this many intervals marks the worker as stale.
const STALE_AFTER_INTERVALS: u32 = 3;

/// Health status of the sync worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// No cycle has completed yet
    Starting,
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }

    pub fn is_serving(&self) -> bool {
        matches!(self, Self::Starting | Self::Healthy | Self::Degraded)
    }
}

/// Health report for an operational surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub total_syncs: u64,
    pub failed_syncs: u64,
    pub last_sync_time: Option<DateTime<Utc>>,
    pub message: Option<String>,
}

impl HealthReport {
    /// Classify a snapshot taken now.
    pub fn from_snapshot(snapshot: &SyncMetricsSnapshot, interval: Duration) -> Self {
        Self::at(snapshot, interval, Utc::now())
    }

    /// Classify a snapshot as of `now`.
    pub fn at(snapshot: &SyncMetricsSnapshot, interval: Duration, now: DateTime<Utc>) -> Self {
        let (status, message) = match snapshot.last_sync_time {
            None => (HealthStatus::Starting, None),
            Some(last) => {
                let stale_after = interval
                    .checked_mul(STALE_AFTER_INTERVALS)
                    .and_then(|d| chrono::Duration::from_std(d).ok())
                    .unwrap_or_else(|| chrono::Duration::days(365));

                if snapshot.successful_syncs == 0 {
                    (HealthStatus::Unhealthy, snapshot.last_error.clone())
                } else if snapshot.last_cycle_failed() {
                    (HealthStatus::Degraded, snapshot.last_error.clone())
                } else if now - last > stale_after {
                    (
                        HealthStatus::Degraded,
                        Some(format!("no cycle since {}", last.to_rfc3339())),
                    )
                } else {
                    (HealthStatus::Healthy, None)
                }
            }
        };

        Self {
            status,
            total_syncs: snapshot.total_syncs,
            failed_syncs: snapshot.failed_syncs,
            last_sync_time: snapshot.last_sync_time,
            message,
        }
    }
}
