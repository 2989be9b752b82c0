//! Incident sync engine.
//!
//! One background task per engine runs a cycle immediately on start, then
//! one per interval tick until cancelled:
//!
//! 1. Fetch recent incidents from the provider, retrying with capped
//!    exponential backoff
//! 2. Reconcile each incident through the processor (per-incident isolation)
//! 3. Record exactly one success or failure in the metrics
//!
//! Cycles never overlap. Ticks that elapse during a long cycle are skipped.

use chrono::Utc;
use incident_core::{Incident, IncidentProvider, Result};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use telemetry::{SyncMetrics, SyncMetricsSnapshot};
use tokio::sync::oneshot;
use tokio::time::{interval, sleep, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::EngineConfig;
use crate::processor::{IncidentProcessor, ProcessOutcome};

/// Engine lifecycle. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Running,
    Stopping,
    Stopped,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Per-incident tallies for a successful cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Fetch attempts used, including the successful one
    pub attempts: u32,
    pub fetched: usize,
    /// Inserted or updated in the risk store
    pub persisted: usize,
    /// Below the persistence threshold
    pub skipped: usize,
    /// Store write failed; incident dropped for this cycle
    pub failed: usize,
}

/// Result of one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    Succeeded(CycleReport),
    /// Every attempt failed; `error` is the last one
    Failed { attempts: u32, error: String },
    /// Shutdown arrived during backoff; not recorded in metrics
    Cancelled { attempts: u32 },
}

impl CycleOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }

    pub fn attempts(&self) -> u32 {
        match self {
            Self::Succeeded(report) => report.attempts,
            Self::Failed { attempts, .. } | Self::Cancelled { attempts } => *attempts,
        }
    }
}

/// Fires once when the engine's background task has fully stopped.
#[derive(Debug)]
pub struct Completion {
    rx: oneshot::Receiver<()>,
}

impl Completion {
    /// Waits for the background task to reach `Stopped`.
    pub async fn wait(self) {
        // A dropped sender also means the task is gone.
        let _ = self.rx.await;
    }
}

/// Periodic incident synchronization worker.
pub struct SyncEngine {
    provider: Arc<dyn IncidentProvider>,
    processor: IncidentProcessor,
    config: EngineConfig,
    metrics: SyncMetrics,
    state: Mutex<EngineState>,
    /// Serializes cycles, including ones driven through `run_cycle_with_retry`
    cycle_lock: tokio::sync::Mutex<()>,
}

impl SyncEngine {
    /// Builds an idle engine. Nothing runs until `start`.
    pub fn new(
        provider: Arc<dyn IncidentProvider>,
        processor: IncidentProcessor,
        config: EngineConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            provider,
            processor,
            config,
            metrics: SyncMetrics::new(),
            state: Mutex::new(EngineState::Idle),
            cycle_lock: tokio::sync::Mutex::new(()),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> EngineState {
        *self.state.lock()
    }

    /// Consistent point-in-time copy of the cycle counters.
    pub fn metrics_snapshot(&self) -> SyncMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Spawns the background task.
    ///
    /// Returns `None` without doing anything unless the engine is `Idle`.
    /// Must be called within a Tokio runtime.
    pub fn start(self: &Arc<Self>, cancel: CancellationToken) -> Option<Completion> {
        {
            let mut state = self.state.lock();
            if *state != EngineState::Idle {
                debug!(state = %*state, "Sync engine already started, ignoring start");
                return None;
            }
            *state = EngineState::Running;
        }

        let (done_tx, done_rx) = oneshot::channel();
        let engine = Arc::clone(self);

        tokio::spawn(async move {
            engine.run(cancel).await;
            let _ = done_tx.send(());
        });

        Some(Completion { rx: done_rx })
    }

    /// Main loop: first tick fires immediately, then every `interval`.
    async fn run(&self, cancel: CancellationToken) {
        info!(
            provider = self.provider.name(),
            interval_secs = self.config.interval.as_secs(),
            max_retries = self.config.max_retries,
            "Sync engine starting"
        );

        let mut ticker = interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            // An in-flight fetch is allowed to finish; the state flips to
            // Stopping as soon as cancellation is seen.
            let cycle = self.run_cycle(&cancel);
            tokio::pin!(cycle);
            tokio::select! {
                biased;
                _ = &mut cycle => {}
                _ = cancel.cancelled() => {
                    self.set_state(EngineState::Stopping);
                    cycle.await;
                }
            }
        }

        self.set_state(EngineState::Stopping);
        drop(ticker);
        self.set_state(EngineState::Stopped);

        info!(provider = self.provider.name(), "Sync engine stopped");
    }

    fn set_state(&self, next: EngineState) {
        let mut state = self.state.lock();
        // Stopped is terminal.
        if *state != EngineState::Stopped {
            *state = next;
        }
    }

    /// Runs one cycle outside the periodic loop, with no cancellation.
    ///
    /// Waits for any in-flight cycle first.
    pub async fn run_cycle_with_retry(&self) -> CycleOutcome {
        self.run_cycle(&CancellationToken::new()).await
    }

    async fn run_cycle(&self, cancel: &CancellationToken) -> CycleOutcome {
        let _cycle = self.cycle_lock.lock().await;
        let started = Instant::now();
        let total_attempts = self.config.total_attempts();
        let mut last_error = None;
        let mut attempts = 0;

        debug!(provider = self.provider.name(), "Sync cycle starting");

        for attempt in 1..=total_attempts {
            if attempt > 1 {
                let backoff = self.config.backoff_for_attempt(attempt);
                warn!(
                    attempt = attempt,
                    backoff_ms = backoff.as_millis() as u64,
                    "Retrying incident fetch"
                );

                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        info!(attempts = attempts, "Sync cycle cancelled during backoff");
                        return CycleOutcome::Cancelled { attempts };
                    }
                    _ = sleep(backoff) => {}
                }
            }

            attempts = attempt;
            match self.provider.fetch_recent_incidents().await {
                Ok(incidents) => {
                    let report = self.process_batch(&incidents, attempt).await;
                    self.metrics.record_success(Utc::now());

                    info!(
                        attempts = report.attempts,
                        fetched = report.fetched,
                        persisted = report.persisted,
                        skipped = report.skipped,
                        failed = report.failed,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Sync cycle succeeded"
                    );
                    return CycleOutcome::Succeeded(report);
                }
                Err(e) => {
                    warn!(
                        attempt = attempt,
                        code = e.code(),
                        error = %e,
                        "Incident fetch failed"
                    );
                    last_error = Some(e);
                }
            }
        }

        let error = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no fetch attempt was made".to_string());
        self.metrics.record_failure(error.clone(), Utc::now());

        error!(
            attempts = attempts,
            error = %error,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Sync cycle failed, retrying at next tick"
        );

        CycleOutcome::Failed { attempts, error }
    }

    /// Processes every incident; a failed write only drops that incident.
    async fn process_batch(&self, incidents: &[Incident], attempts: u32) -> CycleReport {
        let mut report = CycleReport {
            attempts,
            fetched: incidents.len(),
            ..CycleReport::default()
        };

        for incident in incidents {
            match self.processor.process(incident).await {
                Ok(ProcessOutcome::Skipped) => report.skipped += 1,
                Ok(outcome) => {
                    debug!(key = %incident.key(), outcome = ?outcome, "Reconciled incident");
                    report.persisted += 1;
                }
                Err(e) => {
                    warn!(
                        source = %incident.source,
                        external_id = %incident.external_id,
                        code = e.code(),
                        error = %e,
                        "Failed to persist incident, skipping"
                    );
                    report.failed += 1;
                }
            }
        }

        report
    }
}
