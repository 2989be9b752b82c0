//! Mock implementations for testing.

use async_trait::async_trait;
use incident_core::{
    Error, ExternalKey, Incident, IncidentProvider, Result, RiskFields, RiskStore, UpsertOutcome,
};
use parking_lot::Mutex;
use risk_store::MemoryRiskStore;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Provider that fails a scripted number of calls, then serves a fixed batch.
///
/// Also tracks how many fetches were in flight at once, so tests can check
/// that cycles never overlap.
pub struct ScriptedProvider {
    incidents: Mutex<Vec<Incident>>,
    remaining_failures: AtomicU32,
    calls: AtomicU32,
    in_flight: AtomicU32,
    max_in_flight: AtomicU32,
    delay: Mutex<Duration>,
}

impl ScriptedProvider {
    /// Always succeeds with `incidents`.
    pub fn new(incidents: Vec<Incident>) -> Arc<Self> {
        Self::failing(0, incidents)
    }

    /// Fails the first `failures` calls.
    pub fn failing(failures: u32, incidents: Vec<Incident>) -> Arc<Self> {
        Arc::new(Self {
            incidents: Mutex::new(incidents),
            remaining_failures: AtomicU32::new(failures),
            calls: AtomicU32::new(0),
            in_flight: AtomicU32::new(0),
            max_in_flight: AtomicU32::new(0),
            delay: Mutex::new(Duration::ZERO),
        })
    }

    /// Never succeeds.
    pub fn always_failing() -> Arc<Self> {
        Self::failing(u32::MAX, Vec::new())
    }

    /// Makes every fetch take `delay` before answering.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }

    /// Replaces the batch served by later fetches.
    pub fn set_incidents(&self, incidents: Vec<Incident>) {
        *self.incidents.lock() = incidents;
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_concurrent_calls(&self) -> u32 {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IncidentProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn fetch_recent_incidents(&self) -> Result<Vec<Incident>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let now_in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now_in_flight, Ordering::SeqCst);

        let delay = *self.delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let failed = self
            .remaining_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if failed {
            return Err(Error::fetch(format!("mock API error on call {}", call)));
        }
        Ok(self.incidents.lock().clone())
    }
}

/// Risk store that records every upsert and can be told to fail specific
/// external ids. Successful writes land in a real `MemoryRiskStore`.
#[derive(Default)]
pub struct RecordingStore {
    inner: MemoryRiskStore,
    upserts: Mutex<Vec<ExternalKey>>,
    failing_ids: Mutex<HashSet<String>>,
}

impl RecordingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every upsert of this external id fails with a persistence error.
    pub fn fail_on(&self, external_id: impl Into<String>) {
        self.failing_ids.lock().insert(external_id.into());
    }

    /// Every upsert call, including failed ones, in call order.
    pub fn upsert_calls(&self) -> Vec<ExternalKey> {
        self.upserts.lock().clone()
    }

    pub fn upsert_count(&self) -> usize {
        self.upserts.lock().len()
    }

    /// The backing store holding successfully written records.
    pub fn records(&self) -> &MemoryRiskStore {
        &self.inner
    }
}

#[async_trait]
impl RiskStore for RecordingStore {
    async fn upsert_by_external_key(
        &self,
        key: &ExternalKey,
        fields: RiskFields,
    ) -> Result<UpsertOutcome> {
        self.upserts.lock().push(key.clone());

        if self.failing_ids.lock().contains(&key.external_id) {
            return Err(Error::persistence(
                key.source.clone(),
                key.external_id.clone(),
                "mock store failure",
            ));
        }

        self.inner.upsert_by_external_key(key, fields).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::incident;
    use incident_core::Severity;

    #[tokio::test]
    async fn scripted_provider_fails_then_succeeds() {
        let provider = ScriptedProvider::failing(2, vec![incident(Severity::High, "a")]);

        assert!(provider.fetch_recent_incidents().await.is_err());
        assert!(provider.fetch_recent_incidents().await.is_err());
        let batch = provider.fetch_recent_incidents().await.unwrap();

        assert_eq!(batch.len(), 1);
        assert_eq!(provider.calls(), 3);
        assert_eq!(provider.max_concurrent_calls(), 1);
    }

    #[tokio::test]
    async fn recording_store_fails_selected_ids() {
        let store = RecordingStore::new();
        store.fail_on("bad");

        let good = incident(Severity::High, "good");
        let bad = incident(Severity::High, "bad");

        assert!(store
            .upsert_by_external_key(&good.key(), good.risk_fields())
            .await
            .is_ok());
        let err = store
            .upsert_by_external_key(&bad.key(), bad.risk_fields())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Persistence { .. }));
        assert_eq!(store.upsert_count(), 2);
        assert_eq!(store.records().len(), 1);
    }
}
