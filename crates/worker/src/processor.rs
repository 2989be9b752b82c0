//! Severity-gated reconciliation of incidents into the risk store.

use incident_core::{Incident, Result, RiskStore, UpsertOutcome};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// What processing one incident did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Below the persistence threshold; storage untouched
    Skipped,
    Inserted(Uuid),
    Updated(Uuid),
}

impl From<UpsertOutcome> for ProcessOutcome {
    fn from(outcome: UpsertOutcome) -> Self {
        match outcome {
            UpsertOutcome::Inserted(id) => Self::Inserted(id),
            UpsertOutcome::Updated(id) => Self::Updated(id),
        }
    }
}

/// Decides whether an incident is persisted and performs the idempotent upsert.
#[derive(Clone)]
pub struct IncidentProcessor {
    store: Arc<dyn RiskStore>,
}

impl IncidentProcessor {
    pub fn new(store: Arc<dyn RiskStore>) -> Self {
        Self { store }
    }

    /// LOW and MEDIUM are no-ops. HIGH and CRITICAL are upserted under
    /// (source, external id), so repeated fetches never duplicate records.
    pub async fn process(&self, incident: &Incident) -> Result<ProcessOutcome> {
        if !incident.severity.warrants_persistence() {
            debug!(
                key = %incident.key(),
                severity = %incident.severity,
                "Skipping incident below persistence threshold"
            );
            return Ok(ProcessOutcome::Skipped);
        }

        let outcome = self
            .store
            .upsert_by_external_key(&incident.key(), incident.risk_fields())
            .await?;

        Ok(outcome.into())
    }
}
