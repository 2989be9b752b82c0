//! In-process risk store keyed by (source, external id).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use incident_core::{ExternalKey, Result, RiskFields, RiskStore, UpsertOutcome};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

/// A locally stored risk derived from an external incident.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskRecord {
    /// Local identity, assigned on insert and never changed
    pub id: Uuid,
    pub key: ExternalKey,
    pub fields: RiskFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Number of in-place updates since insert
    pub revision: u64,
}

/// Risk store backed by a map under a single write lock.
///
/// The lookup and the write happen under one lock acquisition, which gives
/// the per-key atomicity the sync engine relies on.
#[derive(Debug, Default)]
pub struct MemoryRiskStore {
    records: RwLock<HashMap<ExternalKey, RiskRecord>>,
}

impl MemoryRiskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &ExternalKey) -> Option<RiskRecord> {
        self.records.read().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// All records, oldest insert first.
    pub fn records(&self) -> Vec<RiskRecord> {
        let mut all: Vec<_> = self.records.read().values().cloned().collect();
        all.sort_by_key(|r| r.created_at);
        all
    }

    fn upsert(&self, key: &ExternalKey, fields: RiskFields) -> UpsertOutcome {
        let now = Utc::now();
        let mut records = self.records.write();

        match records.get_mut(key) {
            Some(existing) => {
                existing.fields = fields;
                existing.updated_at = now;
                existing.revision += 1;
                UpsertOutcome::Updated(existing.id)
            }
            None => {
                let id = Uuid::new_v4();
                records.insert(
                    key.clone(),
                    RiskRecord {
                        id,
                        key: key.clone(),
                        fields,
                        created_at: now,
                        updated_at: now,
                        revision: 0,
                    },
                );
                UpsertOutcome::Inserted(id)
            }
        }
    }
}

#[async_trait]
impl RiskStore for MemoryRiskStore {
    async fn upsert_by_external_key(
        &self,
        key: &ExternalKey,
        fields: RiskFields,
    ) -> Result<UpsertOutcome> {
        let outcome = self.upsert(key, fields);
        debug!(key = %key, inserted = outcome.is_insert(), "Upserted risk record");
        Ok(outcome)
    }
}
