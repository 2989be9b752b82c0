//! Risk store capability.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::incident::{ExternalKey, RiskFields};

/// What an upsert did. Carries the local record id, which never changes
/// once a record exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted(Uuid),
    Updated(Uuid),
}

impl UpsertOutcome {
    pub fn id(&self) -> Uuid {
        match self {
            Self::Inserted(id) | Self::Updated(id) => *id,
        }
    }

    pub fn is_insert(&self) -> bool {
        matches!(self, Self::Inserted(_))
    }
}

/// Local risk persistence keyed by external identity.
///
/// Implementations provide per-key atomicity: concurrent upserts of the same
/// key never produce two records.
#[async_trait]
pub trait RiskStore: Send + Sync {
    /// Update the record for `key` in place, or insert one if none exists.
    async fn upsert_by_external_key(
        &self,
        key: &ExternalKey,
        fields: RiskFields,
    ) -> Result<UpsertOutcome>;
}
