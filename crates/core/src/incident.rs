//! Incident and severity types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Ordinal urgency classification.
///
/// Variant order is significant: `Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Whether incidents of this severity are reconciled into the risk store.
    pub fn warrants_persistence(self) -> bool {
        self >= Self::High
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Idempotency key for one external incident: (source tag, external identifier).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalKey {
    pub source: String,
    pub external_id: String,
}

impl ExternalKey {
    pub fn new(source: impl Into<String>, external_id: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            external_id: external_id.into(),
        }
    }
}

impl fmt::Display for ExternalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.source, self.external_id)
    }
}

/// A unit of security case data fetched from an external system.
///
/// Incidents are produced fresh every cycle and dropped after processing.
/// `id` is ephemeral; `(source, external_id)` is the stable identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: String,
    pub severity: Severity,
    pub created_at: DateTime<Utc>,
    /// Source-system tag, e.g. "THEHIVE"
    pub source: String,
    pub external_id: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Incident {
    pub fn key(&self) -> ExternalKey {
        ExternalKey::new(self.source.clone(), self.external_id.clone())
    }

    /// The mutable fields handed to the risk store.
    pub fn risk_fields(&self) -> RiskFields {
        RiskFields {
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status.clone(),
            severity: self.severity,
            tags: self.tags.clone(),
            observed_at: self.created_at,
        }
    }
}

/// Mutable fields of a risk record, overwritten on every upsert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFields {
    pub title: String,
    pub description: String,
    pub status: String,
    pub severity: Severity,
    pub tags: Vec<String>,
    pub observed_at: DateTime<Utc>,
}
