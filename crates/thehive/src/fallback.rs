//! Deterministic fallback batch, used when TheHive is enabled but not configured.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use incident_core::{Incident, IncidentProvider, Result, Severity};
use uuid::Uuid;

use crate::types::SOURCE_TAG;

/// The fixed two-incident batch served in place of live data.
pub fn fallback_incidents() -> Vec<Incident> {
    let now = Utc::now();
    vec![
        Incident {
            id: Uuid::new_v4(),
            title: "Ransomware Detection (Mock)".to_string(),
            description:
                "Case #1234: Encrypted files detected on HR Server during automated daily scan"
                    .to_string(),
            status: "Open".to_string(),
            severity: Severity::High,
            created_at: now - Duration::hours(2),
            source: SOURCE_TAG.to_string(),
            external_id: "case_1234_mock".to_string(),
            tags: Vec::new(),
        },
        Incident {
            id: Uuid::new_v4(),
            title: "Suspicious Login Attempt (Mock)".to_string(),
            description: "Case #5678: Multiple failed login attempts from unusual IP detected"
                .to_string(),
            status: "In Progress".to_string(),
            severity: Severity::Critical,
            created_at: now - Duration::hours(1),
            source: SOURCE_TAG.to_string(),
            external_id: "case_5678_mock".to_string(),
            tags: Vec::new(),
        },
    ]
}

/// Provider that always serves the fallback batch. Never fails, never calls out.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackProvider;

#[async_trait]
impl IncidentProvider for FallbackProvider {
    fn name(&self) -> &str {
        "fallback"
    }

    async fn fetch_recent_incidents(&self) -> Result<Vec<Incident>> {
        Ok(fallback_incidents())
    }
}
