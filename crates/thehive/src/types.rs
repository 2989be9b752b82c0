//! TheHive wire types and their mapping onto domain incidents.

use chrono::DateTime;
use incident_core::{Error, Incident, Result, Severity};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;
use uuid::Uuid;

/// Source tag stamped on every incident coming from TheHive.
pub const SOURCE_TAG: &str = "THEHIVE";

/// Case statuses that are never forwarded.
const CLOSED_STATUSES: &[&str] = &["Closed", "Resolved"];

/// A case as returned by `GET /api/case`.
///
/// Missing and `null` fields decode to their empty value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TheHiveCase {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// 1=Low, 2=Medium, 3=High, 4=Critical
    #[serde(default, deserialize_with = "null_as_default")]
    pub severity: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    /// Epoch milliseconds
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Envelope around a case listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TheHiveResponse {
    pub data: Vec<TheHiveCase>,
    #[serde(default)]
    pub success: bool,
}

/// Map the vendor 1..4 scale onto the domain scale. Unknown values read as Low.
pub fn map_severity(level: i64) -> Severity {
    match level {
        2 => Severity::Medium,
        3 => Severity::High,
        4 => Severity::Critical,
        _ => Severity::Low,
    }
}

impl TheHiveCase {
    pub fn is_closed(&self) -> bool {
        CLOSED_STATUSES
            .iter()
            .any(|s| s.eq_ignore_ascii_case(self.status.trim()))
    }

    /// Convert into a domain incident. Fails for a case without an id or
    /// with an out-of-range `createdAt`.
    pub fn into_incident(self) -> Result<Incident> {
        if self.id.trim().is_empty() {
            return Err(Error::malformed("case has no id"));
        }

        let created_at = DateTime::from_timestamp_millis(self.created_at).ok_or_else(|| {
            Error::malformed(format!(
                "case {} has out-of-range createdAt {}",
                self.id, self.created_at
            ))
        })?;

        Ok(Incident {
            id: Uuid::new_v4(),
            title: self.title,
            description: self.description,
            status: self.status,
            severity: map_severity(self.severity),
            created_at,
            source: SOURCE_TAG.to_string(),
            external_id: self.id,
            tags: self.tags,
        })
    }
}

impl TheHiveResponse {
    /// Open cases as incidents. Closed and resolved cases are dropped
    /// regardless of severity. A case that cannot be converted is skipped
    /// with a warning; the rest of the batch is kept.
    pub fn into_incidents(self) -> Vec<Incident> {
        self.data
            .into_iter()
            .filter(|case| !case.is_closed())
            .filter_map(|case| {
                let id = case.id.clone();
                case.into_incident()
                    .map_err(|e| {
                        warn!(case_id = %id, error = %e, "Skipping unconvertible TheHive case")
                    })
                    .ok()
            })
            .collect()
    }
}
