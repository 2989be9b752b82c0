//! Test fixtures: incidents and TheHive payloads.

use chrono::Utc;
use incident_core::{Incident, Severity};
use uuid::Uuid;

/// A THEHIVE-sourced incident with the given severity and external id.
pub fn incident(severity: Severity, external_id: &str) -> Incident {
    Incident {
        id: Uuid::new_v4(),
        title: format!("Test incident {}", external_id),
        description: "Generated by fixtures".to_string(),
        status: "Open".to_string(),
        severity,
        created_at: Utc::now(),
        source: "THEHIVE".to_string(),
        external_id: external_id.to_string(),
        tags: Vec::new(),
    }
}

/// One incident per severity level, external ids "ext-low" .. "ext-critical".
pub fn one_of_each_severity() -> Vec<Incident> {
    vec![
        incident(Severity::Low, "ext-low"),
        incident(Severity::Medium, "ext-medium"),
        incident(Severity::High, "ext-high"),
        incident(Severity::Critical, "ext-critical"),
    ]
}

/// A TheHive case object.
pub fn thehive_case(id: &str, severity: i64, status: &str) -> serde_json::Value {
    let now = Utc::now().timestamp_millis();
    serde_json::json!({
        "id": id,
        "title": format!("Case {}", id),
        "description": format!("Description for {}", id),
        "severity": severity,
        "status": status,
        "createdAt": now,
        "updatedAt": now,
        "tags": ["soc", "automated"]
    })
}

/// A `GET /api/case` response body.
pub fn thehive_response(cases: Vec<serde_json::Value>) -> String {
    serde_json::json!({
        "data": cases,
        "success": true
    })
    .to_string()
}
