//! Incident provider capability.

use async_trait::async_trait;

use crate::error::Result;
use crate::incident::Incident;

/// A source of recent external incidents.
///
/// Implementations return an unordered, bounded batch and must enforce their
/// own call timeout. A provider without endpoint or credentials returns its
/// fallback batch rather than an error; real I/O, auth and decode failures
/// are returned as errors so the engine can retry them.
#[async_trait]
pub trait IncidentProvider: Send + Sync {
    /// Short name used in log fields.
    fn name(&self) -> &str;

    /// Fetch the most recent known incidents.
    async fn fetch_recent_incidents(&self) -> Result<Vec<Incident>>;
}
