//! TheHive incident provider.

use async_trait::async_trait;
use incident_core::{Error, Incident, IncidentProvider, Result};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use tracing::{debug, warn};
use validator::Validate;

use crate::config::TheHiveConfig;
use crate::fallback::fallback_incidents;
use crate::types::TheHiveResponse;

/// Upper bound on how much of an error response body reaches logs and metrics.
const MAX_ERROR_BODY_BYTES: usize = 512;

/// Cuts `body` to at most `max` bytes on a char boundary.
fn truncate_body(body: &str, max: usize) -> &str {
    if body.len() <= max {
        return body;
    }
    let mut end = max;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

/// How a provider instance answers fetches, decided once at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderMode {
    /// Integration switched off: empty batch, no network.
    Disabled,
    /// Enabled but missing URL or API key: fallback batch, no network.
    Fallback,
    /// Live calls against the configured instance.
    Live,
}

/// Fetches recent cases from TheHive's REST API.
///
/// Uses a pooled client with a whole-request timeout, so a fetch can never
/// hang the sync cycle.
#[derive(Clone)]
pub struct TheHiveProvider {
    config: TheHiveConfig,
    http_client: reqwest::Client,
    mode: ProviderMode,
}

impl TheHiveProvider {
    /// Creates a new provider. Fails only on invalid configuration.
    pub fn new(config: TheHiveConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| Error::config(format!("thehive: {}", e)))?;

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .pool_max_idle_per_host(config.max_idle_per_host)
            .pool_idle_timeout(config.idle_timeout())
            .build()
            .map_err(|e| Error::config(format!("thehive: failed to build HTTP client: {}", e)))?;

        let mode = if !config.enabled {
            ProviderMode::Disabled
        } else if config.is_configured() {
            ProviderMode::Live
        } else {
            ProviderMode::Fallback
        };

        debug!(mode = ?mode, "Created TheHive provider");

        Ok(Self {
            config,
            http_client,
            mode,
        })
    }

    pub fn mode(&self) -> ProviderMode {
        self.mode
    }

    /// Returns the configuration.
    pub fn config(&self) -> &TheHiveConfig {
        &self.config
    }

    /// One authenticated call to the case listing endpoint.
    async fn fetch_from_api(&self) -> Result<Vec<Incident>> {
        let (Some(url), Some(api_key)) = (self.config.cases_url(), self.config.api_key.as_deref())
        else {
            return Err(Error::config("thehive: live mode without url or api key"));
        };

        debug!(url = %url, "Fetching cases from TheHive");

        let response = self
            .http_client
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {}", api_key))
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| Error::fetch(format!("TheHive request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body = truncate_body(&body, MAX_ERROR_BODY_BYTES);
            warn!(status = %status, body = %body, "TheHive returned error status");
            return Err(Error::fetch(format!("TheHive returned {}: {}", status, body)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::fetch(format!("failed to read TheHive response: {}", e)))?;

        let parsed: TheHiveResponse = serde_json::from_str(&body)?;
        let fetched = parsed.data.len();
        let incidents = parsed.into_incidents();

        debug!(
            fetched = fetched,
            open = incidents.len(),
            "Decoded TheHive cases"
        );

        Ok(incidents)
    }
}

#[async_trait]
impl IncidentProvider for TheHiveProvider {
    fn name(&self) -> &str {
        "thehive"
    }

    async fn fetch_recent_incidents(&self) -> Result<Vec<Incident>> {
        match self.mode {
            ProviderMode::Disabled => Ok(Vec::new()),
            ProviderMode::Fallback => {
                debug!("TheHive not configured, serving fallback incidents");
                Ok(fallback_incidents())
            }
            ProviderMode::Live => self.fetch_from_api().await,
        }
    }
}
