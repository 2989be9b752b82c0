//! TheHive connection configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

/// TheHive adapter configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TheHiveConfig {
    /// Disabled adapters return an empty batch without calling out
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Base URL, e.g. "https://thehive.internal:9000"
    #[validate(url)]
    #[serde(default)]
    pub url: Option<String>,
    /// Bearer token
    #[serde(default)]
    pub api_key: Option<String>,
    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Idle pooled connections kept per host
    #[serde(default = "default_max_idle_per_host")]
    pub max_idle_per_host: usize,
    /// Seconds before an idle pooled connection is closed
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_idle_per_host() -> usize {
    2
}

fn default_idle_timeout_secs() -> u64 {
    90
}

impl Default for TheHiveConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            url: None,
            api_key: None,
            timeout_secs: default_timeout_secs(),
            max_idle_per_host: default_max_idle_per_host(),
            idle_timeout_secs: default_idle_timeout_secs(),
        }
    }
}

impl TheHiveConfig {
    /// Config pointing at a live instance.
    pub fn with_endpoint(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// True when both endpoint and credentials are present.
    pub fn is_configured(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.url) && present(&self.api_key)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// The case listing endpoint: newest 50 cases first.
    pub fn cases_url(&self) -> Option<String> {
        self.url
            .as_deref()
            .map(|base| format!("{}/api/case?limit=50&sort=-createdAt", base.trim_end_matches('/')))
    }
}
