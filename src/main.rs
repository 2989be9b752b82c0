//! Incident Sync
//!
//! Periodic worker that pulls recent cases from TheHive and reconciles the
//! HIGH and CRITICAL ones into the local risk store:
//! - Bounded exponential retry per cycle
//! - Idempotent upserts keyed by (source, external id)
//! - Cycle metrics and a health summary logged on shutdown

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use risk_store::MemoryRiskStore;
use telemetry::{init_tracing_from_env, HealthReport};
use thehive::{TheHiveConfig, TheHiveProvider};
use worker::{EngineConfig, IncidentProcessor, SyncEngine};

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct AppConfig {
    #[serde(default)]
    thehive: TheHiveConfig,

    #[serde(default)]
    sync: SyncSettings,
}

/// Sync schedule, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SyncSettings {
    #[serde(default = "default_max_retries")]
    max_retries: u32,
    #[serde(default = "default_initial_backoff_secs")]
    initial_backoff_secs: u64,
    #[serde(default = "default_max_backoff_secs")]
    max_backoff_secs: u64,
    #[serde(default = "default_interval_secs")]
    interval_secs: u64,
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_backoff_secs() -> u64 {
    1
}

fn default_max_backoff_secs() -> u64 {
    16
}

fn default_interval_secs() -> u64 {
    60
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_secs: default_initial_backoff_secs(),
            max_backoff_secs: default_max_backoff_secs(),
            interval_secs: default_interval_secs(),
        }
    }
}

impl From<&SyncSettings> for EngineConfig {
    fn from(settings: &SyncSettings) -> Self {
        Self {
            max_retries: settings.max_retries,
            initial_backoff: Duration::from_secs(settings.initial_backoff_secs),
            max_backoff: Duration::from_secs(settings.max_backoff_secs),
            interval: Duration::from_secs(settings.interval_secs),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing_from_env();

    info!("Starting Incident Sync v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;

    info!(
        enabled = config.thehive.enabled,
        configured = config.thehive.is_configured(),
        url = config.thehive.url.as_deref().unwrap_or("none"),
        "Loaded TheHive config"
    );

    let provider = Arc::new(
        TheHiveProvider::new(config.thehive.clone())
            .context("Failed to create TheHive provider")?,
    );
    info!(mode = ?provider.mode(), "TheHive provider ready");

    let store = Arc::new(MemoryRiskStore::new());
    let processor = IncidentProcessor::new(store.clone());

    let engine_config = EngineConfig::from(&config.sync);
    let interval = engine_config.interval;
    let engine = Arc::new(
        SyncEngine::new(provider, processor, engine_config)
            .context("Invalid sync configuration")?,
    );

    let cancel = CancellationToken::new();
    let completion = engine
        .start(cancel.clone())
        .context("Sync engine was already started")?;

    shutdown_signal().await;

    info!("Shutting down...");
    cancel.cancel();
    completion.wait().await;

    let snapshot = engine.metrics_snapshot();
    let report = HealthReport::from_snapshot(&snapshot, interval);
    info!(
        total_syncs = snapshot.total_syncs,
        successful_syncs = snapshot.successful_syncs,
        failed_syncs = snapshot.failed_syncs,
        last_error = snapshot.last_error.as_deref().unwrap_or("none"),
        risks = store.len(),
        "Final sync metrics"
    );
    let message = report.message.as_deref().unwrap_or("no detail");
    if report.status.is_healthy() {
        info!(status = ?report.status, "Final health: {}", message);
    } else if report.status.is_serving() {
        warn!(status = ?report.status, "Final health: {}", message);
    } else {
        error!(status = ?report.status, "Final health: {}", message);
    }

    info!("Shutdown complete");
    Ok(())
}

/// Load configuration from files and environment.
fn load_config() -> Result<AppConfig> {
    let config = config::Config::builder()
        .add_source(config::Config::try_from(&AppConfig::default())?)
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("INCIDENT_SYNC")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: AppConfig = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    // Plain THEHIVE_* variables used by existing deployments
    if let Ok(url) = std::env::var("THEHIVE_URL") {
        config.thehive.url = Some(url).filter(|u| !u.trim().is_empty());
    }
    if let Ok(api_key) = std::env::var("THEHIVE_API_KEY") {
        config.thehive.api_key = Some(api_key).filter(|k| !k.trim().is_empty());
    }
    if let Ok(enabled) = std::env::var("THEHIVE_ENABLED") {
        config.thehive.enabled = enabled
            .trim()
            .parse()
            .with_context(|| format!("THEHIVE_ENABLED must be true or false, got {:?}", enabled))?;
    }

    Ok(config)
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
