//! TheHive integration for incident sync.
//!
//! Provides the live `TheHiveProvider` adapter and the deterministic
//! `FallbackProvider`; both implement `incident_core::IncidentProvider`.

pub mod client;
pub mod config;
pub mod fallback;
pub mod types;

pub use client::*;
pub use config::*;
pub use fallback::{fallback_incidents, FallbackProvider};
pub use types::SOURCE_TAG;
