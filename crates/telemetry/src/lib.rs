//! Telemetry for the incident sync worker.
//!
//! Structured logging setup, per-engine sync metrics and a health report
//! derived from them. There is no global registry: each engine owns its
//! metrics and hands out snapshots.

pub mod health;
pub mod metrics;
pub mod tracing_setup;

pub use health::*;
pub use metrics::*;
pub use tracing_setup::*;
