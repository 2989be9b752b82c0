//! Incident synchronization worker.
//!
//! - `SyncEngine`: periodic loop, retry with capped exponential backoff, lifecycle
//! - `IncidentProcessor`: severity gate and idempotent upsert
//! - `EngineConfig`: retry and scheduling parameters

pub mod config;
pub mod engine;
pub mod processor;

pub use config::EngineConfig;
pub use engine::*;
pub use processor::{IncidentProcessor, ProcessOutcome};
