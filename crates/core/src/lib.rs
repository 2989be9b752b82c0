//! Core types and capabilities for incident synchronization.

pub mod error;
pub mod incident;
pub mod provider;
pub mod store;

pub use error::{Error, Result};
pub use incident::*;
pub use provider::IncidentProvider;
pub use store::{RiskStore, UpsertOutcome};
