//! Shared helpers for incident sync integration tests.

pub mod fixtures;
pub mod mocks;
pub mod setup;
