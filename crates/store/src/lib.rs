//! Risk store implementations for incident sync.

pub mod memory;

pub use memory::*;
