//! Unified error types for incident synchronization.
//!
//! Error codes:
//! - FETCH_001: Transport failure, timeout or non-2xx upstream status
//! - FETCH_002: Upstream body could not be decoded
//! - STORE_001: Risk store write failed for one incident
//! - CONFIG_001: Construction-time misconfiguration
//!
//! An unconfigured provider is not an error; providers return their
//! fallback batch instead.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Fetch error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorCode {
    /// FETCH_001: Network, timeout or HTTP status failure
    Transport,
    /// FETCH_002: Response body did not decode
    Malformed,
}

impl FetchErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Transport => "FETCH_001",
            Self::Malformed => "FETCH_002",
        }
    }
}

/// Unified error type for incident synchronization.
#[derive(Debug, Error)]
pub enum Error {
    /// The upstream could not be reached or answered with a failure status.
    #[error("[FETCH_001] {0}")]
    Fetch(String),

    /// The upstream answered but the payload could not be decoded.
    #[error("[FETCH_002] malformed response: {0}")]
    MalformedResponse(String),

    /// A single incident could not be written to the risk store.
    #[error("[STORE_001] failed to persist {source_tag}/{external_id}: {message}")]
    Persistence {
        source_tag: String,
        external_id: String,
        message: String,
    },

    #[error("[CONFIG_001] invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    pub fn persistence(
        source_tag: impl Into<String>,
        external_id: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        Self::Persistence {
            source_tag: source_tag.into(),
            external_id: external_id.into(),
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Get the stable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Fetch(_) => FetchErrorCode::Transport.code(),
            Self::MalformedResponse(_) => FetchErrorCode::Malformed.code(),
            Self::Persistence { .. } => "STORE_001",
            Self::Config(_) => "CONFIG_001",
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedResponse(err.to_string())
    }
}
