//! Error types for permission loading
//!
//! This module defines the errors that can occur while fetching and
//! validating the role-permission matrix. None of them ever reach a
//! capability check: the service records them and denies instead.

use thiserror::Error;

/// Permission layer error types.
#[derive(Debug, Clone, Error)]
pub enum AccessError {
    /// The request never produced a response (DNS, connect, timeout)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status
    #[error("Backend error ({status}): {message}")]
    Fetch {
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    /// The response body did not have the expected shape
    #[error("Schema mismatch: {0}")]
    Schema(String),

    /// The backend client is misconfigured
    #[error("Configuration error: {0}")]
    Config(String),

    /// An operation needed a session but none is active
    #[error("No active session")]
    NoSession,

    /// The session changed while the load was in flight; its result was dropped
    #[error("Load superseded by a session change")]
    Superseded,
}

/// Result type for permission layer operations.
pub type AccessResult<T> = Result<T, AccessError>;

impl AccessError {
    /// Check if retrying the same request could succeed.
    ///
    /// Transport failures, throttling and 5xx responses are transient;
    /// schema and client errors will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        match self {
            AccessError::Transport(_) => true,
            AccessError::Fetch { status, .. } => *status == 429 || *status >= 500,
            AccessError::Schema(_)
            | AccessError::Config(_)
            | AccessError::NoSession
            | AccessError::Superseded => false,
        }
    }

    /// Get error code for logs and client-side telemetry.
    pub fn error_code(&self) -> &'static str {
        match self {
            AccessError::Transport(_) => "TRANSPORT_ERROR",
            AccessError::Fetch { .. } => "FETCH_ERROR",
            AccessError::Schema(_) => "SCHEMA_MISMATCH",
            AccessError::Config(_) => "CONFIG_ERROR",
            AccessError::NoSession => "NO_SESSION",
            AccessError::Superseded => "SUPERSEDED",
        }
    }
}

#[cfg(feature = "rest")]
impl From<reqwest::Error> for AccessError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AccessError::Schema(err.to_string())
        } else {
            AccessError::Transport(err.to_string())
        }
    }
}
