// Error types for assistant runs

use std::time::Duration;
use thiserror::Error;

use crate::types::{RunError, RunStatus};

/// Result type alias for remote API calls
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors returned by an `AssistantsApi` implementation
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network failure after the client's retries were exhausted
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-success response from the service
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Client could not be constructed (e.g. missing credentials)
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ApiError {
    pub fn transport(msg: impl Into<String>) -> Self {
        ApiError::Transport(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        ApiError::Decode(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        ApiError::Configuration(msg.into())
    }

    /// Whether the failure is worth another attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Transport(_) => true,
            ApiError::Api { status, .. } => {
                matches!(status, 408 | 409 | 429) || (500..600).contains(status)
            }
            _ => false,
        }
    }
}

/// Errors that stop the run monitor (and therefore the conversation driver)
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Remote call failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Run reached a terminal status other than `completed`
    #[error("Run {run_id} ended with status {status}{}", suffix(.last_error))]
    RunFailed {
        run_id: String,
        status: RunStatus,
        last_error: Option<RunError>,
    },

    /// Wait budget exhausted before a terminal status
    #[error("Timed out after {waited:?} waiting for run {run_id} (last status: {last_status})")]
    Timeout {
        run_id: String,
        last_status: RunStatus,
        waited: Duration,
    },
}

fn suffix(last_error: &Option<RunError>) -> String {
    last_error
        .as_ref()
        .map(|e| format!(" ({})", e))
        .unwrap_or_default()
}
