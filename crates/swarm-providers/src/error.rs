//! Error taxonomy for completion calls.

use std::time::Duration;

use thiserror::Error;

/// Failure of a completion call.
///
/// Kinds are preserved through retries so callers can tell configuration
/// mistakes from transient outages.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Missing credentials or an invalid request. Never retried.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Connection, DNS, TLS, or body-transfer failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-2xx status from the backend.
    #[error("provider error: {status}: {body}")]
    Provider { status: u16, body: String },

    /// 2xx status but an unusable body.
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    /// The attempt exceeded its hard deadline.
    #[error("attempt timed out after {0:?}")]
    Timeout(Duration),
}

/// Coarse classification of an [`LlmError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Transport,
    Provider,
    Timeout,
}

impl LlmError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LlmError::Configuration(_) => ErrorKind::Configuration,
            LlmError::Transport(_) => ErrorKind::Transport,
            LlmError::Provider { .. } | LlmError::MalformedResponse(_) => ErrorKind::Provider,
            LlmError::Timeout(_) => ErrorKind::Timeout,
        }
    }

    /// Whether the retry policy may schedule another attempt.
    pub fn is_retryable(&self) -> bool {
        self.kind() != ErrorKind::Configuration
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            LlmError::MalformedResponse(e.to_string())
        } else {
            LlmError::Transport(e.to_string())
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, LlmError>;
