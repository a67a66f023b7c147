//! Upstream operation errors
//!
//! Every proxy client returns `UpstreamError`; the API layer converts it to
//! the application error taxonomy exactly once. `NotFound` is the only
//! variant a caller is expected to branch on - the rest are surfaced, never
//! retried here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upstream returned {status} during {operation}: {body}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response shape: {0}")]
    Deserialize(String),

    #[error("Invalid continuation token")]
    InvalidContinuation,
}

/// Result type for upstream operations
pub type UpstreamResult<T> = Result<T, UpstreamError>;
