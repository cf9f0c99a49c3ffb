//! Error types for overseer-agents
//!
//! These never cross the [`crate::Agent`] boundary: adapters turn them into
//! answer strings.

use std::time::Duration;

use thiserror::Error;

/// Failures of an external answer source
#[derive(Error, Debug)]
pub enum BackendError {
    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// Non-success status code
    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    /// The call did not finish in time
    #[error("timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The response decoded but carried no answer text
    #[error("response contained no answer text")]
    EmptyResponse,

    /// A retrieval source returned nothing usable
    #[error("no results")]
    NoResults,

    /// Backend is missing required configuration
    #[error("backend not configured: {0}")]
    NotConfigured(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        BackendError::Http(err.to_string())
    }
}

/// Keep error bodies short enough to embed in an answer line.
pub(crate) fn clip(body: &str, max_chars: usize) -> String {
    match body.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
