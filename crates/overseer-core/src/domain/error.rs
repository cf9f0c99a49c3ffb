//! Domain-level error taxonomy for Overseer.

use overseer_agents::{BackendError, UnknownAgentKind};
use overseer_state::StorageError;

/// Overseer domain errors.
#[derive(Debug, thiserror::Error)]
pub enum OverseerError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("rubric bank is empty")]
    EmptyRubricBank,

    #[error("unknown certification domain: {0}")]
    UnknownDomain(String),

    #[error("a certification run is already active")]
    AlreadyRunning,

    #[error("run task failed: {0}")]
    RunTask(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl OverseerError {
    /// Errors that must stop the process at startup.
    pub fn is_fatal_config(&self) -> bool {
        matches!(
            self,
            OverseerError::Configuration(_) | OverseerError::EmptyRubricBank
        )
    }
}

impl From<UnknownAgentKind> for OverseerError {
    fn from(err: UnknownAgentKind) -> Self {
        OverseerError::Configuration(err.to_string())
    }
}

impl From<BackendError> for OverseerError {
    fn from(err: BackendError) -> Self {
        OverseerError::Configuration(format!("agent backend: {err}"))
    }
}

/// Result type for Overseer domain operations.
pub type Result<T> = std::result::Result<T, OverseerError>;
