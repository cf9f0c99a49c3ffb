//! Error types for overseer-state

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in the result log layer
#[derive(Error, Debug)]
pub enum StorageError {
    /// The log medium could not be read or written
    #[error("log I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An entry could not be encoded as a log line
    #[error("failed to serialize log entry: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A verdict label outside `pass` / `fail`
    #[error("unknown verdict: {0}")]
    UnknownVerdict(String),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error came from the storage medium itself.
    pub fn is_io(&self) -> bool {
        matches!(self, StorageError::Io { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_names_path() {
        let err = StorageError::io(
            "/read-only/training_logs.jsonl",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/read-only/training_logs.jsonl"));
        assert!(msg.contains("denied"));
        assert!(err.is_io());
    }

    #[test]
    fn unknown_verdict_is_not_io() {
        let err = StorageError::UnknownVerdict("maybe".to_string());
        assert!(!err.is_io());
        assert!(err.to_string().contains("maybe"));
    }
}
