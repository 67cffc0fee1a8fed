//! Error types for backend operations.
//!
//! Status commits report [`protolab_transition::CommitError`]; everything
//! else the backend does (fetching, deleting, snapshot persistence) reports
//! [`BackendError`].

use std::path::PathBuf;

/// Errors that can occur during backend operations.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The simulated server is offline.
    #[error("backend unavailable")]
    Offline,

    /// No order with this ID exists on the server.
    #[error("order not found: {0}")]
    OrderNotFound(uuid::Uuid),

    /// A snapshot file could not be read or written.
    #[error("snapshot I/O failed at {path}: {source}")]
    Io {
        /// The snapshot path.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A snapshot file held invalid JSON.
    #[error("invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for backend operations.
pub type Result<T> = std::result::Result<T, BackendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        assert_eq!(BackendError::Offline.to_string(), "backend unavailable");

        let err = BackendError::Io {
            path: PathBuf::from("/tmp/lab.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "snapshot I/O failed at /tmp/lab.json: denied");
    }
}
