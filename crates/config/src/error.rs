//! Error types for configuration operations.
//!
//! This module defines the error types that can occur during configuration
//! loading, parsing, environment overrides and validation.

use std::path::PathBuf;

/// Errors that can occur during configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read a configuration file.
    #[error("failed to read config file at {path}: {source}")]
    ReadFile {
        /// The path that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a configuration file.
    #[error("failed to write config file at {path}: {source}")]
    WriteFile {
        /// The path that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse JSON5 configuration.
    #[error("failed to parse config: {0}")]
    ParseJson5(#[from] serde_json5::Error),

    /// Failed to serialize configuration to JSON.
    #[error("failed to serialize config: {0}")]
    SerializeJson(#[from] serde_json::Error),

    /// Invalid simulated backend latency.
    #[error("invalid backend latency: {reason}")]
    InvalidLatency {
        /// The reason the latency is invalid.
        reason: String,
    },

    /// Unknown log level.
    #[error("invalid log level {0:?}, expected one of trace, debug, info, warn, error, off")]
    InvalidLogLevel(String),

    /// A status code in `backend.fail_statuses` names no known status.
    #[error("invalid status code in backend.fail_statuses: {0:?}")]
    InvalidStatus(String),

    /// A key in `transitions.registry.overrides` names no entity kind.
    #[error("unknown entity kind in transitions.registry.overrides: {0:?}")]
    InvalidKind(String),

    /// An environment variable override could not be parsed.
    #[error("invalid value {value:?} for environment variable {name}")]
    InvalidEnv {
        /// The variable name.
        name: &'static str,
        /// The rejected value.
        value: String,
    },

    /// Failed to determine home directory.
    #[error("could not determine home directory")]
    NoHomeDirectory,
}

/// A specialized Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let err = ConfigError::InvalidEnv {
            name: "PROTOLAB_OFFLINE",
            value: "maybe".to_string(),
        };
        assert_eq!(
            err.to_string(),
            r#"invalid value "maybe" for environment variable PROTOLAB_OFFLINE"#
        );

        let err = ConfigError::InvalidStatus("ARCHIVED".to_string());
        assert!(err.to_string().contains("ARCHIVED"));

        let err = ConfigError::InvalidKind("laboratory".to_string());
        assert_eq!(
            err.to_string(),
            r#"unknown entity kind in transitions.registry.overrides: "laboratory""#
        );
    }
}
