//! Logging configuration.
//!
//! The terminal belongs to the UI, so logs always go to a file.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Levels accepted by `logging.level` and `PROTOLAB_LOG`.
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// Where and how much to log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter level; `RUST_LOG` still takes precedence.
    #[serde(default = "default_level")]
    pub level: String,

    /// Log file path. Defaults to `<data_dir>/protolab/protolab.log`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// The file to log to.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoHomeDirectory`] if no file is configured and
    /// the data directory cannot be determined.
    pub fn file_path(&self) -> Result<PathBuf> {
        if let Some(file) = &self.file {
            return Ok(file.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join("protolab").join("protolab.log"))
            .ok_or(ConfigError::NoHomeDirectory)
    }

    /// Checks the level name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidLogLevel`] for an unknown level.
    pub fn validate(&self) -> Result<()> {
        let level = self.level.trim().to_ascii_lowercase();
        if LOG_LEVELS.contains(&level.as_str()) {
            Ok(())
        } else {
            Err(ConfigError::InvalidLogLevel(self.level.clone()))
        }
    }
}
