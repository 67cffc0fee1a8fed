//! Simulated backend configuration.

use std::path::PathBuf;
use std::time::Duration;

use protolab_protocol::EntityStatus;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Default delay of every simulated server answer.
pub const DEFAULT_LATENCY_MS: u64 = 250;

/// Largest accepted delay (10 seconds).
pub const MAX_LATENCY_MS: u64 = 10_000;

/// How the simulated server behaves.
///
/// # Examples
///
/// ```
/// use protolab_config::BackendConfig;
///
/// let config = BackendConfig::default();
/// assert_eq!(config.latency().as_millis(), 250);
/// assert!(!config.offline);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Delay before each answer, in milliseconds.
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,

    /// Start with the server unreachable.
    #[serde(default)]
    pub offline: bool,

    /// Status codes the server refuses (`"CONCLUIDO"`, `"INATIVO"`, ...).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fail_statuses: Vec<String>,

    /// Load records from, and save them back to, this snapshot file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<PathBuf>,
}

fn default_latency_ms() -> u64 {
    DEFAULT_LATENCY_MS
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            latency_ms: DEFAULT_LATENCY_MS,
            offline: false,
            fail_statuses: Vec::new(),
            snapshot: None,
        }
    }
}

impl BackendConfig {
    #[must_use]
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    /// Parses `fail_statuses` into status values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidStatus`] for the first unknown code.
    pub fn parsed_fail_statuses(&self) -> Result<Vec<EntityStatus>> {
        self.fail_statuses
            .iter()
            .map(|code| EntityStatus::from_code(code).map_err(|_| ConfigError::InvalidStatus(code.clone())))
            .collect()
    }

    /// Validates latency and status codes.
    ///
    /// # Errors
    ///
    /// Returns an error if the latency exceeds [`MAX_LATENCY_MS`] or a
    /// status code is unknown.
    pub fn validate(&self) -> Result<()> {
        if self.latency_ms > MAX_LATENCY_MS {
            return Err(ConfigError::InvalidLatency {
                reason: format!(
                    "{} ms exceeds the maximum of {} ms",
                    self.latency_ms, MAX_LATENCY_MS
                ),
            });
        }
        self.parsed_fail_statuses()?;
        Ok(())
    }
}
