//! The top-level [`Config`] and its loading pipeline.
//!
//! Loading runs discovery, parsing, environment overrides and validation in
//! that order, so an override can fix a bad file value but can never smuggle
//! in an invalid one.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::backend::BackendConfig;
use crate::error::{ConfigError, Result};
use crate::logging::LoggingConfig;
use crate::overlay::OverlayConfig;
use crate::persistence::{find_config_file, read_config_file, write_config_file};
use crate::transitions::TransitionsConfig;

/// Overrides `logging.level`.
pub const ENV_LOG: &str = "PROTOLAB_LOG";

/// Overrides `backend.latency_ms`.
pub const ENV_LATENCY_MS: &str = "PROTOLAB_LATENCY_MS";

/// Overrides `backend.offline`.
pub const ENV_OFFLINE: &str = "PROTOLAB_OFFLINE";

/// All protolab settings. Every section is optional in the file.
///
/// # Examples
///
/// ```
/// use protolab_config::Config;
/// use protolab_transition::FailurePolicy;
///
/// let config: Config = serde_json5::from_str(r#"{ backend: { latency_ms: 40 } }"#).unwrap();
/// assert_eq!(config.backend.latency_ms, 40);
/// assert_eq!(config.transitions.board, FailurePolicy::KeepOptimistic);
/// assert_eq!(config.logging.level, "info");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub overlay: OverlayConfig,

    #[serde(default)]
    pub transitions: TransitionsConfig,

    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Loads the discovered config file, or defaults when there is none,
    /// then applies `PROTOLAB_*` overrides and validates.
    ///
    /// # Errors
    ///
    /// Returns an error if a file is found but cannot be read or parsed, an
    /// override is malformed, or the result fails validation.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use protolab_config::Config;
    ///
    /// # async fn example() -> protolab_config::Result<()> {
    /// let config = Config::load().await?;
    /// println!("latency: {:?}", config.backend.latency());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn load() -> Result<Self> {
        let mut config = match find_config_file() {
            Some(path) => read_config_file(&path)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a specific file. Environment overrides are not
    /// applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let config: Config = read_config_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves the configuration as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        write_config_file(path, self)
    }

    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure.
    pub fn validate(&self) -> Result<()> {
        self.backend.validate()?;
        self.logging.validate()?;
        self.transitions.registry.validate()?;
        Ok(())
    }

    /// Applies `PROTOLAB_LOG`, `PROTOLAB_LATENCY_MS` and `PROTOLAB_OFFLINE`
    /// from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] if a variable cannot be parsed.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|name| std::env::var(name).ok())
    }

    /// Applies overrides from an arbitrary variable lookup. Empty values are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] if a variable cannot be parsed.
    ///
    /// # Examples
    ///
    /// ```
    /// use protolab_config::Config;
    ///
    /// let mut config = Config::default();
    /// config
    ///     .apply_overrides_from(|name| (name == "PROTOLAB_OFFLINE").then(|| "yes".to_string()))
    ///     .unwrap();
    /// assert!(config.backend.offline);
    /// ```
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(level) = get(ENV_LOG) {
            self.logging.level = level.trim().to_string();
        }
        if let Some(value) = get(ENV_LATENCY_MS) {
            self.backend.latency_ms = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: ENV_LATENCY_MS,
                value: value.clone(),
            })?;
        }
        if let Some(value) = get(ENV_OFFLINE) {
            self.backend.offline = parse_flag(&value).ok_or(ConfigError::InvalidEnv {
                name: ENV_OFFLINE,
                value,
            })?;
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}
