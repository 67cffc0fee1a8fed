//! Config file discovery, reading and writing.
//!
//! Files are JSON5 (comments and trailing commas allowed); plain JSON is
//! accepted too since it is a subset. Saving always writes pretty JSON.
//!
//! Discovery order, first match wins:
//!
//! 1. `./protolab.json5`, `./protolab.json`
//! 2. `<config_dir>/protolab/config.json5`, `<config_dir>/protolab/config.json`

use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

const LOCAL_FILE_NAMES: &[&str] = &["protolab.json5", "protolab.json"];

const APP_DIR: &str = "protolab";

const USER_FILE_NAMES: &[&str] = &["config.json5", "config.json"];

/// Every path discovery looks at, in priority order.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use protolab_config::persistence::candidate_paths;
///
/// let paths = candidate_paths(Path::new("."), Some(Path::new("/home/ana/.config")));
/// assert_eq!(paths.len(), 4);
/// assert!(paths[0].ends_with("protolab.json5"));
/// assert!(paths[3].ends_with("protolab/config.json"));
/// ```
#[must_use]
pub fn candidate_paths(local_dir: &Path, user_config_dir: Option<&Path>) -> Vec<PathBuf> {
    let local = LOCAL_FILE_NAMES.iter().map(|name| local_dir.join(name));
    let user = user_config_dir
        .into_iter()
        .flat_map(|dir| USER_FILE_NAMES.iter().map(move |name| dir.join(APP_DIR).join(name)));
    local.chain(user).collect()
}

/// Finds the first existing config file under the given roots.
#[must_use]
pub fn find_config_file_in(local_dir: &Path, user_config_dir: Option<&Path>) -> Option<PathBuf> {
    candidate_paths(local_dir, user_config_dir)
        .into_iter()
        .find(|path| path.exists())
}

/// Finds the config file for the current directory and user.
#[must_use]
pub fn find_config_file() -> Option<PathBuf> {
    let user = dirs::config_dir();
    find_config_file_in(Path::new("."), user.as_deref())
}

/// The per-user config directory (`<config_dir>/protolab`).
///
/// # Errors
///
/// Returns [`ConfigError::NoHomeDirectory`] if it cannot be determined.
pub fn user_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR))
        .ok_or(ConfigError::NoHomeDirectory)
}

/// Where `protolab` writes a fresh user config.
///
/// # Errors
///
/// Returns [`ConfigError::NoHomeDirectory`] if it cannot be determined.
pub fn default_user_config_path() -> Result<PathBuf> {
    Ok(user_config_dir()?.join(USER_FILE_NAMES[0]))
}

/// Reads and parses a JSON5 or JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn read_config_file<T: serde::de::DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json5::from_str(&content)?)
}

/// Writes `value` as pretty JSON, creating parent directories as needed.
///
/// # Errors
///
/// Returns an error if serialization or any filesystem step fails.
pub fn write_config_file<T: serde::Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let path = path.as_ref();
    let write_err = |source: std::io::Error| ConfigError::WriteFile {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty() && !p.exists()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(path, content).map_err(write_err)
}
