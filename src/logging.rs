//! File logging for the console.
//!
//! The terminal is owned by the UI, so events go to a log file through a
//! non-blocking writer. `RUST_LOG` overrides the configured level.

use anyhow::Context;
use protolab_config::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber.
///
/// The returned guard flushes buffered events when dropped; keep it alive
/// until the program exits.
pub fn init(config: &LoggingConfig) -> anyhow::Result<WorkerGuard> {
    let path = config.file_path()?;
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(dir) = dir {
        std::fs::create_dir_all(dir).with_context(|| format!("creating log directory {}", dir.display()))?;
    }
    let file_name = path
        .file_name()
        .with_context(|| format!("log path {} has no file name", path.display()))?;

    let appender = tracing_appender::rolling::never(dir.unwrap_or_else(|| std::path::Path::new(".")), file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let level = config.level.trim().to_ascii_lowercase();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing log subscriber: {e}"))?;

    Ok(guard)
}
