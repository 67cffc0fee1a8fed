//! Snapshot persistence for the simulated server.
//!
//! The simulated server keeps its records in memory. When a snapshot file is
//! configured, records are loaded from it at startup and written back on
//! exit, so status changes survive restarts. Without one, every run starts
//! from the sample data.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use protolab_protocol::{OrderRecord, RegistryEntry};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::error::{BackendError, Result};

/// Every record the server holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabSnapshot {
    /// All orders, including cancelled ones.
    pub orders: Vec<OrderRecord>,
    /// All registry entries.
    pub registry: Vec<RegistryEntry>,
    /// When the snapshot was taken.
    pub saved_at: DateTime<Utc>,
}

impl LabSnapshot {
    /// Creates a snapshot stamped with the current time.
    #[must_use]
    pub fn new(orders: Vec<OrderRecord>, registry: Vec<RegistryEntry>) -> Self {
        Self {
            orders,
            registry,
            saved_at: Utc::now(),
        }
    }

    /// The built-in sample lab.
    #[must_use]
    pub fn sample() -> Self {
        Self::new(
            protolab_protocol::dummy::sample_orders(),
            protolab_protocol::dummy::sample_registry(),
        )
    }
}

/// Reads and writes [`LabSnapshot`] files.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// A store at `path`. Missing parent directories are created on save.
    #[must_use]
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the snapshot. Returns `None` if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn load(&self) -> Result<Option<LabSnapshot>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let snapshot: LabSnapshot = serde_json::from_str(&content).inspect_err(|e| {
                    warn!(error = %e, "failed to parse snapshot file");
                })?;
                debug!(
                    orders = snapshot.orders.len(),
                    registry = snapshot.registry.len(),
                    saved_at = %snapshot.saved_at,
                    "loaded snapshot"
                );
                Ok(Some(snapshot))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no snapshot file");
                Ok(None)
            }
            Err(source) => Err(BackendError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Writes the snapshot, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    #[instrument(skip(self, snapshot), fields(path = %self.path.display()))]
    pub fn save(&self, snapshot: &LabSnapshot) -> Result<()> {
        let io_err = |source: std::io::Error| BackendError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = serde_json::to_string_pretty(snapshot)?;
        fs::write(&self.path, content).map_err(io_err)?;
        debug!(orders = snapshot.orders.len(), "saved snapshot");
        Ok(())
    }
}
