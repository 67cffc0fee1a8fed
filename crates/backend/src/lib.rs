//! Simulated lab backend for protolab.
//!
//! Stands in for the lab's REST server: it owns the order and registry
//! records, accepts status commits through
//! [`Committer`](protolab_transition::Committer), and can persist its records
//! to a JSON snapshot.
//!
//! # Examples
//!
//! ```
//! use protolab_backend::{BackendSettings, LabBackend};
//! use protolab_protocol::{EntityStatus, WorkflowStatus};
//! use protolab_transition::Committer;
//!
//! # async fn example() -> protolab_backend::Result<()> {
//! let backend = LabBackend::with_sample_data(BackendSettings::instant());
//! let order = backend.fetch_orders().await?[0].id;
//!
//! backend
//!     .commit(order, EntityStatus::Workflow(WorkflowStatus::Concluido))
//!     .await
//!     .expect("commit accepted");
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod server;
pub mod snapshot;

pub use error::{BackendError, Result};
pub use server::{BackendSettings, LabBackend};
pub use snapshot::{LabSnapshot, SnapshotStore};
