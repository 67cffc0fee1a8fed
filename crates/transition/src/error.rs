//! Error types for remote status commits.

use protolab_protocol::EntityId;
use thiserror::Error;

/// Why a remote commit failed.
///
/// Commit failures are expected outcomes: they are settled into the
/// transition engine and shown to the user, never propagated as fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitError {
    /// The backend could not be reached.
    #[error("backend unavailable")]
    Offline,

    /// The backend refused the new status.
    #[error("server refused status {code}")]
    Refused {
        /// Wire code of the refused status.
        code: String,
    },

    /// The entity no longer exists on the server.
    #[error("entity not found on server: {0}")]
    NotFound(EntityId),

    /// The status does not belong to the entity's family.
    #[error("status {code} does not apply to entity {entity_id}")]
    WrongFamily {
        /// The entity the commit targeted.
        entity_id: EntityId,
        /// Wire code of the mismatched status.
        code: String,
    },
}

/// A specialized Result type for commit calls.
pub type Result<T> = std::result::Result<T, CommitError>;
