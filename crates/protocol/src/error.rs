//! Error types for the protolab-protocol crate.
//!
//! Status conversions are the only fallible protocol operations.

use thiserror::Error;

use crate::status::OrderStatus;

/// Errors that can occur during protocol operations.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The order carries a status that has no board column.
    #[error("order status {0:?} is outside the board workflow")]
    OutOfScopeStatus(OrderStatus),

    /// A status code did not name any known status.
    #[error("unknown status code: {0:?}")]
    UnknownStatusCode(String),
}

/// A specialized Result type for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;
