//! Shared protocol types for the protolab application.
//!
//! This crate defines the core types used across all protolab components:
//! the two status families, orders and their board projection, registry
//! entities, TUI messages, and error types.
//!
//! # Overview
//!
//! The crate is organized into the following modules:
//!
//! - [`status`]: Binary and workflow status families, status change requests
//! - [`order`]: Orders, server records and priorities
//! - [`registry`]: Registry entities with a binary status
//! - [`board`]: The order board and its filtered column projection
//! - [`message`]: TUI event messages
//! - [`dummy`]: Sample data for the simulated backend
//! - [`error`]: Error types for protocol operations
//!
//! # Examples
//!
//! ```
//! use protolab_protocol::{BoardFilter, Order, OrderBoard, OrderDetails, WorkflowStatus};
//!
//! let mut board = OrderBoard::new();
//! let order = Order::new(OrderDetails::new("OS-7", "Ana Costa", "Dr. Reis", "Coroa"));
//! let id = order.id;
//! board.add_order(order);
//!
//! if let Some(order) = board.get_mut(id) {
//!     order.status = WorkflowStatus::EmAndamento;
//! }
//! assert_eq!(board.counts(&BoardFilter::default()), [0, 1, 0]);
//! ```

pub mod board;
pub mod dummy;
pub mod error;
pub mod message;
pub mod order;
pub mod registry;
pub mod status;

// Re-export primary types at crate root for convenience
pub use board::{BoardFilter, OrderBoard};
pub use error::{ProtocolError, Result};
pub use message::Message;
pub use order::{Order, OrderDetails, OrderId, OrderRecord, Priority};
pub use registry::{EntityKind, RegistryEntry, sort_entries};
pub use status::{
    BinaryStatus, EntityId, EntityStatus, OrderStatus, Status, StatusChangeRequest, StatusFamily,
    WorkflowStatus,
};
