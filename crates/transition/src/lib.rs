//! Optimistic status transitions for protolab.
//!
//! - [`engine`]: the per-entity in-flight guard, optimistic update and
//!   failure policy shared by every status-bearing screen
//! - [`commit`]: the remote commit boundary ([`Committer`])
//! - [`kanban`]: the order board, driven by drag gestures and card menus
//! - [`registry`]: binary status changes for registry entities
//!
//! # Examples
//!
//! ```
//! use protolab_protocol::{Order, OrderBoard, OrderDetails, WorkflowStatus};
//! use protolab_transition::{CommitError, CommitOutcome, FailurePolicy, KanbanController};
//!
//! let order = Order::new(OrderDetails::new("OS-1", "Ana Costa", "Dr. Reis", "Coroa"));
//! let id = order.id;
//! let mut board = OrderBoard::new();
//! board.add_order(order);
//! let mut kanban = KanbanController::new(board, FailurePolicy::KeepOptimistic);
//!
//! let request = kanban.request_transition(id, WorkflowStatus::EmAndamento).unwrap();
//! assert_eq!(kanban.counts(), [0, 1, 0]);
//!
//! kanban.settle(CommitOutcome::failed(request, CommitError::Offline));
//! assert_eq!(kanban.counts(), [0, 1, 0]);
//! assert!(kanban.banner().is_some());
//! ```

pub mod commit;
pub mod engine;
pub mod error;
pub mod kanban;
pub mod registry;

pub use commit::{CommitOutcome, Committer, run_commit};
pub use engine::{
    FailurePolicy, Rejection, Settlement, StatusCell, TransitionEngine, TransitionEvent, TransitionObserver,
};
pub use error::{CommitError, Result};
pub use kanban::{DragState, KanbanController};
pub use registry::{KindPolicies, RegistryController};
