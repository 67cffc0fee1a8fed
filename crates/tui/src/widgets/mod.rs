//! Rendering functions for the console.
//!
//! Each widget is a plain function from state (plus the frame's
//! [`ScreenLayout`](crate::layout::ScreenLayout)) to a buffer, so they are
//! easy to test in isolation.
//!
//! # Modules
//!
//! - [`header`]: view tabs, filters and the offline flag
//! - [`board`]: the three status columns and their cards
//! - [`registry`]: registry entries with status pills
//! - [`menu`]: the portal layer holding open menus, painted last
//! - [`status_bar`]: error banner, status messages and key hints
//! - [`help`]: the key binding overlay
//!
//! # Example
//!
//! ```
//! use ratatui::buffer::Buffer;
//! use ratatui::layout::Rect;
//! use protolab_protocol::{OrderBoard, dummy};
//! use protolab_transition::{FailurePolicy, KanbanController, KindPolicies, RegistryController};
//! use protolab_tui::{AppState, layout::ScreenLayout, widgets};
//!
//! let state = AppState::new(
//!     KanbanController::new(OrderBoard::from_records(dummy::sample_orders()), FailurePolicy::KeepOptimistic),
//!     RegistryController::new(dummy::sample_registry(), KindPolicies::default()),
//! );
//! let area = Rect::new(0, 0, 90, 30);
//! let layout = ScreenLayout::compute(&state, area);
//! let mut buf = Buffer::empty(area);
//!
//! widgets::render_board(&state, &layout, &mut buf);
//! ```

pub mod board;
pub mod header;
pub mod help;
pub mod menu;
pub mod registry;
pub mod status_bar;

pub use board::{priority_color, render_board};
pub use header::render_header;
pub use help::render_help_overlay;
pub use menu::{render_menu, render_portal};
pub use registry::{pill_label, render_registry};
pub use status_bar::render_status_bar;
