//! Terminal UI for protolab.
//!
//! A Ratatui console with two views: the order board (three workflow
//! columns with drag and drop and per-card action menus) and the registry
//! (entries grouped by kind, each with an active/inactive status picker).
//!
//! # Overview
//!
//! - [`app`]: application struct, message handling and run loop
//! - [`state`]: selection, scroll and view state
//! - [`layout`]: frame geometry and hit testing
//! - [`overlays`]: the card menu and status picker popups
//! - [`widgets`]: rendering
//! - [`terminal`]: terminal setup, teardown and panic handling
//! - [`event`]: key and mouse mappings
//!
//! # Example
//!
//! ```no_run
//! use protolab_backend::{BackendSettings, LabBackend, LabSnapshot};
//! use protolab_config::Config;
//! use protolab_tui::{App, terminal};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     terminal::install_panic_hook();
//!     let mut terminal = terminal::setup_terminal()?;
//!
//!     let snapshot = LabSnapshot::sample();
//!     let backend = LabBackend::from_snapshot(snapshot.clone(), BackendSettings::instant());
//!     let mut app = App::new(backend, &Config::default(), snapshot);
//!     let result = app.run(&mut terminal).await;
//!
//!     terminal::restore_terminal(&mut terminal)?;
//!     result
//! }
//! ```

pub mod app;
pub mod event;
pub mod layout;
pub mod overlays;
pub mod state;
pub mod terminal;
pub mod widgets;

#[cfg(test)]
pub(crate) mod test_utils;

pub use app::{App, Update};
pub use state::{AppState, View};
