//! Configuration management for protolab.
//!
//! Settings come from one JSON5 file plus a few environment overrides.
//!
//! # Sources (highest priority first)
//!
//! 1. Environment variables (`PROTOLAB_LOG`, `PROTOLAB_LATENCY_MS`,
//!    `PROTOLAB_OFFLINE`)
//! 2. Local config (`./protolab.json5` or `./protolab.json`)
//! 3. User config (`~/.config/protolab/config.json5` or `config.json`)
//! 4. Built-in defaults
//!
//! # File format
//!
//! ```json5
//! {
//!   overlay: { card_menu_anchor: "below-left", status_picker_anchor: "below-right" },
//!   transitions: {
//!     board: "keep-optimistic",
//!     registry: { default: "revert", overrides: { clinic: "keep-optimistic" } },
//!   },
//!   backend: { latency_ms: 250, offline: false, fail_statuses: ["CONCLUIDO"] },
//!   logging: { level: "info" },
//! }
//! ```
//!
//! # Examples
//!
//! ```no_run
//! use protolab_config::Config;
//!
//! # async fn example() -> protolab_config::Result<()> {
//! let config = Config::load().await?;
//! let policies = config.transitions.registry.kind_policies();
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod logging;
pub mod overlay;
pub mod persistence;
pub mod transitions;

pub use backend::BackendConfig;
pub use config::Config;
pub use error::{ConfigError, Result};
pub use logging::LoggingConfig;
pub use overlay::OverlayConfig;
pub use transitions::{RegistryPolicyConfig, TransitionsConfig};
