//! Popup anchoring configuration.

use protolab_overlay::AnchorMode;
use serde::{Deserialize, Serialize};

/// Which trigger corner each popup hangs from.
///
/// # Examples
///
/// ```
/// use protolab_config::OverlayConfig;
/// use protolab_overlay::AnchorMode;
///
/// let config = OverlayConfig::default();
/// assert_eq!(config.card_menu_anchor, AnchorMode::BelowLeft);
/// assert_eq!(config.status_picker_anchor, AnchorMode::BelowRight);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Anchor of the per-card action menu on the board.
    #[serde(default = "default_card_menu_anchor")]
    pub card_menu_anchor: AnchorMode,

    /// Anchor of the status picker on registry rows.
    #[serde(default = "default_status_picker_anchor")]
    pub status_picker_anchor: AnchorMode,
}

fn default_card_menu_anchor() -> AnchorMode {
    AnchorMode::BelowLeft
}

fn default_status_picker_anchor() -> AnchorMode {
    AnchorMode::BelowRight
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            card_menu_anchor: default_card_menu_anchor(),
            status_picker_anchor: default_status_picker_anchor(),
        }
    }
}
