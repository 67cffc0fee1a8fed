//! Viewport position resolver.
//!
//! Computes where a popup anchored to a trigger goes. The computation is a
//! pure function of the trigger's bounding box, the scroll offset and the
//! viewport width; callers recompute it on every open, resize and scroll
//! rather than caching it.
//!
//! No clamping to the viewport edges is performed. A popup anchored near the
//! bottom or right edge may extend past the visible area.

use serde::{Deserialize, Serialize};

use crate::geometry::{Rect, Size, Viewport};

/// Which corner of the trigger the popup hangs from.
///
/// # Examples
///
/// ```
/// use protolab_overlay::AnchorMode;
///
/// let mode: AnchorMode = serde_json::from_str(r#""below-right""#).unwrap();
/// assert_eq!(mode, AnchorMode::BelowRight);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnchorMode {
    /// Popup's top-left corner sits under the trigger's bottom-left corner.
    #[default]
    BelowLeft,
    /// Popup's top-right corner sits under the trigger's bottom-right corner.
    BelowRight,
}

/// Computed placement of a popup in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayPosition {
    /// Offsets from the top and left edges.
    TopLeft {
        /// Distance from the top edge.
        top: i32,
        /// Distance from the left edge.
        left: i32,
    },
    /// Offsets from the top and right edges.
    TopRight {
        /// Distance from the top edge.
        top: i32,
        /// Distance from the right edge of the viewport.
        right: i32,
    },
}

impl OverlayPosition {
    /// Distance from the top edge.
    #[must_use]
    pub const fn top(self) -> i32 {
        match self {
            Self::TopLeft { top, .. } | Self::TopRight { top, .. } => top,
        }
    }

    /// Resolves the position into the rectangle a popup of `size` occupies.
    ///
    /// # Examples
    ///
    /// ```
    /// use protolab_overlay::{OverlayPosition, Rect, Size};
    ///
    /// let pos = OverlayPosition::TopRight { top: 4, right: 10 };
    /// assert_eq!(pos.area(Size::new(12, 3), 80), Rect::new(58, 4, 12, 3));
    /// ```
    #[must_use]
    pub const fn area(self, size: Size, viewport_width: i32) -> Rect {
        match self {
            Self::TopLeft { top, left } => Rect::new(left, top, size.width, size.height),
            Self::TopRight { top, right } => {
                let right_edge = viewport_width - right;
                Rect::new(right_edge - size.width, top, size.width, size.height)
            }
        }
    }
}

/// Computes the popup position for a trigger.
///
/// - `BelowLeft`: `top = trigger.bottom + scroll.y`, `left = trigger.left + scroll.x`
/// - `BelowRight`: `top = trigger.bottom + scroll.y`,
///   `right = viewport.width - trigger.right - scroll.x`
///
/// # Examples
///
/// ```
/// use protolab_overlay::{AnchorMode, OverlayPosition, Rect, ScrollOffset, Viewport, compute_position};
///
/// let trigger = Rect::new(30, 10, 8, 2);
/// let viewport = Viewport::new(100, 40).scrolled(ScrollOffset::new(0, 5));
///
/// assert_eq!(
///     compute_position(trigger, &viewport, AnchorMode::BelowLeft),
///     OverlayPosition::TopLeft { top: 17, left: 30 }
/// );
/// assert_eq!(
///     compute_position(trigger, &viewport, AnchorMode::BelowRight),
///     OverlayPosition::TopRight { top: 17, right: 62 }
/// );
/// ```
#[must_use]
pub const fn compute_position(trigger: Rect, viewport: &Viewport, anchor: AnchorMode) -> OverlayPosition {
    let top = trigger.bottom + viewport.scroll.y;
    match anchor {
        AnchorMode::BelowLeft => OverlayPosition::TopLeft {
            top,
            left: trigger.left + viewport.scroll.x,
        },
        AnchorMode::BelowRight => OverlayPosition::TopRight {
            top,
            right: viewport.width - trigger.right - viewport.scroll.x,
        },
    }
}
