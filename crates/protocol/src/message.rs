//! TUI message types for event handling.
//!
//! This module defines the message enum used for communication between
//! the TUI input handler and the application state.

use serde::{Deserialize, Serialize};

/// Messages that represent user actions in the TUI.
///
/// These messages are produced by the input handler and consumed by
/// the application state to update the UI.
///
/// # Examples
///
/// ```
/// use protolab_protocol::Message;
///
/// let msg = Message::PointerDown { column: 4, row: 2 };
/// assert!(msg.is_pointer());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Message {
    /// Move selection to the left column.
    NavigateLeft,
    /// Move selection to the right column.
    NavigateRight,
    /// Move selection up (or highlight the previous menu item).
    NavigateUp,
    /// Move selection down (or highlight the next menu item).
    NavigateDown,
    /// Activate the highlighted menu item or toggle the selection's menu.
    Select,
    /// Toggle the menu of the selected card or row.
    ToggleMenu,
    /// Move the selected card one column to the left.
    MoveLeft,
    /// Move the selected card one column to the right.
    MoveRight,
    /// Switch between the board and the registry.
    SwitchView,
    /// Start editing the search term.
    StartSearch,
    /// A character typed into the search box.
    SearchInput {
        /// The typed character.
        ch: char,
    },
    /// Delete the last character of the search term.
    SearchBackspace,
    /// Stop editing the search term.
    SearchConfirm,
    /// Cycle the priority filter.
    CyclePriority,
    /// Toggle simulated offline mode on the backend.
    ToggleOffline,
    /// Reload everything from the backend.
    Refresh,
    /// Contextual escape: leave search, close help, clear selection.
    Escape,
    /// Toggle help overlay.
    ToggleHelp,
    /// Quit the application.
    Quit,
    /// Left mouse button pressed.
    PointerDown {
        /// Column (x) in terminal cells.
        column: u16,
        /// Row (y) in terminal cells.
        row: u16,
    },
    /// Mouse moved with the left button held.
    PointerDrag {
        /// Column (x) in terminal cells.
        column: u16,
        /// Row (y) in terminal cells.
        row: u16,
    },
    /// Left mouse button released.
    PointerUp {
        /// Column (x) in terminal cells.
        column: u16,
        /// Row (y) in terminal cells.
        row: u16,
    },
    /// Mouse wheel scrolled.
    Scroll {
        /// Column (x) in terminal cells.
        column: u16,
        /// Row (y) in terminal cells.
        row: u16,
        /// Positive scrolls down, negative up.
        delta: i8,
    },
    /// The terminal was resized.
    Resize {
        /// New width in cells.
        width: u16,
        /// New height in cells.
        height: u16,
    },
}

impl Message {
    /// Returns `true` if this message is a navigation action.
    #[must_use]
    pub const fn is_navigation(self) -> bool {
        matches!(
            self,
            Self::NavigateLeft | Self::NavigateRight | Self::NavigateUp | Self::NavigateDown
        )
    }

    /// Returns `true` for mouse button messages.
    #[must_use]
    pub const fn is_pointer(self) -> bool {
        matches!(
            self,
            Self::PointerDown { .. } | Self::PointerDrag { .. } | Self::PointerUp { .. }
        )
    }

    /// Returns `true` if this message should terminate the application.
    ///
    /// # Examples
    ///
    /// ```
    /// use protolab_protocol::Message;
    ///
    /// assert!(Message::Quit.is_terminating());
    /// assert!(!Message::Escape.is_terminating());
    /// ```
    #[must_use]
    pub const fn is_terminating(self) -> bool {
        matches!(self, Self::Quit)
    }
}
