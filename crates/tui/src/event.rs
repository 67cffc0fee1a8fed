//! Event polling and key/mouse mappings.

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use protolab_protocol::Message;

/// Default poll timeout for events.
const POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// Polls for a terminal event with the default timeout.
///
/// # Errors
///
/// Returns an error if polling the terminal fails.
pub fn poll_event() -> std::io::Result<Option<Event>> {
    if event::poll(POLL_TIMEOUT)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Converts a terminal event to an application message.
///
/// `searching` switches keys to search-box editing.
#[must_use]
pub fn event_to_message(event: &Event, searching: bool) -> Option<Message> {
    match event {
        Event::Key(key) if searching => key_to_search_message(*key),
        Event::Key(key) => key_to_message(*key),
        Event::Mouse(mouse) => mouse_to_message(mouse),
        Event::Resize(width, height) => Some(Message::Resize {
            width: *width,
            height: *height,
        }),
        _ => None,
    }
}

/// Only the left button drives pointer messages; the wheel scrolls.
#[must_use]
fn mouse_to_message(mouse: &MouseEvent) -> Option<Message> {
    let (column, row) = (mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(Message::PointerDown { column, row }),
        MouseEventKind::Drag(MouseButton::Left) => Some(Message::PointerDrag { column, row }),
        MouseEventKind::Up(MouseButton::Left) => Some(Message::PointerUp { column, row }),
        MouseEventKind::ScrollDown => Some(Message::Scroll { column, row, delta: 1 }),
        MouseEventKind::ScrollUp => Some(Message::Scroll { column, row, delta: -1 }),
        _ => None,
    }
}

/// Converts a key event to an application message.
///
/// # Key Bindings
///
/// | Key | Action |
/// |-----|--------|
/// | `Ctrl+C` | Quit |
/// | `Esc` | Escape (close menu, dismiss banner, clear selection) |
/// | Arrows | Navigate |
/// | `Shift+Left` / `Shift+Right` | Move the selected card one column |
/// | `Enter` or `Space` | Select |
/// | `m` | Open the selection's menu |
/// | `Tab` | Switch between board and registry |
/// | `/` | Search |
/// | `p` | Cycle priority filter |
/// | `o` | Toggle offline backend |
/// | `r` | Refresh |
/// | `?` | Toggle help |
#[must_use]
pub fn key_to_message(key: KeyEvent) -> Option<Message> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Message::Quit);
    }

    if key.modifiers.contains(KeyModifiers::SHIFT) {
        match key.code {
            KeyCode::Left => return Some(Message::MoveLeft),
            KeyCode::Right => return Some(Message::MoveRight),
            _ => {}
        }
    }

    match key.code {
        KeyCode::Esc => Some(Message::Escape),

        KeyCode::Left => Some(Message::NavigateLeft),
        KeyCode::Right => Some(Message::NavigateRight),
        KeyCode::Up => Some(Message::NavigateUp),
        KeyCode::Down => Some(Message::NavigateDown),

        KeyCode::Enter | KeyCode::Char(' ') => Some(Message::Select),
        KeyCode::Char('m') => Some(Message::ToggleMenu),
        KeyCode::Tab => Some(Message::SwitchView),

        KeyCode::Char('/') => Some(Message::StartSearch),
        KeyCode::Char('p') => Some(Message::CyclePriority),
        KeyCode::Char('o') => Some(Message::ToggleOffline),
        KeyCode::Char('r') => Some(Message::Refresh),
        KeyCode::Char('?') => Some(Message::ToggleHelp),

        _ => None,
    }
}

/// Converts a key event while the search box has focus.
#[must_use]
pub fn key_to_search_message(key: KeyEvent) -> Option<Message> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Message::Quit);
    }

    match key.code {
        KeyCode::Enter => Some(Message::SearchConfirm),
        KeyCode::Esc => Some(Message::Escape),
        KeyCode::Backspace => Some(Message::SearchBackspace),
        KeyCode::Char(ch) => Some(Message::SearchInput { ch }),
        _ => None,
    }
}
