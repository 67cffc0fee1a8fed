//! Help overlay listing every key binding, shown with `?`.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget},
};

const HELP_WIDTH: u16 = 42;

const HELP_HEIGHT: u16 = 25;

const NAVIGATION: &[(&str, &str)] = &[
    ("←/→", "Previous / next column"),
    ("↑/↓", "Previous / next card or row"),
    ("Tab", "Board / registry"),
];

const ACTIONS: &[(&str, &str)] = &[
    ("Enter", "Open menu / choose item"),
    ("m", "Card menu or status picker"),
    ("Shift+←/→", "Move card one column"),
    ("/", "Search"),
    ("p", "Cycle priority filter"),
    ("r", "Reload from server"),
    ("o", "Toggle offline server"),
    ("Esc", "Close menu / dismiss"),
    ("Ctrl+C", "Quit"),
    ("?", "Toggle help"),
];

const MOUSE: &[(&str, &str)] = &[
    ("Click", "Select, open [≡] or pill"),
    ("Drag", "Move card to a column"),
    ("Wheel", "Scroll column or list"),
];

/// Renders a centered help panel on top of whatever is in `area`.
///
/// # Examples
///
/// ```
/// use ratatui::buffer::Buffer;
/// use ratatui::layout::Rect;
/// use protolab_tui::widgets::render_help_overlay;
///
/// let area = Rect::new(0, 0, 80, 30);
/// let mut buf = Buffer::empty(area);
///
/// render_help_overlay(area, &mut buf);
/// ```
pub fn render_help_overlay(area: Rect, buf: &mut Buffer) {
    let popup_area = centered_rect(HELP_WIDTH, HELP_HEIGHT, area);
    Clear.render(popup_area, buf);

    let help_block = Block::default()
        .title(Span::styled(
            " Ajuda ",
            Style::default().fg(Color::LightYellow).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::LightYellow));

    Paragraph::new(build_help_lines())
        .block(help_block)
        .alignment(Alignment::Left)
        .render(popup_area, buf);
}

fn build_help_lines() -> Vec<Line<'static>> {
    let header_style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let hint_style = Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC);

    let mut lines = Vec::new();
    for (title, bindings) in [("Navigation", NAVIGATION), ("Actions", ACTIONS), ("Mouse", MOUSE)] {
        lines.push(Line::from(Span::styled(format!("  {title}"), header_style)));
        lines.extend(bindings.iter().map(|(key, text)| binding_line(key, text)));
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled("  Press any key to close", hint_style)));
    lines
}

fn binding_line(key: &'static str, text: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {key:<11}"), Style::default().fg(Color::Green)),
        Span::styled(text, Style::default().fg(Color::White)),
    ])
}

/// Centers a `width` x `height` box in `area`, clamped to fit.
pub(crate) fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let popup_width = width.min(area.width);
    let popup_height = height.min(area.height);
    let x = area.x + area.width.saturating_sub(popup_width) / 2;
    let y = area.y + area.height.saturating_sub(popup_height) / 2;
    Rect::new(x, y, popup_width, popup_height)
}
