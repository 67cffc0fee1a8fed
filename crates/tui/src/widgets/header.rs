//! Header bar: view tabs, active filters and connectivity.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::state::{AppState, View};

/// Renders the header. `offline` reflects the backend's simulated
/// connectivity.
pub fn render_header(state: &AppState, offline: bool, area: Rect, buf: &mut Buffer) {
    let active = Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD);
    let inactive = Style::default().fg(Color::DarkGray);
    let label = Style::default().fg(Color::DarkGray);
    let value = Style::default().fg(Color::White);

    let mut spans = vec![Span::styled("protolab ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))];
    for view in [View::Board, View::Registry] {
        let style = if view == state.view { active } else { inactive };
        spans.push(Span::styled(format!(" {} ", view.title()), style));
        spans.push(Span::raw(" "));
    }

    if state.view == View::Board {
        let filter = state.kanban.filter();
        let priority = filter.priority.map_or("Todas", |p| p.label());
        spans.push(Span::styled(" Prioridade: ", label));
        spans.push(Span::styled(priority, value));

        let cursor = if state.searching { "▏" } else { "" };
        if state.searching || !filter.search.is_empty() {
            spans.push(Span::styled("  Busca: ", label));
            spans.push(Span::styled(format!("{}{cursor}", filter.search), value));
        }
    }

    if offline {
        spans.push(Span::styled(
            "  OFFLINE",
            Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD),
        ));
    }

    Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)))
        .render(area, buf);
}
