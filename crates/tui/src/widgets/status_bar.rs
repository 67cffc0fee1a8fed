//! Footer status bar.
//!
//! Shows, in order of precedence: the board's error banner, the last status
//! message, or key hints for the current mode.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::state::{AppState, View};

/// Renders the status bar for `state`.
///
/// # Examples
///
/// ```
/// use ratatui::buffer::Buffer;
/// use ratatui::layout::Rect;
/// use protolab_protocol::{OrderBoard, dummy};
/// use protolab_transition::{FailurePolicy, KanbanController, KindPolicies, RegistryController};
/// use protolab_tui::AppState;
/// use protolab_tui::widgets::render_status_bar;
///
/// let state = AppState::new(
///     KanbanController::new(OrderBoard::from_records(dummy::sample_orders()), FailurePolicy::KeepOptimistic),
///     RegistryController::new(dummy::sample_registry(), KindPolicies::default()),
/// );
/// let area = Rect::new(0, 0, 80, 3);
/// let mut buf = Buffer::empty(area);
///
/// render_status_bar(&state, area, &mut buf);
/// ```
pub fn render_status_bar(state: &AppState, area: Rect, buf: &mut Buffer) {
    let line = if let Some(banner) = state.kanban.banner() {
        Line::from(vec![
            Span::styled(
                format!("⚠ {banner}"),
                Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD),
            ),
            Span::styled("  (Esc fecha)", Style::default().fg(Color::DarkGray)),
        ])
    } else if let Some(message) = &state.status_line {
        Line::from(Span::styled(message.clone(), Style::default().fg(Color::White)))
    } else {
        hints(state)
    };

    Paragraph::new(line)
        .block(Block::default().borders(Borders::ALL))
        .render(area, buf);
}

fn hints(state: &AppState) -> Line<'static> {
    let bindings: &[(&str, &str)] = if state.searching {
        &[("Enter", "Confirmar"), ("Esc", "Cancelar"), ("Backspace", "Apagar")]
    } else {
        match state.view {
            View::Board => &[
                ("Ctrl+C", "Sair"),
                ("←→↑↓", "Navegar"),
                ("Enter", "Menu"),
                ("Shift+←→", "Mover"),
                ("Tab", "Cadastros"),
                ("?", "Ajuda"),
            ],
            View::Registry => &[
                ("Ctrl+C", "Sair"),
                ("↑↓", "Navegar"),
                ("Enter", "Status"),
                ("Tab", "Quadro"),
                ("?", "Ajuda"),
            ],
        }
    };

    let key_style = Style::default().fg(Color::Yellow);
    let text_style = Style::default().fg(Color::White);
    let spans = bindings
        .iter()
        .flat_map(|(key, text)| {
            [
                Span::styled(*key, key_style),
                Span::styled(format!(" {text}  "), text_style),
            ]
        })
        .collect::<Vec<_>>();
    Line::from(spans)
}
