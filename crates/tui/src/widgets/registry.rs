//! Registry rendering: entries grouped under kind headings, each with a
//! status pill that opens the status picker.

use protolab_protocol::{BinaryStatus, RegistryEntry, Status};
use ratatui::{
    buffer::Buffer,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Widget},
};

use crate::layout::ScreenLayout;
use crate::state::{AppState, View};

/// Text of a status pill, padded to the pill width.
///
/// # Examples
///
/// ```
/// use protolab_protocol::BinaryStatus;
/// use protolab_tui::widgets::pill_label;
///
/// assert_eq!(pill_label(BinaryStatus::Ativo), "[Ativo ▾]");
/// assert_eq!(pill_label(BinaryStatus::Inativo), "[Inativo ▾]");
/// ```
#[must_use]
pub fn pill_label(status: BinaryStatus) -> String {
    format!("[{} ▾]", status.label())
}

const fn pill_color(status: BinaryStatus) -> Color {
    match status {
        BinaryStatus::Ativo => Color::Green,
        BinaryStatus::Inativo => Color::Red,
    }
}

/// Renders the registry list.
pub fn render_registry(state: &AppState, layout: &ScreenLayout, buf: &mut Buffer) {
    let entries = state.registry.entries();
    Block::default()
        .title(Span::styled(
            format!(" {} ({}) ", View::Registry.title(), entries.len()),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Cyan))
        .render(layout.content, buf);

    let heading_style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    for (kind, area) in &layout.headings {
        let total = entries.iter().filter(|e| e.kind == *kind).count();
        let active = state.registry.active_count(*kind);
        let line = Line::from(vec![
            Span::styled(kind.heading(), heading_style),
            Span::styled(format!("  {active}/{total} ativos"), Style::default().fg(Color::DarkGray)),
        ]);
        buf.set_line(area.x, area.y, &line, area.width);
    }

    for slot in &layout.rows {
        let Some(entry) = entries.get(slot.index) else {
            continue;
        };
        let selected = state.selected_row == Some(slot.index);
        render_row(entry, state.registry.is_pending(entry.id), selected, slot, buf);
    }
}

fn render_row(entry: &RegistryEntry, pending: bool, selected: bool, slot: &crate::layout::RowSlot, buf: &mut Buffer) {
    let area = slot.area;
    let base = if selected {
        Style::default().bg(Color::DarkGray).fg(Color::White).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    buf.set_style(area, base);

    let marker = if pending { super::board::PENDING_MARKER } else { "  " };
    let name_width = slot.pill.x.saturating_sub(area.x);
    let line = Line::from(vec![
        Span::styled(marker, base.fg(Color::Magenta)),
        Span::styled(entry.name.clone(), base),
    ]);
    buf.set_line(area.x, area.y, &line, name_width);

    let pill_style = base.fg(pill_color(entry.status));
    buf.set_stringn(slot.pill.x, slot.pill.y, pill_label(entry.status), usize::from(slot.pill.width), pill_style);
}

#[cfg(test)]
mod tests {
    use protolab_protocol::EntityKind;
    use ratatui::layout::Rect;

    use super::*;
    use crate::test_utils::{buffer_to_string, sample_state};

    fn render(state: &AppState) -> (ScreenLayout, Buffer) {
        let area = Rect::new(0, 0, 80, 30);
        let layout = ScreenLayout::compute(state, area);
        let mut buf = Buffer::empty(area);
        render_registry(state, &layout, &mut buf);
        (layout, buf)
    }

    fn registry_state() -> AppState {
        let mut state = sample_state();
        state.switch_view();
        state
    }

    #[test]
    fn headings_show_active_counts() {
        let (_, buf) = render(&registry_state());
        let content = buffer_to_string(&buf);
        assert!(content.contains("Cadastros (12)"));
        assert!(content.contains("Dentistas  2/3 ativos"));
        assert!(content.contains("Clínicas  1/1 ativos"));
    }

    #[test]
    fn rows_show_name_and_pill() {
        let (layout, buf) = render(&registry_state());
        let content = buffer_to_string(&buf);
        assert!(content.contains("Dr. Carlos Reis"));
        assert!(content.contains("[Inativo ▾]"));

        let first = layout.rows[0];
        let pill_cell = buf.cell((first.pill.x, first.pill.y)).expect("in bounds");
        assert_eq!(pill_cell.symbol(), "[");
    }

    #[test]
    fn pending_row_has_marker() {
        let mut state = registry_state();
        let entry = state
            .registry
            .entries()
            .iter()
            .find(|e| e.kind == EntityKind::Clinic)
            .map(|e| e.id)
            .expect("sample clinic");
        state
            .registry
            .request_transition(entry, BinaryStatus::Inativo)
            .expect("accepted");

        let (_, buf) = render(&state);
        let content = buffer_to_string(&buf);
        assert!(content.contains("⟳ Clínica Sorriso Centro"));
        assert!(content.contains("Clínicas  0/1 ativos"));
    }

    #[test]
    fn selected_row_is_highlighted() {
        let mut state = registry_state();
        state.selected_row = Some(0);
        let (layout, buf) = render(&state);
        let row = layout.row(state.registry.entries()[0].id).expect("visible");
        let cell = buf.cell((row.area.x + 3, row.area.y)).expect("in bounds");
        assert_eq!(cell.bg, Color::DarkGray);
    }
}
