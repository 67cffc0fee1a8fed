//! Board rendering: three status columns of order cards.
//!
//! Geometry comes from [`ScreenLayout`]; this module only paints. Column
//! borders follow the selection (cyan) and the drag target (yellow), and
//! cards are tinted by priority.

use protolab_protocol::{Order, Priority, Status, WorkflowStatus};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};

use crate::layout::{CardSlot, ScreenLayout};
use crate::state::AppState;

/// Marker drawn in front of a card whose move is still being committed.
pub const PENDING_MARKER: &str = "⟳ ";

/// Label of the card menu trigger.
pub const TRIGGER_LABEL: &str = "[≡]";

/// Returns the color associated with a priority.
///
/// # Examples
///
/// ```
/// use protolab_protocol::Priority;
/// use protolab_tui::widgets::priority_color;
/// use ratatui::style::Color;
///
/// assert_eq!(priority_color(Priority::Urgente), Color::Red);
/// assert_eq!(priority_color(Priority::Baixa), Color::DarkGray);
/// ```
#[must_use]
pub const fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::Baixa => Color::DarkGray,
        Priority::Media => Color::Blue,
        Priority::Alta => Color::Yellow,
        Priority::Urgente => Color::Red,
    }
}

const fn priority_color_bright(priority: Priority) -> Color {
    match priority {
        Priority::Baixa => Color::Gray,
        Priority::Media => Color::LightBlue,
        Priority::Alta => Color::LightYellow,
        Priority::Urgente => Color::LightRed,
    }
}

/// Renders the columns and the cards visible in them.
pub fn render_board(state: &AppState, layout: &ScreenLayout, buf: &mut Buffer) {
    let counts = state.kanban.counts();
    let drag = state.kanban.drag();

    for (index, area) in layout.columns.iter().enumerate() {
        let Some(status) = WorkflowStatus::from_index(index) else {
            continue;
        };
        let is_drop_target = drag.is_some_and(|d| d.over == Some(status));
        let is_focused = index == state.selected_column;
        render_column(status, counts[index], is_focused, is_drop_target, *area, buf);
    }

    for slot in &layout.cards {
        let Some(order) = state.kanban.order(slot.order) else {
            continue;
        };
        let selected = slot.column == state.selected_column && state.selected_card == Some(slot.index);
        let card = CardLook {
            pending: state.kanban.is_pending(order.id),
            selected,
            dragging: drag.is_some_and(|d| d.order == order.id),
        };
        render_card(order, card, slot, buf);
    }
}

fn render_column(status: WorkflowStatus, count: usize, is_focused: bool, is_drop_target: bool, area: Rect, buf: &mut Buffer) {
    let border_color = if is_drop_target {
        Color::Yellow
    } else if is_focused {
        Color::Cyan
    } else {
        Color::DarkGray
    };
    let title_style = if is_focused || is_drop_target {
        Style::default().fg(border_color).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };

    let block = Block::default()
        .title(Span::styled(format!(" {} ({count}) ", status.label()), title_style))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color));
    let inner = block.inner(area);
    block.render(area, buf);

    if count == 0 && inner.height > 0 {
        Paragraph::new(Line::from(Span::styled(
            "Nenhum pedido",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )))
        .render(inner, buf);
    }
}

#[derive(Debug, Clone, Copy)]
struct CardLook {
    pending: bool,
    selected: bool,
    dragging: bool,
}

/// Renders one card.
///
/// ```text
/// ╭──────────────────────────╮
/// │⟳ OS-0101            [≡] │
/// │Maria Souza · Alta        │
/// ╰──────────────────────────╯
/// ```
fn render_card(order: &Order, look: CardLook, slot: &CardSlot, buf: &mut Buffer) {
    let area = slot.area;
    if area.width < 4 || area.height < 3 {
        return;
    }

    let priority = order.details.priority;
    let (border_color, code_style, detail_style) = if look.selected {
        (
            priority_color_bright(priority),
            Style::default().fg(priority_color_bright(priority)).add_modifier(Modifier::BOLD),
            Style::default().fg(Color::White),
        )
    } else {
        (
            priority_color(priority),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            Style::default().fg(Color::DarkGray),
        )
    };
    let mut border_style = Style::default().fg(border_color);
    if look.dragging {
        border_style = border_style.add_modifier(Modifier::DIM);
    }

    let mut first = Vec::new();
    if look.pending {
        first.push(Span::styled(PENDING_MARKER, Style::default().fg(Color::Magenta)));
    }
    first.push(Span::styled(order.details.code.clone(), code_style));

    let second = Line::from(Span::styled(
        format!("{} · {}", order.details.patient, priority.label()),
        detail_style,
    ));

    Paragraph::new(vec![Line::from(first), second])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(border_style),
        )
        .render(area, buf);

    if let Some(trigger) = slot.trigger {
        buf.set_string(trigger.x, trigger.y, TRIGGER_LABEL, Style::default().fg(Color::Cyan));
    }
}
