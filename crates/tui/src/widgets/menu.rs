//! Paints the portal layer: every mounted popup, after everything else.
//!
//! Popups are placed in screen coordinates and may hang off an edge, so each
//! one is drawn into its own scratch buffer and only the cells that land on
//! screen are copied over.

use protolab_overlay::{MountedNode, Portal};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};

use crate::layout::clip_rect;
use crate::overlays::MenuContent;

/// Renders every node of the portal, in mount order, clipped to `bounds`.
pub fn render_portal(portal: &Portal<MenuContent>, bounds: Rect, buf: &mut Buffer) {
    for node in portal.nodes().iter() {
        paint_node(node, bounds, buf);
    }
}

fn paint_node(node: &MountedNode<MenuContent>, bounds: Rect, buf: &mut Buffer) {
    let Some(visible) = clip_rect(node.area, bounds) else {
        return;
    };
    let (Ok(width), Ok(height)) = (u16::try_from(node.area.width()), u16::try_from(node.area.height())) else {
        return;
    };
    let local = Rect::new(0, 0, width, height);
    let mut scratch = Buffer::empty(local);
    render_menu(&node.content, local, &mut scratch);

    for y in visible.top()..visible.bottom() {
        for x in visible.left()..visible.right() {
            let (Ok(sx), Ok(sy)) = (
                u16::try_from(i32::from(x) - node.area.left),
                u16::try_from(i32::from(y) - node.area.top),
            ) else {
                continue;
            };
            if let (Some(src), Some(dst)) = (scratch.cell((sx, sy)), buf.cell_mut((x, y))) {
                *dst = src.clone();
            }
        }
    }
}

/// Renders one menu box into `area`.
///
/// ```text
/// ╭ OS-0101 ───────────────╮
/// │  Mover para Em andamento│
/// │  Excluir                │
/// ╰─────────────────────────╯
/// ```
pub fn render_menu(menu: &MenuContent, area: Rect, buf: &mut Buffer) {
    let highlight = Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD);
    let normal = Style::default().fg(Color::White);

    let lines: Vec<Line<'_>> = menu
        .items
        .iter()
        .enumerate()
        .map(|(index, label)| {
            let mark = if menu.current == Some(index) { "✓ " } else { "  " };
            let style = if index == menu.highlighted { highlight } else { normal };
            Line::from(Span::styled(format!("{mark}{label} "), style))
        })
        .collect();

    Paragraph::new(lines)
        .style(Style::default().bg(Color::Black))
        .block(
            Block::default()
                .title(Span::styled(
                    format!(" {} ", menu.title),
                    Style::default().fg(Color::LightYellow).add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::LightYellow)),
        )
        .render(area, buf);
}
