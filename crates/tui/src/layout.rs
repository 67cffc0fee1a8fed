//! Screen layout: measurements plus the hit-test geometry of one frame.
//!
//! [`ScreenLayout::compute`] is a pure function of the state and the
//! terminal area. The app recomputes it after every update, renders from
//! it, hit-tests mouse events against it, and re-measures popup triggers
//! from it.

use protolab_overlay::{Point, Rect as OverlayRect, Viewport};
use protolab_protocol::{EntityId, EntityKind, OrderId};
use ratatui::layout::{Constraint, Layout, Rect};

use crate::state::{AppState, COLUMN_COUNT, RegistryLine, View, registry_lines};

/// Height of the header bar in rows.
pub const HEADER_HEIGHT: u16 = 3;

/// Height of the status bar in rows.
pub const STATUS_BAR_HEIGHT: u16 = 3;

/// Height of each order card: border, two content rows, border.
pub const CARD_HEIGHT: u16 = 4;

/// Width of the menu trigger drawn on each card's first row.
pub const TRIGGER_WIDTH: u16 = 3;

/// Width of the status pill on registry rows.
pub const PILL_WIDTH: u16 = 11;

/// Minimum terminal height: status bar plus one card per column.
pub const MIN_HEIGHT: u16 = STATUS_BAR_HEIGHT + CARD_HEIGHT + 2 + 1;

/// Below this height the header is hidden to give the board its rows back.
pub const MIN_HEIGHT_WITH_HEADER: u16 = MIN_HEIGHT + HEADER_HEIGHT;

/// Minimum terminal width: three columns of 16 cells.
pub const MIN_WIDTH: u16 = 48;

/// A visible order card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardSlot {
    pub order: OrderId,
    pub column: usize,
    /// Index within the filtered column.
    pub index: usize,
    pub area: Rect,
    /// The card menu trigger.
    pub trigger: Option<Rect>,
}

/// A visible registry entry row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSlot {
    pub entity: EntityId,
    /// Index into the registry entries.
    pub index: usize,
    pub area: Rect,
    /// The status pill, which triggers the status picker.
    pub pill: Rect,
}

/// Geometry of one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScreenLayout {
    pub area: Rect,
    /// `true` when the terminal is below the minimum size.
    pub too_small: bool,
    pub header: Option<Rect>,
    pub content: Rect,
    pub status_bar: Rect,
    /// Column blocks, board view only.
    pub columns: Vec<Rect>,
    pub cards: Vec<CardSlot>,
    /// Cards that fit in each column.
    pub column_capacity: [usize; COLUMN_COUNT],
    /// Effective first visible card of each column.
    pub column_scroll: [usize; COLUMN_COUNT],
    /// Inner area of the registry list.
    pub list: Rect,
    pub headings: Vec<(EntityKind, Rect)>,
    pub rows: Vec<RowSlot>,
    pub registry_capacity: usize,
    pub registry_scroll: usize,
}

impl ScreenLayout {
    /// Lays out `state` inside `area`.
    #[must_use]
    pub fn compute(state: &AppState, area: Rect) -> Self {
        let mut layout = Self {
            area,
            column_scroll: state.column_scroll,
            registry_scroll: state.registry_scroll,
            ..Self::default()
        };
        if area.height < MIN_HEIGHT || area.width < MIN_WIDTH {
            layout.too_small = true;
            return layout;
        }

        let body = if area.height >= MIN_HEIGHT_WITH_HEADER {
            let [header, body] = Layout::vertical([Constraint::Length(HEADER_HEIGHT), Constraint::Min(0)]).areas(area);
            layout.header = Some(header);
            body
        } else {
            area
        };
        let [content, status_bar] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(STATUS_BAR_HEIGHT)]).areas(body);
        layout.content = content;
        layout.status_bar = status_bar;

        match state.view {
            View::Board => layout.place_board(state),
            View::Registry => layout.place_registry(state),
        }
        layout
    }

    fn place_board(&mut self, state: &AppState) {
        let columns: [Rect; COLUMN_COUNT] = Layout::horizontal([Constraint::Ratio(1, 3); COLUMN_COUNT]).areas(self.content);
        self.columns = columns.to_vec();

        for (column, orders) in state.kanban.columns().iter().enumerate() {
            let inner = inset(columns[column]);
            let capacity = usize::from((inner.height / CARD_HEIGHT).max(1));
            let selected = (column == state.selected_column)
                .then_some(state.selected_card)
                .flatten();
            let scroll = fit_scroll(self.column_scroll[column], selected, orders.len(), capacity);
            self.column_capacity[column] = capacity;
            self.column_scroll[column] = scroll;

            for (slot, (index, order)) in orders.iter().enumerate().skip(scroll).take(capacity).enumerate() {
                let top = inner.y + CARD_HEIGHT * slot as u16;
                let height = CARD_HEIGHT.min(inner.bottom().saturating_sub(top));
                if height < 3 {
                    break;
                }
                let area = Rect::new(inner.x, top, inner.width, height);
                self.cards.push(CardSlot {
                    order: order.id,
                    column,
                    index,
                    area,
                    trigger: card_trigger(area),
                });
            }
        }
    }

    fn place_registry(&mut self, state: &AppState) {
        let list = inset(self.content);
        let lines = registry_lines(state.registry.entries());
        let capacity = usize::from(list.height).max(1);
        let selected_line = state
            .selected_row
            .and_then(|row| lines.iter().position(|l| *l == RegistryLine::Entry(row)));
        let scroll = fit_scroll(self.registry_scroll, selected_line, lines.len(), capacity);
        self.list = list;
        self.registry_capacity = capacity;
        self.registry_scroll = scroll;

        let entries = state.registry.entries();
        for (offset, line) in lines.iter().skip(scroll).take(capacity).enumerate() {
            let area = Rect::new(list.x, list.y + offset as u16, list.width, 1);
            match *line {
                RegistryLine::Heading(kind) => self.headings.push((kind, area)),
                RegistryLine::Entry(index) => {
                    let Some(entry) = entries.get(index) else {
                        continue;
                    };
                    let pill_x = area.right().saturating_sub(PILL_WIDTH + 1).max(area.x);
                    self.rows.push(RowSlot {
                        entity: entry.id,
                        index,
                        area,
                        pill: Rect::new(pill_x, area.y, PILL_WIDTH.min(area.width), 1),
                    });
                }
            }
        }
    }

    /// The viewport handed to the overlay layer. The terminal root never
    /// scrolls, so the offset is always zero.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        Viewport::new(i32::from(self.area.width), i32::from(self.area.height))
    }

    #[must_use]
    pub fn card(&self, order: OrderId) -> Option<&CardSlot> {
        self.cards.iter().find(|c| c.order == order)
    }

    #[must_use]
    pub fn row(&self, entity: EntityId) -> Option<&RowSlot> {
        self.rows.iter().find(|r| r.entity == entity)
    }

    #[must_use]
    pub fn card_at(&self, column: u16, row: u16) -> Option<&CardSlot> {
        self.cards.iter().find(|c| c.area.contains((column, row).into()))
    }

    #[must_use]
    pub fn row_at(&self, column: u16, row: u16) -> Option<&RowSlot> {
        self.rows.iter().find(|r| r.area.contains((column, row).into()))
    }

    /// The board column under a point.
    #[must_use]
    pub fn column_at(&self, column: u16, row: u16) -> Option<usize> {
        self.columns.iter().position(|c| c.contains((column, row).into()))
    }

    #[must_use]
    pub fn in_list(&self, column: u16, row: u16) -> bool {
        self.list.contains((column, row).into())
    }
}

/// The first visible index that keeps `selected` on screen.
fn fit_scroll(scroll: usize, selected: Option<usize>, len: usize, capacity: usize) -> usize {
    let scroll = scroll.min(len.saturating_sub(capacity));
    match selected {
        Some(index) if index < scroll => index,
        Some(index) if index >= scroll + capacity => index + 1 - capacity,
        _ => scroll,
    }
}

fn inset(area: Rect) -> Rect {
    Rect::new(
        area.x.saturating_add(1),
        area.y.saturating_add(1),
        area.width.saturating_sub(2),
        area.height.saturating_sub(2),
    )
}

fn card_trigger(card: Rect) -> Option<Rect> {
    if card.width < TRIGGER_WIDTH + 6 {
        return None;
    }
    Some(Rect::new(card.right() - 1 - TRIGGER_WIDTH, card.y + 1, TRIGGER_WIDTH, 1))
}

/// Converts a terminal rectangle to overlay geometry.
#[must_use]
pub fn overlay_rect(rect: Rect) -> OverlayRect {
    OverlayRect::new(
        i32::from(rect.x),
        i32::from(rect.y),
        i32::from(rect.width),
        i32::from(rect.height),
    )
}

/// The part of an overlay rectangle that lies within `bounds`, if any.
///
/// Popups are not clamped to the screen, so they may hang off an edge.
#[must_use]
pub fn clip_rect(rect: OverlayRect, bounds: Rect) -> Option<Rect> {
    let left = rect.left.max(i32::from(bounds.x));
    let top = rect.top.max(i32::from(bounds.y));
    let right = rect.right.min(i32::from(bounds.right()));
    let bottom = rect.bottom.min(i32::from(bounds.bottom()));
    if right <= left || bottom <= top {
        return None;
    }
    let cell = |v: i32| u16::try_from(v).ok();
    Some(Rect::new(cell(left)?, cell(top)?, cell(right - left)?, cell(bottom - top)?))
}

/// A terminal cell as an overlay point.
#[must_use]
pub fn point(column: u16, row: u16) -> Point {
    Point::new(i32::from(column), i32::from(row))
}
