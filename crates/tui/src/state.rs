//! Application state: the two controllers plus selection and view flags.

use protolab_protocol::{EntityKind, Order, OrderId, RegistryEntry, WorkflowStatus};
use protolab_transition::{KanbanController, RegistryController};

/// Number of board columns.
pub const COLUMN_COUNT: usize = 3;

/// Which screen is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// The order board.
    #[default]
    Board,
    /// The registry list.
    Registry,
}

impl View {
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Board => Self::Registry,
            Self::Registry => Self::Board,
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Board => "Quadro de pedidos",
            Self::Registry => "Cadastros",
        }
    }
}

/// One line of the registry list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryLine {
    /// A kind heading.
    Heading(EntityKind),
    /// An entry, by index into the controller's entries.
    Entry(usize),
}

/// Flattens sorted entries into headed lines.
///
/// # Examples
///
/// ```
/// use protolab_protocol::{EntityKind, RegistryEntry};
/// use protolab_tui::state::{RegistryLine, registry_lines};
///
/// let entries = vec![
///     RegistryEntry::new(EntityKind::Dentist, "Dr. Reis"),
///     RegistryEntry::new(EntityKind::Dentist, "Dra. Prado"),
///     RegistryEntry::new(EntityKind::Clinic, "Sorriso"),
/// ];
/// let lines = registry_lines(&entries);
/// assert_eq!(lines.len(), 5);
/// assert_eq!(lines[0], RegistryLine::Heading(EntityKind::Dentist));
/// assert_eq!(lines[4], RegistryLine::Entry(2));
/// ```
#[must_use]
pub fn registry_lines(entries: &[RegistryEntry]) -> Vec<RegistryLine> {
    let mut lines = Vec::with_capacity(entries.len() + EntityKind::all().len());
    let mut current = None;
    for (index, entry) in entries.iter().enumerate() {
        if current != Some(entry.kind) {
            current = Some(entry.kind);
            lines.push(RegistryLine::Heading(entry.kind));
        }
        lines.push(RegistryLine::Entry(index));
    }
    lines
}

/// All mutable state of the console.
#[derive(Debug)]
pub struct AppState {
    pub kanban: KanbanController,
    pub registry: RegistryController,
    pub view: View,
    /// Selected board column (0-2).
    pub selected_column: usize,
    /// Selected card within the filtered column.
    pub selected_card: Option<usize>,
    /// Selected registry entry.
    pub selected_row: Option<usize>,
    /// First visible card of each column.
    pub column_scroll: [usize; COLUMN_COUNT],
    /// First visible registry line.
    pub registry_scroll: usize,
    /// Whether keystrokes edit the search term.
    pub searching: bool,
    pub help_visible: bool,
    /// Transient message shown in the status bar.
    pub status_line: Option<String>,
}

impl AppState {
    #[must_use]
    pub fn new(kanban: KanbanController, registry: RegistryController) -> Self {
        Self {
            kanban,
            registry,
            view: View::default(),
            selected_column: 0,
            selected_card: None,
            selected_row: None,
            column_scroll: [0; COLUMN_COUNT],
            registry_scroll: 0,
            searching: false,
            help_visible: false,
            status_line: None,
        }
    }

    pub fn toggle_help(&mut self) {
        self.help_visible = !self.help_visible;
    }

    /// Hides help. Returns `true` if it was showing.
    pub fn dismiss_help(&mut self) -> bool {
        std::mem::replace(&mut self.help_visible, false)
    }

    pub fn switch_view(&mut self) {
        self.view = self.view.other();
    }

    /// The workflow status of the selected column.
    #[must_use]
    pub fn selected_status(&self) -> WorkflowStatus {
        WorkflowStatus::from_index(self.selected_column).unwrap_or_default()
    }

    fn column_len(&self, column: usize) -> usize {
        self.kanban.counts().get(column).copied().unwrap_or(0)
    }

    /// The selected order, if the selection points at a visible card.
    #[must_use]
    pub fn selected_order(&self) -> Option<&Order> {
        let index = self.selected_card?;
        let columns = self.kanban.columns();
        columns.get(self.selected_column)?.get(index).copied()
    }

    #[must_use]
    pub fn selected_entry(&self) -> Option<&RegistryEntry> {
        self.registry.entries().get(self.selected_row?)
    }

    /// Moves the selection onto an order. Returns `false` if it is not
    /// visible under the current filter.
    pub fn select_order(&mut self, id: OrderId) -> bool {
        for (column, orders) in self.kanban.columns().iter().enumerate() {
            if let Some(index) = orders.iter().position(|o| o.id == id) {
                self.selected_column = column;
                self.selected_card = Some(index);
                return true;
            }
        }
        false
    }

    pub fn navigate_left(&mut self) {
        self.selected_column = (self.selected_column + COLUMN_COUNT - 1) % COLUMN_COUNT;
        self.clamp_selection();
    }

    pub fn navigate_right(&mut self) {
        self.selected_column = (self.selected_column + 1) % COLUMN_COUNT;
        self.clamp_selection();
    }

    /// Moves up within the column or registry list, wrapping at the top.
    pub fn navigate_up(&mut self) {
        let len = self.current_len();
        let slot = self.current_selection_mut();
        *slot = match *slot {
            _ if len == 0 => None,
            Some(index) if index > 0 => Some(index - 1),
            Some(_) => Some(len - 1),
            None => Some(0),
        };
    }

    /// Moves down within the column or registry list, wrapping at the bottom.
    pub fn navigate_down(&mut self) {
        let len = self.current_len();
        let slot = self.current_selection_mut();
        *slot = match *slot {
            _ if len == 0 => None,
            Some(index) if index + 1 < len => Some(index + 1),
            Some(_) | None => Some(0),
        };
    }

    pub fn clear_selection(&mut self) {
        match self.view {
            View::Board => self.selected_card = None,
            View::Registry => self.selected_row = None,
        }
    }

    /// Pulls selections back in range after the data changed.
    pub fn clamp_selection(&mut self) {
        let cards = self.column_len(self.selected_column);
        self.selected_card = self.selected_card.and_then(|i| clamp_index(i, cards));
        let rows = self.registry.entries().len();
        self.selected_row = self.selected_row.and_then(|i| clamp_index(i, rows));
    }

    /// Scrolls one column by `delta` cards, dragging the selection along so
    /// it stays within the `capacity` visible cards.
    pub fn scroll_column(&mut self, column: usize, delta: i32, capacity: usize) {
        let Some(scroll) = self.column_scroll.get(column).copied() else {
            return;
        };
        let max = self.column_len(column).saturating_sub(capacity.max(1));
        let scroll = offset(scroll, delta).min(max);
        self.column_scroll[column] = scroll;

        if column == self.selected_column {
            self.selected_card = self
                .selected_card
                .map(|i| i.clamp(scroll, scroll + capacity.max(1) - 1));
            self.clamp_selection();
        }
    }

    /// Scrolls the registry list by `delta` lines, keeping the selected
    /// entry among the `capacity` visible lines.
    pub fn scroll_registry(&mut self, delta: i32, capacity: usize) {
        let lines = registry_lines(self.registry.entries());
        let capacity = capacity.max(1);
        let scroll = offset(self.registry_scroll, delta).min(lines.len().saturating_sub(capacity));
        self.registry_scroll = scroll;

        let Some(selected) = self.selected_row else {
            return;
        };
        let visible = lines.iter().skip(scroll).take(capacity);
        let entries: Vec<usize> = visible
            .filter_map(|line| match line {
                RegistryLine::Entry(index) => Some(*index),
                RegistryLine::Heading(_) => None,
            })
            .collect();
        if !entries.contains(&selected) {
            self.selected_row = if selected < entries.first().copied().unwrap_or(0) {
                entries.first().copied()
            } else {
                entries.last().copied()
            };
        }
    }

    fn current_len(&self) -> usize {
        match self.view {
            View::Board => self.column_len(self.selected_column),
            View::Registry => self.registry.entries().len(),
        }
    }

    fn current_selection_mut(&mut self) -> &mut Option<usize> {
        match self.view {
            View::Board => &mut self.selected_card,
            View::Registry => &mut self.selected_row,
        }
    }
}

fn clamp_index(index: usize, len: usize) -> Option<usize> {
    (len > 0).then(|| index.min(len - 1))
}

fn offset(value: usize, delta: i32) -> usize {
    if delta.is_negative() {
        value.saturating_sub(delta.unsigned_abs() as usize)
    } else {
        value.saturating_add(delta as usize)
    }
}

#[cfg(test)]
mod tests {
    use protolab_protocol::{OrderBoard, dummy};
    use protolab_transition::{FailurePolicy, KindPolicies};

    use super::*;

    fn sample_state() -> AppState {
        let kanban = KanbanController::new(
            OrderBoard::from_records(dummy::sample_orders()),
            FailurePolicy::KeepOptimistic,
        );
        let registry = RegistryController::new(dummy::sample_registry(), KindPolicies::default());
        AppState::new(kanban, registry)
    }

    #[test]
    fn starts_on_board_without_selection() {
        let state = sample_state();
        assert_eq!(state.view, View::Board);
        assert_eq!(state.selected_column, 0);
        assert!(state.selected_order().is_none());
    }

    #[test]
    fn column_navigation_wraps() {
        let mut state = sample_state();
        state.navigate_left();
        assert_eq!(state.selected_column, 2);
        state.navigate_right();
        assert_eq!(state.selected_column, 0);
    }

    #[test]
    fn card_navigation_wraps_within_column() {
        let mut state = sample_state();
        state.navigate_down();
        assert_eq!(state.selected_card, Some(0));
        state.navigate_up();
        assert_eq!(state.selected_card, Some(4));
        state.navigate_down();
        assert_eq!(state.selected_card, Some(0));
    }

    #[test]
    fn switching_column_clamps_card_index() {
        let mut state = sample_state();
        state.selected_card = Some(4);
        state.navigate_left();
        assert_eq!(state.selected_status(), WorkflowStatus::Concluido);
        assert_eq!(state.selected_card, Some(1));
    }

    #[test]
    fn select_order_finds_column_and_index() {
        let mut state = sample_state();
        let target = state.kanban.columns()[1][2].id;
        assert!(state.select_order(target));
        assert_eq!(state.selected_column, 1);
        assert_eq!(state.selected_card, Some(2));
        assert_eq!(state.selected_order().map(|o| o.id), Some(target));
    }

    #[test]
    fn registry_navigation_uses_rows() {
        let mut state = sample_state();
        state.switch_view();
        state.navigate_down();
        state.navigate_down();
        assert_eq!(state.selected_row, Some(1));
        assert_eq!(state.selected_card, None);
        state.clear_selection();
        assert_eq!(state.selected_row, None);
    }

    #[test]
    fn help_dismissal_reports_visibility() {
        let mut state = sample_state();
        assert!(!state.dismiss_help());
        state.toggle_help();
        assert!(state.dismiss_help());
        assert!(!state.help_visible);
    }

    #[test]
    fn column_scroll_drags_selection_along() {
        let mut state = sample_state();
        state.selected_card = Some(0);
        state.scroll_column(0, 3, 2);
        assert_eq!(state.column_scroll[0], 3);
        assert_eq!(state.selected_card, Some(3));

        state.scroll_column(0, 10, 2);
        assert_eq!(state.column_scroll[0], 3, "clamped to len - capacity");

        state.scroll_column(0, -10, 2);
        assert_eq!(state.column_scroll[0], 0);
        assert_eq!(state.selected_card, Some(1));
    }

    #[test]
    fn registry_scroll_keeps_selection_visible() {
        let mut state = sample_state();
        state.view = View::Registry;
        state.selected_row = Some(0);
        state.scroll_registry(4, 3);
        assert_eq!(state.registry_scroll, 4);
        let lines = registry_lines(state.registry.entries());
        let visible = &lines[4..7];
        let selected = state.selected_row.expect("still selected");
        assert!(visible.contains(&RegistryLine::Entry(selected)));
    }

    #[test]
    fn registry_lines_head_each_kind_once() {
        let state = sample_state();
        let lines = registry_lines(state.registry.entries());
        let headings = lines
            .iter()
            .filter(|l| matches!(l, RegistryLine::Heading(_)))
            .count();
        assert_eq!(headings, EntityKind::all().len());
        assert_eq!(lines.len(), state.registry.entries().len() + headings);
    }
}
