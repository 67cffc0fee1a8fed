//! Main application struct and run loop.
//!
//! [`App`] owns the console state, the popup layer and a handle on the
//! backend. Status commits and reloads run as tokio tasks; their results
//! come back as [`Update`]s over a channel and are applied between frames,
//! so the UI never waits on the network.

use protolab_backend::{LabBackend, LabSnapshot};
use protolab_config::Config;
use protolab_overlay::OverlayEvent;
use protolab_protocol::{
    BinaryStatus, EntityId, Message, OrderBoard, OrderId, OrderRecord, RegistryEntry, Status,
    StatusChangeRequest, WorkflowStatus,
};
use protolab_transition::{
    CommitOutcome, KanbanController, RegistryController, Rejection, TransitionEvent, run_commit,
};
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Style},
    widgets::Paragraph,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{
    AppState,
    event::{event_to_message, poll_event},
    layout::{MIN_HEIGHT, MIN_WIDTH, ScreenLayout, point},
    overlays::{MenuItem, MenuTarget, Overlays},
    state::View,
    terminal::AppTerminal,
    widgets::{render_board, render_header, render_help_overlay, render_portal, render_registry, render_status_bar},
};

/// A result produced off the UI loop.
#[derive(Debug)]
pub enum Update {
    /// An order status commit settled.
    Order(CommitOutcome<WorkflowStatus>),
    /// A registry status commit settled.
    Registry(CommitOutcome<BinaryStatus>),
    /// A reload finished.
    Refreshed {
        orders: Vec<OrderRecord>,
        registry: Vec<RegistryEntry>,
    },
    /// A message for the status bar.
    Notice(String),
}

/// The console application.
#[derive(Debug)]
pub struct App {
    state: AppState,
    overlays: Overlays,
    layout: ScreenLayout,
    /// Terminal area of the last frame or resize.
    area: Rect,
    backend: LabBackend,
    updates_tx: mpsc::UnboundedSender<Update>,
    updates_rx: mpsc::UnboundedReceiver<Update>,
    should_quit: bool,
}

impl App {
    /// Creates the console over `snapshot`, talking to `backend`.
    ///
    /// # Examples
    ///
    /// ```
    /// use protolab_backend::{BackendSettings, LabBackend, LabSnapshot};
    /// use protolab_config::Config;
    /// use protolab_tui::App;
    ///
    /// let snapshot = LabSnapshot::sample();
    /// let backend = LabBackend::from_snapshot(snapshot.clone(), BackendSettings::instant());
    /// let app = App::new(backend, &Config::default(), snapshot);
    /// assert_eq!(app.state().kanban.counts(), [5, 4, 2]);
    /// ```
    #[must_use]
    pub fn new(backend: LabBackend, config: &Config, snapshot: LabSnapshot) -> Self {
        let mut kanban = KanbanController::new(OrderBoard::from_records(snapshot.orders), config.transitions.board);
        kanban.subscribe(|event: &TransitionEvent<WorkflowStatus>| log_transition("order", event));

        let mut registry = RegistryController::new(snapshot.registry, config.transitions.registry.kind_policies());
        registry.subscribe(|event: &TransitionEvent<BinaryStatus>| log_transition("registry", event));

        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        Self {
            state: AppState::new(kanban, registry),
            overlays: Overlays::new(config.overlay.card_menu_anchor, config.overlay.status_picker_anchor),
            layout: ScreenLayout::default(),
            area: Rect::default(),
            backend,
            updates_tx,
            updates_rx,
            should_quit: false,
        }
    }

    #[must_use]
    pub fn state(&self) -> &AppState {
        &self.state
    }

    #[must_use]
    pub fn overlays(&self) -> &Overlays {
        &self.overlays
    }

    /// Geometry of the last frame.
    #[must_use]
    pub fn layout(&self) -> &ScreenLayout {
        &self.layout
    }

    #[must_use]
    pub fn backend(&self) -> &LabBackend {
        &self.backend
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Processes one message.
    ///
    /// While help is showing, every message except `Quit` and `Resize`
    /// just dismisses it. While a menu is open, arrow keys and `Enter`
    /// drive the menu.
    pub fn update(&mut self, msg: Message) {
        match msg {
            Message::Quit => {
                self.should_quit = true;
                return;
            }
            Message::Resize { width, height } => {
                self.resize(width, height);
                return;
            }
            _ => {}
        }

        if self.state.help_visible {
            if msg == Message::ToggleHelp || msg == Message::Escape {
                self.state.toggle_help();
            } else {
                let _ = self.state.dismiss_help();
            }
            return;
        }

        if self.state.searching && self.handle_search(msg) {
            self.state.clamp_selection();
            self.relayout();
            return;
        }

        if self.overlays.is_open() && self.handle_menu_key(msg) {
            self.relayout();
            return;
        }

        match msg {
            Message::Escape => {
                if self.state.kanban.banner().is_some() {
                    self.state.kanban.dismiss_banner();
                } else if self.state.status_line.take().is_none() {
                    self.state.clear_selection();
                }
            }
            Message::NavigateLeft if self.state.view == View::Board => self.state.navigate_left(),
            Message::NavigateRight if self.state.view == View::Board => self.state.navigate_right(),
            Message::NavigateUp => self.state.navigate_up(),
            Message::NavigateDown => self.state.navigate_down(),
            Message::Select | Message::ToggleMenu => self.toggle_selection_menu(),
            Message::MoveLeft => self.move_selected(WorkflowStatus::previous),
            Message::MoveRight => self.move_selected(WorkflowStatus::next),
            Message::SwitchView => {
                self.state.kanban.cancel_drag();
                self.state.switch_view();
            }
            Message::StartSearch if self.state.view == View::Board => self.state.searching = true,
            Message::CyclePriority if self.state.view == View::Board => {
                self.state.kanban.filter_mut().cycle_priority();
                self.state.clamp_selection();
            }
            Message::ToggleOffline => {
                let offline = !self.backend.is_offline();
                self.backend.set_offline(offline);
                self.state.status_line = Some(if offline { "Servidor offline" } else { "Servidor online" }.to_string());
            }
            Message::Refresh => self.refresh(),
            Message::ToggleHelp => self.state.toggle_help(),
            Message::PointerDown { column, row } => self.pointer_down(column, row),
            Message::PointerDrag { column, row } => {
                if self.state.kanban.drag().is_some() {
                    let over = self.layout.column_at(column, row).and_then(WorkflowStatus::from_index);
                    self.state.kanban.drag_over(over);
                }
            }
            Message::PointerUp { column, row } => self.pointer_up(column, row),
            Message::Scroll { column, row, delta } => {
                self.scroll(column, row, delta);
                return;
            }
            _ => {}
        }
        self.relayout();
    }

    /// Returns `true` if the message was a search edit.
    fn handle_search(&mut self, msg: Message) -> bool {
        let filter = self.state.kanban.filter_mut();
        match msg {
            Message::SearchInput { ch } => filter.search.push(ch),
            Message::SearchBackspace => {
                filter.search.pop();
            }
            Message::SearchConfirm => self.state.searching = false,
            Message::Escape => {
                filter.search.clear();
                self.state.searching = false;
            }
            _ => {
                self.state.searching = false;
                return false;
            }
        }
        true
    }

    /// Returns `true` if the open menu consumed the message. Esc and `m`
    /// dismiss it like a press outside; other keys pass through and leave
    /// it open. Pointer and scroll messages reach the menu through the
    /// listener registry.
    fn handle_menu_key(&mut self, msg: Message) -> bool {
        match msg {
            Message::NavigateUp => self.overlays.highlight(-1),
            Message::NavigateDown => self.overlays.highlight(1),
            Message::Select => {
                if let Some((target, item)) = self.overlays.activate() {
                    self.perform(target, item);
                }
            }
            Message::Escape | Message::ToggleMenu => {
                self.overlays.close();
            }
            _ => return false,
        }
        true
    }

    fn toggle_selection_menu(&mut self) {
        let viewport = self.layout.viewport();
        match self.state.view {
            View::Board => {
                let Some(order) = self.state.selected_order() else {
                    return;
                };
                let trigger = self.layout.card(order.id).and_then(|c| c.trigger);
                self.overlays.toggle_card_menu(order, trigger, &viewport);
            }
            View::Registry => {
                let Some(entry) = self.state.selected_entry() else {
                    return;
                };
                let trigger = self.layout.row(entry.id).map(|r| r.pill);
                self.overlays.toggle_status_picker(entry, trigger, &viewport);
            }
        }
    }

    fn move_selected(&mut self, step: fn(WorkflowStatus) -> Option<WorkflowStatus>) {
        if self.state.view != View::Board {
            return;
        }
        let Some(order) = self.state.selected_order() else {
            return;
        };
        let (id, from) = (order.id, order.status);
        if let Some(to) = step(from) {
            let result = self.state.kanban.request_transition(id, to);
            self.after_board_request(result);
        }
    }

    fn perform(&mut self, target: MenuTarget, item: MenuItem) {
        match (target, item) {
            (MenuTarget::Card(id), MenuItem::MoveTo(to)) => {
                let result = self.state.kanban.move_via_menu(id, to);
                self.after_board_request(result);
            }
            (MenuTarget::Card(id), MenuItem::Edit) => self.show_details(id),
            (MenuTarget::Card(id), MenuItem::Delete) => self.delete_order(id),
            (MenuTarget::Row(id), MenuItem::SetStatus(to)) => self.set_entry_status(id, to),
            (target, item) => debug!(?target, ?item, "menu item does not apply"),
        }
    }

    fn after_board_request(&mut self, result: Result<StatusChangeRequest<WorkflowStatus>, Rejection>) {
        match result {
            Ok(request) => {
                self.state.select_order(request.entity_id);
                self.spawn_commit(request, Update::Order);
            }
            Err(rejection) => self.reject(rejection),
        }
    }

    fn set_entry_status(&mut self, id: EntityId, to: BinaryStatus) {
        match self.state.registry.request_transition(id, to) {
            Ok(request) => self.spawn_commit(request, Update::Registry),
            Err(rejection) => self.reject(rejection),
        }
    }

    fn reject(&mut self, rejection: Rejection) {
        debug!(%rejection, "transition not requested");
        let notice = match rejection {
            Rejection::SameStatus => return,
            Rejection::InFlight => "Aguarde: a alteração anterior ainda não foi confirmada",
            Rejection::Missing => "Registro não encontrado",
        };
        self.state.status_line = Some(notice.to_string());
    }

    /// Commits a request on a tokio task and reports the outcome.
    fn spawn_commit<S: Status>(&self, request: StatusChangeRequest<S>, wrap: fn(CommitOutcome<S>) -> Update) {
        let backend = self.backend.clone();
        let updates = self.updates_tx.clone();
        tokio::spawn(async move {
            let outcome = run_commit(&backend, request).await;
            if updates.send(wrap(outcome)).is_err() {
                debug!("console closed before commit settled");
            }
        });
    }

    fn show_details(&mut self, id: OrderId) {
        let Some(order) = self.state.kanban.order(id) else {
            return;
        };
        let details = &order.details;
        let due = details
            .due_date
            .map_or_else(|| "sem data".to_string(), |d| d.format("%d/%m/%Y").to_string());
        self.state.status_line = Some(format!(
            "{} · {} · {} · {} · entrega {due}",
            details.code, details.patient, details.dentist, details.service
        ));
    }

    fn delete_order(&mut self, id: OrderId) {
        let Some(order) = self.state.kanban.delete_order(id) else {
            return;
        };
        self.state.clamp_selection();
        let code = order.details.code;
        info!(order = %code, "deleting order");

        let backend = self.backend.clone();
        let updates = self.updates_tx.clone();
        tokio::spawn(async move {
            let notice = match backend.delete_order(id).await {
                Ok(()) => format!("{code} excluído"),
                Err(e) => {
                    warn!(order = %code, error = %e, "delete failed");
                    format!("Falha ao excluir {code}: {e}")
                }
            };
            let _ = updates.send(Update::Notice(notice));
        });
    }

    /// Reloads orders and registry from the backend.
    fn refresh(&mut self) {
        self.state.status_line = Some("Atualizando...".to_string());
        let backend = self.backend.clone();
        let updates = self.updates_tx.clone();
        tokio::spawn(async move {
            let update = match tokio::try_join!(backend.fetch_orders(), backend.fetch_registry()) {
                Ok((orders, registry)) => Update::Refreshed { orders, registry },
                Err(e) => {
                    warn!(error = %e, "refresh failed");
                    Update::Notice(format!("Falha ao atualizar: {e}"))
                }
            };
            let _ = updates.send(update);
        });
    }

    fn pointer_down(&mut self, column: u16, row: u16) {
        let at = point(column, row);
        if let Some((target, item)) = self.overlays.activate_at(at) {
            self.perform(target, item);
            return;
        }
        self.overlays.route(&OverlayEvent::PointerDown(at));
        if self.overlays.popup_area().is_some_and(|area| area.contains(at)) {
            return;
        }

        let viewport = self.layout.viewport();
        match self.state.view {
            View::Board => {
                if let Some(slot) = self.layout.card_at(column, row).copied() {
                    self.state.selected_column = slot.column;
                    self.state.selected_card = Some(slot.index);
                    let on_trigger = slot.trigger.is_some_and(|t| t.contains((column, row).into()));
                    if !on_trigger {
                        self.state.kanban.drag_start(slot.order);
                    } else if let Some(order) = self.state.kanban.order(slot.order) {
                        self.overlays.toggle_card_menu(order, slot.trigger, &viewport);
                    }
                } else if let Some(index) = self.layout.column_at(column, row) {
                    self.state.selected_column = index;
                    self.state.clamp_selection();
                }
            }
            View::Registry => {
                if let Some(slot) = self.layout.row_at(column, row).copied() {
                    self.state.selected_row = Some(slot.index);
                    if slot.pill.contains((column, row).into())
                        && let Some(entry) = self.state.registry.entry(slot.entity)
                    {
                        self.overlays.toggle_status_picker(entry, Some(slot.pill), &viewport);
                    }
                }
            }
        }
    }

    fn pointer_up(&mut self, column: u16, row: u16) {
        if self.state.kanban.drag().is_none() {
            return;
        }
        match self.layout.column_at(column, row).and_then(WorkflowStatus::from_index) {
            Some(status) => {
                if let Some(result) = self.state.kanban.drop_on(status) {
                    self.after_board_request(result);
                }
            }
            None => self.state.kanban.cancel_drag(),
        }
    }

    fn scroll(&mut self, column: u16, row: u16, delta: i8) {
        match self.state.view {
            View::Board => {
                let Some(index) = self.layout.column_at(column, row) else {
                    return;
                };
                let capacity = self.layout.column_capacity[index];
                self.state.scroll_column(index, i32::from(delta), capacity);
            }
            View::Registry => {
                if !self.layout.in_list(column, row) {
                    return;
                }
                self.state.scroll_registry(i32::from(delta), self.layout.registry_capacity);
            }
        }
        self.relayout();
        self.overlays.route(&OverlayEvent::Scroll(self.layout.viewport()));
    }

    fn resize(&mut self, width: u16, height: u16) {
        self.area = Rect::new(0, 0, width, height);
        self.relayout();
        self.overlays.route(&OverlayEvent::Resize(self.layout.viewport()));
    }

    /// Recomputes the layout and re-measures the open popup's trigger.
    fn relayout(&mut self) {
        self.layout = ScreenLayout::compute(&self.state, self.area);
        self.state.column_scroll = self.layout.column_scroll;
        self.state.registry_scroll = self.layout.registry_scroll;
        self.overlays.sync(&self.layout, &self.state);
    }

    /// Applies a result produced off the UI loop.
    pub fn apply(&mut self, update: Update) {
        match update {
            Update::Order(outcome) => {
                let settlement = self.state.kanban.settle(outcome);
                debug!(?settlement, "order commit settled");
            }
            Update::Registry(outcome) => {
                let settlement = self.state.registry.settle(outcome);
                debug!(?settlement, "registry commit settled");
                if let Some(notice) = self.state.registry.take_notice() {
                    self.state.status_line = Some(notice);
                }
            }
            Update::Refreshed { orders, registry } => {
                self.state.kanban.replace_from_records(orders);
                self.state.registry.replace_entries(registry);
                self.state.status_line = Some("Dados atualizados".to_string());
            }
            Update::Notice(notice) => self.state.status_line = Some(notice),
        }
        self.state.clamp_selection();
        self.relayout();
    }

    /// Waits for the next background result and applies it.
    ///
    /// Returns `false` if no more results can arrive.
    pub async fn process_next_update(&mut self) -> bool {
        match self.updates_rx.recv().await {
            Some(update) => {
                self.apply(update);
                true
            }
            None => false,
        }
    }

    /// Applies every background result that is already available.
    pub fn drain_updates(&mut self) {
        while let Ok(update) = self.updates_rx.try_recv() {
            self.apply(update);
        }
    }

    /// Renders one frame.
    ///
    /// Popups are painted from the portal after the board, the registry and
    /// the status bar, so nothing drawn by those can cover them.
    pub fn view(&mut self, frame: &mut Frame) {
        self.area = frame.area();
        self.relayout();

        if self.layout.too_small {
            render_terminal_too_small(frame, self.area);
            return;
        }

        let area = self.area;
        let buf = frame.buffer_mut();
        if let Some(header) = self.layout.header {
            render_header(&self.state, self.backend.is_offline(), header, buf);
        }
        match self.state.view {
            View::Board => render_board(&self.state, &self.layout, buf),
            View::Registry => render_registry(&self.state, &self.layout, buf),
        }
        render_status_bar(&self.state, self.layout.status_bar, buf);
        render_portal(self.overlays.portal(), area, buf);

        if self.state.help_visible {
            render_help_overlay(area, buf);
        }
    }

    /// Runs the main application loop until quit.
    ///
    /// # Errors
    ///
    /// Returns an error if drawing or reading terminal events fails.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use protolab_backend::{BackendSettings, LabBackend, LabSnapshot};
    /// use protolab_config::Config;
    /// use protolab_tui::{App, terminal};
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let snapshot = LabSnapshot::sample();
    ///     let backend = LabBackend::from_snapshot(snapshot.clone(), BackendSettings::instant());
    ///     let mut app = App::new(backend, &Config::default(), snapshot);
    ///
    ///     let mut terminal = terminal::setup_terminal()?;
    ///     let result = app.run(&mut terminal).await;
    ///     terminal::restore_terminal(&mut terminal)?;
    ///     result
    /// }
    /// ```
    pub async fn run(&mut self, terminal: &mut AppTerminal) -> anyhow::Result<()> {
        info!("console started");
        loop {
            self.drain_updates();
            terminal.draw(|frame| self.view(frame))?;

            if let Some(event) = poll_event()?
                && let Some(msg) = event_to_message(&event, self.state.searching)
            {
                self.update(msg);
            }

            if self.should_quit {
                break;
            }
        }
        info!("console stopped");
        Ok(())
    }
}

fn render_terminal_too_small(frame: &mut Frame, area: Rect) {
    let message = format!(
        "Terminal too small ({}×{})\nMinimum: {}×{} (w×h)",
        area.width, area.height, MIN_WIDTH, MIN_HEIGHT
    );
    let paragraph = Paragraph::new(message)
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .wrap(ratatui::widgets::Wrap { trim: false });

    let vertical_offset = area.height.saturating_sub(2) / 2;
    let centered_area = Rect {
        x: area.x,
        y: area.y + vertical_offset,
        width: area.width,
        height: area.height.saturating_sub(vertical_offset),
    };
    frame.render_widget(paragraph, centered_area);
}

fn log_transition<S: Status>(family: &'static str, event: &TransitionEvent<S>) {
    match event {
        TransitionEvent::Changed { entity_id, new_status } => {
            info!(family, entity = %entity_id, status = new_status.code(), "status committed");
        }
        TransitionEvent::Failed {
            entity_id,
            attempted,
            error,
            reverted_to,
        } => {
            warn!(
                family,
                entity = %entity_id,
                attempted = attempted.code(),
                reverted = reverted_to.is_some(),
                %error,
                "status commit failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use protolab_backend::BackendSettings;
    use protolab_overlay::CloseReason;
    use protolab_protocol::{EntityStatus, OrderStatus};
    use protolab_transition::FailurePolicy;
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;
    use crate::test_utils::buffer_to_string;

    fn app_with(settings: BackendSettings, config: &Config) -> App {
        let snapshot = LabSnapshot::sample();
        let backend = LabBackend::from_snapshot(snapshot.clone(), settings);
        let mut app = App::new(backend, config, snapshot);
        app.update(Message::Resize { width: 90, height: 30 });
        app
    }

    fn sample_app() -> App {
        app_with(BackendSettings::instant(), &Config::default())
    }

    fn first_card(app: &App, column: usize) -> crate::layout::CardSlot {
        *app.layout()
            .cards
            .iter()
            .find(|c| c.column == column && c.index == 0)
            .expect("card visible")
    }

    fn click(app: &mut App, rect: Rect) {
        app.update(Message::PointerDown { column: rect.x, row: rect.y });
    }

    fn render(app: &mut App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| app.view(frame)).unwrap();
        buffer_to_string(terminal.backend().buffer())
    }

    async fn server_status(app: &App, id: OrderId) -> OrderStatus {
        let snapshot = app.backend().snapshot().await;
        snapshot.orders.iter().find(|o| o.id == id).map(|o| o.status).unwrap()
    }

    #[test]
    fn app_new_starts_on_board() {
        let app = sample_app();
        assert!(!app.should_quit());
        assert_eq!(app.state().view, View::Board);
        assert_eq!(app.state().kanban.counts(), [5, 4, 2]);
        assert_eq!(app.layout().cards.len(), 11);
    }

    #[test]
    fn quit_works_with_help_visible() {
        let mut app = sample_app();
        app.update(Message::ToggleHelp);
        app.update(Message::Quit);
        assert!(app.should_quit());
    }

    #[test]
    fn help_intercepts_other_keys() {
        let mut app = sample_app();
        app.update(Message::ToggleHelp);
        app.update(Message::NavigateRight);
        assert!(!app.state().help_visible);
        assert_eq!(app.state().selected_column, 0);
    }

    #[test]
    fn navigation_updates_selection() {
        let mut app = sample_app();
        app.update(Message::NavigateRight);
        app.update(Message::NavigateDown);
        assert_eq!(app.state().selected_column, 1);
        assert_eq!(app.state().selected_card, Some(0));

        app.update(Message::Escape);
        assert_eq!(app.state().selected_card, None);
    }

    #[test]
    fn select_without_card_opens_nothing() {
        let mut app = sample_app();
        app.update(Message::Select);
        assert!(!app.overlays().is_open());
    }

    #[test]
    fn select_opens_card_menu_and_escape_closes_it() {
        let mut app = sample_app();
        app.update(Message::NavigateDown);
        app.update(Message::Select);
        assert!(app.overlays().is_open());
        assert_eq!(app.overlays().listeners().active_count(), 3);
        assert_eq!(app.overlays().portal().len(), 1);

        app.update(Message::Escape);
        assert!(!app.overlays().is_open());
        assert_eq!(app.overlays().listeners().active_count(), 0);
        assert!(app.overlays().portal().is_empty());
        assert_eq!(app.state().selected_card, Some(0), "escape only closed the menu");
    }

    #[test]
    fn trigger_click_toggles_and_outside_click_closes() {
        let mut app = sample_app();
        let trigger = first_card(&app, 0).trigger.expect("trigger");

        click(&mut app, trigger);
        assert!(app.overlays().is_open());
        let area = app.overlays().popup_area().expect("mounted");
        assert_eq!((area.left, area.top), (i32::from(trigger.x), i32::from(trigger.bottom())));

        click(&mut app, trigger);
        assert!(!app.overlays().is_open(), "second press on the trigger toggles closed");

        click(&mut app, trigger);
        let outside = app.layout().status_bar;
        click(&mut app, outside);
        assert!(!app.overlays().is_open());
        assert_eq!(app.overlays().listeners().active_count(), 0);
    }

    #[test]
    fn opening_second_menu_closes_first() {
        let mut app = sample_app();
        let first = first_card(&app, 0).trigger.expect("trigger");
        let second = first_card(&app, 1).trigger.expect("trigger");

        click(&mut app, first);
        click(&mut app, second);
        let order = app.state().kanban.columns()[1][0].id;
        assert_eq!(app.overlays().target(), Some(MenuTarget::Card(order)));
        assert_eq!(app.overlays().portal().len(), 1);
        assert_eq!(app.overlays().listeners().active_count(), 3);
    }

    #[tokio::test]
    async fn menu_move_is_optimistic_then_committed() {
        let mut app = sample_app();
        let order = app.state().kanban.columns()[0][0].id;
        app.update(Message::NavigateDown);
        app.update(Message::Select);
        app.update(Message::NavigateDown);
        app.update(Message::Select); // "Mover para Concluído"

        assert!(!app.overlays().is_open());
        assert_eq!(app.state().kanban.counts(), [4, 4, 3]);
        assert!(app.state().kanban.is_pending(order));
        assert_eq!(app.state().selected_column, 2, "selection follows the card");

        assert!(app.process_next_update().await);
        assert!(!app.state().kanban.is_pending(order));
        assert_eq!(server_status(&app, order).await, OrderStatus::Concluido);
    }

    #[tokio::test]
    async fn clicking_menu_item_activates_it() {
        let mut app = sample_app();
        let order = app.state().kanban.columns()[0][0].id;
        let trigger = first_card(&app, 0).trigger.expect("trigger");
        click(&mut app, trigger);

        let area = app.overlays().popup_area().expect("mounted");
        let first_item = Rect::new(
            u16::try_from(area.left + 2).unwrap(),
            u16::try_from(area.top + 1).unwrap(),
            1,
            1,
        );
        click(&mut app, first_item);

        assert!(!app.overlays().is_open());
        assert_eq!(app.state().kanban.order(order).unwrap().status, WorkflowStatus::EmAndamento);
        assert!(app.process_next_update().await);
        assert_eq!(server_status(&app, order).await, OrderStatus::EmAndamento);
    }

    #[tokio::test]
    async fn failed_board_move_keeps_card_and_raises_banner() {
        let mut app = app_with(BackendSettings::instant().with_offline(true), &Config::default());
        let order = app.state().kanban.columns()[0][0].id;
        app.update(Message::NavigateDown);
        app.update(Message::MoveRight);
        assert!(app.process_next_update().await);

        let moved = app.state().kanban.order(order).unwrap();
        assert_eq!(moved.status, WorkflowStatus::EmAndamento);
        assert!(!app.state().kanban.is_pending(order));
        assert!(app.state().kanban.banner().is_some_and(|b| b.contains("Em andamento")));

        app.update(Message::Escape);
        assert!(app.state().kanban.banner().is_none());
    }

    #[tokio::test]
    async fn board_revert_policy_restores_column() {
        let mut config = Config::default();
        config.transitions.board = FailurePolicy::Revert;
        let settings = BackendSettings::instant().refusing(EntityStatus::Workflow(WorkflowStatus::Concluido));
        let mut app = app_with(settings, &config);
        let order = app.state().kanban.columns()[1][0].id;

        app.update(Message::NavigateRight);
        app.update(Message::NavigateDown);
        app.update(Message::MoveRight);
        assert_eq!(app.state().kanban.counts(), [5, 3, 3]);

        assert!(app.process_next_update().await);
        assert_eq!(app.state().kanban.counts(), [5, 4, 2]);
        assert_eq!(app.state().kanban.order(order).unwrap().status, WorkflowStatus::EmAndamento);
    }

    #[tokio::test]
    async fn second_move_while_pending_is_rejected() {
        let mut app = app_with(
            BackendSettings::instant().with_latency(std::time::Duration::from_millis(50)),
            &Config::default(),
        );
        let order = app.state().kanban.columns()[0][0].id;
        app.update(Message::NavigateDown);
        app.update(Message::MoveRight);
        app.update(Message::MoveRight);

        assert_eq!(app.state().kanban.order(order).unwrap().status, WorkflowStatus::EmAndamento);
        assert!(app.state().status_line.as_deref().is_some_and(|s| s.starts_with("Aguarde")));
        assert!(app.process_next_update().await);
        assert_eq!(app.backend().commit_count(), 1);
    }

    #[tokio::test]
    async fn drag_and_drop_moves_card() {
        let mut app = sample_app();
        let card = first_card(&app, 0);
        let target = app.layout().columns[2];

        click(&mut app, card.area);
        assert!(app.state().kanban.drag().is_some());
        app.update(Message::PointerDrag { column: target.x + 2, row: target.y + 2 });
        assert_eq!(app.state().kanban.drag().and_then(|d| d.over), Some(WorkflowStatus::Concluido));
        app.update(Message::PointerUp { column: target.x + 2, row: target.y + 2 });

        assert!(app.state().kanban.drag().is_none());
        assert_eq!(app.state().kanban.order(card.order).unwrap().status, WorkflowStatus::Concluido);
        assert!(app.process_next_update().await);
        assert_eq!(server_status(&app, card.order).await, OrderStatus::Concluido);
    }

    #[test]
    fn click_without_moving_is_a_silent_same_column_drop() {
        let mut app = sample_app();
        let card = first_card(&app, 0);
        click(&mut app, card.area);
        app.update(Message::PointerUp { column: card.area.x, row: card.area.y });

        assert!(app.state().kanban.drag().is_none());
        assert_eq!(app.state().kanban.counts(), [5, 4, 2]);
        assert!(app.state().status_line.is_none());
        assert_eq!(app.state().selected_card, Some(0));
    }

    #[test]
    fn drop_outside_columns_cancels_drag() {
        let mut app = sample_app();
        let card = first_card(&app, 0);
        click(&mut app, card.area);
        let bar = app.layout().status_bar;
        app.update(Message::PointerUp { column: bar.x + 1, row: bar.y + 1 });

        assert!(app.state().kanban.drag().is_none());
        assert_eq!(app.state().kanban.counts(), [5, 4, 2]);
    }

    #[test]
    fn scrolling_trigger_out_of_view_closes_menu() {
        let snapshot = LabSnapshot::sample();
        let backend = LabBackend::from_snapshot(snapshot.clone(), BackendSettings::instant());
        let mut app = App::new(backend, &Config::default(), snapshot);
        app.update(Message::Resize { width: 90, height: 20 });
        assert_eq!(app.layout().column_capacity[0], 3);

        let trigger = first_card(&app, 0).trigger.expect("trigger");
        click(&mut app, trigger);
        assert!(app.overlays().is_open());

        let column = app.layout().columns[0];
        app.update(Message::Scroll { column: column.x + 2, row: column.y + 2, delta: 1 });
        assert_eq!(app.state().column_scroll[0], 1);
        assert!(!app.overlays().is_open());
        assert!(app.overlays().portal().is_empty());
        assert_eq!(app.overlays().listeners().active_count(), 0);
    }

    #[test]
    fn scrolling_keeps_visible_trigger_attached() {
        let snapshot = LabSnapshot::sample();
        let backend = LabBackend::from_snapshot(snapshot.clone(), BackendSettings::instant());
        let mut app = App::new(backend, &Config::default(), snapshot);
        app.update(Message::Resize { width: 90, height: 20 });

        let second = *app.layout().cards.iter().find(|c| c.column == 0 && c.index == 1).unwrap();
        click(&mut app, second.trigger.expect("trigger"));

        let column = app.layout().columns[0];
        app.update(Message::Scroll { column: column.x + 2, row: column.y + 2, delta: 1 });
        let moved = app.layout().card(second.order).and_then(|c| c.trigger).expect("still visible");
        let area = app.overlays().popup_area().expect("open");
        assert_eq!(area.top, i32::from(moved.bottom()));
    }

    #[test]
    fn resize_repositions_status_picker() {
        let mut app = sample_app();
        app.update(Message::SwitchView);
        let row = app.layout().rows[0];
        click(&mut app, row.pill);
        assert!(app.overlays().is_open());
        assert_eq!(app.overlays().popup_area().map(|a| a.right), Some(i32::from(row.pill.right())));

        app.update(Message::Resize { width: 120, height: 30 });
        let pill = app.layout().rows[0].pill;
        assert_ne!(pill.x, row.pill.x);
        assert_eq!(app.overlays().popup_area().map(|a| a.right), Some(i32::from(pill.right())));

        app.update(Message::Resize { width: 30, height: 8 });
        assert!(!app.overlays().is_open(), "trigger vanished with the layout");
    }

    #[tokio::test]
    async fn registry_failure_reverts_and_notifies() {
        let mut app = app_with(BackendSettings::instant().with_offline(true), &Config::default());
        app.update(Message::SwitchView);
        app.update(Message::NavigateDown);
        let entry = app.state().selected_entry().cloned().expect("selected");
        assert_eq!(entry.status, BinaryStatus::Ativo);

        app.update(Message::Select);
        app.update(Message::NavigateDown);
        app.update(Message::Select);
        assert_eq!(app.state().registry.entry(entry.id).unwrap().status, BinaryStatus::Inativo);

        assert!(app.process_next_update().await);
        assert_eq!(app.state().registry.entry(entry.id).unwrap().status, BinaryStatus::Ativo);
        assert!(app.state().status_line.as_deref().is_some_and(|s| s.contains("revertido")));
    }

    #[test]
    fn picking_current_status_commits_nothing() {
        let mut app = sample_app();
        app.update(Message::SwitchView);
        app.update(Message::NavigateDown);
        app.update(Message::Select);
        assert_eq!(app.overlays().highlighted(), Some(0));
        app.update(Message::Select);
        assert!(!app.overlays().is_open());
        assert!(app.state().selected_entry().is_some_and(|e| !app.state().registry.is_pending(e.id)));
    }

    #[tokio::test]
    async fn delete_removes_card_and_server_record() {
        let mut app = sample_app();
        let order = app.state().kanban.columns()[0][0].id;
        app.update(Message::NavigateDown);
        app.update(Message::Select);
        app.update(Message::NavigateUp); // wraps to "Excluir"
        app.update(Message::Select);

        assert_eq!(app.state().kanban.counts(), [4, 4, 2]);
        assert!(app.process_next_update().await);
        assert!(app.state().status_line.as_deref().is_some_and(|s| s.ends_with("excluído")));
        let snapshot = app.backend().snapshot().await;
        assert!(snapshot.orders.iter().all(|o| o.id != order));
    }

    #[tokio::test]
    async fn refresh_pulls_server_changes() {
        let mut app = sample_app();
        let order = app.state().kanban.columns()[0][0].id;
        app.backend().delete_order(order).await.unwrap();

        app.update(Message::Refresh);
        assert!(app.process_next_update().await);
        assert_eq!(app.state().kanban.counts(), [4, 4, 2]);
        assert_eq!(app.state().status_line.as_deref(), Some("Dados atualizados"));
    }

    #[tokio::test]
    async fn refresh_while_offline_reports_failure() {
        let mut app = sample_app();
        app.update(Message::ToggleOffline);
        assert!(app.backend().is_offline());

        app.update(Message::Refresh);
        assert!(app.process_next_update().await);
        assert!(app.state().status_line.as_deref().is_some_and(|s| s.starts_with("Falha ao atualizar")));
        assert_eq!(app.state().kanban.counts(), [5, 4, 2]);
    }

    #[test]
    fn search_filters_board() {
        let mut app = sample_app();
        app.update(Message::StartSearch);
        for ch in "reis".chars() {
            app.update(Message::SearchInput { ch });
        }
        app.update(Message::SearchConfirm);
        assert!(!app.state().searching);
        assert_eq!(app.state().kanban.counts(), [2, 1, 1]);

        app.update(Message::StartSearch);
        app.update(Message::Escape);
        assert_eq!(app.state().kanban.counts(), [5, 4, 2]);
    }

    #[test]
    fn filtering_out_menu_card_closes_menu() {
        let mut app = sample_app();
        app.update(Message::NavigateDown);
        app.update(Message::Select);
        app.update(Message::CyclePriority);
        assert!(!app.overlays().is_open());
    }

    #[test]
    fn edit_shows_order_details() {
        let mut app = sample_app();
        app.update(Message::NavigateDown);
        app.update(Message::Select);
        for _ in 0..2 {
            app.update(Message::NavigateDown);
        }
        app.update(Message::Select);
        let line = app.state().status_line.clone().expect("details");
        assert!(line.starts_with("OS-0101 · Maria Souza"));
        assert!(line.ends_with("entrega 03/11/2026"));
    }

    #[test]
    fn view_paints_popup_above_board() {
        let mut app = sample_app();
        let trigger = first_card(&app, 0).trigger.expect("trigger");
        click(&mut app, trigger);

        let content = render(&mut app, 90, 30);
        assert!(content.contains("Mover para Em andamento"));
        assert!(content.contains("Excluir"));
        assert!(content.contains("Pendente (5)"));
    }

    #[test]
    fn view_shows_too_small_message() {
        let mut app = sample_app();
        let content = render(&mut app, 80, 8);
        assert!(content.contains("Terminal too small"));
        assert!(app.layout().too_small);
    }

    #[test]
    fn view_hides_header_in_compact_mode() {
        let mut app = sample_app();
        let content = render(&mut app, 90, 11);
        assert!(app.layout().header.is_none());
        assert!(!content.contains("protolab"));

        let content = render(&mut app, 90, 30);
        assert!(content.contains("protolab"));
    }

    #[test]
    fn menu_close_reasons_reach_listeners() {
        let mut app = sample_app();
        let trigger = first_card(&app, 0).trigger.expect("trigger");
        click(&mut app, trigger);
        let reason = app.overlays.route(&OverlayEvent::PointerDown(point(0, 0)));
        assert_eq!(reason, Some(CloseReason::OutsidePointer));
    }

    #[tokio::test]
    async fn unrelated_keys_leave_menu_open() {
        let mut app = sample_app();
        let trigger = first_card(&app, 0).trigger.expect("trigger");
        click(&mut app, trigger);
        let target = app.overlays().target();

        app.update(Message::ToggleOffline);
        assert!(app.backend().is_offline());
        app.update(Message::ToggleOffline);
        app.update(Message::Refresh);
        assert!(app.process_next_update().await);
        assert_eq!(app.state().status_line.as_deref(), Some("Dados atualizados"));

        assert!(app.overlays().is_open());
        assert_eq!(app.overlays().target(), target);
        assert_eq!(app.overlays().listeners().active_count(), 3);

        app.update(Message::ToggleMenu);
        assert!(!app.overlays().is_open());
    }

    #[tokio::test]
    async fn open_menu_follows_keyboard_move_of_its_card() {
        let mut app = sample_app();
        app.update(Message::NavigateDown);
        app.update(Message::Select);
        let order = app.state().kanban.columns()[0][0].id;
        assert_eq!(app.overlays().target(), Some(MenuTarget::Card(order)));

        app.update(Message::MoveRight);
        assert_eq!(app.state().kanban.order(order).unwrap().status, WorkflowStatus::EmAndamento);
        assert!(app.overlays().is_open());

        let content = render(&mut app, 90, 30);
        assert!(content.contains("Mover para Pendente"));
        assert!(content.contains("Mover para Concluído"));
        assert!(!content.contains("Mover para Em andamento"));
        assert!(app.process_next_update().await);
    }
}
