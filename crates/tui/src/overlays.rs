//! Card menus and status pickers.
//!
//! Each menu is a [`Popup`] whose trigger is a cell range measured from the
//! current [`ScreenLayout`]. Popups mount their content into one shared
//! [`Portal`], which the renderer paints after everything else. Global
//! pointer, resize and scroll events are routed to open popups through the
//! listener registry, so only popups that are actually listening see them.

use protolab_overlay::{
    AnchorMode, CloseReason, EventListeners, OverlayEvent, Point, Popup, Portal, Rect as OverlayRect,
    Size, Viewport,
};
use protolab_protocol::{BinaryStatus, EntityId, Order, OrderId, RegistryEntry, Status, WorkflowStatus};
use tracing::debug;

use crate::layout::{ScreenLayout, overlay_rect};
use crate::state::AppState;

/// An action offered by a menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    /// Move the order to another column.
    MoveTo(WorkflowStatus),
    /// Show the order's details.
    Edit,
    /// Delete the order.
    Delete,
    /// Set a registry entry's status.
    SetStatus(BinaryStatus),
}

impl MenuItem {
    #[must_use]
    pub fn label(self) -> String {
        match self {
            Self::MoveTo(status) => format!("Mover para {}", status.label()),
            Self::Edit => "Editar".to_string(),
            Self::Delete => "Excluir".to_string(),
            Self::SetStatus(status) => status.label().to_string(),
        }
    }
}

/// What a menu belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuTarget {
    Card(OrderId),
    Row(EntityId),
}

/// What the portal paints for an open menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuContent {
    pub title: String,
    pub items: Vec<String>,
    pub highlighted: usize,
    /// Item matching the current value, drawn with a check mark.
    pub current: Option<usize>,
}

type MenuPopup = Popup<EventListeners, Option<OverlayRect>, MenuContent>;

#[derive(Debug)]
struct OpenMenu {
    target: MenuTarget,
    title: String,
    items: Vec<MenuItem>,
    current: Option<usize>,
    highlighted: usize,
    popup: MenuPopup,
}

impl OpenMenu {
    /// Rebuilds the items from the target's live status. Records that are
    /// gone are left alone; their trigger is gone too.
    fn refresh(&mut self, state: &AppState) {
        match self.target {
            MenuTarget::Card(id) => {
                let Some(order) = state.kanban.order(id) else {
                    return;
                };
                let items = card_items(order.status);
                if items != self.items {
                    self.items = items;
                    self.highlighted = self.highlighted.min(self.items.len().saturating_sub(1));
                    self.popup.set_size(menu_size(&self.title, &self.items));
                }
            }
            MenuTarget::Row(id) => {
                if let Some(entry) = state.registry.entry(id) {
                    self.current = BinaryStatus::all().iter().position(|s| *s == entry.status);
                }
            }
        }
    }

    fn content(&self) -> MenuContent {
        MenuContent {
            title: self.title.clone(),
            items: self.items.iter().map(|item| item.label()).collect(),
            highlighted: self.highlighted,
            current: self.current,
        }
    }
}

/// Owner of the console's popups.
#[derive(Debug)]
pub struct Overlays {
    listeners: EventListeners,
    portal: Portal<MenuContent>,
    card_anchor: AnchorMode,
    picker_anchor: AnchorMode,
    menu: Option<OpenMenu>,
}

impl Overlays {
    #[must_use]
    pub fn new(card_anchor: AnchorMode, picker_anchor: AnchorMode) -> Self {
        Self {
            listeners: EventListeners::new(),
            portal: Portal::new(),
            card_anchor,
            picker_anchor,
            menu: None,
        }
    }

    #[must_use]
    pub fn listeners(&self) -> &EventListeners {
        &self.listeners
    }

    /// The portal root holding every mounted popup.
    #[must_use]
    pub fn portal(&self) -> &Portal<MenuContent> {
        &self.portal
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.menu.as_ref().is_some_and(|m| m.popup.is_open())
    }

    #[must_use]
    pub fn target(&self) -> Option<MenuTarget> {
        self.menu.as_ref().map(|m| m.target)
    }

    #[must_use]
    pub fn highlighted(&self) -> Option<usize> {
        self.menu.as_ref().map(|m| m.highlighted)
    }

    /// Where the open popup was last painted.
    #[must_use]
    pub fn popup_area(&self) -> Option<OverlayRect> {
        self.menu.as_ref().and_then(|m| m.popup.controller().popup_area())
    }

    /// Activates the card menu trigger of `order`.
    ///
    /// Opens the menu, or closes it if it is already open for this card.
    /// Returns `true` if a menu is open afterwards.
    pub fn toggle_card_menu(&mut self, order: &Order, trigger: Option<ratatui::layout::Rect>, viewport: &Viewport) -> bool {
        self.toggle(
            MenuTarget::Card(order.id),
            order.details.code.clone(),
            card_items(order.status),
            None,
            self.card_anchor,
            trigger,
            viewport,
        )
    }

    /// Activates the status pill of a registry row.
    pub fn toggle_status_picker(
        &mut self,
        entry: &RegistryEntry,
        trigger: Option<ratatui::layout::Rect>,
        viewport: &Viewport,
    ) -> bool {
        let statuses = BinaryStatus::all();
        let current = statuses.iter().position(|s| *s == entry.status);
        self.toggle(
            MenuTarget::Row(entry.id),
            "Status".to_string(),
            statuses.map(MenuItem::SetStatus).to_vec(),
            current,
            self.picker_anchor,
            trigger,
            viewport,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn toggle(
        &mut self,
        target: MenuTarget,
        title: String,
        items: Vec<MenuItem>,
        current: Option<usize>,
        anchor: AnchorMode,
        trigger: Option<ratatui::layout::Rect>,
        viewport: &Viewport,
    ) -> bool {
        if let Some(menu) = self.menu.as_mut() {
            if menu.target == target {
                menu.popup.toggle(viewport);
                if !menu.popup.is_open() {
                    self.menu = None;
                }
                return self.is_open();
            }
            menu.popup.close();
            self.menu = None;
        }

        let size = menu_size(&title, &items);
        let mut popup = Popup::new(&self.listeners, self.portal.clone(), trigger.map(overlay_rect), anchor, size);
        if !popup.open(viewport) {
            return false;
        }
        debug!(?target, "menu opened");
        self.menu = Some(OpenMenu {
            target,
            title,
            items,
            current,
            highlighted: current.unwrap_or(0),
            popup,
        });
        true
    }

    /// Closes the open menu at the owner's request.
    pub fn close(&mut self) -> bool {
        match self.menu.take() {
            Some(mut menu) => menu.popup.close(),
            None => false,
        }
    }

    /// Moves the highlight, wrapping at either end.
    pub fn highlight(&mut self, delta: isize) {
        if let Some(menu) = self.menu.as_mut() {
            let len = menu.items.len() as isize;
            if len > 0 {
                menu.highlighted = (menu.highlighted as isize + delta).rem_euclid(len) as usize;
            }
        }
    }

    /// Chooses the highlighted item and closes the menu.
    pub fn activate(&mut self) -> Option<(MenuTarget, MenuItem)> {
        let index = self.menu.as_ref()?.highlighted;
        self.activate_index(index)
    }

    /// Chooses the item painted under `point`, if the point is on one.
    pub fn activate_at(&mut self, point: Point) -> Option<(MenuTarget, MenuItem)> {
        let area = self.popup_area()?;
        if !area.contains(point) {
            return None;
        }
        let index = usize::try_from(point.y - area.top - 1).ok()?;
        self.activate_index(index)
    }

    fn activate_index(&mut self, index: usize) -> Option<(MenuTarget, MenuItem)> {
        let menu = self.menu.as_mut()?;
        let item = *menu.items.get(index)?;
        let target = menu.target;
        menu.popup.select();
        self.menu = None;
        Some((target, item))
    }

    /// Delivers a global event to the popups subscribed to it.
    ///
    /// Returns why the open popup closed, if the event closed it.
    pub fn route(&mut self, event: &OverlayEvent) -> Option<CloseReason> {
        let subscribers = self.listeners.subscribers(event.kind());
        let menu = self.menu.as_mut()?;
        if !subscribers.contains(&menu.popup.id()) {
            return None;
        }
        let reason = menu.popup.handle_event(event);
        if reason.is_some() {
            self.menu = None;
        }
        reason
    }

    /// Re-measures the open popup's trigger against a fresh layout, rebuilds
    /// its items from the current state and mounts its content. A trigger
    /// that left the screen closes the popup.
    pub fn sync(&mut self, layout: &ScreenLayout, state: &AppState) {
        let Some(menu) = self.menu.as_mut() else {
            return;
        };
        let trigger = match menu.target {
            MenuTarget::Card(order) => layout.card(order).and_then(|c| c.trigger),
            MenuTarget::Row(entity) => layout.row(entity).map(|r| r.pill),
        };
        *menu.popup.trigger_mut() = trigger.map(overlay_rect);
        if trigger.is_none() {
            menu.popup.trigger_removed();
            self.menu = None;
            return;
        }
        menu.refresh(state);
        let content = menu.content();
        menu.popup.render(content, &layout.viewport());
    }
}

/// Moves to the two other columns, then the order actions.
fn card_items(status: WorkflowStatus) -> Vec<MenuItem> {
    let mut items: Vec<MenuItem> = status.others().map(MenuItem::MoveTo).to_vec();
    items.extend([MenuItem::Edit, MenuItem::Delete]);
    items
}

/// Bordered box around the longest line.
fn menu_size(title: &str, items: &[MenuItem]) -> Size {
    let widest = items
        .iter()
        .map(|item| item.label().chars().count())
        .chain(std::iter::once(title.chars().count()))
        .max()
        .unwrap_or(0);
    Size::new(widest as i32 + 6, items.len() as i32 + 2)
}

#[cfg(test)]
mod tests {
    use protolab_protocol::{EntityKind, OrderDetails};
    use ratatui::layout::Rect;

    use super::*;
    use crate::test_utils::sample_state;

    fn order() -> Order {
        Order::new(OrderDetails::new("OS-0101", "Maria Souza", "Dr. Reis", "Coroa"))
    }

    fn viewport() -> Viewport {
        Viewport::new(80, 24)
    }

    fn overlays() -> Overlays {
        Overlays::new(AnchorMode::BelowLeft, AnchorMode::BelowRight)
    }

    fn layout_with_card(order: OrderId, trigger: Rect) -> ScreenLayout {
        let mut layout = ScreenLayout {
            area: Rect::new(0, 0, 80, 24),
            ..ScreenLayout::default()
        };
        layout.cards.push(crate::layout::CardSlot {
            order,
            column: 0,
            index: 0,
            area: Rect::new(0, 4, 24, 4),
            trigger: Some(trigger),
        });
        layout
    }

    #[test]
    fn card_menu_offers_other_columns_then_actions() {
        let order = order();
        let mut overlays = overlays();
        assert!(overlays.toggle_card_menu(&order, Some(Rect::new(20, 5, 3, 1)), &viewport()));
        assert_eq!(overlays.target(), Some(MenuTarget::Card(order.id)));
        assert_eq!(overlays.listeners().active_count(), 3);

        overlays.highlight(-1);
        assert_eq!(overlays.activate(), Some((MenuTarget::Card(order.id), MenuItem::Delete)));
        assert!(!overlays.is_open());
        assert_eq!(overlays.listeners().active_count(), 0);
        assert!(overlays.portal().is_empty());
    }

    #[test]
    fn same_trigger_toggles_closed() {
        let order = order();
        let mut overlays = overlays();
        let trigger = Some(Rect::new(20, 5, 3, 1));
        assert!(overlays.toggle_card_menu(&order, trigger, &viewport()));
        assert!(!overlays.toggle_card_menu(&order, trigger, &viewport()));
        assert_eq!(overlays.target(), None);
        assert_eq!(overlays.listeners().active_count(), 0);
    }

    #[test]
    fn opening_another_menu_replaces_the_first() {
        let first = order();
        let second = order();
        let mut overlays = overlays();
        overlays.toggle_card_menu(&first, Some(Rect::new(20, 5, 3, 1)), &viewport());
        overlays.toggle_card_menu(&second, Some(Rect::new(20, 9, 3, 1)), &viewport());
        assert_eq!(overlays.target(), Some(MenuTarget::Card(second.id)));
        assert_eq!(overlays.listeners().active_count(), 3);
    }

    #[test]
    fn missing_trigger_never_opens() {
        let mut overlays = overlays();
        assert!(!overlays.toggle_card_menu(&order(), None, &viewport()));
        assert_eq!(overlays.listeners().attach_count(), 0);
    }

    #[test]
    fn status_picker_highlights_current_value() {
        let entry = RegistryEntry::new(EntityKind::Clinic, "Sorriso").with_status(BinaryStatus::Inativo);
        let mut overlays = overlays();
        overlays.toggle_status_picker(&entry, Some(Rect::new(60, 8, 11, 1)), &viewport());
        assert_eq!(overlays.highlighted(), Some(1));
        assert_eq!(
            overlays.activate(),
            Some((MenuTarget::Row(entry.id), MenuItem::SetStatus(BinaryStatus::Inativo)))
        );
    }

    #[test]
    fn outside_press_closes_but_trigger_press_does_not() {
        let mut overlays = overlays();
        overlays.toggle_card_menu(&order(), Some(Rect::new(20, 5, 3, 1)), &viewport());

        let on_trigger = OverlayEvent::PointerDown(Point::new(21, 5));
        assert_eq!(overlays.route(&on_trigger), None);
        assert!(overlays.is_open());

        let outside = OverlayEvent::PointerDown(Point::new(70, 20));
        assert_eq!(overlays.route(&outside), Some(CloseReason::OutsidePointer));
        assert!(!overlays.is_open());
        assert_eq!(overlays.listeners().active_count(), 0);
    }

    #[test]
    fn click_on_item_activates_it() {
        let order = order();
        let mut overlays = overlays();
        overlays.toggle_card_menu(&order, Some(Rect::new(20, 5, 3, 1)), &viewport());

        // Mount it the way the renderer would, with the trigger unchanged.
        overlays.sync(&layout_with_card(order.id, Rect::new(20, 5, 3, 1)), &sample_state());

        let area = overlays.popup_area().expect("mounted");
        assert_eq!((area.left, area.top), (20, 6));
        let second_item = Point::new(area.left + 2, area.top + 2);
        let chosen = overlays.activate_at(second_item);
        assert_eq!(
            chosen,
            Some((MenuTarget::Card(order.id), MenuItem::MoveTo(WorkflowStatus::Concluido)))
        );
    }

    #[test]
    fn sync_closes_menu_when_card_leaves_screen() {
        let mut overlays = overlays();
        overlays.toggle_card_menu(&order(), Some(Rect::new(20, 5, 3, 1)), &viewport());
        overlays.sync(&ScreenLayout::default(), &sample_state());
        assert!(!overlays.is_open());
        assert!(overlays.portal().is_empty());
        assert_eq!(overlays.listeners().active_count(), 0);
    }

    #[test]
    fn resize_keeps_right_anchored_picker_attached() {
        let entry = RegistryEntry::new(EntityKind::Dentist, "Dr. Reis");
        let mut overlays = overlays();
        let pill = Rect::new(60, 8, 11, 1);
        overlays.toggle_status_picker(&entry, Some(pill), &viewport());

        let mut layout = ScreenLayout {
            area: Rect::new(0, 0, 80, 24),
            ..ScreenLayout::default()
        };
        layout.rows.push(crate::layout::RowSlot {
            entity: entry.id,
            index: 0,
            area: Rect::new(1, 8, 78, 1),
            pill,
        });
        overlays.sync(&layout, &sample_state());
        let before = overlays.popup_area().expect("mounted");
        assert_eq!(before.right, 71);

        let wider = Viewport::new(120, 24);
        assert_eq!(overlays.route(&OverlayEvent::Resize(wider)), None);
        let after = overlays.portal().area_of(overlays.menu.as_ref().map(|m| m.popup.id()).expect("open"));
        assert_eq!(after.map(|a| a.right), Some(71));
    }

    #[test]
    fn sync_rebuilds_card_items_after_status_change() {
        let mut state = sample_state();
        let order = state.kanban.columns()[0][0].clone();
        let trigger = Rect::new(20, 5, 3, 1);
        let mut overlays = overlays();
        overlays.toggle_card_menu(&order, Some(trigger), &viewport());
        overlays.highlight(1);

        state.kanban.request_transition(order.id, WorkflowStatus::Concluido).unwrap();
        overlays.sync(&layout_with_card(order.id, trigger), &state);

        let items = overlays.portal().nodes()[0].content.items.clone();
        assert_eq!(items, ["Mover para Pendente", "Mover para Em andamento", "Editar", "Excluir"]);
        assert_eq!(overlays.highlighted(), Some(1));
        assert_eq!(
            overlays.activate(),
            Some((MenuTarget::Card(order.id), MenuItem::MoveTo(WorkflowStatus::EmAndamento)))
        );
    }

    #[test]
    fn sync_moves_picker_check_mark_to_live_status() {
        let mut state = sample_state();
        let entry = state
            .registry
            .entries()
            .iter()
            .find(|e| e.status == BinaryStatus::Ativo)
            .cloned()
            .unwrap();
        let pill = Rect::new(60, 8, 11, 1);
        let mut overlays = overlays();
        overlays.toggle_status_picker(&entry, Some(pill), &viewport());

        state.registry.request_transition(entry.id, BinaryStatus::Inativo).unwrap();
        let mut layout = ScreenLayout {
            area: Rect::new(0, 0, 80, 24),
            ..ScreenLayout::default()
        };
        layout.rows.push(crate::layout::RowSlot {
            entity: entry.id,
            index: 0,
            area: Rect::new(1, 8, 78, 1),
            pill,
        });
        overlays.sync(&layout, &state);

        assert_eq!(overlays.portal().nodes()[0].content.current, Some(1));
    }
}
