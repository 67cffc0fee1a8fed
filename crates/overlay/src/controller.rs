//! Overlay lifecycle controller.
//!
//! Owns the open/closed state of one popup. The state machine is:
//!
//! ```text
//! Closed --open()/toggle()--> Open --close()/toggle()--> Closed
//! ```
//!
//! While open, the controller holds a [`Registration`] for the pointer-down,
//! resize and scroll listeners; closing (or dropping the controller) releases
//! it. An open overlay closes on an outside pointer press, on item
//! selection, or when its trigger goes away. Presses inside the trigger or
//! the popup are ignored for dismissal.

use tracing::debug;

use crate::geometry::{Point, Rect, Viewport};
use crate::listeners::{ListenerHost, ListenerKind, OverlayId, Registration};
use crate::position::{AnchorMode, OverlayPosition, compute_position};

/// The element that opens an overlay.
///
/// The view layer owns the element; the controller only measures it and
/// hit-tests against it.
pub trait Trigger {
    /// Viewport-relative bounding box, or `None` once the element is gone.
    fn bounding_rect(&self) -> Option<Rect>;

    /// Returns `true` if the point lies within the trigger's subtree.
    fn contains(&self, point: Point) -> bool {
        self.bounding_rect().is_some_and(|rect| rect.contains(point))
    }
}

impl Trigger for Rect {
    fn bounding_rect(&self) -> Option<Rect> {
        Some(*self)
    }
}

impl Trigger for Option<Rect> {
    fn bounding_rect(&self) -> Option<Rect> {
        *self
    }
}

/// Whether the overlay is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OverlayState {
    #[default]
    Closed,
    Open,
}

/// Why an overlay closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloseReason {
    /// A pointer press outside both the trigger and the popup.
    OutsidePointer,
    /// A menu item was chosen.
    Selection,
    /// The trigger element was removed.
    TriggerRemoved,
    /// The trigger was activated again while open.
    Toggled,
    /// The owning view closed it explicitly.
    Requested,
}

/// A global event routed to an overlay by the listener registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayEvent {
    /// Pointer pressed at a viewport point.
    PointerDown(Point),
    /// The window changed size.
    Resize(Viewport),
    /// The document or a scroll container scrolled.
    Scroll(Viewport),
}

impl OverlayEvent {
    /// The listener kind this event is delivered to.
    #[must_use]
    pub const fn kind(&self) -> ListenerKind {
        match self {
            Self::PointerDown(_) => ListenerKind::PointerDown,
            Self::Resize(_) => ListenerKind::Resize,
            Self::Scroll(_) => ListenerKind::Scroll,
        }
    }
}

/// Controls one popup instance.
///
/// # Examples
///
/// ```
/// use protolab_overlay::{
///     AnchorMode, EventListeners, OverlayController, OverlayEvent, Point, Rect, Viewport,
/// };
///
/// let listeners = EventListeners::new();
/// let trigger = Rect::new(10, 2, 6, 1);
/// let mut menu = OverlayController::new(listeners.allocate_id(), listeners.clone(), trigger, AnchorMode::BelowLeft);
///
/// menu.toggle(&Viewport::new(80, 24));
/// assert!(menu.is_open());
/// assert_eq!(listeners.active_count(), 3);
///
/// // A press elsewhere dismisses it and releases every listener.
/// menu.handle_event(&OverlayEvent::PointerDown(Point::new(70, 20)));
/// assert!(!menu.is_open());
/// assert_eq!(listeners.active_count(), 0);
/// ```
#[derive(Debug)]
pub struct OverlayController<H: ListenerHost, T: Trigger> {
    id: OverlayId,
    host: H,
    trigger: T,
    anchor: AnchorMode,
    state: OverlayState,
    position: Option<OverlayPosition>,
    popup_area: Option<Rect>,
    registration: Option<Registration<H>>,
}

impl<H: ListenerHost, T: Trigger> OverlayController<H, T> {
    /// Creates a closed controller. No listener is attached until it opens.
    #[must_use]
    pub fn new(id: OverlayId, host: H, trigger: T, anchor: AnchorMode) -> Self {
        Self {
            id,
            host,
            trigger,
            anchor,
            state: OverlayState::Closed,
            position: None,
            popup_area: None,
            registration: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> OverlayId {
        self.id
    }

    #[must_use]
    pub fn state(&self) -> OverlayState {
        self.state
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state == OverlayState::Open
    }

    #[must_use]
    pub fn anchor(&self) -> AnchorMode {
        self.anchor
    }

    #[must_use]
    pub fn trigger(&self) -> &T {
        &self.trigger
    }

    /// Mutable access for views that re-measure the trigger after layout.
    pub fn trigger_mut(&mut self) -> &mut T {
        &mut self.trigger
    }

    /// Last computed position. `None` until the first successful measurement.
    #[must_use]
    pub fn position(&self) -> Option<OverlayPosition> {
        self.position
    }

    /// Records where the popup was painted, for dismissal hit-testing.
    pub fn set_popup_area(&mut self, area: Option<Rect>) {
        self.popup_area = area;
    }

    #[must_use]
    pub fn popup_area(&self) -> Option<Rect> {
        self.popup_area
    }

    /// Re-measures the trigger and recomputes the position.
    ///
    /// If the trigger is no longer available the stored position is left
    /// untouched and `None` is returned.
    pub fn refresh_position(&mut self, viewport: &Viewport) -> Option<OverlayPosition> {
        let rect = self.trigger.bounding_rect()?;
        let position = compute_position(rect, viewport, self.anchor);
        self.position = Some(position);
        Some(position)
    }

    /// Opens the overlay and arms its dismissal listeners.
    ///
    /// Returns `false` if it was already open, or if the trigger is gone
    /// (an overlay never opens for a removed trigger).
    pub fn open(&mut self, viewport: &Viewport) -> bool {
        if self.is_open() {
            return false;
        }
        if self.refresh_position(viewport).is_none() {
            debug!(overlay = self.id.get(), "trigger unavailable, not opening");
            return false;
        }
        self.state = OverlayState::Open;
        self.registration = Some(Registration::acquire(&self.host, self.id));
        debug!(overlay = self.id.get(), position = ?self.position, "overlay opened");
        true
    }

    /// Closes the overlay and disarms every listener it armed.
    ///
    /// Returns `false` if it was already closed.
    pub fn close(&mut self) -> bool {
        self.close_because(CloseReason::Requested).is_some()
    }

    /// Flips the state. Opening re-measures the trigger first.
    pub fn toggle(&mut self, viewport: &Viewport) -> OverlayState {
        match self.state {
            OverlayState::Closed => {
                self.open(viewport);
            }
            OverlayState::Open => {
                self.close_because(CloseReason::Toggled);
            }
        }
        self.state
    }

    /// Closes the overlay after one of its items was chosen.
    pub fn select(&mut self) -> bool {
        self.close_because(CloseReason::Selection).is_some()
    }

    /// Closes the overlay because its trigger was unmounted.
    pub fn trigger_removed(&mut self) -> bool {
        self.close_because(CloseReason::TriggerRemoved).is_some()
    }

    /// Handles a routed global event.
    ///
    /// Returns the close reason if the event dismissed the overlay. Events
    /// reaching a closed overlay are ignored.
    pub fn handle_event(&mut self, event: &OverlayEvent) -> Option<CloseReason> {
        if !self.is_open() {
            return None;
        }
        match event {
            OverlayEvent::PointerDown(point) => {
                if self.is_inside(*point) {
                    return None;
                }
                self.close_because(CloseReason::OutsidePointer)
            }
            OverlayEvent::Resize(viewport) | OverlayEvent::Scroll(viewport) => {
                if self.refresh_position(viewport).is_none() {
                    return self.close_because(CloseReason::TriggerRemoved);
                }
                None
            }
        }
    }

    /// Returns `true` if the point is inside the trigger or the popup.
    #[must_use]
    pub fn is_inside(&self, point: Point) -> bool {
        self.trigger.contains(point) || self.popup_area.is_some_and(|area| area.contains(point))
    }

    fn close_because(&mut self, reason: CloseReason) -> Option<CloseReason> {
        if !self.is_open() {
            return None;
        }
        self.state = OverlayState::Closed;
        self.registration = None;
        self.popup_area = None;
        debug!(overlay = self.id.get(), ?reason, "overlay closed");
        Some(reason)
    }
}

impl<H: ListenerHost, T: Trigger> Drop for OverlayController<H, T> {
    fn drop(&mut self) {
        if self.is_open() {
            debug!(overlay = self.id.get(), "overlay dropped while open");
        }
        self.registration = None;
    }
}
