//! A floating popup: lifecycle controller plus detached surface.

use crate::controller::{CloseReason, OverlayController, OverlayEvent, OverlayState, Trigger};
use crate::geometry::{Rect, Size, Viewport};
use crate::listeners::{ListenerHost, OverlayId};
use crate::position::{AnchorMode, OverlayPosition};
use crate::surface::{DetachedSurface, Portal};

/// One floating popup anchored to a trigger.
///
/// Closing unmounts the popup's node from the portal synchronously, so a
/// closed popup never leaves anything painted behind it.
///
/// # Examples
///
/// ```
/// use protolab_overlay::{AnchorMode, EventListeners, Popup, Portal, Rect, Size, Viewport};
///
/// let listeners = EventListeners::new();
/// let portal = Portal::new();
/// let mut menu = Popup::new(
///     &listeners,
///     portal.clone(),
///     Rect::new(10, 4, 12, 1),
///     AnchorMode::BelowLeft,
///     Size::new(14, 3),
/// );
///
/// let viewport = Viewport::new(80, 24);
/// menu.open(&viewport);
/// menu.render("Editar | Excluir", &viewport);
/// assert_eq!(portal.area_of(menu.id()), Some(Rect::new(10, 5, 14, 3)));
///
/// menu.close();
/// assert!(portal.is_empty());
/// ```
#[derive(Debug)]
pub struct Popup<H: ListenerHost, T: Trigger, C> {
    controller: OverlayController<H, T>,
    surface: DetachedSurface<C>,
    size: Size,
}

impl<H: ListenerHost, T: Trigger, C> Popup<H, T, C> {
    /// Creates a closed popup with a fresh identity.
    pub fn new(host: &H, portal: Portal<C>, trigger: T, anchor: AnchorMode, size: Size) -> Self
    where
        H: AllocateOverlay,
    {
        let id = host.allocate_overlay();
        Self::with_id(id, host.clone(), portal, trigger, anchor, size)
    }

    /// Creates a closed popup with an explicit identity.
    pub fn with_id(
        id: OverlayId,
        host: H,
        portal: Portal<C>,
        trigger: T,
        anchor: AnchorMode,
        size: Size,
    ) -> Self {
        Self {
            controller: OverlayController::new(id, host, trigger, anchor),
            surface: DetachedSurface::new(portal, id),
            size,
        }
    }

    #[must_use]
    pub fn id(&self) -> OverlayId {
        self.controller.id()
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.controller.is_open()
    }

    #[must_use]
    pub fn state(&self) -> OverlayState {
        self.controller.state()
    }

    #[must_use]
    pub fn position(&self) -> Option<OverlayPosition> {
        self.controller.position()
    }

    #[must_use]
    pub fn controller(&self) -> &OverlayController<H, T> {
        &self.controller
    }

    #[must_use]
    pub fn trigger(&self) -> &T {
        self.controller.trigger()
    }

    pub fn trigger_mut(&mut self) -> &mut T {
        self.controller.trigger_mut()
    }

    #[must_use]
    pub fn size(&self) -> Size {
        self.size
    }

    /// Changes the popup size, e.g. when its item list changes.
    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    pub fn open(&mut self, viewport: &Viewport) -> bool {
        self.controller.open(viewport)
    }

    pub fn close(&mut self) -> bool {
        let closed = self.controller.close();
        self.surface.unmount();
        closed
    }

    pub fn toggle(&mut self, viewport: &Viewport) -> OverlayState {
        let state = self.controller.toggle(viewport);
        if state == OverlayState::Closed {
            self.surface.unmount();
        }
        state
    }

    /// Closes after an item was chosen.
    pub fn select(&mut self) -> bool {
        let closed = self.controller.select();
        self.surface.unmount();
        closed
    }

    pub fn trigger_removed(&mut self) -> bool {
        let closed = self.controller.trigger_removed();
        self.surface.unmount();
        closed
    }

    /// Routes a global event. A mounted popup follows its trigger on resize
    /// and scroll, and is unmounted if the event closed it.
    pub fn handle_event(&mut self, event: &OverlayEvent) -> Option<CloseReason> {
        let reason = self.controller.handle_event(event);
        if reason.is_some() {
            self.surface.unmount();
            return reason;
        }
        if let (OverlayEvent::Resize(viewport) | OverlayEvent::Scroll(viewport), Some(position)) =
            (event, self.controller.position())
        {
            let area = self.surface.reposition(position, self.size, viewport);
            if area.is_some() {
                self.controller.set_popup_area(area);
            }
        }
        None
    }

    /// Mounts `content` at the current position while open.
    ///
    /// Returns the painted area, or `None` when closed.
    pub fn render(&mut self, content: C, viewport: &Viewport) -> Option<Rect> {
        if !self.controller.is_open() {
            return None;
        }
        let position = self.controller.refresh_position(viewport).or(self.controller.position())?;
        let area = self.surface.render(content, position, self.size, viewport);
        self.controller.set_popup_area(Some(area));
        Some(area)
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.surface.is_mounted()
    }
}

/// Hosts that can hand out overlay identities.
pub trait AllocateOverlay: ListenerHost {
    fn allocate_overlay(&self) -> OverlayId;
}

impl AllocateOverlay for crate::listeners::EventListeners {
    fn allocate_overlay(&self) -> OverlayId {
        self.allocate_id()
    }
}
