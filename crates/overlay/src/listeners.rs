//! Global event listener registration.
//!
//! Overlays dismiss themselves on outside pointer presses and follow their
//! trigger on resize and scroll. Those are document- and window-level
//! events, so each open overlay registers its own listeners with a
//! [`ListenerHost`] and must remove every one of them when it closes.
//!
//! Registration is scoped: [`Registration::acquire`] attaches one listener
//! per [`ListenerKind`] and dropping the token detaches them. Overlays never
//! share a listener, because each one hit-tests against its own trigger and
//! popup.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::trace;

/// Identifies one overlay instance for listener bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayId(u64);

impl OverlayId {
    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Identifies one attached listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// The global events an open overlay listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ListenerKind {
    /// Pointer press anywhere in the document.
    PointerDown,
    /// Window resize.
    Resize,
    /// Window (or scroll container) scroll.
    Scroll,
}

impl ListenerKind {
    /// Every kind an open overlay registers, one listener each.
    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::PointerDown, Self::Resize, Self::Scroll]
    }
}

/// Something overlays can attach global listeners to.
///
/// Implementations are cheap handles (`Clone`) onto shared, single-threaded
/// state.
pub trait ListenerHost: Clone {
    /// Attaches a listener of `kind` owned by `owner`.
    fn attach(&self, kind: ListenerKind, owner: OverlayId) -> ListenerId;

    /// Detaches a listener. Returns `false` if it was not attached.
    fn detach(&self, id: ListenerId) -> bool;
}

#[derive(Debug, Clone, Copy)]
struct Listener {
    kind: ListenerKind,
    owner: OverlayId,
}

#[derive(Debug, Default)]
struct ListenerTable {
    next_listener: u64,
    next_overlay: u64,
    listeners: BTreeMap<ListenerId, Listener>,
    attached: u64,
    detached: u64,
}

/// The listener registry of one screen.
///
/// A cloneable handle; every clone refers to the same table. The event loop
/// asks it which overlays subscribe to an event and routes the event to
/// them.
///
/// # Examples
///
/// ```
/// use protolab_overlay::{EventListeners, ListenerKind, Registration};
///
/// let listeners = EventListeners::new();
/// let owner = listeners.allocate_id();
///
/// let token = Registration::acquire(&listeners, owner);
/// assert_eq!(listeners.subscribers(ListenerKind::PointerDown), vec![owner]);
///
/// drop(token);
/// assert_eq!(listeners.active_count(), 0);
/// assert_eq!(listeners.attach_count(), listeners.detach_count());
/// ```
#[derive(Debug, Clone, Default)]
pub struct EventListeners {
    table: Rc<RefCell<ListenerTable>>,
}

impl EventListeners {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out a fresh overlay identifier.
    #[must_use]
    pub fn allocate_id(&self) -> OverlayId {
        let mut table = self.table.borrow_mut();
        table.next_overlay += 1;
        OverlayId(table.next_overlay)
    }

    /// Overlays with a listener of `kind`, in registration order, without
    /// duplicates.
    #[must_use]
    pub fn subscribers(&self, kind: ListenerKind) -> Vec<OverlayId> {
        let table = self.table.borrow();
        let mut owners: Vec<OverlayId> = Vec::new();
        for listener in table.listeners.values().filter(|l| l.kind == kind) {
            if !owners.contains(&listener.owner) {
                owners.push(listener.owner);
            }
        }
        owners
    }

    /// Number of listeners currently attached.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.table.borrow().listeners.len()
    }

    /// Number of listeners currently attached for one owner.
    #[must_use]
    pub fn active_for(&self, owner: OverlayId) -> usize {
        self.table
            .borrow()
            .listeners
            .values()
            .filter(|l| l.owner == owner)
            .count()
    }

    /// Total attach calls since creation.
    #[must_use]
    pub fn attach_count(&self) -> u64 {
        self.table.borrow().attached
    }

    /// Total successful detach calls since creation.
    #[must_use]
    pub fn detach_count(&self) -> u64 {
        self.table.borrow().detached
    }
}

impl ListenerHost for EventListeners {
    fn attach(&self, kind: ListenerKind, owner: OverlayId) -> ListenerId {
        let mut table = self.table.borrow_mut();
        table.next_listener += 1;
        let id = ListenerId(table.next_listener);
        table.listeners.insert(id, Listener { kind, owner });
        table.attached += 1;
        trace!(?id, ?kind, owner = owner.get(), "listener attached");
        id
    }

    fn detach(&self, id: ListenerId) -> bool {
        let mut table = self.table.borrow_mut();
        match table.listeners.remove(&id) {
            Some(listener) => {
                table.detached += 1;
                trace!(?id, kind = ?listener.kind, owner = listener.owner.get(), "listener detached");
                true
            }
            None => false,
        }
    }
}

/// The listeners one open overlay holds.
///
/// Obtained on open, released on close. Dropping the token detaches every
/// listener it attached, so an overlay destroyed while open still cleans up.
#[derive(Debug)]
#[must_use = "dropping a registration detaches its listeners immediately"]
pub struct Registration<H: ListenerHost> {
    host: H,
    owner: OverlayId,
    ids: Vec<ListenerId>,
}

impl<H: ListenerHost> Registration<H> {
    /// Attaches one listener of every [`ListenerKind`] for `owner`.
    pub fn acquire(host: &H, owner: OverlayId) -> Self {
        let ids = ListenerKind::all()
            .into_iter()
            .map(|kind| host.attach(kind, owner))
            .collect();
        Self {
            host: host.clone(),
            owner,
            ids,
        }
    }

    /// The overlay holding this registration.
    #[must_use]
    pub fn owner(&self) -> OverlayId {
        self.owner
    }

    /// Number of listeners held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` if no listener is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<H: ListenerHost> Drop for Registration<H> {
    fn drop(&mut self) {
        for id in self.ids.drain(..) {
            self.host.detach(id);
        }
    }
}
