//! Floating overlay framework.
//!
//! Dropdown menus and pickers that float above scrolling, clipped content.
//! Three pieces cooperate:
//!
//! - [`position`]: where a popup goes, computed from its trigger's bounding
//!   box, the scroll offset and the viewport width
//! - [`controller`]: open/closed state, dismissal on outside presses and
//!   repositioning on resize or scroll, with scoped listener registration
//!   ([`listeners`])
//! - [`surface`]: a detached render root that popups mount into so they are
//!   painted above everything else
//!
//! [`Popup`] bundles a controller and a surface for the common case.
//!
//! The crate is single-threaded by construction: listener tables and portal
//! roots are `Rc<RefCell<_>>` handles owned by one UI loop.

pub mod controller;
pub mod geometry;
pub mod listeners;
pub mod popup;
pub mod position;
pub mod surface;

pub use controller::{CloseReason, OverlayController, OverlayEvent, OverlayState, Trigger};
pub use geometry::{Point, Rect, ScrollOffset, Size, Viewport};
pub use listeners::{EventListeners, ListenerHost, ListenerId, ListenerKind, OverlayId, Registration};
pub use popup::{AllocateOverlay, Popup};
pub use position::{AnchorMode, OverlayPosition, compute_position};
pub use surface::{DetachedSurface, MountedNode, Portal, PortalRoot};
