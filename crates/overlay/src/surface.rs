//! Detached render surface.
//!
//! Popups are not painted inside the element that opened them. They are
//! mounted as children of a single [`PortalRoot`] that the view paints last,
//! at fixed screen coordinates, so no ancestor clipping or stacking can hide
//! them. Each overlay mounts at most one node; mounting again replaces it.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use tracing::trace;

use crate::geometry::{Rect, Size, Viewport};
use crate::listeners::OverlayId;
use crate::position::OverlayPosition;

/// A popup mounted at the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountedNode<C> {
    /// The overlay that owns this node.
    pub owner: OverlayId,
    /// What to paint.
    pub content: C,
    /// Where to paint it, in screen coordinates.
    pub area: Rect,
}

/// The top-level layer popups are mounted into, in paint order.
#[derive(Debug)]
pub struct PortalRoot<C> {
    nodes: Vec<MountedNode<C>>,
}

impl<C> Default for PortalRoot<C> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

/// A cloneable handle onto a [`PortalRoot`].
///
/// # Examples
///
/// ```
/// use protolab_overlay::{OverlayId, Portal, Rect};
///
/// let portal: Portal<&str> = Portal::new();
/// let owner = OverlayId::new(1);
///
/// portal.mount(owner, "menu", Rect::new(4, 2, 10, 3));
/// portal.mount(owner, "menu v2", Rect::new(4, 3, 10, 3));
/// assert_eq!(portal.len(), 1);
///
/// assert!(portal.unmount(owner));
/// assert!(portal.is_empty());
/// ```
#[derive(Debug)]
pub struct Portal<C> {
    root: Rc<RefCell<PortalRoot<C>>>,
}

impl<C> Clone for Portal<C> {
    fn clone(&self) -> Self {
        Self {
            root: Rc::clone(&self.root),
        }
    }
}

impl<C> Default for Portal<C> {
    fn default() -> Self {
        Self {
            root: Rc::new(RefCell::new(PortalRoot::default())),
        }
    }
}

impl<C> Portal<C> {
    /// Creates an empty root.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mounts `content` for `owner`, replacing the owner's previous node.
    pub fn mount(&self, owner: OverlayId, content: C, area: Rect) {
        let mut root = self.root.borrow_mut();
        let node = MountedNode {
            owner,
            content,
            area,
        };
        match root.nodes.iter_mut().find(|n| n.owner == owner) {
            Some(existing) => *existing = node,
            None => root.nodes.push(node),
        }
        trace!(owner = owner.get(), ?area, "portal node mounted");
    }

    /// Moves the owner's node without touching its content.
    ///
    /// Returns `false` if nothing is mounted for the owner.
    pub fn move_to(&self, owner: OverlayId, area: Rect) -> bool {
        let mut root = self.root.borrow_mut();
        match root.nodes.iter_mut().find(|n| n.owner == owner) {
            Some(node) => {
                node.area = area;
                true
            }
            None => false,
        }
    }

    /// Removes the owner's node. Returns `false` if nothing was mounted.
    pub fn unmount(&self, owner: OverlayId) -> bool {
        let mut root = self.root.borrow_mut();
        let before = root.nodes.len();
        root.nodes.retain(|n| n.owner != owner);
        let removed = root.nodes.len() < before;
        if removed {
            trace!(owner = owner.get(), "portal node unmounted");
        }
        removed
    }

    /// Returns `true` if the owner has a mounted node.
    #[must_use]
    pub fn is_mounted(&self, owner: OverlayId) -> bool {
        self.root.borrow().nodes.iter().any(|n| n.owner == owner)
    }

    /// Area of the owner's node, if mounted.
    #[must_use]
    pub fn area_of(&self, owner: OverlayId) -> Option<Rect> {
        self.root
            .borrow()
            .nodes
            .iter()
            .find(|n| n.owner == owner)
            .map(|n| n.area)
    }

    /// Mounted nodes in paint order.
    ///
    /// The returned guard borrows the root; drop it before mounting or
    /// unmounting.
    #[must_use]
    pub fn nodes(&self) -> Ref<'_, [MountedNode<C>]> {
        Ref::map(self.root.borrow(), |root| root.nodes.as_slice())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.root.borrow().nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.borrow().nodes.is_empty()
    }
}

/// One overlay's slot in the portal.
///
/// Unmounts its node when dropped.
#[derive(Debug)]
pub struct DetachedSurface<C> {
    portal: Portal<C>,
    owner: OverlayId,
}

impl<C> DetachedSurface<C> {
    /// Creates a surface for `owner`. Nothing is mounted yet.
    #[must_use]
    pub fn new(portal: Portal<C>, owner: OverlayId) -> Self {
        Self { portal, owner }
    }

    /// Mounts `content` at the position, returning the occupied area.
    pub fn render(&self, content: C, position: OverlayPosition, size: Size, viewport: &Viewport) -> Rect {
        let area = position.area(size, viewport.width);
        self.portal.mount(self.owner, content, area);
        area
    }

    /// Moves an already mounted node. Returns the new area if one was mounted.
    pub fn reposition(&self, position: OverlayPosition, size: Size, viewport: &Viewport) -> Option<Rect> {
        let area = position.area(size, viewport.width);
        self.portal.move_to(self.owner, area).then_some(area)
    }

    /// Removes the node. Returns `false` if nothing was mounted.
    pub fn unmount(&self) -> bool {
        self.portal.unmount(self.owner)
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.portal.is_mounted(self.owner)
    }
}

impl<C> Drop for DetachedSurface<C> {
    fn drop(&mut self) {
        self.portal.unmount(self.owner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_mounts_at_computed_area() {
        let portal = Portal::new();
        let surface = DetachedSurface::new(portal.clone(), OverlayId::new(7));
        let area = surface.render(
            "menu",
            OverlayPosition::TopLeft { top: 3, left: 5 },
            Size::new(10, 4),
            &Viewport::new(80, 24),
        );
        assert_eq!(area, Rect::new(5, 3, 10, 4));
        assert_eq!(portal.area_of(OverlayId::new(7)), Some(area));
        assert_eq!(portal.nodes()[0].content, "menu");
    }

    #[test]
    fn never_more_than_one_node_per_overlay() {
        let portal = Portal::new();
        let surface = DetachedSurface::new(portal.clone(), OverlayId::new(1));
        let pos = OverlayPosition::TopLeft { top: 0, left: 0 };
        for _ in 0..5 {
            surface.render(1u8, pos, Size::new(2, 2), &Viewport::new(80, 24));
        }
        assert_eq!(portal.len(), 1);
    }

    #[test]
    fn separate_overlays_stack_in_mount_order() {
        let portal = Portal::new();
        portal.mount(OverlayId::new(1), 'a', Rect::new(0, 0, 1, 1));
        portal.mount(OverlayId::new(2), 'b', Rect::new(0, 0, 1, 1));
        let order: Vec<char> = portal.nodes().iter().map(|n| n.content).collect();
        assert_eq!(order, ['a', 'b']);
    }

    #[test]
    fn reposition_requires_mounted_node() {
        let portal: Portal<()> = Portal::new();
        let surface = DetachedSurface::new(portal.clone(), OverlayId::new(3));
        let pos = OverlayPosition::TopRight { top: 2, right: 0 };
        let viewport = Viewport::new(40, 10);
        assert_eq!(surface.reposition(pos, Size::new(5, 2), &viewport), None);

        surface.render((), pos, Size::new(5, 2), &viewport);
        assert_eq!(
            surface.reposition(pos, Size::new(5, 2), &Viewport::new(60, 10)),
            Some(Rect::new(55, 2, 5, 2))
        );
    }

    #[test]
    fn dropping_surface_unmounts() {
        let portal = Portal::new();
        let surface = DetachedSurface::new(portal.clone(), OverlayId::new(1));
        surface.render(0, OverlayPosition::TopLeft { top: 0, left: 0 }, Size::new(1, 1), &Viewport::new(10, 10));
        drop(surface);
        assert!(portal.is_empty());
    }
}
