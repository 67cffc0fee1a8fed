//! Integer geometry used for overlay placement and hit-testing.
//!
//! Coordinates are whole pixels (or terminal cells). Rectangles are
//! half-open: `left <= x < right`, `top <= y < bottom`.

/// A point on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Width and height of a popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// A bounding box given by its four edges.
///
/// # Examples
///
/// ```
/// use protolab_overlay::{Point, Rect};
///
/// let rect = Rect::new(10, 5, 20, 3);
/// assert_eq!(rect.right, 30);
/// assert_eq!(rect.bottom, 8);
/// assert!(rect.contains(Point::new(10, 5)));
/// assert!(!rect.contains(Point::new(30, 5)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    /// Creates a rectangle from its origin and size.
    #[must_use]
    pub const fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            right: left + width,
            bottom: top + height,
        }
    }

    #[must_use]
    pub const fn width(&self) -> i32 {
        self.right - self.left
    }

    #[must_use]
    pub const fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Returns `true` if the point lies inside the rectangle.
    #[must_use]
    pub const fn contains(&self, point: Point) -> bool {
        point.x >= self.left && point.x < self.right && point.y >= self.top && point.y < self.bottom
    }
}

/// How far the document has been scrolled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ScrollOffset {
    pub x: i32,
    pub y: i32,
}

impl ScrollOffset {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// The visible window: its size and the current document scroll offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Viewport {
    pub width: i32,
    pub height: i32,
    pub scroll: ScrollOffset,
}

impl Viewport {
    /// A viewport that is not scrolled.
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            scroll: ScrollOffset::new(0, 0),
        }
    }

    /// Returns a copy with the given scroll offset.
    #[must_use]
    pub const fn scrolled(mut self, scroll: ScrollOffset) -> Self {
        self.scroll = scroll;
        self
    }
}
