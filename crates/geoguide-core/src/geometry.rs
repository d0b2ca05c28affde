#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! [`Span`] is a one-dimensional document extent (where a section anchor sits
//! along the scroll axis). [`Rect`] is a screen rectangle used for hit testing.

/// A vertical extent in document coordinates: `[offset, offset + height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Span {
    /// Distance from the top of the document.
    pub offset: u32,
    /// Extent along the scroll axis.
    pub height: u32,
}

impl Span {
    /// Create a new span.
    #[inline]
    pub const fn new(offset: u32, height: u32) -> Self {
        Self { offset, height }
    }

    /// End of the span (exclusive).
    #[inline]
    pub const fn end(&self) -> u32 {
        self.offset.saturating_add(self.height)
    }

    /// Whether `position` lies in `[offset, offset + height)`.
    ///
    /// A zero-height span contains nothing.
    #[inline]
    pub const fn contains(&self, position: u32) -> bool {
        position >= self.offset && position < self.end()
    }

    /// Check if the span has zero extent.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.height == 0
    }
}

/// A rectangle for layout bounds and hit testing.
///
/// Uses terminal coordinates (0-indexed, origin at top-left).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: u16,
    /// Top edge (inclusive).
    pub y: u16,
    /// Width in cells.
    pub width: u16,
    /// Height in cells.
    pub height: u16,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from origin with given size.
    #[inline]
    pub const fn from_size(width: u16, height: u16) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }

    /// Check if the rectangle has zero area.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    pub const fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Shrink the rectangle by `margin` cells on every side.
    pub fn inset(&self, margin: u16) -> Rect {
        let twice = margin.saturating_mul(2);
        Rect {
            x: self.x.saturating_add(margin),
            y: self.y.saturating_add(margin),
            width: self.width.saturating_sub(twice),
            height: self.height.saturating_sub(twice),
        }
    }

    /// Split off `width` columns from the right edge.
    ///
    /// Returns `(left, right)`. When `width` exceeds the rectangle the left
    /// part is empty.
    pub fn split_right(&self, width: u16) -> (Rect, Rect) {
        let width = width.min(self.width);
        let left = Rect::new(self.x, self.y, self.width - width, self.height);
        let right = Rect::new(left.right(), self.y, width, self.height);
        (left, right)
    }

    /// A rectangle of at most `width` x `height`, centered inside `self`.
    pub fn centered(&self, width: u16, height: u16) -> Rect {
        let width = width.min(self.width);
        let height = height.min(self.height);
        Rect::new(
            self.x + (self.width - width) / 2,
            self.y + (self.height - height) / 2,
            width,
            height,
        )
    }
}
