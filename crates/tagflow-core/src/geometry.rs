#![forbid(unsafe_code)]

//! Geometric primitives.

/// A rectangle in terminal cell coordinates (0-indexed, origin top-left).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
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

    /// Create a rectangle at the origin with the given size.
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

    /// True when either dimension is zero.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    pub const fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Overlap with `other`, or an empty rect when they do not touch.
    pub fn intersection(&self, other: &Rect) -> Rect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if x < right && y < bottom {
            Rect::new(x, y, right - x, bottom - y)
        } else {
            Rect::default()
        }
    }

    /// Shrink by `margin` on each side, saturating at zero size.
    pub fn inner(&self, margin: Sides) -> Rect {
        Rect {
            x: self.x.saturating_add(margin.left),
            y: self.y.saturating_add(margin.top),
            width: self
                .width
                .saturating_sub(margin.left)
                .saturating_sub(margin.right),
            height: self
                .height
                .saturating_sub(margin.top)
                .saturating_sub(margin.bottom),
        }
    }

    /// A single row of this rect, `dy` rows below the top.
    ///
    /// Returns an empty rect when `dy` falls outside.
    pub fn row(&self, dy: u16) -> Rect {
        if dy >= self.height {
            return Rect::new(self.x, self.bottom(), self.width, 0);
        }
        Rect::new(self.x, self.y + dy, self.width, 1)
    }

    /// A `width` x `height` rect centered inside this one, clamped to fit.
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

/// Per-side spacing used for borders and padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Sides {
    pub top: u16,
    pub right: u16,
    pub bottom: u16,
    pub left: u16,
}

impl Sides {
    /// Create sides with explicit values (CSS order).
    pub const fn new(top: u16, right: u16, bottom: u16, left: u16) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// The same value on every side.
    pub const fn all(n: u16) -> Self {
        Self::new(n, n, n, n)
    }
}
