//! Rectangles for space partitioning
//!
//! A `Rect` is a region of the grid owned by one BSP node. Splitting a rect
//! produces two adjacent children that together cover exactly the parent.

use serde::{Deserialize, Serialize};

use super::point::Point;

/// An axis-aligned region: top-left corner plus extent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

/// Axis of a cut through a rect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitAxis {
    /// Cut along a column; children sit side by side
    Vertical,
    /// Cut along a row; children are stacked
    Horizontal,
}

impl Rect {
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self { x, y, width, height }
    }

    /// Exclusive right edge
    pub fn right(&self) -> usize {
        self.x + self.width
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> usize {
        self.y + self.height
    }

    pub fn area(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Check if this rectangle contains another
    pub fn contains(&self, other: &Rect) -> bool {
        self.x <= other.x
            && self.y <= other.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Check if this rectangle intersects another
    pub fn intersects(&self, other: &Rect) -> bool {
        !(self.right() <= other.x
            || other.right() <= self.x
            || self.bottom() <= other.y
            || other.bottom() <= self.y)
    }

    /// Shrink by `pad` cells on every side
    pub fn inset(&self, pad: usize) -> Rect {
        Rect {
            x: self.x + pad,
            y: self.y + pad,
            width: self.width.saturating_sub(2 * pad),
            height: self.height.saturating_sub(2 * pad),
        }
    }

    /// Wide rects are cut vertically, tall or square ones horizontally
    pub fn preferred_axis(&self) -> SplitAxis {
        if self.width > self.height {
            SplitAxis::Vertical
        } else {
            SplitAxis::Horizontal
        }
    }

    /// Extent along the axis being cut
    pub fn extent(&self, axis: SplitAxis) -> usize {
        match axis {
            SplitAxis::Vertical => self.width,
            SplitAxis::Horizontal => self.height,
        }
    }

    /// Cut at `offset` cells from the leading edge.
    ///
    /// Returns `None` unless both halves are non-empty.
    pub fn split(&self, axis: SplitAxis, offset: usize) -> Option<(Rect, Rect)> {
        if offset == 0 || offset >= self.extent(axis) {
            return None;
        }
        Some(match axis {
            SplitAxis::Vertical => (
                Rect::new(self.x, self.y, offset, self.height),
                Rect::new(self.x + offset, self.y, self.width - offset, self.height),
            ),
            SplitAxis::Horizontal => (
                Rect::new(self.x, self.y, self.width, offset),
                Rect::new(self.x, self.y + offset, self.width, self.height - offset),
            ),
        })
    }
}
