//! Grid coordinates

use serde::{Deserialize, Serialize};

/// 4-directional moves used by the pathfinder and chokepoint checks
pub const CARDINALS: [(i32, i32); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

/// 8-directional moves, in the order the safe-spot fallback tries them:
/// right, left, down, up, then the diagonals
pub const NEIGHBORS_8: [(i32, i32); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (-1, 1),
    (1, -1),
    (-1, -1),
];

/// A cell position: `x` is the column, `y` the row
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    pub fn manhattan(self, other: Point) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Squared Euclidean distance
    pub fn distance_sq(self, other: Point) -> usize {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        dx * dx + dy * dy
    }

    /// Step by a delta; `None` if either coordinate would go negative
    pub fn offset(self, dx: i32, dy: i32) -> Option<Point> {
        let x = self.x.checked_add_signed(dx as isize)?;
        let y = self.y.checked_add_signed(dy as isize)?;
        Some(Point { x, y })
    }

    /// Cell containing a pixel position
    pub fn from_pixels(px: f32, py: f32, cell_size: u32) -> Option<Point> {
        if px < 0.0 || py < 0.0 || cell_size == 0 || !px.is_finite() || !py.is_finite() {
            return None;
        }
        let cell = cell_size as f32;
        Some(Point {
            x: (px / cell).floor() as usize,
            y: (py / cell).floor() as usize,
        })
    }

    /// Pixel position of the middle of this cell
    pub fn to_pixel_center(self, cell_size: u32) -> (f32, f32) {
        let cell = cell_size as f32;
        (
            self.x as f32 * cell + cell / 2.0,
            self.y as f32 * cell + cell / 2.0,
        )
    }
}

impl core::fmt::Display for Point {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
