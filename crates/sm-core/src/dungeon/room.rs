//! Rooms carved into BSP leaves

use serde::{Deserialize, Serialize};

use super::point::Point;
use super::rect::Rect;
use crate::rng::GameRng;

/// Rectangle representing a room
///
/// Rooms are immutable once the generator has placed them; only the
/// corridors between them change during play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// X coordinate of room interior (left edge)
    pub x: usize,
    /// Y coordinate of room interior (top edge)
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Room {
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self { x, y, width, height }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Get center point of room
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Check if point is inside room
    pub fn contains(&self, p: Point) -> bool {
        self.rect().contains_point(p)
    }

    /// Check if this room overlaps with another
    pub fn overlaps(&self, other: &Room) -> bool {
        self.rect().intersects(&other.rect())
    }

    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Get a random point inside the room
    pub fn random_point(&self, rng: &mut GameRng) -> Point {
        Point::new(
            self.x + rng.rn2(self.width),
            self.y + rng.rn2(self.height),
        )
    }

    /// Random point kept up to `pad` cells away from the edges.
    ///
    /// The margin shrinks for rooms too small to honour it, so the result
    /// is always inside the room.
    pub fn random_inner_point(&self, pad: usize, rng: &mut GameRng) -> Point {
        let pad_x = pad.min(self.width.saturating_sub(1) / 2);
        let pad_y = pad.min(self.height.saturating_sub(1) / 2);
        Point::new(
            rng.between(self.x + pad_x, self.x + self.width - 1 - pad_x),
            rng.between(self.y + pad_y, self.y + self.height - 1 - pad_y),
        )
    }

    /// Every cell of the room, row by row
    pub fn cells(&self) -> impl Iterator<Item = Point> + '_ {
        (self.y..self.y + self.height)
            .flat_map(move |y| (self.x..self.x + self.width).map(move |x| Point::new(x, y)))
    }
}

/// Index of the room containing a point
pub fn pos_to_room(rooms: &[Room], p: Point) -> Option<usize> {
    rooms.iter().position(|room| room.contains(p))
}
