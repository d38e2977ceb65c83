//! Locked doors
//!
//! Doors appear on freshly opened cells that form a one-cell-wide straight
//! passage, and vanish again when that cell is re-walled, stops being a
//! chokepoint, or is unlocked with a key.

use serde::{Deserialize, Serialize};

use crate::dungeon::{Grid, Point};

/// Opaque handle a presentation layer can map to its sprite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DoorId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedDoor {
    pub id: DoorId,
    pub pos: Point,
}

/// Check if `p` is a straight one-cell passage.
///
/// Walls north and south with floor east and west, or the transpose.
/// Cells on the two outer rings never qualify.
pub fn is_chokepoint(grid: &Grid, p: Point) -> bool {
    let n = grid.size();
    if p.x <= 1 || p.y <= 1 || p.x + 2 >= n || p.y + 2 >= n {
        return false;
    }
    let north = grid.is_wall(Point::new(p.x, p.y - 1));
    let south = grid.is_wall(Point::new(p.x, p.y + 1));
    let west = grid.is_wall(Point::new(p.x - 1, p.y));
    let east = grid.is_wall(Point::new(p.x + 1, p.y));

    (north && south && !west && !east) || (west && east && !north && !south)
}

/// The doors of the current level
#[derive(Debug, Clone, Default)]
pub struct LockedDoors {
    doors: Vec<LockedDoor>,
    unlocked: usize,
    next_id: u32,
    cap: usize,
    min_spacing: usize,
}

impl LockedDoors {
    pub fn new(cap: usize, min_spacing: usize) -> Self {
        Self {
            cap,
            min_spacing,
            ..Self::default()
        }
    }

    /// Forget every door and unlock, and set the cap for the next level
    pub fn reset(&mut self, cap: usize) {
        self.doors.clear();
        self.unlocked = 0;
        self.cap = cap;
    }

    pub fn doors(&self) -> &[LockedDoor] {
        &self.doors
    }

    pub fn len(&self) -> usize {
        self.doors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doors.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn unlocked(&self) -> usize {
        self.unlocked
    }

    /// Active plus unlocked doors stay below the cap
    pub fn has_room(&self) -> bool {
        self.doors.len() + self.unlocked < self.cap
    }

    pub fn door_at(&self, p: Point) -> Option<&LockedDoor> {
        self.doors.iter().find(|d| d.pos == p)
    }

    /// Chokepoint and far enough from every other door
    pub fn is_valid_position(&self, grid: &Grid, p: Point) -> bool {
        is_chokepoint(grid, p)
            && self
                .doors
                .iter()
                .filter(|d| d.pos != p)
                .all(|d| d.pos.manhattan(p) >= self.min_spacing)
    }

    /// Place a door at `p` if the cap and the position allow it
    pub fn try_place(&mut self, grid: &Grid, p: Point) -> Option<LockedDoor> {
        if !self.has_room() || self.door_at(p).is_some() || !self.is_valid_position(grid, p) {
            return None;
        }
        let door = LockedDoor {
            id: DoorId(self.next_id),
            pos: p,
        };
        self.next_id = self.next_id.wrapping_add(1);
        self.doors.push(door);
        log::debug!("locked door {:?} placed at {}", door.id, p);
        Some(door)
    }

    /// Drop doors whose cell is a wall or no longer a chokepoint
    pub fn revalidate(&mut self, grid: &Grid) -> Vec<LockedDoor> {
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.doors.len());
        for door in std::mem::take(&mut self.doors) {
            if grid.is_wall(door.pos) || !is_chokepoint(grid, door.pos) {
                removed.push(door);
            } else {
                kept.push(door);
            }
        }
        self.doors = kept;
        for door in &removed {
            log::debug!("locked door {:?} at {} removed", door.id, door.pos);
        }
        removed
    }

    /// Remove every door within `radius` (Euclidean, in cells) of `center`
    pub fn destroy_near(&mut self, center: Point, radius: usize) -> Vec<LockedDoor> {
        let r2 = radius * radius;
        let (gone, kept): (Vec<LockedDoor>, Vec<LockedDoor>) = std::mem::take(&mut self.doors)
            .into_iter()
            .partition(|d| d.pos.distance_sq(center) <= r2);
        self.doors = kept;
        gone
    }

    /// Open the door at `p`; it still counts toward the cap
    pub fn unlock(&mut self, p: Point) -> Option<LockedDoor> {
        let idx = self.doors.iter().position(|d| d.pos == p)?;
        let door = self.doors.remove(idx);
        self.unlocked += 1;
        log::debug!("locked door {:?} at {} unlocked", door.id, p);
        Some(door)
    }
}
