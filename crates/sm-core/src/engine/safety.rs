//! Keeping the player out of walls

use crate::dungeon::{Grid, NEIGHBORS_8, Point};

/// Cells the player has stood on, most recent last, each at most once
#[derive(Debug, Clone, Default)]
pub struct VisitedTiles {
    tiles: Vec<Point>,
}

impl VisitedTiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move `p` to the most-recent end, adding it if new
    pub fn record(&mut self, p: Point) {
        if self.tiles.last() == Some(&p) {
            return;
        }
        self.tiles.retain(|&q| q != p);
        self.tiles.push(p);
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn contains(&self, p: Point) -> bool {
        self.tiles.contains(&p)
    }

    pub fn most_recent(&self) -> Option<Point> {
        self.tiles.last().copied()
    }

    /// Most recent first
    pub fn iter_recent(&self) -> impl Iterator<Item = Point> + '_ {
        self.tiles.iter().rev().copied()
    }

    pub fn clear(&mut self) {
        self.tiles.clear();
    }
}

/// Find somewhere safe for a player standing at `current`.
///
/// Visited cells are tried newest first, then the 8 neighbours.
/// `None` only when none of them is floor.
pub fn find_safe_spot(grid: &Grid, current: Point, visited: &VisitedTiles) -> Option<Point> {
    if let Some(p) = visited
        .iter_recent()
        .find(|&p| p != current && grid.is_floor(p))
    {
        return Some(p);
    }

    NEIGHBORS_8
        .iter()
        .filter_map(|&(dx, dy)| current.offset(dx, dy))
        .find(|&p| grid.is_floor(p))
}
