//! The wall grid
//!
//! A square matrix of booleans addressed `cells[row][col]`, `true` = wall.
//! The outer ring (row/col 0 and N-1) is always a wall, whatever is stored
//! there: reads report it as wall and writes to it are ignored.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::point::{CARDINALS, Point};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    size: usize,
    cells: Vec<Vec<bool>>,
}

impl Grid {
    /// Create a grid with every cell a wall
    pub fn new(size: usize) -> Self {
        Self::filled(size, true)
    }

    pub fn filled(size: usize, wall: bool) -> Self {
        Self {
            size,
            cells: vec![vec![wall; size]; size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn in_bounds(&self, p: Point) -> bool {
        p.x < self.size && p.y < self.size
    }

    /// Check if a cell is on the outer ring
    pub fn is_border(&self, p: Point) -> bool {
        p.x == 0 || p.y == 0 || p.x + 1 >= self.size || p.y + 1 >= self.size
    }

    /// Inside the grid and off the outer ring
    pub fn is_interior(&self, p: Point) -> bool {
        self.in_bounds(p) && !self.is_border(p)
    }

    /// Out-of-bounds and border cells count as walls
    pub fn is_wall(&self, p: Point) -> bool {
        !self.in_bounds(p) || self.is_border(p) || self.cells[p.y][p.x]
    }

    pub fn is_floor(&self, p: Point) -> bool {
        !self.is_wall(p)
    }

    /// Set a cell; border and out-of-bounds writes are ignored.
    /// Returns true if the stored value changed.
    pub fn set_wall(&mut self, p: Point, wall: bool) -> bool {
        if !self.is_interior(p) || self.cells[p.y][p.x] == wall {
            return false;
        }
        self.cells[p.y][p.x] = wall;
        true
    }

    /// Row-major view, `rows()[y][x]`
    pub fn rows(&self) -> &[Vec<bool>] {
        &self.cells
    }

    pub fn floor_count(&self) -> usize {
        self.points().filter(|&p| self.is_floor(p)).count()
    }

    /// Every cell position, row by row
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        (0..self.size).flat_map(move |y| (0..self.size).map(move |x| Point::new(x, y)))
    }

    /// Floor cells reachable from `start` by 4-directional moves
    pub fn flood_fill(&self, start: Point) -> Vec<Vec<bool>> {
        let mut visited = vec![vec![false; self.size]; self.size];
        if self.is_wall(start) {
            return visited;
        }

        let mut queue = VecDeque::new();
        visited[start.y][start.x] = true;
        queue.push_back(start);

        while let Some(p) = queue.pop_front() {
            for (dx, dy) in CARDINALS {
                let Some(n) = p.offset(dx, dy) else {
                    continue;
                };
                if self.is_floor(n) && !visited[n.y][n.x] {
                    visited[n.y][n.x] = true;
                    queue.push_back(n);
                }
            }
        }

        visited
    }

    /// Check if `to` can be walked to from `from` over floor cells
    pub fn is_reachable(&self, from: Point, to: Point) -> bool {
        if !self.in_bounds(to) {
            return false;
        }
        self.flood_fill(from)[to.y][to.x]
    }

    /// ASCII dump: `#` wall, `.` floor, with optional overlay characters
    pub fn to_ascii(&self, overlay: impl Fn(Point) -> Option<char>) -> String {
        let mut out = String::with_capacity(self.size * (self.size + 1));
        for y in 0..self.size {
            for x in 0..self.size {
                let p = Point::new(x, y);
                let c = overlay(p).unwrap_or(if self.is_wall(p) { '#' } else { '.' });
                out.push(c);
            }
            out.push('\n');
        }
        out
    }
}
