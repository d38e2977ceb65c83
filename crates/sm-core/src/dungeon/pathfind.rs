//! A* corridor search
//!
//! Finds a 4-connected route between two cells over the interior of the
//! grid. Entering a wall costs 1 and entering a floor cell costs 3, so the
//! search prefers cutting fresh rock over wandering through open rooms.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::grid::Grid;
use super::point::{CARDINALS, Point};
use crate::consts::ASTAR_MAX_ITERATIONS;

pub const WALL_STEP_COST: usize = 1;
pub const FLOOR_STEP_COST: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenNode {
    f: usize,
    g: usize,
    idx: usize,
}

// Min-heap on f; among equal f, deeper nodes (larger g) first.
impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .cmp(&self.f)
            .then_with(|| self.g.cmp(&other.g))
            .then_with(|| other.idx.cmp(&self.idx))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Corridor pathfinder with an expansion cap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorridorPathfinder {
    max_iterations: usize,
}

impl Default for CorridorPathfinder {
    fn default() -> Self {
        Self::new(ASTAR_MAX_ITERATIONS)
    }
}

impl CorridorPathfinder {
    pub fn new(max_iterations: usize) -> Self {
        Self { max_iterations }
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Cost of stepping into `p` given the current grid
    pub fn step_cost(grid: &Grid, p: Point) -> usize {
        if grid.is_wall(p) {
            WALL_STEP_COST
        } else {
            FLOOR_STEP_COST
        }
    }

    /// Search from `start` to `goal`.
    ///
    /// Returns the whole route including both endpoints, or an empty vector
    /// when either endpoint is off the interior, no route exists, or the
    /// expansion cap runs out.
    pub fn find_path(&self, grid: &Grid, start: Point, goal: Point) -> Vec<Point> {
        if !grid.is_interior(start) || !grid.is_interior(goal) {
            return Vec::new();
        }
        if start == goal {
            return vec![start];
        }

        let size = grid.size();
        let index = |p: Point| p.y * size + p.x;
        let mut g_score = vec![usize::MAX; size * size];
        let mut parent: Vec<Option<usize>> = vec![None; size * size];
        let mut closed = vec![false; size * size];
        let mut open = BinaryHeap::new();

        g_score[index(start)] = 0;
        open.push(OpenNode {
            f: start.manhattan(goal),
            g: 0,
            idx: index(start),
        });

        let mut iterations = 0;
        while let Some(node) = open.pop() {
            if closed[node.idx] {
                continue;
            }
            if iterations >= self.max_iterations {
                log::warn!(
                    "corridor search {} -> {} gave up after {} expansions",
                    start,
                    goal,
                    iterations
                );
                return Vec::new();
            }
            iterations += 1;
            closed[node.idx] = true;

            let current = Point::new(node.idx % size, node.idx / size);
            if current == goal {
                return reconstruct(&parent, node.idx, size);
            }

            for (dx, dy) in CARDINALS {
                let Some(next) = current.offset(dx, dy) else {
                    continue;
                };
                if !grid.is_interior(next) {
                    continue;
                }
                let next_idx = index(next);
                if closed[next_idx] {
                    continue;
                }
                let tentative = node.g + Self::step_cost(grid, next);
                if tentative < g_score[next_idx] {
                    g_score[next_idx] = tentative;
                    parent[next_idx] = Some(node.idx);
                    open.push(OpenNode {
                        f: tentative + next.manhattan(goal),
                        g: tentative,
                        idx: next_idx,
                    });
                }
            }
        }

        Vec::new()
    }
}

fn reconstruct(parent: &[Option<usize>], goal_idx: usize, size: usize) -> Vec<Point> {
    let mut path = vec![Point::new(goal_idx % size, goal_idx / size)];
    let mut cur = goal_idx;
    while let Some(prev) = parent[cur] {
        path.push(Point::new(prev % size, prev / size));
        cur = prev;
    }
    path.reverse();
    path
}
