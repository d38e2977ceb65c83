//! Simulated player
//!
//! Walks toward the exit along the shortest open route, spending keys on
//! doors in the way and a bomb when the exit is sealed off. With nowhere to
//! go it shuffles to a random open neighbour and waits for the maze to shift.

use std::collections::VecDeque;

use sm_core::dungeon::{CARDINALS, Point};
use sm_core::items::ItemKind;
use sm_core::{DungeonSession, GameRng};

pub struct Walker {
    rng: GameRng,
}

impl Walker {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: GameRng::new(seed),
        }
    }

    /// Take one step from `from` and return the new cell
    pub fn step(&mut self, session: &mut DungeonSession, from: Point) -> Point {
        let has_key = session.inventory().count(ItemKind::Key) > 0;
        let next = match route_step(session, from, has_key) {
            Some(next) => next,
            None => {
                if session.inventory().count(ItemKind::Bomb) > 0 {
                    if let Some(blast) = session.use_bomb(from) {
                        log::info!("bomb at {} opened {} cells", from, blast.opened.len());
                    }
                }
                match self.wander(session, from) {
                    Some(p) => p,
                    None => return from,
                }
            }
        };

        if session.state().door_at(next).is_some() && !session.unlock_door(next) {
            return from;
        }
        next
    }

    fn wander(&mut self, session: &DungeonSession, from: Point) -> Option<Point> {
        let open: Vec<Point> = CARDINALS
            .iter()
            .filter_map(|&(dx, dy)| from.offset(dx, dy))
            .filter(|&p| passable(session, p, false))
            .collect();
        self.rng.choose(&open).copied()
    }
}

fn passable(session: &DungeonSession, p: Point, has_key: bool) -> bool {
    let state = session.state();
    state.grid().is_floor(p) && (has_key || state.door_at(p).is_none())
}

/// First step of a shortest route to the exit, breadth first
fn route_step(session: &DungeonSession, from: Point, has_key: bool) -> Option<Point> {
    let grid = session.state().grid();
    let goal = session.state().exit();
    if from == goal || !grid.in_bounds(from) {
        return None;
    }

    let size = grid.size();
    let mut came_from: Vec<Option<Point>> = vec![None; size * size];
    let mut seen = vec![false; size * size];
    let mut queue = VecDeque::new();
    seen[from.y * size + from.x] = true;
    queue.push_back(from);

    while let Some(cur) = queue.pop_front() {
        if cur == goal {
            let mut step = cur;
            while let Some(prev) = came_from[step.y * size + step.x] {
                if prev == from {
                    return Some(step);
                }
                step = prev;
            }
            return None;
        }
        for &(dx, dy) in &CARDINALS {
            let Some(next) = cur.offset(dx, dy) else {
                continue;
            };
            if !grid.in_bounds(next) || seen[next.y * size + next.x] {
                continue;
            }
            if !passable(session, next, has_key) {
                continue;
            }
            seen[next.y * size + next.x] = true;
            came_from[next.y * size + next.x] = Some(cur);
            queue.push_back(next);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use sm_core::SessionConfig;

    fn session() -> DungeonSession {
        let mut config = SessionConfig {
            seed: Some(42),
            ..SessionConfig::default()
        };
        config.engine.astar_max_iterations = 40 * 40;
        DungeonSession::new(config).unwrap()
    }

    #[test]
    fn test_route_step_is_adjacent_floor() {
        let session = session();
        let start = session.level_data().entrance();
        let next = route_step(&session, start, false).unwrap();
        assert_eq!(start.manhattan(next), 1);
        assert!(session.state().grid().is_floor(next));
    }

    #[test]
    fn test_walker_reaches_exit_on_fresh_level() {
        let mut session = session();
        let mut walker = Walker::new(42);
        let exit = session.state().exit();
        let mut player = session.level_data().entrance();
        for _ in 0..40 * 40 {
            if player == exit {
                break;
            }
            player = walker.step(&mut session, player);
        }
        assert_eq!(player, exit);
    }

    #[test]
    fn test_no_step_from_exit() {
        let session = session();
        assert!(route_step(&session, session.state().exit(), false).is_none());
    }
}
