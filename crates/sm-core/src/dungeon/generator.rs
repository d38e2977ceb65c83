//! Level generation
//!
//! Partition, carve rooms, join sibling subtrees with corridors, then pick
//! an entrance and exit far enough apart.

use serde::{Deserialize, Serialize};

use super::bsp::BspNode;
use super::grid::Grid;
use super::pathfind::CorridorPathfinder;
use super::point::Point;
use super::rect::Rect;
use super::room::{Room, pos_to_room};
use crate::config::{ConfigError, GeneratorConfig};
use crate::consts::{MAX_EXIT_SAMPLES, MAX_JOIN_ATTEMPTS};
use crate::rng::GameRng;

/// A corridor carved between two rooms at generation time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corridor {
    pub room_a: usize,
    pub room_b: usize,
    /// Full route from `room_a`'s centre to `room_b`'s centre
    pub path: Vec<Point>,
}

/// Everything the rest of the game needs from a freshly generated level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    pub grid: Grid,
    pub rooms: Vec<Room>,
    pub corridors: Vec<Corridor>,
    pub entrance_x: usize,
    pub entrance_y: usize,
    pub exit_x: usize,
    pub exit_y: usize,
}

impl LevelData {
    pub fn entrance(&self) -> Point {
        Point::new(self.entrance_x, self.entrance_y)
    }

    pub fn exit(&self) -> Point {
        Point::new(self.exit_x, self.exit_y)
    }

    pub fn entrance_room(&self) -> Option<usize> {
        pos_to_room(&self.rooms, self.entrance())
    }

    pub fn exit_room(&self) -> Option<usize> {
        pos_to_room(&self.rooms, self.exit())
    }

    /// Mask of cells that belong to some room, `[y][x]`
    pub fn room_tiles(&self) -> Vec<Vec<bool>> {
        let size = self.grid.size();
        let mut tiles = vec![vec![false; size]; size];
        for room in &self.rooms {
            for p in room.cells() {
                if p.x < size && p.y < size {
                    tiles[p.y][p.x] = true;
                }
            }
        }
        tiles
    }

    /// Render the level with `<` for the entrance and `>` for the exit
    pub fn to_ascii(&self) -> String {
        let (entrance, exit) = (self.entrance(), self.exit());
        self.grid.to_ascii(|p| {
            if p == exit {
                Some('>')
            } else if p == entrance {
                Some('<')
            } else {
                None
            }
        })
    }
}

/// BSP level generator
#[derive(Debug, Clone)]
pub struct LevelGenerator {
    config: GeneratorConfig,
    pathfinder: CorridorPathfinder,
}

impl LevelGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            pathfinder: CorridorPathfinder::default(),
        })
    }

    /// Replace the corridor pathfinder (to change its expansion cap)
    pub fn with_pathfinder(mut self, pathfinder: CorridorPathfinder) -> Self {
        self.pathfinder = pathfinder;
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn pathfinder(&self) -> &CorridorPathfinder {
        &self.pathfinder
    }

    /// Route a corridor between two room centres on the given grid.
    ///
    /// Empty when no route was found.
    pub fn connect_rooms(&self, grid: &Grid, a: &Room, b: &Room) -> Vec<Point> {
        self.pathfinder.find_path(grid, a.center(), b.center())
    }

    /// Build a complete level. Never fails: a partition with no usable leaf
    /// still yields a one-cell level.
    pub fn generate_level(&self, rng: &mut GameRng) -> LevelData {
        let size = self.config.grid_size;
        let mut grid = Grid::new(size);
        let mut rooms = Vec::new();

        let playable = Rect::new(1, 1, size - 2, size - 2);
        let mut tree = BspNode::build(playable, &self.config, rng);
        tree.carve_rooms(&mut grid, &mut rooms, &self.config, rng);

        if rooms.is_empty() {
            let centre = Point::new(size / 2, size / 2);
            grid.set_wall(centre, false);
            log::warn!("partition produced no rooms; carving a single cell at {}", centre);
            return LevelData {
                grid,
                rooms,
                corridors: Vec::new(),
                entrance_x: centre.x,
                entrance_y: centre.y,
                exit_x: centre.x,
                exit_y: centre.y,
            };
        }

        let mut corridors = Vec::new();
        self.join_subtrees(&tree, &mut grid, &rooms, &mut corridors, rng);

        let (entrance, exit) = place_entrance_and_exit(&mut grid, &rooms, rng);

        log::debug!(
            "generated {}x{} level: {} rooms, {} corridors, entrance {}, exit {}",
            size,
            size,
            rooms.len(),
            corridors.len(),
            entrance,
            exit
        );

        LevelData {
            grid,
            rooms,
            corridors,
            entrance_x: entrance.x,
            entrance_y: entrance.y,
            exit_x: exit.x,
            exit_y: exit.y,
        }
    }

    /// Join the two halves of every internal node, deepest first
    fn join_subtrees(
        &self,
        node: &BspNode,
        grid: &mut Grid,
        rooms: &[Room],
        corridors: &mut Vec<Corridor>,
        rng: &mut GameRng,
    ) {
        let Some((left, right)) = node.children() else {
            return;
        };
        self.join_subtrees(left, grid, rooms, corridors, rng);
        self.join_subtrees(right, grid, rooms, corridors, rng);

        let left_rooms = left.room_indices();
        let right_rooms = right.room_indices();
        if left_rooms.is_empty() || right_rooms.is_empty() {
            return;
        }

        let mut candidates = Vec::with_capacity(MAX_JOIN_ATTEMPTS + 1);
        for _ in 0..MAX_JOIN_ATTEMPTS {
            if let (Some(&a), Some(&b)) = (rng.choose(&left_rooms), rng.choose(&right_rooms)) {
                candidates.push((a, b));
            }
        }
        // Last resort: the closest pair across the cut
        if let Some(pair) = closest_pair(rooms, &left_rooms, &right_rooms) {
            candidates.push(pair);
        }

        for (a, b) in candidates {
            let path = self.connect_rooms(grid, &rooms[a], &rooms[b]);
            if path.is_empty() {
                continue;
            }
            for &p in &path {
                grid.set_wall(p, false);
            }
            log::trace!("seed corridor {}-{}: {} cells", a, b, path.len());
            corridors.push(Corridor {
                room_a: a,
                room_b: b,
                path,
            });
            return;
        }

        log::warn!(
            "could not join subtrees {:?} and {:?}",
            left.bounds,
            right.bounds
        );
    }
}

fn closest_pair(rooms: &[Room], left: &[usize], right: &[usize]) -> Option<(usize, usize)> {
    left.iter()
        .flat_map(|&a| right.iter().map(move |&b| (a, b)))
        .min_by_key(|&(a, b)| rooms[a].center().manhattan(rooms[b].center()))
}

/// Pick entrance and exit cells.
///
/// Rooms are shuffled and the first pair (in that order) whose centres are
/// at least half the grid apart wins; if none is, the first and last
/// shuffled rooms are used. The exit cell is forced to floor.
pub fn place_entrance_and_exit(grid: &mut Grid, rooms: &[Room], rng: &mut GameRng) -> (Point, Point) {
    let mut order: Vec<usize> = (0..rooms.len()).collect();
    rng.shuffle(&mut order);

    let threshold = grid.size() / 2;
    let mut chosen = None;
    'search: for i in 0..order.len() {
        for j in (i + 1)..order.len() {
            let (a, b) = (&rooms[order[i]], &rooms[order[j]]);
            if a.center().manhattan(b.center()) >= threshold {
                chosen = Some((order[i], order[j]));
                break 'search;
            }
        }
    }
    let (entrance_room, exit_room) = match (chosen, order.first(), order.last()) {
        (Some(pair), _, _) => pair,
        (None, Some(&first), Some(&last)) => (first, last),
        _ => {
            let centre = Point::new(grid.size() / 2, grid.size() / 2);
            grid.set_wall(centre, false);
            return (centre, centre);
        }
    };

    let entrance = rooms[entrance_room].random_point(rng);

    let exit_area = &rooms[exit_room];
    let mut exit = exit_area.random_point(rng);
    for _ in 0..MAX_EXIT_SAMPLES {
        if grid.is_floor(exit) {
            break;
        }
        exit = exit_area.random_point(rng);
    }
    grid.set_wall(exit, false);

    (entrance, exit)
}
