//! Core game constants
//!
//! These are the values the game ships with. Every one of them can be
//! overridden through [`crate::config`].

/// Side length of the square level grid
pub const GRID_SIZE: usize = 40;

/// Pixel size of one grid cell
pub const CELL_SIZE: u32 = 32;

/// BSP generation defaults
pub const MIN_ROOM_SIZE: usize = 3;
pub const MAX_ROOM_SIZE: usize = 12;
pub const MAX_SPLITS: u32 = 5;
pub const ROOM_PADDING: usize = 1;
pub const SPLIT_RANDOMNESS: f64 = 0.25;

/// Smallest grid the generator accepts (border ring plus a 3x3 interior)
pub const MIN_GRID_SIZE: usize = 5;

/// Process one wall change every 200ms of game time
pub const WALL_UPDATE_INTERVAL_MS: u64 = 200;

/// Fraction of open connections sealed by one removal batch
pub const REMOVAL_FRACTION_MIN: f64 = 0.3;
pub const REMOVAL_FRACTION_MAX: f64 = 0.6;

/// Start a new removal batch when fewer than this many openings are queued
pub const REMOVAL_BACKLOG: usize = 50;

/// A* safety valve
pub const ASTAR_MAX_ITERATIONS: usize = 1000;

/// Locked door limits
pub const MAX_LOCKED_DOORS: usize = 5;
pub const MIN_DOOR_SPACING: usize = 5;

/// Door cap for each level (index 0 = level 1)
pub const LOCKED_DOORS_PER_LEVEL: [usize; 9] = [0, 0, 2, 3, 4, 4, 4, 5, 5];

/// Number of levels in a run
pub const TOTAL_LEVELS: u32 = 9;

/// Exit transition length in milliseconds
pub const TRANSITION_DURATION_MS: u64 = 2500;

/// Attempts made when looking for a room pair that the pathfinder can join
pub const MAX_JOIN_ATTEMPTS: usize = 8;

/// Attempts made when rejection-sampling the exit cell
pub const MAX_EXIT_SAMPLES: usize = 100;

/// Items are kept this many cells away from room edges
pub const ITEM_EDGE_PADDING: usize = 2;

/// Story notes, one per level; the last level has none
pub const NOTE_COUNT: u32 = 9;

/// Bomb blast radius in cells (a 100px blast on 32px cells)
pub const BOMB_RADIUS: usize = 4;
