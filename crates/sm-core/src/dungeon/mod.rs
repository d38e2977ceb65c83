//! Dungeon generation
//!
//! Grid, rooms, binary space partition, corridor pathfinding and the level
//! generator that ties them together.

mod bsp;
mod generator;
mod grid;
mod pathfind;
mod point;
mod rect;
mod room;

pub use bsp::BspNode;
pub use generator::{Corridor, LevelData, LevelGenerator, place_entrance_and_exit};
pub use grid::Grid;
pub use pathfind::{CorridorPathfinder, FLOOR_STEP_COST, WALL_STEP_COST};
pub use point::{CARDINALS, NEIGHBORS_8, Point};
pub use rect::{Rect, SplitAxis};
pub use room::{Room, pos_to_room};
