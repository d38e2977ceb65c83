//! sm-core: Core logic for Shifting Maze
//!
//! This crate contains the procedural dungeon generator and the live
//! corridor-mutation engine. It has no rendering, input or audio code; a
//! front end drives it through [`DungeonSession`] and draws what it reports.
//!
//! The only I/O is optional configuration loading (see [`config`]).

pub mod config;
pub mod dungeon;
pub mod engine;
pub mod items;
pub mod session;
pub mod transition;

mod consts;
mod rng;

pub use config::{ConfigError, EngineConfig, GeneratorConfig, SessionConfig};
pub use consts::*;
pub use dungeon::{LevelData, LevelGenerator, Point};
pub use engine::MazeState;
pub use items::{Inventory, ItemKind};
pub use rng::GameRng;
pub use session::{DungeonSession, MutationFlags, MutationResult};
pub use transition::{LevelTransition, TransitionState};
