//! Corridor mutation engine
//!
//! Keeps a generated level shifting while it is played: corridors are
//! sealed and reopened a cell at a time, locked doors appear on new
//! chokepoints, and every room stays reachable.

mod connections;
mod doors;
mod queues;
mod safety;
mod state;

pub use connections::{ConnectionKey, Connections, ConnectivityTracker};
pub use doors::{DoorId, LockedDoor, LockedDoors, is_chokepoint};
pub use queues::WallQueues;
pub use safety::{VisitedTiles, find_safe_spot};
pub use state::{Detonation, DriveOutcome, MazeState, TickOutcome};
