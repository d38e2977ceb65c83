//! A play session
//!
//! `DungeonSession` owns everything that lives for one run: the RNG, the
//! generator, the live maze, the player's visited history and inventory,
//! the items on the floor and the level transition. A front end calls
//! [`DungeonSession::tick`] once per frame with the game time and the
//! player's cell, and draws what the returned [`MutationResult`] reports.

use bitflags::bitflags;

use crate::config::{ConfigError, SessionConfig};
use crate::consts::BOMB_RADIUS;
use crate::dungeon::{CorridorPathfinder, LevelData, LevelGenerator, Point};
use crate::engine::{Detonation, LockedDoor, MazeState, VisitedTiles, find_safe_spot};
use crate::items::{Inventory, Item, ItemKind, spawn_items};
use crate::rng::GameRng;
use crate::transition::{LevelTransition, TransitionEvent, TransitionState};

bitflags! {
    /// What changed during one frame
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MutationFlags: u16 {
        const WALL_ADDED = 0x0001;
        const WALL_REMOVED = 0x0002;
        /// A wall queue was consumed
        const QUEUE_CHANGED = 0x0004;
        const DOOR_PLACED = 0x0008;
        const DOOR_REMOVED = 0x0010;
        const CONNECTIONS_CHANGED = 0x0020;
        const PLAYER_RESCUED = 0x0040;
        const TRANSITION_STARTED = 0x0080;
        const LEVEL_CHANGED = 0x0100;
        /// Exit of the last level reached
        const RUN_COMPLETE = 0x0200;
    }
}

impl MutationFlags {
    pub fn needs_redraw(self) -> bool {
        self.intersects(
            MutationFlags::WALL_ADDED
                | MutationFlags::WALL_REMOVED
                | MutationFlags::QUEUE_CHANGED
                | MutationFlags::DOOR_PLACED
                | MutationFlags::DOOR_REMOVED
                | MutationFlags::LEVEL_CHANGED,
        )
    }
}

/// Everything one frame changed
#[derive(Debug, Clone, PartialEq)]
pub struct MutationResult {
    pub flags: MutationFlags,
    pub walled: Vec<Point>,
    pub opened: Vec<Point>,
    pub doors_placed: Vec<LockedDoor>,
    pub doors_removed: Vec<LockedDoor>,
    /// Where a stranded player was moved to
    pub rescued_to: Option<Point>,
    /// Set on the frame a new level replaces the old one
    pub new_level: Option<LevelData>,
    /// The player's cell after this frame
    pub player: Point,
    pub transition: TransitionState,
}

impl MutationResult {
    fn new(player: Point) -> Self {
        Self {
            flags: MutationFlags::empty(),
            walled: Vec::new(),
            opened: Vec::new(),
            doors_placed: Vec::new(),
            doors_removed: Vec::new(),
            rescued_to: None,
            new_level: None,
            player,
            transition: TransitionState::Idle,
        }
    }

    pub fn needs_redraw(&self) -> bool {
        self.flags.needs_redraw()
    }
}

#[derive(Debug, Clone)]
pub struct DungeonSession {
    config: SessionConfig,
    rng: GameRng,
    generator: LevelGenerator,
    level_data: LevelData,
    state: MazeState,
    visited: VisitedTiles,
    inventory: Inventory,
    items: Vec<Item>,
    transition: LevelTransition,
    level: u32,
    last_frame: Option<u64>,
    finished: bool,
}

impl DungeonSession {
    /// Validate the config and generate the first level
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => GameRng::new(seed),
            None => GameRng::from_entropy(),
        };
        let generator = LevelGenerator::new(config.generator)?
            .with_pathfinder(CorridorPathfinder::new(config.engine.astar_max_iterations));
        let level_data = generator.generate_level(&mut rng);
        let state = MazeState::new(config.engine, &level_data, config.door_cap(1))?;

        log::debug!("session started with seed {}", rng.seed());

        let mut session = Self {
            transition: LevelTransition::new(config.transition_duration_ms),
            config,
            rng,
            generator,
            level_data,
            state,
            visited: VisitedTiles::new(),
            inventory: Inventory::new(),
            items: Vec::new(),
            level: 1,
            last_frame: None,
            finished: false,
        };
        session.start_level();
        Ok(session)
    }

    fn start_level(&mut self) {
        self.visited.clear();
        self.visited.record(self.level_data.entrance());
        self.items = spawn_items(
            &self.level_data.rooms,
            self.level_data.entrance_room(),
            self.level,
            &mut self.rng,
        );
    }

    /// Generate a fresh layout for the current level and wipe all maze
    /// state. Inventory and level number carry over.
    pub fn reset(&mut self) -> LevelData {
        self.level_data = self.generator.generate_level(&mut self.rng);
        self.state
            .reset(&self.level_data, self.config.door_cap(self.level));
        self.start_level();
        log::debug!(
            "level {} ready: {} rooms, entrance {}, exit {}",
            self.level,
            self.level_data.rooms.len(),
            self.level_data.entrance(),
            self.level_data.exit()
        );
        self.level_data.clone()
    }

    /// Move on to the next level
    pub fn advance_level(&mut self) -> LevelData {
        self.level += 1;
        self.reset()
    }

    /// Run one frame.
    ///
    /// In order: the transition step, the throttled wall change, the
    /// rewiring loop, the rescue of a player standing in a wall, and the
    /// visited history update. While a transition is playing the maze is
    /// left alone.
    pub fn tick(&mut self, now_ms: u64, player: Point) -> MutationResult {
        let dt = self
            .last_frame
            .map_or(0, |last| now_ms.saturating_sub(last));
        self.last_frame = Some(now_ms);
        let mut result = MutationResult::new(player);

        if self.transition.is_idle() {
            if player == self.state.exit() {
                if self.is_final_level() {
                    if !self.finished {
                        self.finished = true;
                        log::info!("exit of the final level reached");
                        result.flags |= MutationFlags::RUN_COMPLETE;
                    }
                } else {
                    self.transition.advance(TransitionEvent::ExitReached);
                    result.flags |= MutationFlags::TRANSITION_STARTED;
                }
            }
        } else {
            self.transition.advance(TransitionEvent::Elapsed(dt));
        }

        if self.transition.state() == TransitionState::Generating {
            let data = self.advance_level();
            self.transition.advance(TransitionEvent::LevelGenerated);
            self.transition.advance(TransitionEvent::ResetComplete);
            log::info!("entered level {}", self.level);
            result.player = data.entrance();
            result.new_level = Some(data);
            result.flags |= MutationFlags::LEVEL_CHANGED;
            result.transition = self.transition.state();
            return result;
        }

        result.transition = self.transition.state();
        if !self.transition.is_idle() {
            return result;
        }

        let tick = self.state.tick(now_ms, player);
        if tick.redraw {
            result.flags |= MutationFlags::QUEUE_CHANGED;
        }
        if let Some(p) = tick.walled {
            result.walled.push(p);
            result.flags |= MutationFlags::WALL_ADDED;
        }
        if let Some(p) = tick.opened {
            result.opened.push(p);
            result.flags |= MutationFlags::WALL_REMOVED;
        }
        if let Some(door) = tick.door_placed {
            result.doors_placed.push(door);
            result.flags |= MutationFlags::DOOR_PLACED;
        }
        if !tick.doors_removed.is_empty() {
            result.doors_removed = tick.doors_removed;
            result.flags |= MutationFlags::DOOR_REMOVED;
        }

        let drive = self.state.drive(player, &mut self.rng);
        if drive.connections_removed + drive.connections_added > 0 {
            result.flags |= MutationFlags::CONNECTIONS_CHANGED;
        }

        let mut pos = player;
        if self.state.grid().is_wall(player) {
            match find_safe_spot(self.state.grid(), player, &self.visited) {
                Some(safe) => {
                    log::debug!("player stranded at {}, moved to {}", player, safe);
                    pos = safe;
                    result.rescued_to = Some(safe);
                    result.flags |= MutationFlags::PLAYER_RESCUED;
                }
                None => log::warn!("player stranded at {} with nowhere safe to go", player),
            }
        }
        self.visited.record(pos);
        result.player = pos;
        result
    }

    /// [`Self::tick`] for a front end that tracks the player in pixels.
    ///
    /// A position outside the pixel space (negative or not finite) counts as
    /// the last visited cell.
    pub fn tick_pixels(&mut self, now_ms: u64, px: f32, py: f32) -> MutationResult {
        let player = Point::from_pixels(px, py, self.config.cell_size)
            .or_else(|| self.visited.most_recent())
            .unwrap_or_else(|| self.level_data.entrance());
        self.tick(now_ms, player)
    }

    /// Pixel centre of a cell, where a front end draws the player
    pub fn cell_center(&self, p: Point) -> (f32, f32) {
        p.to_pixel_center(self.config.cell_size)
    }

    /// Collect every item lying at `p`
    pub fn pick_up(&mut self, p: Point) -> Vec<ItemKind> {
        let mut taken = Vec::new();
        self.items.retain(|item| {
            if item.pos == p {
                taken.push(item.kind);
                false
            } else {
                true
            }
        });
        for &kind in &taken {
            self.inventory.add(kind, 1);
        }
        taken
    }

    /// Spend a key on the door at `p`. False if there is no door or no key.
    pub fn unlock_door(&mut self, p: Point) -> bool {
        if self.state.door_at(p).is_none() || !self.inventory.take(ItemKind::Key) {
            return false;
        }
        self.state.unlock_door(p).is_some()
    }

    /// Spend a bomb at `at`; `None` without a bomb
    pub fn use_bomb(&mut self, at: Point) -> Option<Detonation> {
        if !self.inventory.take(ItemKind::Bomb) {
            return None;
        }
        Some(self.state.detonate(at, BOMB_RADIUS))
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// 1-based level number
    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn is_final_level(&self) -> bool {
        self.level >= self.config.total_levels
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The level as generated; the live grid is in [`Self::state`]
    pub fn level_data(&self) -> &LevelData {
        &self.level_data
    }

    pub fn state(&self) -> &MazeState {
        &self.state
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }

    pub fn visited(&self) -> &VisitedTiles {
        &self.visited
    }

    pub fn transition_state(&self) -> TransitionState {
        self.transition.state()
    }

    /// ASCII view of the live maze with doors, items, entrance and exit
    pub fn render_ascii(&self, player: Option<Point>) -> String {
        let state = &self.state;
        state.grid().to_ascii(|p| {
            if Some(p) == player {
                Some('@')
            } else if p == state.exit() {
                Some('>')
            } else if p == state.entrance() {
                Some('<')
            } else if state.door_at(p).is_some() {
                Some('+')
            } else if let Some(item) = self.items.iter().find(|i| i.pos == p) {
                Some(match item.kind {
                    ItemKind::Battery => 'b',
                    ItemKind::Key => 'k',
                    ItemKind::Bomb => '*',
                    ItemKind::Camera => 'c',
                    ItemKind::Note => '?',
                })
            } else {
                None
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(seed: u64) -> SessionConfig {
        SessionConfig {
            seed: Some(seed),
            ..SessionConfig::default()
        }
    }

    #[test]
    fn test_new_session() {
        let session = DungeonSession::new(seeded(42)).unwrap();
        let entrance = session.level_data().entrance();

        assert_eq!(session.level(), 1);
        assert_eq!(session.seed(), 42);
        assert!(session.state().grid().is_floor(entrance));
        assert_eq!(session.visited().most_recent(), Some(entrance));
        assert_eq!(session.inventory().count(ItemKind::Battery), 1);
        assert_eq!(session.state().door_cap(), 0);

        let note = session
            .items()
            .iter()
            .find(|i| i.kind == ItemKind::Note)
            .unwrap();
        let start = session.level_data().entrance_room().unwrap();
        assert!(session.level_data().rooms[start].contains(note.pos));
    }

    #[test]
    fn test_invalid_config() {
        let mut config = seeded(1);
        config.generator.grid_size = 3;
        assert!(matches!(
            DungeonSession::new(config),
            Err(ConfigError::GridTooSmall { .. })
        ));
    }

    #[test]
    fn test_same_seed_same_level() {
        let a = DungeonSession::new(seeded(7)).unwrap();
        let b = DungeonSession::new(seeded(7)).unwrap();
        assert_eq!(a.level_data(), b.level_data());
        assert_eq!(a.items(), b.items());
    }

    #[test]
    fn test_grid_only_changes_on_interval() {
        let mut session = DungeonSession::new(seeded(42)).unwrap();
        let player = session.level_data().entrance();
        session.tick(1000, player);
        let before = session.state().grid().clone();
        for now in [1050, 1100, 1150, 1199] {
            let result = session.tick(now, player);
            assert!(result.walled.is_empty() && result.opened.is_empty());
        }
        assert_eq!(session.state().grid(), &before);
    }

    #[test]
    fn test_stranded_player_is_rescued() {
        let mut session = DungeonSession::new(seeded(42)).unwrap();
        let entrance = session.level_data().entrance();
        let result = session.tick(0, Point::new(0, 0));

        assert_eq!(result.rescued_to, Some(entrance));
        assert_eq!(result.player, entrance);
        assert!(result.flags.contains(MutationFlags::PLAYER_RESCUED));
        assert_eq!(session.visited().most_recent(), Some(entrance));
    }

    #[test]
    fn test_pixel_positions_use_cell_size() {
        let mut config = seeded(42);
        config.cell_size = 10;
        let mut session = DungeonSession::new(config).unwrap();
        let entrance = session.level_data().entrance();

        assert_eq!(session.cell_center(Point::new(3, 4)), (35.0, 45.0));

        let (px, py) = session.cell_center(entrance);
        let r = session.tick_pixels(0, px + 4.0, py - 4.0);
        assert_eq!(r.player, entrance);
        assert!(r.rescued_to.is_none());

        let r = session.tick_pixels(50, 5.0, 5.0);
        assert_eq!(r.rescued_to, Some(entrance));

        let r = session.tick_pixels(100, -1.0, f32::NAN);
        assert_eq!(r.player, entrance);
        assert!(r.rescued_to.is_none());
    }

    #[test]
    fn test_exit_starts_transition_then_new_level() {
        let mut session = DungeonSession::new(seeded(42)).unwrap();
        let exit = session.state().exit();

        let r = session.tick(0, exit);
        assert!(r.flags.contains(MutationFlags::TRANSITION_STARTED));
        assert_eq!(r.transition, TransitionState::Transitioning);

        let r = session.tick(1000, exit);
        assert!(r.new_level.is_none());
        assert_eq!(session.transition_state(), TransitionState::Transitioning);

        let r = session.tick(2600, exit);
        let data = r.new_level.as_ref().expect("level changed");
        assert!(r.flags.contains(MutationFlags::LEVEL_CHANGED));
        assert!(r.needs_redraw());
        assert_eq!(r.player, data.entrance());
        assert_eq!(session.level(), 2);
        assert_eq!(session.transition_state(), TransitionState::Idle);
        assert_eq!(session.state().door_cap(), 0);
        assert!(session.state().queues().is_empty());

        session.advance_level();
        assert_eq!(session.state().door_cap(), 2);
    }

    #[test]
    fn test_final_level_completes_run() {
        let mut config = seeded(42);
        config.total_levels = 1;
        let mut session = DungeonSession::new(config).unwrap();
        let exit = session.state().exit();

        let r = session.tick(0, exit);
        assert!(r.flags.contains(MutationFlags::RUN_COMPLETE));
        assert!(session.is_finished());
        assert_eq!(session.transition_state(), TransitionState::Idle);
        assert_eq!(session.level(), 1);

        let r = session.tick(100, exit);
        assert!(!r.flags.contains(MutationFlags::RUN_COMPLETE));
    }

    #[test]
    fn test_items_and_inventory() {
        let mut session = DungeonSession::new(seeded(42)).unwrap();
        let note = session
            .items()
            .iter()
            .find(|i| i.kind == ItemKind::Note)
            .copied()
            .unwrap();

        assert_eq!(session.pick_up(note.pos), vec![ItemKind::Note]);
        assert!(session.pick_up(note.pos).is_empty());
        assert_eq!(session.inventory().count(ItemKind::Note), 1);

        let entrance = session.level_data().entrance();
        assert!(session.use_bomb(entrance).is_none());
        session.inventory_mut().add(ItemKind::Bomb, 1);
        let blast = session.use_bomb(entrance).unwrap();
        assert!(blast.opened.iter().all(|&p| session.state().grid().is_floor(p)));
        assert_eq!(session.inventory().count(ItemKind::Bomb), 0);

        session.inventory_mut().add(ItemKind::Key, 1);
        assert!(!session.unlock_door(entrance));
        assert_eq!(session.inventory().count(ItemKind::Key), 1);
    }

    #[test]
    fn test_invariants_over_many_frames() {
        let mut session = DungeonSession::new(seeded(3)).unwrap();
        let exit = session.state().exit();
        let tiles = session.level_data().room_tiles();
        let size = session.state().grid().size();
        let mut player = session.level_data().entrance();

        for frame in 0..600u64 {
            let r = session.tick(frame * 50, player);
            player = r.player;
            let grid = session.state().grid();
            assert!(grid.is_floor(exit));
            let rows = grid.rows();
            for i in 0..size {
                assert!(rows[0][i] && rows[size - 1][i]);
                assert!(rows[i][0] && rows[i][size - 1]);
            }
            for (y, row) in tiles.iter().enumerate() {
                for (x, &tile) in row.iter().enumerate() {
                    if tile {
                        assert!(grid.is_floor(Point::new(x, y)));
                    }
                }
            }
        }
    }
}
