//! The live maze
//!
//! `MazeState` owns the mutable grid of the current level and everything
//! that rewires it: connections, wall queues and locked doors. Mutation is
//! throttled to one wall added and one wall removed per tick interval.

use crate::config::{ConfigError, EngineConfig};
use crate::consts::MAX_JOIN_ATTEMPTS;
use crate::dungeon::{CorridorPathfinder, Grid, LevelData, Point, Room, pos_to_room};
use crate::rng::GameRng;

use super::connections::{ConnectionKey, Connections};
use super::doors::{LockedDoor, LockedDoors};
use super::queues::WallQueues;

/// What one call to [`MazeState::tick`] did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// False when the tick interval had not yet elapsed
    pub ran: bool,
    pub walled: Option<Point>,
    pub opened: Option<Point>,
    pub door_placed: Option<LockedDoor>,
    pub doors_removed: Vec<LockedDoor>,
    /// A queue was consumed, so the grid should be redrawn
    pub redraw: bool,
}

/// What one pass of the driving loop did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriveOutcome {
    pub connections_removed: usize,
    pub connections_added: usize,
}

/// Cells opened and doors destroyed by a detonation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Detonation {
    pub opened: Vec<Point>,
    pub doors_destroyed: Vec<LockedDoor>,
}

#[derive(Debug, Clone)]
pub struct MazeState {
    config: EngineConfig,
    pathfinder: CorridorPathfinder,
    grid: Grid,
    room_tiles: Vec<Vec<bool>>,
    rooms: Vec<Room>,
    connections: Connections,
    queues: WallQueues,
    doors: LockedDoors,
    entrance: Point,
    exit: Point,
    last_update: Option<u64>,
}

impl MazeState {
    /// Take over a freshly generated level
    pub fn new(config: EngineConfig, level: &LevelData, door_cap: usize) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut state = Self {
            config,
            pathfinder: CorridorPathfinder::new(config.astar_max_iterations),
            grid: level.grid.clone(),
            room_tiles: Vec::new(),
            rooms: Vec::new(),
            connections: Connections::new(),
            queues: WallQueues::new(),
            doors: LockedDoors::new(door_cap, config.min_door_spacing),
            entrance: level.entrance(),
            exit: level.exit(),
            last_update: None,
        };
        state.reset(level, door_cap);
        Ok(state)
    }

    /// Discard everything about the previous level and load `level`
    pub fn reset(&mut self, level: &LevelData, door_cap: usize) {
        self.grid = level.grid.clone();
        self.room_tiles = level.room_tiles();
        self.rooms = level.rooms.clone();
        self.entrance = level.entrance();
        self.exit = level.exit();
        self.queues.clear();
        self.doors.reset(door_cap);
        self.last_update = None;

        self.connections.clear();
        for corridor in &level.corridors {
            self.connections.insert(
                ConnectionKey::new(corridor.room_a, corridor.room_b),
                corridor.path.clone(),
            );
        }

        log::debug!(
            "maze reset: {} rooms, {} connections, door cap {}",
            self.rooms.len(),
            self.connections.len(),
            door_cap
        );
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn entrance(&self) -> Point {
        self.entrance
    }

    pub fn exit(&self) -> Point {
        self.exit
    }

    pub fn connections(&self) -> &Connections {
        &self.connections
    }

    pub fn queues(&self) -> &WallQueues {
        &self.queues
    }

    pub fn doors(&self) -> &[LockedDoor] {
        self.doors.doors()
    }

    pub fn door_at(&self, p: Point) -> Option<&LockedDoor> {
        self.doors.door_at(p)
    }

    pub fn door_cap(&self) -> usize {
        self.doors.cap()
    }

    pub fn unlocked_doors(&self) -> usize {
        self.doors.unlocked()
    }

    pub fn is_room_tile(&self, p: Point) -> bool {
        self.room_tiles
            .get(p.y)
            .and_then(|row| row.get(p.x))
            .copied()
            .unwrap_or(false)
    }

    pub fn room_at(&self, p: Point) -> Option<usize> {
        pos_to_room(&self.rooms, p)
    }

    pub fn get_room_connection_count(&self, room: usize) -> usize {
        self.connections.count_for(room)
    }

    pub fn are_connected(&self, a: usize, b: usize) -> bool {
        self.connections.contains(ConnectionKey::new(a, b))
    }

    /// Route a corridor between rooms `a` and `b` and queue it for opening.
    ///
    /// Returns false (and changes nothing) when the rooms are the same,
    /// already connected, or the pathfinder found no route.
    pub fn connect_rooms(&mut self, a: usize, b: usize) -> bool {
        if a == b || a >= self.rooms.len() || b >= self.rooms.len() {
            return false;
        }
        let key = ConnectionKey::new(a, b);
        if self.connections.contains(key) {
            return false;
        }

        let path = self
            .pathfinder
            .find_path(&self.grid, self.rooms[a].center(), self.rooms[b].center());
        if path.is_empty() {
            log::debug!("no corridor found for {}", key);
            return false;
        }

        let mut queued = 0;
        for &p in &path {
            self.queues.cancel_add(p);
            if !self.is_room_tile(p) && self.grid.is_wall(p) && self.queues.push_remove(p) {
                queued += 1;
            }
        }
        log::debug!(
            "connecting {}: {} cells, {} queued to open",
            key,
            path.len(),
            queued
        );
        self.connections.insert(key, path);
        true
    }

    /// Close a random 30-60% (per config) of the open connections.
    ///
    /// Returns how many connections were dropped.
    pub fn remove_some_connections(&mut self, rng: &mut GameRng) -> usize {
        if self.connections.is_empty() {
            return 0;
        }

        let fraction = rng.frac_range(self.config.removal_fraction_min, self.config.removal_fraction_max);
        let count = (self.connections.len() as f64 * fraction).floor() as usize;
        if count == 0 {
            return 0;
        }

        let mut keys = self.connections.sorted_keys();
        rng.shuffle(&mut keys);
        keys.truncate(count);

        let closed: Vec<Vec<Point>> = keys
            .iter()
            .filter_map(|&key| self.connections.remove(key))
            .collect();

        let mut queued = 0;
        for &p in closed.iter().flatten() {
            if self.is_room_tile(p)
                || p == self.exit
                || p == self.entrance
                || self.connections.on_any_path(p)
            {
                continue;
            }
            // Still waiting to be opened: just forget it
            if self.queues.cancel_remove(p) && self.grid.is_wall(p) {
                continue;
            }
            if self.grid.is_floor(p) && self.queues.push_add(p) {
                queued += 1;
            }
        }

        log::debug!(
            "closing {} of {} connections, {} cells queued to wall",
            keys.len(),
            keys.len() + self.connections.len(),
            queued
        );
        keys.len()
    }

    /// Make sure every room is linked to the rest of the level.
    ///
    /// First every room without a connection is paired with a room that has
    /// fewer than two, taking the player's room and then the exit room
    /// before the others. Then any group of rooms still cut off from the
    /// player's room (or the exit room) is joined to it.
    ///
    /// Returns the number of connections made.
    pub fn connect_unconnected_rooms(&mut self, player: Point, rng: &mut GameRng) -> usize {
        let n = self.rooms.len();
        if n < 2 {
            return 0;
        }
        let player_room = self.room_at(player);
        let exit_room = self.room_at(self.exit);
        let mut added = 0;

        let mut pending: Vec<usize> = (0..n)
            .filter(|&r| self.get_room_connection_count(r) == 0)
            .collect();
        while !pending.is_empty() {
            let preferred = [player_room, exit_room]
                .into_iter()
                .flatten()
                .find_map(|r| pending.iter().position(|&q| q == r));
            let idx = preferred.unwrap_or_else(|| rng.rn2(pending.len()));
            let room = pending.remove(idx);
            if self.get_room_connection_count(room) > 0 {
                continue;
            }

            let candidates: Vec<usize> = (0..n)
                .filter(|&r| {
                    r != room && self.get_room_connection_count(r) < 2 && !self.are_connected(room, r)
                })
                .collect();
            let Some(&other) = rng.choose(&candidates) else {
                continue;
            };
            if self.connect_rooms(room, other) {
                added += 1;
            }
        }

        added + self.join_components(player_room.or(exit_room).unwrap_or(0), rng)
    }

    /// Join every connection-graph component to the one holding `anchor`
    fn join_components(&mut self, anchor: usize, rng: &mut GameRng) -> usize {
        let mut tracker = self.connections.components(self.rooms.len());
        if tracker.all_connected() {
            return 0;
        }

        let mut added = 0;
        for group in tracker.groups() {
            if group.contains(&anchor) {
                continue;
            }
            let anchor_group: Vec<usize> = (0..self.rooms.len())
                .filter(|&r| tracker.are_connected(r, anchor))
                .collect();
            if self.join_groups(&group, &anchor_group, rng) {
                tracker.merge(anchor, group[0]);
                added += 1;
            } else {
                log::warn!("could not connect rooms {:?} to the rest of the level", group);
            }
        }
        added
    }

    /// Try random pairs across two groups, then the closest pair
    fn join_groups(&mut self, from: &[usize], to: &[usize], rng: &mut GameRng) -> bool {
        for _ in 0..MAX_JOIN_ATTEMPTS {
            if let (Some(&a), Some(&b)) = (rng.choose(from), rng.choose(to)) {
                if self.connect_rooms(a, b) {
                    return true;
                }
            }
        }

        let closest = from
            .iter()
            .flat_map(|&a| to.iter().map(move |&b| (a, b)))
            .min_by_key(|&(a, b)| self.rooms[a].center().manhattan(self.rooms[b].center()));
        match closest {
            Some((a, b)) => self.connect_rooms(a, b),
            None => false,
        }
    }

    /// Apply at most one queued wall and one queued opening.
    ///
    /// Does nothing unless `tick_interval_ms` has passed since the last
    /// tick that ran. Openings on paths of the player's room go first.
    pub fn tick(&mut self, now_ms: u64, player: Point) -> TickOutcome {
        if let Some(last) = self.last_update {
            if now_ms.saturating_sub(last) < self.config.tick_interval_ms {
                return TickOutcome::default();
            }
        }
        self.last_update = Some(now_ms);

        let mut out = TickOutcome {
            ran: true,
            ..TickOutcome::default()
        };

        if let Some(p) = self.queues.pop_add() {
            out.redraw = true;
            // The exit and room tiles are never re-walled
            if p != self.exit && !self.is_room_tile(p) && self.grid.set_wall(p, true) {
                log::trace!("walled {}", p);
                out.walled = Some(p);
            }
        }

        let mut next = None;
        if let Some(room) = self.room_at(player) {
            for key in self.connections.keys_for(room) {
                let Some(path) = self.connections.path(key) else {
                    continue;
                };
                if let Some(p) = self.queues.take_remove_where(|q| path.contains(&q)) {
                    next = Some(p);
                    break;
                }
            }
        }
        if let Some(p) = next.or_else(|| self.queues.pop_remove()) {
            out.redraw = true;
            if self.grid.set_wall(p, false) {
                log::trace!("opened {}", p);
                out.opened = Some(p);
            }
            if self.grid.is_floor(p) {
                out.door_placed = self.doors.try_place(&self.grid, p);
            }
        }

        out.doors_removed = self.doors.revalidate(&self.grid);
        out
    }

    /// The periodic rewiring the frame loop runs after each tick
    pub fn drive(&mut self, player: Point, rng: &mut GameRng) -> DriveOutcome {
        let mut out = DriveOutcome::default();
        if self.queues.add_len() == 0 && self.queues.remove_len() < self.config.removal_backlog {
            out.connections_removed = self.remove_some_connections(rng);
        }
        if self.queues.remove_len() == 0 {
            out.connections_added = self.connect_unconnected_rooms(player, rng);
        }
        out
    }

    /// Blow open every wall within `radius` cells of `center`
    pub fn detonate(&mut self, center: Point, radius: usize) -> Detonation {
        let r = radius as i32;
        let r2 = radius * radius;
        let mut opened = Vec::new();
        for dy in -r..=r {
            for dx in -r..=r {
                let Some(p) = center.offset(dx, dy) else {
                    continue;
                };
                if p.distance_sq(center) <= r2 && self.grid.set_wall(p, false) {
                    opened.push(p);
                }
            }
        }
        let doors_destroyed = self.doors.destroy_near(center, radius);
        log::debug!(
            "detonation at {}: {} cells opened, {} doors destroyed",
            center,
            opened.len(),
            doors_destroyed.len()
        );
        Detonation {
            opened,
            doors_destroyed,
        }
    }

    /// Remove the door at `p`. The caller pays the key.
    pub fn unlock_door(&mut self, p: Point) -> Option<LockedDoor> {
        self.doors.unlock(p)
    }
}
