//! Collectible items
//!
//! Each level scatters a few items over its rooms according to a fixed
//! table: batteries from the first level, keys from the second, bombs from
//! the fourth, cameras from the sixth, and a story note in the starting room.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter};

use crate::consts::{ITEM_EDGE_PADDING, NOTE_COUNT};
use crate::dungeon::{Point, Room};
use crate::rng::GameRng;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumCount,
)]
#[repr(u8)]
pub enum ItemKind {
    Battery = 0,
    Key = 1,
    Bomb = 2,
    Camera = 3,
    Note = 4,
}

/// Where an item kind is placed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// In the room the player starts in
    StartRoom,
    /// One per room, each in a different room
    DistinctRooms,
}

/// How many of an item kind a level gets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnRule {
    /// First level (1-based) the item appears on
    pub from_level: u32,
    /// Last level is `until_level - 1`; `None` means no limit
    pub until_level: Option<u32>,
    pub min: usize,
    pub max: usize,
    pub placement: Placement,
}

impl SpawnRule {
    pub const fn applies_to(&self, level: u32) -> bool {
        if level < self.from_level {
            return false;
        }
        match self.until_level {
            Some(until) => level < until,
            None => true,
        }
    }
}

impl ItemKind {
    /// Spawn table
    pub const fn spawn_rule(self) -> SpawnRule {
        match self {
            ItemKind::Battery => SpawnRule {
                from_level: 1,
                until_level: None,
                min: 1,
                max: 3,
                placement: Placement::DistinctRooms,
            },
            ItemKind::Key => SpawnRule {
                from_level: 2,
                until_level: None,
                min: 1,
                max: 3,
                placement: Placement::DistinctRooms,
            },
            ItemKind::Bomb => SpawnRule {
                from_level: 4,
                until_level: None,
                min: 1,
                max: 3,
                placement: Placement::DistinctRooms,
            },
            ItemKind::Camera => SpawnRule {
                from_level: 6,
                until_level: None,
                min: 1,
                max: 2,
                placement: Placement::DistinctRooms,
            },
            ItemKind::Note => SpawnRule {
                from_level: 1,
                until_level: Some(NOTE_COUNT),
                min: 1,
                max: 1,
                placement: Placement::StartRoom,
            },
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// An item lying on the floor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub kind: ItemKind,
    pub pos: Point,
}

/// Place the items of one level.
///
/// The start-room note goes first; every other item takes a different
/// room from a shuffled list until the rooms run out.
pub fn spawn_items(
    rooms: &[Room],
    start_room: Option<usize>,
    level: u32,
    rng: &mut GameRng,
) -> Vec<Item> {
    let mut order: Vec<usize> = (0..rooms.len()).collect();
    rng.shuffle(&mut order);

    let mut items = Vec::new();
    let (start_kinds, spread_kinds): (Vec<ItemKind>, Vec<ItemKind>) =
        [ItemKind::Note, ItemKind::Battery, ItemKind::Key, ItemKind::Bomb, ItemKind::Camera]
            .into_iter()
            .filter(|kind| kind.spawn_rule().applies_to(level))
            .partition(|kind| kind.spawn_rule().placement == Placement::StartRoom);

    if let Some(start) = start_room.filter(|&r| r < rooms.len()) {
        for kind in start_kinds {
            items.push(Item {
                kind,
                pos: rooms[start].random_inner_point(ITEM_EDGE_PADDING, rng),
            });
        }
        order.retain(|&r| r != start);
    }

    for kind in spread_kinds {
        let rule = kind.spawn_rule();
        let count = rng.between(rule.min, rule.max);
        for _ in 0..count {
            let Some(room) = order.pop() else {
                break;
            };
            items.push(Item {
                kind,
                pos: rooms[room].random_inner_point(ITEM_EDGE_PADDING, rng),
            });
        }
    }

    log::debug!("level {}: spawned {} items", level, items.len());
    items
}

/// Item counts carried by the player across levels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    counts: [u32; ItemKind::COUNT],
}

impl Default for Inventory {
    /// The player starts with one spare battery
    fn default() -> Self {
        let mut inv = Self {
            counts: [0; ItemKind::COUNT],
        };
        inv.add(ItemKind::Battery, 1);
        inv
    }
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, kind: ItemKind) -> u32 {
        self.counts[kind.index()]
    }

    pub fn add(&mut self, kind: ItemKind, n: u32) {
        let slot = &mut self.counts[kind.index()];
        *slot = slot.saturating_add(n);
    }

    /// Use up one item; false if there was none
    pub fn take(&mut self, kind: ItemKind) -> bool {
        let slot = &mut self.counts[kind.index()];
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }
}
