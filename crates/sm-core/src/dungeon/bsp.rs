//! Binary space partition of the playable area
//!
//! The root spans everything inside the border ring. Each node is cut along
//! its longer side at an offset drawn from a band around the midpoint, until
//! `max_splits` levels deep or until a cut would leave a child too small to
//! hold a padded room. Each leaf then receives at most one room.

use super::grid::Grid;
use super::rect::Rect;
use super::room::Room;
use crate::config::GeneratorConfig;
use crate::rng::GameRng;

/// One node of the partition tree
#[derive(Debug, Clone)]
pub struct BspNode {
    pub bounds: Rect,
    pub depth: u32,
    /// Index into the level's room list, leaves only
    pub room: Option<usize>,
    children: Option<Box<(BspNode, BspNode)>>,
}

impl BspNode {
    pub fn leaf(bounds: Rect, depth: u32) -> Self {
        Self {
            bounds,
            depth,
            room: None,
            children: None,
        }
    }

    /// Partition `bounds` recursively
    pub fn build(bounds: Rect, config: &GeneratorConfig, rng: &mut GameRng) -> Self {
        let mut root = Self::leaf(bounds, 0);
        root.split(config, rng);
        root
    }

    fn split(&mut self, config: &GeneratorConfig, rng: &mut GameRng) {
        if self.depth >= config.max_splits {
            return;
        }

        let axis = self.bounds.preferred_axis();
        let Some(offset) = split_offset(self.bounds.extent(axis), config, rng) else {
            return;
        };
        let Some((a, b)) = self.bounds.split(axis, offset) else {
            return;
        };

        let mut left = Self::leaf(a, self.depth + 1);
        let mut right = Self::leaf(b, self.depth + 1);
        left.split(config, rng);
        right.split(config, rng);
        self.children = Some(Box::new((left, right)));
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    pub fn children(&self) -> Option<(&BspNode, &BspNode)> {
        self.children.as_deref().map(|(l, r)| (l, r))
    }

    /// Leaves in left-to-right order
    pub fn leaves(&self) -> Vec<&BspNode> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a BspNode>) {
        match self.children() {
            Some((l, r)) => {
                l.collect_leaves(out);
                r.collect_leaves(out);
            }
            None => out.push(self),
        }
    }

    /// Indices of every room carved below this node
    pub fn room_indices(&self) -> Vec<usize> {
        self.leaves().iter().filter_map(|leaf| leaf.room).collect()
    }

    /// Carve one room into every leaf that can hold one.
    ///
    /// Rooms are appended to `rooms` and their cells set to floor.
    pub fn carve_rooms(
        &mut self,
        grid: &mut Grid,
        rooms: &mut Vec<Room>,
        config: &GeneratorConfig,
        rng: &mut GameRng,
    ) {
        if let Some(children) = self.children.as_deref_mut() {
            children.0.carve_rooms(grid, rooms, config, rng);
            children.1.carve_rooms(grid, rooms, config, rng);
            return;
        }

        let Some(room) = room_for_leaf(self.bounds, config, rng) else {
            log::trace!("leaf {:?} too small for a room", self.bounds);
            return;
        };
        for p in room.cells() {
            grid.set_wall(p, false);
        }
        self.room = Some(rooms.len());
        rooms.push(room);
    }
}

/// Smallest extent a child may have: a minimum room plus padding both sides
fn min_child_extent(config: &GeneratorConfig) -> usize {
    config.min_room_size + 2 * config.room_padding
}

/// Pick the cut position along an extent, or `None` if it is too short.
///
/// Randomness 0 always cuts at the midpoint; 1 allows anything that leaves
/// both children at least the minimum extent. That minimum is
/// `min_room_size + 2 * room_padding` rather than bare `min_room_size`, so
/// every child can still hold a padded room; the full band is therefore
/// `[min_child, extent - min_child]`, and recursion stops once an extent is
/// below `2 * min_child`.
fn split_offset(extent: usize, config: &GeneratorConfig, rng: &mut GameRng) -> Option<usize> {
    let min_child = min_child_extent(config);
    if extent < 2 * min_child {
        return None;
    }

    let lo = min_child;
    let hi = extent - min_child;
    let mid = extent / 2;
    let r = config.split_randomness;
    let band_lo = mid - ((mid - lo) as f64 * r).floor() as usize;
    let band_hi = mid + ((hi - mid) as f64 * r).floor() as usize;
    Some(rng.between(band_lo, band_hi))
}

/// Size and centre a room inside a leaf, or `None` if the padded leaf is
/// below the minimum room size.
fn room_for_leaf(leaf: Rect, config: &GeneratorConfig, rng: &mut GameRng) -> Option<Room> {
    let avail = leaf.inset(config.room_padding);
    if avail.width < config.min_room_size || avail.height < config.min_room_size {
        return None;
    }

    let width = sized_extent(avail.width, config, rng);
    let height = sized_extent(avail.height, config, rng);
    Some(Room::new(
        avail.x + (avail.width - width) / 2,
        avail.y + (avail.height - height) / 2,
        width,
        height,
    ))
}

/// Room extent along one axis: the largest that fits the padded leaf (capped
/// at `max_room_size`), shrunk by up to `split_randomness` of the slack above
/// `min_room_size`. Sizing down from the fit, instead of growing past it,
/// keeps every room inside its leaf.
fn sized_extent(avail: usize, config: &GeneratorConfig, rng: &mut GameRng) -> usize {
    let fit = avail.min(config.max_room_size).max(config.min_room_size);
    let slack = ((fit - config.min_room_size) as f64 * config.split_randomness).floor() as usize;
    fit - rng.between(0, slack)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> GeneratorConfig {
        GeneratorConfig {
            grid_size: 10,
            min_room_size: 2,
            max_room_size: 4,
            max_splits: 2,
            room_padding: 1,
            split_randomness: 0.0,
        }
    }

    #[test]
    fn test_midpoint_splits_without_randomness() {
        let mut rng = GameRng::new(42);
        let tree = BspNode::build(Rect::new(1, 1, 8, 8), &small_config(), &mut rng);

        let leaves: Vec<Rect> = tree.leaves().iter().map(|n| n.bounds).collect();
        assert_eq!(
            leaves,
            vec![
                Rect::new(1, 1, 4, 4),
                Rect::new(5, 1, 4, 4),
                Rect::new(1, 5, 4, 4),
                Rect::new(5, 5, 4, 4),
            ]
        );
        assert!(tree.leaves().iter().all(|n| n.depth == 2));
    }

    #[test]
    fn test_leaves_tile_the_root() {
        let config = GeneratorConfig::default();
        for seed in 0..20 {
            let mut rng = GameRng::new(seed);
            let root = Rect::new(1, 1, 38, 38);
            let tree = BspNode::build(root, &config, &mut rng);
            let leaves = tree.leaves();

            let total: usize = leaves.iter().map(|n| n.bounds.area()).sum();
            assert_eq!(total, root.area());
            for (i, a) in leaves.iter().enumerate() {
                assert!(root.contains(&a.bounds));
                assert!(a.bounds.width >= min_child_extent(&config));
                assert!(a.bounds.height >= min_child_extent(&config));
                for b in &leaves[i + 1..] {
                    assert!(!a.bounds.intersects(&b.bounds));
                }
            }
        }
    }

    #[test]
    fn test_split_stops_when_too_small() {
        let mut rng = GameRng::new(42);
        let tree = BspNode::build(Rect::new(1, 1, 7, 7), &small_config(), &mut rng);
        assert!(tree.is_leaf());
        assert_eq!(tree.leaves().len(), 1);
    }

    #[test]
    fn test_carved_rooms_stay_in_padded_leaf() {
        let config = GeneratorConfig::default();
        let mut rng = GameRng::new(42);
        let mut grid = Grid::new(config.grid_size);
        let mut rooms = Vec::new();
        let mut tree = BspNode::build(Rect::new(1, 1, 38, 38), &config, &mut rng);
        tree.carve_rooms(&mut grid, &mut rooms, &config, &mut rng);

        assert!(!rooms.is_empty());
        for leaf in tree.leaves() {
            let Some(idx) = leaf.room else { continue };
            let room = rooms[idx];
            assert!(leaf.bounds.inset(config.room_padding).contains(&room.rect()));
            assert!(room.width >= config.min_room_size && room.width <= config.max_room_size);
            assert!(room.height >= config.min_room_size && room.height <= config.max_room_size);
            assert!(room.cells().all(|p| grid.is_floor(p)));
        }
        assert_eq!(tree.room_indices().len(), rooms.len());
    }

    #[test]
    fn test_split_band_keeps_padded_children() {
        let config = GeneratorConfig {
            split_randomness: 1.0,
            ..small_config()
        };
        let mut rng = GameRng::new(42);
        // min_child = 2 + 2 * 1
        assert_eq!(split_offset(7, &config, &mut rng), None);
        assert_eq!(split_offset(8, &config, &mut rng), Some(4));
        for _ in 0..200 {
            let cut = split_offset(20, &config, &mut rng).unwrap();
            assert!((4..=16).contains(&cut));
        }
    }

    #[test]
    fn test_room_extent_shrinks_from_fit() {
        let mut config = small_config();
        let mut rng = GameRng::new(42);
        assert_eq!(sized_extent(10, &config, &mut rng), 4);

        config.split_randomness = 1.0;
        for _ in 0..100 {
            let extent = sized_extent(10, &config, &mut rng);
            assert!((2..=4).contains(&extent));
        }
    }

    #[test]
    fn test_zero_randomness_fills_leaf() {
        let config = small_config();
        let mut rng = GameRng::new(42);
        let room = room_for_leaf(Rect::new(1, 1, 4, 4), &config, &mut rng).unwrap();
        assert_eq!(room, Room::new(2, 2, 2, 2));
        assert!(room_for_leaf(Rect::new(1, 1, 3, 4), &config, &mut rng).is_none());
    }
}
