//! Room connection bookkeeping
//!
//! A connection is an unordered room pair with an open (or opening)
//! corridor. Each one owns the path that realises it.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::dungeon::Point;

/// Canonical unordered room pair, smaller index first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionKey {
    a: usize,
    b: usize,
}

impl ConnectionKey {
    pub fn new(i: usize, j: usize) -> Self {
        Self {
            a: i.min(j),
            b: i.max(j),
        }
    }

    pub fn rooms(&self) -> (usize, usize) {
        (self.a, self.b)
    }

    pub fn involves(&self, room: usize) -> bool {
        self.a == room || self.b == room
    }

    /// The room at the far end from `room`
    pub fn other(&self, room: usize) -> Option<usize> {
        if self.a == room {
            Some(self.b)
        } else if self.b == room {
            Some(self.a)
        } else {
            None
        }
    }
}

impl core::fmt::Display for ConnectionKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{},{}", self.a, self.b)
    }
}

/// Live connections and their paths
#[derive(Debug, Clone, Default)]
pub struct Connections {
    paths: HashMap<ConnectionKey, Vec<Point>>,
}

impl Connections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: ConnectionKey, path: Vec<Point>) {
        self.paths.insert(key, path);
    }

    pub fn remove(&mut self, key: ConnectionKey) -> Option<Vec<Point>> {
        self.paths.remove(&key)
    }

    pub fn contains(&self, key: ConnectionKey) -> bool {
        self.paths.contains_key(&key)
    }

    pub fn path(&self, key: ConnectionKey) -> Option<&[Point]> {
        self.paths.get(&key).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn clear(&mut self) {
        self.paths.clear();
    }

    /// Keys in ascending order, so iteration does not depend on hashing
    pub fn sorted_keys(&self) -> Vec<ConnectionKey> {
        let mut keys: Vec<ConnectionKey> = self.paths.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// Number of connections touching `room`
    pub fn count_for(&self, room: usize) -> usize {
        self.paths.keys().filter(|k| k.involves(room)).count()
    }

    /// Connections touching `room`, in key order
    pub fn keys_for(&self, room: usize) -> Vec<ConnectionKey> {
        let mut keys: Vec<ConnectionKey> =
            self.paths.keys().filter(|k| k.involves(room)).copied().collect();
        keys.sort_unstable();
        keys
    }

    /// Check if any live path runs through `p`
    pub fn on_any_path(&self, p: Point) -> bool {
        self.paths.values().any(|path| path.contains(&p))
    }

    /// Group rooms by reachability over the connection graph
    pub fn components(&self, num_rooms: usize) -> ConnectivityTracker {
        let mut tracker = ConnectivityTracker::new(num_rooms);
        for key in self.sorted_keys() {
            tracker.merge(key.a, key.b);
        }
        tracker
    }
}

/// Tracks which rooms are connected to each other
///
/// Every room carries a class label; merging relabels one whole class.
#[derive(Debug, Clone)]
pub struct ConnectivityTracker {
    class: Vec<usize>,
}

impl ConnectivityTracker {
    /// Create a new tracker where every room is alone
    pub fn new(num_rooms: usize) -> Self {
        Self {
            class: (0..num_rooms).collect(),
        }
    }

    pub fn class_of(&self, room: usize) -> Option<usize> {
        self.class.get(room).copied()
    }

    /// Check if two rooms are in the same class
    pub fn are_connected(&self, a: usize, b: usize) -> bool {
        match (self.class_of(a), self.class_of(b)) {
            (Some(ca), Some(cb)) => ca == cb,
            _ => false,
        }
    }

    /// Merge the classes of `a` and `b`
    pub fn merge(&mut self, a: usize, b: usize) {
        let (Some(keep), Some(old)) = (self.class_of(a), self.class_of(b)) else {
            return;
        };
        if keep == old {
            return;
        }
        for c in &mut self.class {
            if *c == old {
                *c = keep;
            }
        }
    }

    /// Check if all rooms are connected
    pub fn all_connected(&self) -> bool {
        self.class.windows(2).all(|w| w[0] == w[1])
    }

    /// Rooms grouped by class, groups ordered by their lowest room index
    pub fn groups(&self) -> Vec<Vec<usize>> {
        let mut groups: Vec<Vec<usize>> = Vec::new();
        let mut labels: Vec<usize> = Vec::new();
        for (room, &c) in self.class.iter().enumerate() {
            match labels.iter().position(|&l| l == c) {
                Some(i) => groups[i].push(room),
                None => {
                    labels.push(c);
                    groups.push(vec![room]);
                }
            }
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_canonical() {
        assert_eq!(ConnectionKey::new(4, 1), ConnectionKey::new(1, 4));
        assert_eq!(ConnectionKey::new(4, 1).to_string(), "1,4");
        assert_eq!(ConnectionKey::new(4, 1).other(4), Some(1));
        assert_eq!(ConnectionKey::new(4, 1).other(2), None);
    }

    #[test]
    fn test_counts_and_paths() {
        let mut conns = Connections::new();
        conns.insert(ConnectionKey::new(0, 1), vec![Point::new(1, 1), Point::new(2, 1)]);
        conns.insert(ConnectionKey::new(1, 2), vec![Point::new(3, 3)]);

        assert_eq!(conns.count_for(1), 2);
        assert_eq!(conns.count_for(0), 1);
        assert_eq!(conns.count_for(5), 0);
        assert!(conns.on_any_path(Point::new(2, 1)));
        assert!(!conns.on_any_path(Point::new(9, 9)));
        assert_eq!(
            conns.sorted_keys(),
            vec![ConnectionKey::new(0, 1), ConnectionKey::new(1, 2)]
        );

        assert!(conns.remove(ConnectionKey::new(1, 0)).is_some());
        assert_eq!(conns.count_for(1), 1);
    }

    #[test]
    fn test_connectivity_tracker() {
        let mut tracker = ConnectivityTracker::new(4);
        assert!(!tracker.all_connected());
        tracker.merge(0, 1);
        tracker.merge(2, 3);
        assert!(tracker.are_connected(0, 1));
        assert!(!tracker.are_connected(1, 2));
        assert_eq!(tracker.groups(), vec![vec![0, 1], vec![2, 3]]);
        tracker.merge(3, 0);
        assert!(tracker.all_connected());
        assert!(!tracker.are_connected(0, 9));
    }

    #[test]
    fn test_components_from_connections() {
        let mut conns = Connections::new();
        conns.insert(ConnectionKey::new(0, 2), vec![]);
        conns.insert(ConnectionKey::new(3, 4), vec![]);
        let groups = conns.components(5).groups();
        assert_eq!(groups, vec![vec![0, 2], vec![1], vec![3, 4]]);
    }
}
