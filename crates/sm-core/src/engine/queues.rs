//! Pending wall changes
//!
//! Two FIFO queues: cells waiting to be re-walled and cells waiting to be
//! opened. A cell sits in at most one of them and at most once.

use std::collections::VecDeque;

use crate::dungeon::Point;

#[derive(Debug, Clone, Default)]
pub struct WallQueues {
    to_add: VecDeque<Point>,
    to_remove: VecDeque<Point>,
}

impl WallQueues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_len(&self) -> usize {
        self.to_add.len()
    }

    pub fn remove_len(&self) -> usize {
        self.to_remove.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    pub fn is_queued_for_add(&self, p: Point) -> bool {
        self.to_add.contains(&p)
    }

    pub fn is_queued_for_remove(&self, p: Point) -> bool {
        self.to_remove.contains(&p)
    }

    /// Queue a cell to be walled, cancelling any pending opening.
    /// Returns true if the cell was newly queued.
    pub fn push_add(&mut self, p: Point) -> bool {
        self.cancel_remove(p);
        if self.to_add.contains(&p) {
            return false;
        }
        self.to_add.push_back(p);
        true
    }

    /// Queue a cell to be opened, cancelling any pending closing.
    /// Returns true if the cell was newly queued.
    pub fn push_remove(&mut self, p: Point) -> bool {
        self.cancel_add(p);
        if self.to_remove.contains(&p) {
            return false;
        }
        self.to_remove.push_back(p);
        true
    }

    pub fn cancel_add(&mut self, p: Point) -> bool {
        let before = self.to_add.len();
        self.to_add.retain(|&q| q != p);
        self.to_add.len() != before
    }

    pub fn cancel_remove(&mut self, p: Point) -> bool {
        let before = self.to_remove.len();
        self.to_remove.retain(|&q| q != p);
        self.to_remove.len() != before
    }

    pub fn pop_add(&mut self) -> Option<Point> {
        self.to_add.pop_front()
    }

    pub fn pop_remove(&mut self) -> Option<Point> {
        self.to_remove.pop_front()
    }

    /// Take the earliest queued opening that satisfies `pred`
    pub fn take_remove_where(&mut self, pred: impl Fn(Point) -> bool) -> Option<Point> {
        let idx = self.to_remove.iter().position(|&p| pred(p))?;
        self.to_remove.remove(idx)
    }

    pub fn pending_adds(&self) -> impl Iterator<Item = Point> + '_ {
        self.to_add.iter().copied()
    }

    pub fn pending_removes(&self) -> impl Iterator<Item = Point> + '_ {
        self.to_remove.iter().copied()
    }

    pub fn clear(&mut self) {
        self.to_add.clear();
        self.to_remove.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut q = WallQueues::new();
        q.push_remove(Point::new(1, 1));
        q.push_remove(Point::new(2, 1));
        assert_eq!(q.pop_remove(), Some(Point::new(1, 1)));
        assert_eq!(q.pop_remove(), Some(Point::new(2, 1)));
        assert_eq!(q.pop_remove(), None);
    }

    #[test]
    fn test_no_duplicates() {
        let mut q = WallQueues::new();
        assert!(q.push_remove(Point::new(3, 3)));
        assert!(!q.push_remove(Point::new(3, 3)));
        assert_eq!(q.remove_len(), 1);
    }

    #[test]
    fn test_cell_in_one_queue_only() {
        let mut q = WallQueues::new();
        let p = Point::new(4, 4);
        q.push_remove(p);
        q.push_add(p);
        assert!(q.is_queued_for_add(p));
        assert!(!q.is_queued_for_remove(p));

        q.push_remove(p);
        assert!(!q.is_queued_for_add(p));
        assert!(q.is_queued_for_remove(p));
    }

    #[test]
    fn test_take_remove_where() {
        let mut q = WallQueues::new();
        for x in 1..=4 {
            q.push_remove(Point::new(x, 2));
        }
        assert_eq!(q.take_remove_where(|p| p.x >= 3), Some(Point::new(3, 2)));
        assert_eq!(q.take_remove_where(|p| p.x > 10), None);
        assert_eq!(
            q.pending_removes().collect::<Vec<_>>(),
            vec![Point::new(1, 2), Point::new(2, 2), Point::new(4, 2)]
        );
    }
}
