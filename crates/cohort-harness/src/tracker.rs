//! Independent occupancy check for threaded runs.
//!
//! Actors bump the tracker right after `enter` returns and drop it right
//! before `leave`, so the tracked set is always a subset of the real
//! occupants. Anything the tracker flags is therefore a real violation.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use cohort_core::Category;

/// Per-category occupancy counters maintained outside the room lock.
#[derive(Debug)]
pub struct OccupancyTracker {
    capacity: usize,
    inside: [AtomicUsize; 2],
    peak: [AtomicUsize; 2],
    violations: AtomicU64,
}

impl OccupancyTracker {
    /// Tracker for a room of `capacity`.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inside: [AtomicUsize::new(0), AtomicUsize::new(0)],
            peak: [AtomicUsize::new(0), AtomicUsize::new(0)],
            violations: AtomicU64::new(0),
        }
    }

    /// An actor of `category` just got in.
    pub fn arrive(&self, category: Category) {
        let now = self.inside[category.index()].fetch_add(1, Ordering::SeqCst) + 1;
        let others = self.inside[category.opposite().index()].load(Ordering::SeqCst);
        self.peak[category.index()].fetch_max(now, Ordering::SeqCst);

        if others > 0 || now > self.capacity {
            self.violations.fetch_add(1, Ordering::SeqCst);
            tracing::error!(%category, now, others, capacity = self.capacity, "occupancy violation");
        }
    }

    /// An actor of `category` is about to leave.
    pub fn depart(&self, category: Category) {
        self.inside[category.index()].fetch_sub(1, Ordering::SeqCst);
    }

    /// Violations observed so far.
    pub fn violations(&self) -> u64 {
        self.violations.load(Ordering::SeqCst)
    }

    /// Highest simultaneous occupancy seen for `category`.
    pub fn peak(&self, category: Category) -> usize {
        self.peak[category.index()].load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_category_within_capacity_is_clean() {
        let tracker = OccupancyTracker::new(2);
        tracker.arrive(Category::A);
        tracker.arrive(Category::A);
        tracker.depart(Category::A);
        tracker.depart(Category::A);
        tracker.arrive(Category::B);

        assert_eq!(tracker.violations(), 0);
        assert_eq!(tracker.peak(Category::A), 2);
        assert_eq!(tracker.peak(Category::B), 1);
    }

    #[test]
    fn flags_mixed_occupancy() {
        let tracker = OccupancyTracker::new(3);
        tracker.arrive(Category::A);
        tracker.arrive(Category::B);
        assert_eq!(tracker.violations(), 1);
    }

    #[test]
    fn flags_over_capacity() {
        let tracker = OccupancyTracker::new(1);
        tracker.arrive(Category::B);
        tracker.arrive(Category::B);
        assert_eq!(tracker.violations(), 1);
    }
}
