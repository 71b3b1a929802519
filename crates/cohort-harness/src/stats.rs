//! Occupancy and waiting-time histograms.
//!
//! The room calls [`Recorder::record_admission`] under its own lock;
//! waiting times arrive from the actor threads. Both go through one
//! separate mutex so the histograms never contend with the room lock for
//! longer than an increment.

use cohort_core::{Category, Recorder};
use parking_lot::Mutex;

/// Largest waiting histogram ever allocated; longer waits overflow.
pub const MAX_WAITING_BUCKETS: usize = 1 << 16;

#[derive(Debug)]
struct Buckets {
    /// `occupancy[category][n]` counts admissions that brought the room to
    /// `n` occupants.
    occupancy: [Vec<u64>; 2],
    waiting: Vec<u64>,
    waiting_overflow: u64,
}

/// Histogram recorder shared by a room and its actors.
#[derive(Debug)]
pub struct Histograms {
    buckets: Mutex<Buckets>,
}

/// Copy of the histogram contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistogramSnapshot {
    /// Per category, indexed by occupant count (index 0 stays zero).
    pub occupancy: [Vec<u64>; 2],
    /// Indexed by the number of admissions waited for.
    pub waiting: Vec<u64>,
    /// Waits longer than the waiting histogram can hold.
    pub waiting_overflow: u64,
}

impl Histograms {
    /// Histograms for occupancies up to `max_occupancy`, with
    /// `waiting_buckets` distinct waiting times before overflow.
    ///
    /// `max_occupancy` should be the room capacity or the number of actors,
    /// whichever is smaller, since nothing else can be observed.
    /// `waiting_buckets` is clamped to [`MAX_WAITING_BUCKETS`].
    pub fn new(max_occupancy: usize, waiting_buckets: usize) -> Self {
        let occupancy_len = max_occupancy.saturating_add(1);
        Self {
            buckets: Mutex::new(Buckets {
                occupancy: [vec![0; occupancy_len], vec![0; occupancy_len]],
                waiting: vec![0; waiting_buckets.min(MAX_WAITING_BUCKETS)],
                waiting_overflow: 0,
            }),
        }
    }

    /// Distinct waiting times tracked before overflow.
    pub fn waiting_buckets(&self) -> usize {
        self.buckets.lock().waiting.len()
    }

    /// Admissions of `category` that brought the room to `occupants`.
    pub fn occupancy(&self, category: Category, occupants: usize) -> u64 {
        self.buckets.lock().occupancy[category.index()].get(occupants).copied().unwrap_or(0)
    }

    /// Times an actor waited for exactly `ticks` other admissions.
    pub fn waited(&self, ticks: u64) -> u64 {
        let buckets = self.buckets.lock();
        usize::try_from(ticks).ok().and_then(|i| buckets.waiting.get(i)).copied().unwrap_or(0)
    }

    /// Waits that did not fit in the histogram.
    pub fn waiting_overflow(&self) -> u64 {
        self.buckets.lock().waiting_overflow
    }

    /// Copy out everything recorded so far.
    pub fn snapshot(&self) -> HistogramSnapshot {
        let buckets = self.buckets.lock();
        HistogramSnapshot {
            occupancy: buckets.occupancy.clone(),
            waiting: buckets.waiting.clone(),
            waiting_overflow: buckets.waiting_overflow,
        }
    }
}

impl Recorder for Histograms {
    fn record_admission(&self, category: Category, occupants: usize) {
        let mut buckets = self.buckets.lock();
        if let Some(slot) = buckets.occupancy[category.index()].get_mut(occupants) {
            *slot += 1;
        } else {
            tracing::warn!(%category, occupants, "occupancy outside histogram range");
        }
    }

    fn record_wait(&self, ticks: u64) {
        let mut buckets = self.buckets.lock();
        let slot = usize::try_from(ticks).ok().filter(|&i| i < buckets.waiting.len());
        match slot {
            Some(i) => buckets.waiting[i] += 1,
            None => buckets.waiting_overflow += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_occupancy_per_category() {
        let histograms = Histograms::new(3, 10);
        histograms.record_admission(Category::A, 1);
        histograms.record_admission(Category::A, 2);
        histograms.record_admission(Category::A, 2);
        histograms.record_admission(Category::B, 3);

        assert_eq!(histograms.occupancy(Category::A, 1), 1);
        assert_eq!(histograms.occupancy(Category::A, 2), 2);
        assert_eq!(histograms.occupancy(Category::B, 3), 1);
        assert_eq!(histograms.occupancy(Category::B, 1), 0);
    }

    #[test]
    fn waits_past_the_end_overflow() {
        let histograms = Histograms::new(3, 4);
        histograms.record_wait(0);
        histograms.record_wait(3);
        histograms.record_wait(4);
        histograms.record_wait(u64::MAX);

        assert_eq!(histograms.waited(0), 1);
        assert_eq!(histograms.waited(3), 1);
        assert_eq!(histograms.waited(4), 0);
        assert_eq!(histograms.waiting_overflow(), 2);
    }

    #[test]
    fn waiting_histogram_is_clamped() {
        let histograms = Histograms::new(3, usize::MAX);
        assert_eq!(histograms.waiting_buckets(), MAX_WAITING_BUCKETS);

        histograms.record_wait(MAX_WAITING_BUCKETS as u64);
        assert_eq!(histograms.waiting_overflow(), 1);
    }

    #[test]
    fn out_of_range_occupancy_is_ignored() {
        let histograms = Histograms::new(2, 4);
        histograms.record_admission(Category::A, 5);
        assert_eq!(histograms.snapshot().occupancy[0].iter().sum::<u64>(), 0);
    }
}
