//! End-of-run report.

use std::fmt;

use cohort_core::Category;
use serde::Serialize;

use crate::{simulation::Strategy, stats::HistogramSnapshot};

/// Admissions of one category that brought the room to `occupants`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OccupancyCount {
    /// Category admitted.
    pub category: Category,
    /// Occupants right after the admission.
    pub occupants: usize,
    /// How often this happened.
    pub count: u64,
}

/// Number of times an actor waited for `waited` other admissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WaitCount {
    /// Other admissions that happened while waiting.
    pub waited: u64,
    /// How often this happened.
    pub count: u64,
}

/// Summary of a finished simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Wake strategy the room used.
    pub strategy: Strategy,
    /// Seed the categories were drawn from.
    pub seed: u64,
    /// Room capacity.
    pub capacity: usize,
    /// Room fairness threshold.
    pub fairness_threshold: usize,
    /// Number of actors.
    pub actors: usize,
    /// Enter/leave rounds per actor.
    pub iterations: usize,
    /// Actors per category, indexed by [`Category::index`].
    pub actors_per_category: [usize; 2],
    /// One row per category and occupant count up to the smaller of
    /// capacity and actors, zero rows included.
    pub occupancy: Vec<OccupancyCount>,
    /// Non-zero waiting buckets, ascending.
    pub waiting: Vec<WaitCount>,
    /// Size of the waiting histogram.
    pub waiting_buckets: usize,
    /// Waits that did not fit in the histogram.
    pub waiting_overflow: u64,
    /// Admissions counted by the room.
    pub admissions: u64,
    /// Highest simultaneous occupancy seen per category.
    pub peak_occupancy: [usize; 2],
    /// Mixed-category or over-capacity observations (always zero for a
    /// correct room).
    pub violations: u64,
}

impl Report {
    pub(crate) fn occupancy_rows(histograms: &HistogramSnapshot) -> Vec<OccupancyCount> {
        Category::ALL
            .iter()
            .flat_map(|&category| {
                histograms.occupancy[category.index()].iter().enumerate().skip(1).map(
                    move |(occupants, &count)| OccupancyCount { category, occupants, count },
                )
            })
            .collect()
    }

    pub(crate) fn waiting_rows(histograms: &HistogramSnapshot) -> Vec<WaitCount> {
        histograms
            .waiting
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .map(|(waited, &count)| WaitCount { waited: waited as u64, count })
            .collect()
    }

    /// Total admissions according to the occupancy histogram.
    pub fn recorded_admissions(&self) -> u64 {
        self.occupancy.iter().map(|row| row.count).sum()
    }

    /// Total waits recorded, overflow included.
    pub fn recorded_waits(&self) -> u64 {
        self.waiting.iter().map(|row| row.count).sum::<u64>() + self.waiting_overflow
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Strategy {} with capacity {}, fairness threshold {}, seed {}",
            self.strategy, self.capacity, self.fairness_threshold, self.seed
        )?;
        writeln!(
            f,
            "{} actors ({} A, {} B), {} iterations each, {} admissions",
            self.actors,
            self.actors_per_category[Category::A.index()],
            self.actors_per_category[Category::B.index()],
            self.iterations,
            self.admissions
        )?;

        for row in &self.occupancy {
            let label = format!("{} {}", row.occupants, row.category);
            writeln!(f, "Times with {label:<6} {}", row.count)?;
        }

        writeln!(f, "Waiting histogram")?;
        for row in &self.waiting {
            let noun = if row.waited == 1 { "actor" } else { "actors" };
            writeln!(
                f,
                "  Number of times actors waited for {} {noun} to enter: {}",
                row.waited, row.count
            )?;
        }
        if self.waiting_overflow > 0 {
            writeln!(
                f,
                "  Number of times actors waited more than {} entries: {}",
                self.waiting_buckets, self.waiting_overflow
            )?;
        }
        if self.violations > 0 {
            writeln!(f, "Occupancy violations: {}", self.violations)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn histograms() -> HistogramSnapshot {
        HistogramSnapshot {
            occupancy: [vec![0, 4, 2], vec![0, 3, 0]],
            waiting: vec![5, 0, 2, 0],
            waiting_overflow: 1,
        }
    }

    #[test]
    fn occupancy_rows_skip_the_empty_bucket() {
        let rows = Report::occupancy_rows(&histograms());
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0], OccupancyCount { category: Category::A, occupants: 1, count: 4 });
        assert_eq!(rows[3], OccupancyCount { category: Category::B, occupants: 2, count: 0 });
    }

    #[test]
    fn waiting_rows_keep_non_zero_buckets() {
        let rows = Report::waiting_rows(&histograms());
        assert_eq!(rows, vec![WaitCount { waited: 0, count: 5 }, WaitCount { waited: 2, count: 2 }]);
    }

    #[test]
    fn display_lists_histograms() {
        let snapshot = histograms();
        let report = Report {
            strategy: Strategy::Monitor,
            seed: 7,
            capacity: 2,
            fairness_threshold: 4,
            actors: 2,
            iterations: 4,
            actors_per_category: [1, 1],
            occupancy: Report::occupancy_rows(&snapshot),
            waiting: Report::waiting_rows(&snapshot),
            waiting_buckets: 4,
            waiting_overflow: snapshot.waiting_overflow,
            admissions: 9,
            peak_occupancy: [2, 1],
            violations: 0,
        };

        let text = report.to_string();
        assert!(text.contains("Times with 2 A"));
        assert!(text.contains("waited for 2 actors to enter: 2"));
        assert!(text.contains("waited more than 4 entries: 1"));
        assert!(!text.contains("violations"));
        assert_eq!(report.recorded_admissions(), 9);
        assert_eq!(report.recorded_waits(), 8);
    }
}
