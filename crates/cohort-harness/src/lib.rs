//! Simulation driver, statistics and model checker for cohort rooms.
//!
//! Three ways to exercise a room:
//!
//! - [`Simulation`]: real threads hammering a [`Room`](cohort_core::Room) or
//!   [`CreditRoom`](cohort_core::CreditRoom), producing a [`Report`] with
//!   occupancy and waiting-time histograms.
//! - [`model`]: a step-by-step world over
//!   [`RoomState`](cohort_core::RoomState) for proptest and fuzzing.
//! - [`OccupancyTracker`]: an independent safety check threaded runs
//!   report as `violations`.
//!
//! ## Example
//!
//! ```rust
//! use cohort_harness::{Simulation, SimulationConfig};
//!
//! let config = SimulationConfig { actors: 4, iterations: 10, seed: Some(1), ..Default::default() };
//! let report = Simulation::new(config).run().unwrap();
//! assert_eq!(report.admissions, 40);
//! assert_eq!(report.violations, 0);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod assign;
mod error;
pub mod model;
mod report;
mod simulation;
mod stats;
mod tracker;

pub use assign::CategoryAssigner;
pub use error::SimulationError;
pub use report::{OccupancyCount, Report, WaitCount};
pub use simulation::{DEFAULT_ACTORS, DEFAULT_ITERATIONS, Simulation, SimulationConfig, Strategy};
pub use stats::{HistogramSnapshot, Histograms, MAX_WAITING_BUCKETS};
pub use tracker::OccupancyTracker;
