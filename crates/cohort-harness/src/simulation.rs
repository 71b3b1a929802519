//! Threaded simulation driver.
//!
//! One OS thread per actor. Every actor repeatedly enters the room, stays
//! for a few scheduler yields, leaves, and yields again before the next
//! round. The same loop drives both wake strategies; only the closures
//! handed to [`drive`] differ.

use std::{fmt, sync::Arc, thread};

use cohort_core::{Admission, Category, CreditRoom, Recorder, Room, RoomConfig};
use serde::{Deserialize, Serialize};

use crate::{
    assign::CategoryAssigner,
    error::SimulationError,
    report::Report,
    stats::Histograms,
    tracker::OccupancyTracker,
};

/// Default number of actors.
pub const DEFAULT_ACTORS: usize = 20;

/// Default enter/leave rounds per actor.
pub const DEFAULT_ITERATIONS: usize = 100;

/// How a departure hands the room to waiters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Wake, then let every waiter re-check ([`Room`]).
    #[default]
    Monitor,
    /// Admit on the waiter's behalf before waking it ([`CreditRoom`]).
    Credit,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Monitor => f.write_str("monitor"),
            Self::Credit => f.write_str("credit"),
        }
    }
}

/// Parameters of one simulation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Room capacity and fairness threshold.
    pub room: RoomConfig,
    /// Number of actor threads.
    pub actors: usize,
    /// Enter/leave rounds per actor.
    pub iterations: usize,
    /// Category seed. A fresh one is drawn and logged when absent.
    pub seed: Option<u64>,
    /// Wake strategy.
    pub strategy: Strategy,
    /// Scheduler yields inside and outside the room. Defaults to the
    /// number of actors.
    pub yields: Option<usize>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            room: RoomConfig::default(),
            actors: DEFAULT_ACTORS,
            iterations: DEFAULT_ITERATIONS,
            seed: None,
            strategy: Strategy::default(),
            yields: None,
        }
    }
}

/// Everything an actor thread needs besides the room itself.
struct Plan<'a> {
    categories: &'a [Category],
    iterations: usize,
    yields: usize,
    histograms: &'a Histograms,
    tracker: &'a OccupancyTracker,
}

/// A configured simulation, ready to run.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimulationConfig,
}

impl Simulation {
    /// Simulation for `config`.
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    /// Use `room` instead of the configured room parameters.
    #[must_use]
    pub fn with_room(mut self, room: RoomConfig) -> Self {
        self.config.room = room;
        self
    }

    /// Use a fixed category seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Use `strategy` for waking waiters.
    #[must_use]
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    /// Configuration this simulation runs with.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Run every actor to completion and summarize.
    ///
    /// # Errors
    ///
    /// - [`SimulationError::InvalidParameter`] for zero actors or iterations
    /// - [`SimulationError::Spawn`] if an actor thread cannot be started
    /// - [`SimulationError::ActorPanicked`] if an actor hit a room trap
    pub fn run(&self) -> Result<Report, SimulationError> {
        let SimulationConfig { room, actors, iterations, seed, strategy, yields } =
            self.config.clone();

        if actors == 0 {
            return Err(SimulationError::InvalidParameter { name: "actors", value: actors });
        }
        if iterations == 0 {
            return Err(SimulationError::InvalidParameter { name: "iterations", value: iterations });
        }

        let mut assigner = seed.map_or_else(CategoryAssigner::from_entropy, CategoryAssigner::with_seed);
        let categories = assigner.assign(actors);
        let histograms = Arc::new(Histograms::new(
            room.capacity().min(actors),
            actors.saturating_mul(iterations),
        ));
        let waiting_buckets = histograms.waiting_buckets();
        let tracker = OccupancyTracker::new(room.capacity());

        tracing::info!(
            %strategy,
            seed = assigner.seed(),
            actors,
            iterations,
            capacity = room.capacity(),
            fairness_threshold = room.fairness_threshold(),
            "starting simulation"
        );

        let plan = Plan {
            categories: &categories,
            iterations,
            yields: yields.unwrap_or(actors),
            histograms: &histograms,
            tracker: &tracker,
        };

        let admissions = match strategy {
            Strategy::Monitor => {
                let shared = Room::with_recorder(room, Arc::clone(&histograms));
                drive(&plan, |c| shared.enter(c), |a| shared.leave(a), || shared.admissions())?;
                shared.admissions()
            },
            Strategy::Credit => {
                let shared = CreditRoom::with_recorder(room, Arc::clone(&histograms));
                drive(&plan, |c| shared.enter(c), |a| shared.leave(a), || shared.admissions())?;
                shared.admissions()
            },
        };

        let snapshot = histograms.snapshot();
        let mut actors_per_category = [0; 2];
        for category in &categories {
            actors_per_category[category.index()] += 1;
        }

        let report = Report {
            strategy,
            seed: assigner.seed(),
            capacity: room.capacity(),
            fairness_threshold: room.fairness_threshold(),
            actors,
            iterations,
            actors_per_category,
            occupancy: Report::occupancy_rows(&snapshot),
            waiting: Report::waiting_rows(&snapshot),
            waiting_buckets,
            waiting_overflow: snapshot.waiting_overflow,
            admissions,
            peak_occupancy: [tracker.peak(Category::A), tracker.peak(Category::B)],
            violations: tracker.violations(),
        };

        tracing::info!(admissions, violations = report.violations, "simulation finished");
        Ok(report)
    }
}

/// Spawn one scoped thread per actor and join them all.
///
/// Every started actor is joined even after a failure, so the room is
/// never dropped while a thread still uses it. An actor that panics while
/// inside hands its slot back through [`HeldSlot`], so the others keep
/// making progress and the panic is reported. A trap raised by `enter` or
/// `leave` themselves leaves the room state suspect and may still block
/// the remaining actors.
fn drive<E, L, N>(plan: &Plan<'_>, enter: E, leave: L, admissions: N) -> Result<(), SimulationError>
where
    E: Fn(Category) -> Admission + Sync,
    L: Fn(Admission) + Sync,
    N: Fn() -> u64 + Sync,
{
    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(plan.categories.len());
        let mut result = Ok(());

        for (actor, &category) in plan.categories.iter().enumerate() {
            let (enter, leave, admissions) = (&enter, &leave, &admissions);
            let spawned = thread::Builder::new()
                .name(format!("actor-{actor}"))
                .spawn_scoped(scope, move || {
                    run_actor(plan, actor, category, enter, leave, admissions);
                });

            match spawned {
                Ok(handle) => handles.push((actor, handle)),
                Err(source) => {
                    tracing::error!(actor, %source, "failed to spawn actor");
                    result = Err(SimulationError::Spawn { actor, source });
                    break;
                },
            }
        }

        for (actor, handle) in handles {
            if handle.join().is_err() {
                tracing::error!(actor, "actor panicked");
                if result.is_ok() {
                    result = Err(SimulationError::ActorPanicked { actor });
                }
            }
        }
        result
    })
}

fn run_actor<E, L, N>(
    plan: &Plan<'_>,
    actor: usize,
    category: Category,
    enter: &E,
    leave: &L,
    admissions: &N,
) where
    E: Fn(Category) -> Admission,
    L: Fn(Admission),
    N: Fn() -> u64,
{
    tracing::debug!(actor, %category, "actor started");

    for _ in 0..plan.iterations {
        let start = admissions();
        let admission = enter(category);
        let waited = admission.waited_since(start);
        let slot = HeldSlot::new(admission, leave);
        plan.histograms.record_wait(waited);

        plan.tracker.arrive(category);
        pause(plan.yields);
        plan.tracker.depart(category);

        slot.release();
        pause(plan.yields);
    }

    tracing::debug!(actor, "actor finished");
}

/// Slot held by a running actor. Dropping it without [`release`] (an
/// unwinding actor) still hands the admission back.
///
/// [`release`]: HeldSlot::release
struct HeldSlot<'a, L: Fn(Admission)> {
    admission: Option<Admission>,
    leave: &'a L,
}

impl<'a, L: Fn(Admission)> HeldSlot<'a, L> {
    fn new(admission: Admission, leave: &'a L) -> Self {
        Self { admission: Some(admission), leave }
    }

    fn release(mut self) {
        if let Some(admission) = self.admission.take() {
            (self.leave)(admission);
        }
    }
}

impl<L: Fn(Admission)> Drop for HeldSlot<'_, L> {
    fn drop(&mut self) {
        // Taken before calling `leave`, so a trap inside `leave` is never
        // retried here.
        if let Some(admission) = self.admission.take() {
            tracing::warn!(category = %admission.category(), "releasing slot of an unwinding actor");
            (self.leave)(admission);
        }
    }
}

fn pause(yields: usize) {
    for _ in 0..yields {
        thread::yield_now();
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{self, AssertUnwindSafe};

    use super::*;

    #[test]
    fn defaults_match_the_classic_run() {
        let config = SimulationConfig::default();
        assert_eq!(config.actors, 20);
        assert_eq!(config.iterations, 100);
        assert_eq!(config.room, RoomConfig::default());
        assert_eq!(config.strategy, Strategy::Monitor);
    }

    #[test]
    fn builders_override_config() {
        let room = RoomConfig::new(5, 2).unwrap();
        let simulation = Simulation::new(SimulationConfig::default())
            .with_room(room)
            .with_seed(11)
            .with_strategy(Strategy::Credit);

        assert_eq!(simulation.config().room, room);
        assert_eq!(simulation.config().seed, Some(11));
        assert_eq!(simulation.config().strategy, Strategy::Credit);
    }

    #[test]
    fn slot_is_handed_back_when_holder_panics() {
        let room = Room::new(RoomConfig::new(1, 4).unwrap());
        let leave = |admission: Admission| room.leave(admission);

        let unwound = panic::catch_unwind(AssertUnwindSafe(|| {
            let _slot = HeldSlot::new(room.enter(Category::A), &leave);
            panic!("actor failed while inside");
        }));

        assert!(unwound.is_err());
        assert_eq!(room.snapshot().occupants, 0);
        let next = room.enter(Category::B);
        room.leave(next);
        assert_eq!(room.admissions(), 2);
    }

    #[test]
    fn released_slot_leaves_exactly_once() {
        let room = Room::new(RoomConfig::new(2, 4).unwrap());
        let leave = |admission: Admission| room.leave(admission);

        let slot = HeldSlot::new(room.enter(Category::A), &leave);
        assert_eq!(room.snapshot().occupants, 1);
        slot.release();
        assert_eq!(room.snapshot().occupants, 0);
    }

    #[test]
    fn strategy_displays_lowercase() {
        assert_eq!(Strategy::Monitor.to_string(), "monitor");
        assert_eq!(Strategy::Credit.to_string(), "credit");
    }
}
