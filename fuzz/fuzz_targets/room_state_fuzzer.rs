//! Fuzz target for the room state machine, driven through the model world.
//!
//! # Strategy
//!
//! - Room shape: capacity and fairness threshold in `1..=8`
//! - Actors: up to 16, each with an arbitrary category
//! - Steps: arbitrary arrive/depart/resume/spurious-wake sequences, folded
//!   onto the existing actors
//!
//! # Invariants
//!
//! - Occupancy never exceeds capacity and never mixes categories
//! - Waiter counts match the actors that are blocked or woken
//! - Admission sequence numbers are consecutive
//! - The streak stays within the threshold while the other category waits
//! - Draining always ends with every actor outside
//! - Illegal steps are rejected without touching the room

#![no_main]

use arbitrary::Arbitrary;
use cohort_core::{Category, RoomConfig};
use cohort_harness::model::{ModelWorld, Operation};
use libfuzzer_sys::fuzz_target;

const MAX_ACTORS: usize = 16;

#[derive(Debug, Clone, Arbitrary)]
struct FuzzInput {
    capacity: u8,
    fairness_threshold: u8,
    /// One bit per actor; `true` is category B.
    categories: Vec<bool>,
    operations: Vec<Operation>,
}

fuzz_target!(|input: FuzzInput| {
    let capacity = usize::from(input.capacity % 8) + 1;
    let threshold = usize::from(input.fairness_threshold % 8) + 1;
    let Ok(config) = RoomConfig::new(capacity, threshold) else {
        return;
    };

    let categories: Vec<Category> =
        input.categories.iter().take(MAX_ACTORS).map(|&bit| Category::from_bit(bit)).collect();
    if categories.is_empty() {
        return;
    }

    let mut world = ModelWorld::new(config, &categories);
    let actors = world.num_actors();

    for op in input.operations {
        let op = op.retarget(actors);
        let before = world.state().clone();
        let result = world.apply(&op);

        if result.is_err() {
            assert_eq!(world.state(), &before, "rejected {op:?} changed the room");
        }
        if let Err(violation) = world.check() {
            panic!("{op:?} -> {result:?}: {violation}");
        }
    }

    if let Err(violation) = world.drain() {
        panic!("drain failed: {violation}");
    }
    if let Err(violation) = world.check_liveness() {
        panic!("{violation}");
    }
});
