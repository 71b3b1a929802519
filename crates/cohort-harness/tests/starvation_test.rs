//! Fairness and handover scenarios replayed step by step in the model.

use std::collections::VecDeque;

use cohort_core::{Category, RoomConfig};
use cohort_harness::model::{ActorPhase, ModelWorld, Operation, OperationResult};

fn world(capacity: usize, threshold: usize, categories: &[Category]) -> ModelWorld {
    ModelWorld::new(RoomConfig::new(capacity, threshold).unwrap(), categories)
}

fn phase(world: &ModelWorld, actor: u8) -> ActorPhase {
    world.actor(actor).unwrap().phase()
}

fn admitted(result: &OperationResult) -> bool {
    matches!(result, OperationResult::Admitted { .. })
}

#[test]
fn blocked_waiter_enters_when_room_empties() {
    use Category::{A, B};
    let mut world = world(3, 4, &[A, A, A, B]);

    for actor in 0..3 {
        assert!(admitted(&world.apply(&Operation::Arrive { actor })));
    }
    assert_eq!(world.state().occupants(), 3);
    assert_eq!(world.apply(&Operation::Arrive { actor: 3 }), OperationResult::Blocked);

    assert_eq!(world.apply(&Operation::Depart { actor: 0 }), OperationResult::Departed { woken: 0 });
    assert_eq!(world.apply(&Operation::Depart { actor: 1 }), OperationResult::Departed { woken: 0 });
    assert_eq!(phase(&world, 3), ActorPhase::Waiting);
    assert_eq!(world.apply(&Operation::Depart { actor: 2 }), OperationResult::Departed { woken: 1 });

    assert!(admitted(&world.apply(&Operation::Resume { actor: 3 })));
    assert_eq!(world.state().occupants(), 1);
    assert_eq!(world.state().occupant_category(), Some(B));
    world.check().unwrap();
}

#[test]
fn same_category_joins_without_blocking() {
    use Category::A;
    let mut world = world(3, 4, &[A, A]);

    assert!(admitted(&world.apply(&Operation::Arrive { actor: 0 })));
    assert!(admitted(&world.apply(&Operation::Arrive { actor: 1 })));
    assert_eq!(world.state().occupants(), 2);
    world.check().unwrap();
}

#[test]
fn exhausted_streak_holds_back_resident_arrivals() {
    use Category::{A, B};
    let mut world = world(3, 2, &[A, B, A, A, A]);

    assert!(admitted(&world.apply(&Operation::Arrive { actor: 0 })));
    assert_eq!(world.apply(&Operation::Arrive { actor: 1 }), OperationResult::Blocked);
    assert!(admitted(&world.apply(&Operation::Arrive { actor: 2 })));
    assert!(admitted(&world.apply(&Operation::Arrive { actor: 3 })));
    assert_eq!(world.state().streak(), 2);

    // A slot frees up, but B has been waiting for the whole streak.
    world.apply(&Operation::Depart { actor: 0 });
    assert!(world.state().has_room());
    assert_eq!(world.apply(&Operation::Arrive { actor: 4 }), OperationResult::Blocked);

    world.apply(&Operation::Depart { actor: 2 });
    assert_eq!(world.apply(&Operation::Depart { actor: 3 }), OperationResult::Departed { woken: 1 });
    assert!(admitted(&world.apply(&Operation::Resume { actor: 1 })));
    assert_eq!(phase(&world, 4), ActorPhase::Waiting);
    world.check().unwrap();

    world.drain().unwrap();
    world.check_liveness().unwrap();
}

#[test]
fn resident_run_is_bounded_by_threshold_plus_capacity() {
    use Category::{A, B};
    let capacity = 3;
    let threshold = 4;

    let mut categories = vec![A; capacity];
    categories.push(B);
    categories.extend([A; 5]);
    let mut world = world(capacity, threshold, &categories);

    let mut inside: VecDeque<u8> = VecDeque::new();
    for actor in 0..3 {
        assert!(admitted(&world.apply(&Operation::Arrive { actor })));
        inside.push_back(actor);
    }
    let registered_at = world.state().admissions();
    assert_eq!(world.apply(&Operation::Arrive { actor: 3 }), OperationResult::Blocked);

    // Keep the room busy: each departure is followed by a fresh A arrival.
    let mut admitted_while_b_waits = 0;
    let mut held_back = None;
    for actor in 4..9 {
        let leaving = inside.pop_front().unwrap();
        assert_eq!(world.apply(&Operation::Depart { actor: leaving }), OperationResult::Departed {
            woken: 0
        });
        match world.apply(&Operation::Arrive { actor }) {
            OperationResult::Admitted { .. } => {
                admitted_while_b_waits += 1;
                inside.push_back(actor);
            },
            OperationResult::Blocked => {
                held_back = Some(actor);
                break;
            },
            other => panic!("unexpected {other:?}"),
        }
        world.check().unwrap();
    }
    assert_eq!(admitted_while_b_waits, threshold);
    assert_eq!(held_back, Some(8));

    while let Some(leaving) = inside.pop_front() {
        world.apply(&Operation::Depart { actor: leaving });
    }
    let OperationResult::Admitted { sequence } = world.apply(&Operation::Resume { actor: 3 })
    else {
        panic!("B was not admitted once the room emptied");
    };
    assert_eq!(phase(&world, 8), ActorPhase::Waiting);

    // Admissions B sat through: the resident run it was allowed to see.
    assert_eq!(sequence - registered_at - 1, threshold as u64);
    world.check().unwrap();

    world.drain().unwrap();
    world.check_liveness().unwrap();
}

#[test]
fn woken_waiter_that_loses_the_race_blocks_again() {
    use Category::{A, B};
    let mut world = world(1, 4, &[A, B, B]);

    assert!(admitted(&world.apply(&Operation::Arrive { actor: 0 })));
    assert_eq!(world.apply(&Operation::Arrive { actor: 1 }), OperationResult::Blocked);
    assert_eq!(world.apply(&Operation::Arrive { actor: 2 }), OperationResult::Blocked);

    // Capacity one: the batch wakes a single B.
    assert_eq!(world.apply(&Operation::Depart { actor: 0 }), OperationResult::Departed { woken: 1 });
    assert_eq!(phase(&world, 1), ActorPhase::Woken);
    assert_eq!(world.apply(&Operation::SpuriousWake { actor: 2 }), OperationResult::Woken);

    assert!(admitted(&world.apply(&Operation::Resume { actor: 2 })));
    assert_eq!(world.apply(&Operation::Resume { actor: 1 }), OperationResult::Blocked);
    world.check().unwrap();

    world.drain().unwrap();
    world.check_liveness().unwrap();
}
