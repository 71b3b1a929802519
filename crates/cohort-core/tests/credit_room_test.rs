//! Threaded tests for the direct-credit room.

use std::{
    sync::{Arc, mpsc},
    thread,
    time::{Duration, Instant},
};

use cohort_core::{Category, CreditRoom, RoomConfig};

/// Helper: spin until `condition` holds, failing the test after a deadline.
fn wait_until(what: &str, condition: impl Fn() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while !condition() {
        assert!(Instant::now() < deadline, "timed out waiting for: {what}");
        thread::sleep(Duration::from_millis(1));
    }
}

fn room(capacity: usize) -> Arc<CreditRoom> {
    Arc::new(CreditRoom::new(RoomConfig::new(capacity, 4).unwrap()))
}

#[test]
fn waker_admits_other_category_before_it_runs() {
    let room = room(3);

    let inside: Vec<_> = (0..3).map(|_| room.enter(Category::A)).collect();
    let waiter = {
        let room = Arc::clone(&room);
        thread::spawn(move || room.enter(Category::B))
    };
    wait_until("B to block", || room.snapshot().waiting(Category::B) == 1);

    for admission in inside {
        room.leave(admission);
    }

    // The last leave admitted B itself; the state already shows it whether or
    // not the B thread has been scheduled.
    let snapshot = room.snapshot();
    assert_eq!(snapshot.occupants, 1);
    assert_eq!(snapshot.occupant_category, Some(Category::B));
    assert_eq!(snapshot.waiting(Category::B), 0);

    let admission = waiter.join().expect("B thread panicked");
    assert_eq!(admission.category(), Category::B);
    assert_eq!(admission.sequence(), 4);
    room.leave(admission);
}

#[test]
fn same_category_enters_without_blocking() {
    let room = room(3);
    let first = room.enter(Category::B);
    let second = room.enter(Category::B);
    assert_eq!(room.snapshot().occupants, 2);
    room.leave(first);
    room.leave(second);
}

#[test]
fn resident_arrivals_hold_back_once_other_category_waits() {
    let room = room(3);

    let a1 = room.enter(Category::A);
    let b = {
        let room = Arc::clone(&room);
        thread::spawn(move || room.enter(Category::B))
    };
    wait_until("B to block", || room.snapshot().waiting(Category::B) == 1);

    let a2 = {
        let room = Arc::clone(&room);
        thread::spawn(move || room.enter(Category::A))
    };
    wait_until("second A to block", || room.snapshot().waiting(Category::A) == 1);
    assert_eq!(room.snapshot().occupants, 1);

    room.leave(a1);
    let b = b.join().expect("B thread panicked");
    assert_eq!(room.snapshot().occupant_category, Some(Category::B));

    room.leave(b);
    let a2 = a2.join().expect("A thread panicked");
    assert_eq!(room.snapshot().occupant_category, Some(Category::A));
    room.leave(a2);
}

#[test]
fn batch_is_capped_at_capacity() {
    let room = room(2);
    let (tx, rx) = mpsc::channel();

    let holder = room.enter(Category::A);
    let waiters: Vec<_> = (0..3)
        .map(|_| {
            let room = Arc::clone(&room);
            let tx = tx.clone();
            thread::spawn(move || {
                let admission = room.enter(Category::B);
                tx.send(admission).expect("receiver dropped");
            })
        })
        .collect();
    wait_until("all B to block", || room.snapshot().waiting(Category::B) == 3);

    room.leave(holder);
    let snapshot = room.snapshot();
    assert_eq!(snapshot.occupants, 2);
    assert_eq!(snapshot.waiting(Category::B), 1);

    // Each B leave credits the next waiting B.
    for _ in 0..3 {
        let admission = rx.recv().expect("B thread hung up");
        room.leave(admission);
    }
    for handle in waiters {
        handle.join().expect("B thread panicked");
    }
    assert_eq!(room.snapshot().occupants, 0);
    assert_eq!(room.admissions(), 4);
}

#[test]
#[should_panic(expected = "leaving an empty room")]
fn leave_on_empty_room_traps() {
    let room = room(3);
    room.release(Category::B);
}
