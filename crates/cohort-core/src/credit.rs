//! Direct-credit room: the waker admits on the waiter's behalf.
//!
//! Whoever releases a slot decides who gets in, performs the admission
//! itself and queues a grant for the chosen category. A woken waiter takes a
//! grant and proceeds without looking at the room again.
//!
//! # Fairness
//!
//! Weaker than [`Room`](crate::Room). There is no streak bound: arrivals of
//! the resident category hold back as soon as the other category has any
//! waiter, and the other category is let in, up to `capacity` at once, only
//! when the room empties. How long the resident category keeps the room
//! before that happens is unbounded. The streak is still maintained by
//! [`RoomState::admit`] but never consulted here.

use std::collections::VecDeque;

use parking_lot::{Condvar, Mutex};

use crate::{
    admission::Admission,
    category::Category,
    config::RoomConfig,
    recorder::{NoopRecorder, Recorder},
    state::{RoomSnapshot, RoomState},
};

#[derive(Debug)]
struct CreditState {
    room: RoomState,
    /// Sequence numbers of admissions made on behalf of waiters, not yet
    /// picked up.
    grants: [VecDeque<u64>; 2],
}

impl CreditState {
    fn admits(&self, category: Category) -> bool {
        let other_waiting = self.room.waiting(category.opposite()) > 0;
        self.room.is_empty()
            || (self.room.has_room() && self.room.is_resident(category) && !other_waiting)
    }
}

/// Room using pre-credited wakeups instead of re-checking.
pub struct CreditRoom<R = NoopRecorder> {
    state: Mutex<CreditState>,
    granted: [Condvar; 2],
    recorder: R,
}

impl CreditRoom<NoopRecorder> {
    /// Create an empty room with no statistics.
    pub fn new(config: RoomConfig) -> Self {
        Self::with_recorder(config, NoopRecorder)
    }
}

impl<R: Recorder> CreditRoom<R> {
    /// Create an empty room reporting admissions to `recorder`.
    pub fn with_recorder(config: RoomConfig, recorder: R) -> Self {
        Self {
            state: Mutex::new(CreditState {
                room: RoomState::new(config),
                grants: [VecDeque::new(), VecDeque::new()],
            }),
            granted: [Condvar::new(), Condvar::new()],
            recorder,
        }
    }

    /// Block until an actor of `category` is admitted.
    pub fn enter(&self, category: Category) -> Admission {
        let mut state = self.state.lock();
        if state.admits(category) {
            let sequence = state.room.admit(category);
            self.recorder.record_admission(category, state.room.occupants());
            return Admission::new(category, sequence);
        }

        state.room.register_waiter(category);
        // The admission already happened on our behalf; we only wait for the
        // grant. The queue makes spurious wakeups harmless.
        loop {
            if let Some(sequence) = state.grants[category.index()].pop_front() {
                return Admission::new(category, sequence);
            }
            self.granted[category.index()].wait(&mut state);
        }
    }

    /// Release the slot held by `admission`. Never blocks.
    pub fn leave(&self, admission: Admission) {
        self.release(admission.category());
    }

    /// Release one slot held by an actor of `category`.
    ///
    /// # Panics
    ///
    /// Traps if the room is empty or held by the other category.
    pub fn release(&self, category: Category) {
        let mut state = self.state.lock();
        state.room.vacate(category);

        let resident = category;
        let other = resident.opposite();
        if state.room.waiting(other) > 0 {
            if state.room.is_empty() {
                let batch = state.room.waiting(other).min(state.room.config().capacity());
                tracing::debug!(category = %other, batch, "room emptied, crediting waiters");
                for _ in 0..batch {
                    self.grant(&mut state, other);
                }
            }
        } else if state.room.waiting(resident) > 0 {
            self.grant(&mut state, resident);
        }
    }

    /// Current value of the admission counter.
    pub fn admissions(&self) -> u64 {
        self.state.lock().room.admissions()
    }

    /// Consistent copy of the observable state.
    ///
    /// Waiters already credited are no longer counted as waiting.
    pub fn snapshot(&self) -> RoomSnapshot {
        self.state.lock().room.snapshot()
    }

    /// Statistics recorder attached to this room.
    pub fn recorder(&self) -> &R {
        &self.recorder
    }

    fn grant(&self, state: &mut CreditState, category: Category) {
        state.room.unregister_waiter(category);
        let sequence = state.room.admit(category);
        self.recorder.record_admission(category, state.room.occupants());
        state.grants[category.index()].push_back(sequence);
        self.granted[category.index()].notify_one();
    }
}

impl<R> std::fmt::Debug for CreditRoom<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreditRoom").field("state", &*self.state.lock()).finish_non_exhaustive()
    }
}
