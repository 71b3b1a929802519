//! Monitor-style room: broadcast, then every woken waiter re-checks.
//!
//! ```text
//! enter(c)                               leave(admission)
//!   lock                                   lock
//!   loop                                   action = state.depart(c)
//!     admits(c)? ── yes ─► admit, record   deliver action on condvars
//!       │                  return          unlock
//!       no
//!     register_waiter(c)
//!     wait(can_enter[c])   (unlock/relock)
//!     unregister_waiter(c)
//! ```
//!
//! A wakeup is only a hint. Several waiters may be woken for fewer free
//! slots, and condition variables may wake spuriously, so the predicate is
//! evaluated again from scratch after every wait. This is the only strategy
//! that bounds how long one category can keep the other out.

use parking_lot::{Condvar, Mutex};

use crate::{
    admission::Admission,
    category::Category,
    config::RoomConfig,
    recorder::{NoopRecorder, Recorder},
    state::{RoomSnapshot, RoomState},
    wake::WakeAction,
};

/// Shared room guarded by one mutex, with one wait channel per category.
///
/// Share it between threads with `Arc<Room<R>>`.
pub struct Room<R = NoopRecorder> {
    state: Mutex<RoomState>,
    can_enter: [Condvar; 2],
    recorder: R,
}

impl Room<NoopRecorder> {
    /// Create an empty room with no statistics.
    pub fn new(config: RoomConfig) -> Self {
        Self::with_recorder(config, NoopRecorder)
    }
}

impl<R: Recorder> Room<R> {
    /// Create an empty room reporting admissions to `recorder`.
    pub fn with_recorder(config: RoomConfig, recorder: R) -> Self {
        Self {
            state: Mutex::new(RoomState::new(config)),
            can_enter: [Condvar::new(), Condvar::new()],
            recorder,
        }
    }

    /// Block until an actor of `category` is admitted.
    ///
    /// There is no timeout: a caller commits to waiting until a `leave`
    /// lets it in.
    pub fn enter(&self, category: Category) -> Admission {
        let mut state = self.state.lock();
        loop {
            if state.admits(category) {
                let sequence = state.admit(category);
                self.recorder.record_admission(category, state.occupants());
                return Admission::new(category, sequence);
            }

            state.register_waiter(category);
            self.can_enter[category.index()].wait(&mut state);
            state.unregister_waiter(category);
        }
    }

    /// Release the slot held by `admission`. Never blocks.
    pub fn leave(&self, admission: Admission) {
        self.release(admission.category());
    }

    /// Release one slot held by an actor of `category`.
    ///
    /// Prefer [`leave`](Self::leave) when an [`Admission`] is at hand; this
    /// form exists for callers that track occupancy themselves.
    ///
    /// # Panics
    ///
    /// Traps if the room is empty or held by the other category.
    pub fn release(&self, category: Category) {
        let mut state = self.state.lock();
        let action = state.depart(category);
        self.deliver(action);
    }

    /// Current value of the admission counter.
    pub fn admissions(&self) -> u64 {
        self.state.lock().admissions()
    }

    /// Consistent copy of the observable state.
    pub fn snapshot(&self) -> RoomSnapshot {
        self.state.lock().snapshot()
    }

    /// Configuration this room was built with.
    pub fn config(&self) -> RoomConfig {
        self.state.lock().config()
    }

    /// Statistics recorder attached to this room.
    pub fn recorder(&self) -> &R {
        &self.recorder
    }

    /// Called with the state lock held, so no waiter can miss a signal.
    fn deliver(&self, action: WakeAction) {
        match action {
            WakeAction::None => {},
            WakeAction::One(category) => {
                self.can_enter[category.index()].notify_one();
            },
            WakeAction::Batch { category, count } => {
                tracing::debug!(%category, count, "room emptied, handing over");
                let channel = &self.can_enter[category.index()];
                for _ in 0..count {
                    if !channel.notify_one() {
                        break;
                    }
                }
            },
        }
    }
}

impl<R> std::fmt::Debug for Room<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Room").field("state", &*self.state.lock()).finish_non_exhaustive()
    }
}
