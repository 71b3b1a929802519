//! Statistics hook.
//!
//! The room reports admissions to a `Recorder` while still holding its lock,
//! so `occupants` is exact at the moment of entry. Implementations must be
//! cheap and must never call back into the room.

use std::sync::Arc;

use crate::category::Category;

/// Passive receiver of admission and waiting-time events.
pub trait Recorder: Send + Sync {
    /// An actor of `category` was admitted; `occupants` includes it.
    fn record_admission(&self, category: Category, occupants: usize);

    /// An actor waited for `ticks` other admissions before its own.
    ///
    /// Called by the driving loop, not by the room.
    fn record_wait(&self, ticks: u64) {
        let _ = ticks;
    }
}

/// Recorder that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRecorder;

impl Recorder for NoopRecorder {
    fn record_admission(&self, _category: Category, _occupants: usize) {}
}

impl<R: Recorder + ?Sized> Recorder for Arc<R> {
    fn record_admission(&self, category: Category, occupants: usize) {
        (**self).record_admission(category, occupants);
    }

    fn record_wait(&self, ticks: u64) {
        (**self).record_wait(ticks);
    }
}

impl<R: Recorder + ?Sized> Recorder for &R {
    fn record_admission(&self, category: Category, occupants: usize) {
        (**self).record_admission(category, occupants);
    }

    fn record_wait(&self, ticks: u64) {
        (**self).record_wait(ticks);
    }
}
