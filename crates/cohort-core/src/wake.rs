//! Wake decisions produced by a departure.
//!
//! [`RoomState::depart`](crate::RoomState::depart) never touches threads
//! itself. It returns a `WakeAction` and the caller decides how to deliver
//! it: [`Room`](crate::Room) maps it onto condition variables, the harness
//! model maps it onto its emulated wait queues.

use crate::category::Category;

/// Which waiters a departure should wake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeAction {
    /// Nobody is woken.
    None,

    /// Wake exactly one waiter of the resident category to top up a free
    /// slot.
    One(Category),

    /// The room just emptied and the opposite category gets its turn.
    /// Every woken waiter re-checks the admission predicate, so `count`
    /// is an upper bound, not a grant.
    Batch {
        /// Category whose waiters are woken.
        category: Category,
        /// Maximum number of waiters to wake (the room capacity).
        count: usize,
    },
}

impl WakeAction {
    /// Category targeted by this action, if any.
    pub fn category(&self) -> Option<Category> {
        match self {
            Self::None => None,
            Self::One(category) | Self::Batch { category, .. } => Some(*category),
        }
    }

    /// Number of wakeups to deliver.
    pub fn count(&self) -> usize {
        match self {
            Self::None => 0,
            Self::One(_) => 1,
            Self::Batch { count, .. } => *count,
        }
    }
}
