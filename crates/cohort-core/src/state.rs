//! Shared room state and its transitions.
//!
//! `RoomState` is the whole protocol minus the blocking. Every transition is
//! a plain method that mutates the state and returns data; nothing here
//! sleeps or signals. [`Room`](crate::Room) wraps it in a mutex and executes
//! the returned [`WakeAction`]s, while the harness model drives it one step
//! at a time.
//!
//! # Invariants
//!
//! - `0 <= occupants <= capacity`
//! - Every current occupant was admitted with `occupant_category`
//! - The streak only grows on a same-category admission into an occupied
//!   room and resets on any other admission
//! - `admissions` grows by exactly one per admission
//! - While the other category waits, the streak never exceeds the fairness
//!   threshold, as long as every admission is gated by [`RoomState::admits`]
//!   (see [`RoomState::fairness_violation`])
//!
//! Breaking one of the first four is a bug in the caller or in this module, so the
//! transitions trap with `assert!` instead of returning errors.

use serde::Serialize;

use crate::{category::Category, config::RoomConfig, wake::WakeAction};

/// Occupancy counters, waiter counts and fairness bookkeeping for one room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomState {
    config: RoomConfig,
    occupants: usize,
    /// Retained after the room empties; the departure decision reads it.
    occupant_category: Category,
    waiters: [usize; 2],
    streak: usize,
    admissions: u64,
}

/// Point-in-time copy of the observable room state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoomSnapshot {
    /// Actors currently inside.
    pub occupants: usize,
    /// Category of the current occupants, `None` when empty.
    pub occupant_category: Option<Category>,
    /// Blocked actors per category, indexed by [`Category::index`].
    pub waiters: [usize; 2],
    /// Current fairness streak.
    pub streak: usize,
    /// Total admissions so far.
    pub admissions: u64,
}

impl RoomSnapshot {
    /// Blocked actors of `category`.
    pub fn waiting(&self, category: Category) -> usize {
        self.waiters[category.index()]
    }
}

impl RoomState {
    /// Create an empty room.
    pub fn new(config: RoomConfig) -> Self {
        Self {
            config,
            occupants: 0,
            occupant_category: Category::A,
            waiters: [0; 2],
            streak: 0,
            admissions: 0,
        }
    }

    /// Configuration this room was built with.
    pub fn config(&self) -> RoomConfig {
        self.config
    }

    /// Actors currently inside.
    pub fn occupants(&self) -> usize {
        self.occupants
    }

    /// Category of the current occupants, `None` when the room is empty.
    pub fn occupant_category(&self) -> Option<Category> {
        (self.occupants > 0).then_some(self.occupant_category)
    }

    /// Registered waiters of `category`.
    pub fn waiting(&self, category: Category) -> usize {
        self.waiters[category.index()]
    }

    /// Consecutive same-category admissions since the last switch.
    pub fn streak(&self) -> usize {
        self.streak
    }

    /// Total admissions so far.
    pub fn admissions(&self) -> u64 {
        self.admissions
    }

    /// Copy out the observable fields.
    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            occupants: self.occupants,
            occupant_category: self.occupant_category(),
            waiters: self.waiters,
            streak: self.streak,
            admissions: self.admissions,
        }
    }

    /// Whether the room is empty.
    pub fn is_empty(&self) -> bool {
        self.occupants == 0
    }

    /// Whether a slot is free.
    pub fn has_room(&self) -> bool {
        self.occupants < self.config.capacity()
    }

    /// Whether `category` is the category currently inside.
    pub fn is_resident(&self, category: Category) -> bool {
        self.occupants > 0 && self.occupant_category == category
    }

    /// Whether the streak has reached the fairness threshold.
    pub fn streak_exhausted(&self) -> bool {
        self.streak >= self.config.fairness_threshold()
    }

    /// Admission predicate: may `category` enter right now?
    ///
    /// An empty room always admits. An occupied room admits its own category
    /// while capacity remains, unless the other category is waiting and the
    /// streak has reached the threshold, in which case arrivals hold back so
    /// the other side gets the room once it empties.
    pub fn admits(&self, category: Category) -> bool {
        let other_waiting = self.waiting(category.opposite()) > 0;
        let opponents_turn = other_waiting && self.streak_exhausted();

        self.is_empty() || (self.has_room() && self.is_resident(category) && !opponents_turn)
    }

    /// Admit one actor of `category` and return its admission sequence
    /// number (the counter value after the increment).
    ///
    /// # Panics
    ///
    /// Traps if the room is full or occupied by the other category.
    pub fn admit(&mut self, category: Category) -> u64 {
        assert!(
            self.is_empty() || self.occupant_category == category,
            "admitting {category} into a room occupied by {}",
            self.occupant_category
        );
        assert!(
            self.has_room(),
            "admitting {category} into a full room ({} occupants)",
            self.occupants
        );

        if self.is_resident(category) {
            self.streak += 1;
        } else {
            self.streak = 0;
        }

        self.occupant_category = category;
        self.occupants += 1;
        self.admissions += 1;

        tracing::trace!(
            %category,
            occupants = self.occupants,
            streak = self.streak,
            sequence = self.admissions,
            "admitted"
        );

        self.debug_check();
        self.admissions
    }

    /// Register a blocked actor of `category`.
    ///
    /// The first waiter of the non-resident category resets the streak, so
    /// it is not penalized for admissions that happened before it arrived.
    pub fn register_waiter(&mut self, category: Category) {
        if category != self.occupant_category && self.waiting(category) == 0 {
            self.streak = 0;
        }
        self.waiters[category.index()] += 1;

        tracing::trace!(
            %category,
            waiting = self.waiting(category),
            streak = self.streak,
            "waiting to enter"
        );
    }

    /// Remove a previously registered waiter of `category`.
    ///
    /// # Panics
    ///
    /// Traps if no waiter of `category` is registered.
    pub fn unregister_waiter(&mut self, category: Category) {
        let waiting = &mut self.waiters[category.index()];
        assert!(*waiting > 0, "unregistering a {category} waiter that was never registered");
        *waiting -= 1;
    }

    /// Release one slot held by `category` without deciding who to wake.
    ///
    /// # Panics
    ///
    /// Traps if the room is empty or occupied by the other category.
    pub fn vacate(&mut self, category: Category) {
        assert!(self.occupants > 0, "{category} leaving an empty room without a matching admission");
        assert!(
            self.occupant_category == category,
            "{category} leaving a room occupied by {}",
            self.occupant_category
        );

        self.occupants -= 1;
        self.debug_check();
    }

    /// Release one slot held by `category` and decide who to wake.
    ///
    /// The other category is only woken once the room is fully vacated, and
    /// only when fairness demands it or the resident category has nobody
    /// waiting. Otherwise one resident waiter is woken to take the free
    /// slot.
    ///
    /// # Panics
    ///
    /// Traps on the same misuse as [`vacate`](Self::vacate).
    pub fn depart(&mut self, category: Category) -> WakeAction {
        self.vacate(category);

        let resident = self.occupant_category;
        let other = resident.opposite();
        let other_waiting = self.waiting(other) > 0;
        let resident_waiting = self.waiting(resident) > 0;

        let action = if other_waiting && (self.streak_exhausted() || !resident_waiting) {
            if self.is_empty() {
                WakeAction::Batch { category: other, count: self.config.capacity() }
            } else {
                WakeAction::None
            }
        } else if resident_waiting {
            WakeAction::One(resident)
        } else {
            WakeAction::None
        };

        tracing::trace!(
            %category,
            occupants = self.occupants,
            streak = self.streak,
            ?action,
            "departed"
        );
        action
    }

    /// First safety invariant that does not hold, if any.
    pub fn invariant_violation(&self) -> Option<&'static str> {
        if self.occupants > self.config.capacity() {
            return Some("occupants exceed capacity");
        }
        None
    }

    /// Set when the resident category ran past the fairness threshold while
    /// the other category was waiting.
    ///
    /// Holds for every state reachable through [`admits`](Self::admits)
    /// gated admissions. Rooms that admit on a waiter's behalf without
    /// consulting the streak, such as [`CreditRoom`](crate::CreditRoom)
    /// handing a batch to the other category, can legitimately break it.
    pub fn fairness_violation(&self) -> Option<&'static str> {
        let other_waiting = self.waiting(self.occupant_category.opposite()) > 0;
        if self.occupants > 0 && other_waiting && self.streak > self.config.fairness_threshold() {
            return Some("streak exceeds fairness threshold while the other category waits");
        }
        None
    }

    fn debug_check(&self) {
        debug_assert!(
            self.invariant_violation().is_none(),
            "room invariant violated: {:?}",
            self.invariant_violation()
        );
    }
}
