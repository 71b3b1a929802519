//! Model actor: a category and where the actor is in the enter/leave cycle.

use std::fmt;

use cohort_core::Category;

/// Where an actor is relative to the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorPhase {
    /// Not inside and not trying to get in.
    Outside,
    /// Registered as a waiter and blocked on its category's channel.
    Waiting,
    /// Signalled (or spuriously woken) but not yet back under the lock.
    /// Still counted as a registered waiter by the room.
    Woken,
    /// Admitted and holding a slot.
    Inside,
}

impl fmt::Display for ActorPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Outside => "outside",
            Self::Waiting => "waiting",
            Self::Woken => "woken",
            Self::Inside => "inside",
        };
        f.write_str(name)
    }
}

/// One actor in the model world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelActor {
    category: Category,
    phase: ActorPhase,
}

impl ModelActor {
    /// Outside actor of `category`.
    pub fn new(category: Category) -> Self {
        Self { category, phase: ActorPhase::Outside }
    }

    /// Category this actor enters as.
    pub fn category(&self) -> Category {
        self.category
    }

    /// Current phase.
    pub fn phase(&self) -> ActorPhase {
        self.phase
    }

    /// Whether the room still counts this actor as a waiter.
    pub fn is_registered(&self) -> bool {
        matches!(self.phase, ActorPhase::Waiting | ActorPhase::Woken)
    }

    pub(super) fn set_phase(&mut self, phase: ActorPhase) {
        self.phase = phase;
    }
}
