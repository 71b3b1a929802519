//! Model world: a [`RoomState`] plus explicit actors and wait queues.
//!
//! The world replaces the mutex and condition variables of
//! [`Room`](cohort_core::Room) with data: each category has a FIFO of
//! blocked actors, a signal moves an actor from `Waiting` to `Woken`, and a
//! `Resume` performs what the woken thread does once it holds the lock
//! again. Every interleaving the threaded room can produce is a sequence of
//! these steps, so checking invariants after each step covers them all.

use std::collections::VecDeque;

use cohort_core::{Category, RoomConfig, RoomState, WakeAction};
use thiserror::Error;

use super::{
    actor::{ActorPhase, ModelActor},
    operation::{ActorId, Operation, OperationError, OperationResult},
};

/// Upper bound on drain steps per actor before declaring a livelock.
const MAX_DRAIN_STEPS_PER_ACTOR: usize = 64;

/// A property the model found broken.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelViolation {
    /// `RoomState` reports a broken invariant.
    #[error("room invariant violated: {reason}")]
    RoomInvariant {
        /// Invariant description from the room.
        reason: &'static str,
    },

    /// Actors of both categories are inside at once.
    #[error("actors of both categories are inside")]
    MixedOccupancy,

    /// Inside actors and room occupancy disagree.
    #[error("{inside} actors inside but the room counts {occupants}")]
    OccupantMismatch {
        /// Actors in the `Inside` phase.
        inside: usize,
        /// Occupants according to the room.
        occupants: usize,
    },

    /// The room's occupant category is not the category of those inside.
    #[error("{inside} actors inside but the room is held by {occupant}")]
    WrongOccupant {
        /// Category of the inside actors.
        inside: Category,
        /// Category recorded by the room.
        occupant: Category,
    },

    /// Registered actors and room waiter counts disagree.
    #[error("{registered} {category} actors registered but the room counts {waiting}")]
    WaiterMismatch {
        /// Category checked.
        category: Category,
        /// Actors in `Waiting` or `Woken`.
        registered: usize,
        /// Waiters according to the room.
        waiting: usize,
    },

    /// An admission skipped or repeated a sequence number.
    #[error("admission sequence jumped from {previous} to {actual}")]
    SequenceGap {
        /// Last sequence number handed out.
        previous: u64,
        /// Sequence number of the offending admission.
        actual: u64,
    },

    /// Draining did not reach quiescence.
    #[error("no quiescence after {steps} drain steps")]
    NoProgress {
        /// Steps taken before giving up.
        steps: usize,
    },

    /// An actor is still blocked after the world went quiet.
    #[error("actor {actor} is still {phase} after draining")]
    Stranded {
        /// Actor left behind.
        actor: ActorId,
        /// Its phase.
        phase: ActorPhase,
    },
}

/// Reference world for model-based testing.
#[derive(Debug, Clone)]
pub struct ModelWorld {
    state: RoomState,
    actors: Vec<ModelActor>,
    wait_queues: [VecDeque<ActorId>; 2],
    last_sequence: u64,
    /// First sequence violation seen by `apply`.
    violation: Option<ModelViolation>,
}

impl ModelWorld {
    /// World with one outside actor per entry of `categories`.
    ///
    /// Actor ids are indices into `categories`; anything past `u8::MAX` is
    /// ignored.
    pub fn new(config: RoomConfig, categories: &[Category]) -> Self {
        let actors =
            categories.iter().take(usize::from(ActorId::MAX) + 1).map(|&c| ModelActor::new(c));
        Self {
            state: RoomState::new(config),
            actors: actors.collect(),
            wait_queues: [VecDeque::new(), VecDeque::new()],
            last_sequence: 0,
            violation: None,
        }
    }

    /// Number of actors.
    pub fn num_actors(&self) -> usize {
        self.actors.len()
    }

    /// Actor by id.
    pub fn actor(&self, id: ActorId) -> Option<&ModelActor> {
        self.actors.get(usize::from(id))
    }

    /// Underlying room state.
    pub fn state(&self) -> &RoomState {
        &self.state
    }

    /// Apply one operation.
    pub fn apply(&mut self, op: &Operation) -> OperationResult {
        let id = op.actor();
        let Some(actor) = self.actors.get(usize::from(id)).copied() else {
            return OperationResult::Error(OperationError::InvalidActor);
        };

        match (op, actor.phase()) {
            (Operation::Arrive { .. }, ActorPhase::Outside) => self.try_enter(id, actor.category()),
            (Operation::Arrive { .. }, _) => OperationResult::Error(OperationError::NotOutside),

            (Operation::Depart { .. }, ActorPhase::Inside) => self.depart(id, actor.category()),
            (Operation::Depart { .. }, _) => OperationResult::Error(OperationError::NotInside),

            (Operation::Resume { .. }, ActorPhase::Woken) => {
                self.state.unregister_waiter(actor.category());
                self.try_enter(id, actor.category())
            },
            (Operation::Resume { .. }, _) => OperationResult::Error(OperationError::NotWoken),

            (Operation::SpuriousWake { .. }, ActorPhase::Waiting) => {
                self.wait_queues[actor.category().index()].retain(|&queued| queued != id);
                self.set_phase(id, ActorPhase::Woken);
                OperationResult::Woken
            },
            (Operation::SpuriousWake { .. }, _) => {
                OperationResult::Error(OperationError::NotWaiting)
            },
        }
    }

    /// Check every cross-cutting property of the current state.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn check(&self) -> Result<(), ModelViolation> {
        if let Some(violation) = &self.violation {
            return Err(violation.clone());
        }
        if let Some(reason) = self.state.invariant_violation() {
            return Err(ModelViolation::RoomInvariant { reason });
        }
        if let Some(reason) = self.state.fairness_violation() {
            return Err(ModelViolation::RoomInvariant { reason });
        }

        let inside = |category: Category| {
            self.actors
                .iter()
                .filter(|a| a.phase() == ActorPhase::Inside && a.category() == category)
                .count()
        };
        let (inside_a, inside_b) = (inside(Category::A), inside(Category::B));
        if inside_a > 0 && inside_b > 0 {
            return Err(ModelViolation::MixedOccupancy);
        }
        if inside_a + inside_b != self.state.occupants() {
            return Err(ModelViolation::OccupantMismatch {
                inside: inside_a + inside_b,
                occupants: self.state.occupants(),
            });
        }
        if let Some(occupant) = self.state.occupant_category() {
            let held = if inside_a > 0 { Category::A } else { Category::B };
            if held != occupant {
                return Err(ModelViolation::WrongOccupant { inside: held, occupant });
            }
        }

        for category in Category::ALL {
            let registered = self
                .actors
                .iter()
                .filter(|a| a.category() == category && a.is_registered())
                .count();
            let waiting = self.state.waiting(category);
            if registered != waiting {
                return Err(ModelViolation::WaiterMismatch { category, registered, waiting });
            }
        }

        Ok(())
    }

    /// Run the world to quiescence: resume woken actors first, otherwise
    /// let an inside actor leave. Stops when neither exists.
    ///
    /// Returns the number of steps taken.
    ///
    /// # Errors
    ///
    /// Returns a violation if a step breaks a property, or
    /// [`ModelViolation::NoProgress`] if the step bound is exceeded.
    pub fn drain(&mut self) -> Result<usize, ModelViolation> {
        let limit = MAX_DRAIN_STEPS_PER_ACTOR * (self.actors.len() + 1);

        for steps in 0..limit {
            let op = if let Some(actor) = self.first_in(ActorPhase::Woken) {
                Operation::Resume { actor }
            } else if let Some(actor) = self.first_in(ActorPhase::Inside) {
                Operation::Depart { actor }
            } else {
                return Ok(steps);
            };

            let result = self.apply(&op);
            debug_assert!(result.is_ok(), "drain chose an illegal step {op:?}: {result:?}");
            self.check()?;
        }

        Err(ModelViolation::NoProgress { steps: limit })
    }

    /// After [`drain`](Self::drain), every actor must be outside.
    ///
    /// # Errors
    ///
    /// Returns [`ModelViolation::Stranded`] for the first actor that is not.
    pub fn check_liveness(&self) -> Result<(), ModelViolation> {
        self.actors
            .iter()
            .zip(0..=ActorId::MAX)
            .find(|(actor, _)| actor.phase() != ActorPhase::Outside)
            .map_or(Ok(()), |(actor, id)| {
                Err(ModelViolation::Stranded { actor: id, phase: actor.phase() })
            })
    }

    fn try_enter(&mut self, id: ActorId, category: Category) -> OperationResult {
        if self.state.admits(category) {
            let sequence = self.state.admit(category);
            if sequence != self.last_sequence + 1 && self.violation.is_none() {
                self.violation =
                    Some(ModelViolation::SequenceGap { previous: self.last_sequence, actual: sequence });
            }
            self.last_sequence = sequence;
            self.set_phase(id, ActorPhase::Inside);
            OperationResult::Admitted { sequence }
        } else {
            self.state.register_waiter(category);
            self.wait_queues[category.index()].push_back(id);
            self.set_phase(id, ActorPhase::Waiting);
            OperationResult::Blocked
        }
    }

    fn depart(&mut self, id: ActorId, category: Category) -> OperationResult {
        let action = self.state.depart(category);
        self.set_phase(id, ActorPhase::Outside);

        let (target, count) = match action {
            WakeAction::None => return OperationResult::Departed { woken: 0 },
            WakeAction::One(target) => (target, 1),
            WakeAction::Batch { category: target, count } => (target, count),
        };

        let mut woken = 0;
        while woken < count {
            let Some(next) = self.wait_queues[target.index()].pop_front() else {
                break;
            };
            self.set_phase(next, ActorPhase::Woken);
            woken += 1;
        }
        OperationResult::Departed { woken }
    }

    fn first_in(&self, phase: ActorPhase) -> Option<ActorId> {
        self.actors.iter().zip(0..=ActorId::MAX).find(|(a, _)| a.phase() == phase).map(|(_, id)| id)
    }

    fn set_phase(&mut self, id: ActorId, phase: ActorPhase) {
        if let Some(actor) = self.actors.get_mut(usize::from(id)) {
            actor.set_phase(phase);
        }
    }
}
