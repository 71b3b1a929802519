//! Operations for model-based testing.
//!
//! Each operation is one atomic step of one actor. proptest and the fuzzer
//! generate sequences of them; the model world decides which are legal in
//! the current phase and reports the rest as errors instead of panicking.

use arbitrary::Arbitrary;

/// Actor identifier (0-indexed).
pub type ActorId = u8;

/// One step of one actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub enum Operation {
    /// An outside actor calls `enter`.
    Arrive {
        /// Actor arriving.
        actor: ActorId,
    },

    /// An inside actor calls `leave`.
    Depart {
        /// Actor leaving.
        actor: ActorId,
    },

    /// A woken actor reacquires the lock and re-checks the predicate.
    Resume {
        /// Actor resuming.
        actor: ActorId,
    },

    /// A waiting actor returns from its wait without being signalled.
    SpuriousWake {
        /// Actor woken.
        actor: ActorId,
    },
}

impl Operation {
    /// Actor this operation belongs to.
    pub fn actor(&self) -> ActorId {
        match self {
            Self::Arrive { actor }
            | Self::Depart { actor }
            | Self::Resume { actor }
            | Self::SpuriousWake { actor } => *actor,
        }
    }

    /// Same operation, with the actor folded into `0..actors`.
    ///
    /// Fuzz inputs pick actors from the whole `u8` range; folding keeps
    /// most of them meaningful for small worlds.
    #[must_use]
    pub fn retarget(self, actors: usize) -> Self {
        let Ok(actors) = u8::try_from(actors.clamp(1, usize::from(u8::MAX))) else {
            return self;
        };
        let actor = self.actor() % actors;
        match self {
            Self::Arrive { .. } => Self::Arrive { actor },
            Self::Depart { .. } => Self::Depart { actor },
            Self::Resume { .. } => Self::Resume { actor },
            Self::SpuriousWake { .. } => Self::SpuriousWake { actor },
        }
    }
}

/// Result of applying an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationResult {
    /// The actor got in with this admission sequence number.
    Admitted {
        /// Counter value after the admission.
        sequence: u64,
    },

    /// The actor registered as a waiter and blocked.
    Blocked,

    /// The actor left; `woken` waiters were signalled.
    Departed {
        /// Number of waiters moved from waiting to woken.
        woken: usize,
    },

    /// A waiting actor woke without a signal.
    Woken,

    /// Operation is not legal for the actor's current phase.
    Error(OperationError),
}

/// Reasons an operation was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationError {
    /// No such actor.
    InvalidActor,

    /// `Arrive` from an actor that is not outside.
    NotOutside,

    /// `Depart` from an actor that is not inside.
    NotInside,

    /// `Resume` from an actor that was not woken.
    NotWoken,

    /// `SpuriousWake` for an actor that is not waiting.
    NotWaiting,
}

impl OperationResult {
    /// Check if operation was applied.
    pub fn is_ok(&self) -> bool {
        !self.is_err()
    }

    /// Check if operation was rejected.
    pub fn is_err(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}
