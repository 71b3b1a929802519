//! Reference model for model-based testing.
//!
//! The model drives the real [`RoomState`](cohort_core::RoomState) but
//! replaces threads with explicit actors and condition variables with FIFO
//! wait queues. Any interleaving of enter, leave, signal and spurious
//! wakeup can be written down as an [`Operation`] sequence and replayed
//! deterministically.
//!
//! # Design Principles
//!
//! - Same transitions as the threaded room, one lock acquisition per step
//! - Deterministic: same operations produce the same world
//! - Illegal steps are reported, never panicked on, so generated input is
//!   always usable

mod actor;
pub mod operation;
mod world;

pub use actor::{ActorPhase, ModelActor};
pub use operation::{ActorId, Operation, OperationError, OperationResult};
pub use world::{ModelViolation, ModelWorld};
