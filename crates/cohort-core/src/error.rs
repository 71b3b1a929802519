//! Core error types.
//!
//! Only construction can fail recoverably. Protocol misuse and invariant
//! violations are traps, not errors.

use thiserror::Error;

/// Errors from building a [`RoomConfig`](crate::RoomConfig).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Capacity must admit at least one occupant.
    #[error("capacity must be positive, got {capacity}")]
    ZeroCapacity {
        /// The rejected capacity.
        capacity: usize,
    },

    /// A zero threshold would hand the room over on every admission.
    #[error("fairness threshold must be positive, got {threshold}")]
    ZeroFairnessThreshold {
        /// The rejected threshold.
        threshold: usize,
    },
}
