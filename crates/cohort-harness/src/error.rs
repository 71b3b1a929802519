//! Simulation error types.

use cohort_core::ConfigError;
use thiserror::Error;

/// Errors from setting up or running a simulation.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Room configuration was rejected.
    #[error("invalid room configuration: {0}")]
    Config(#[from] ConfigError),

    /// A run parameter is out of range.
    #[error("invalid simulation parameter: {name} must be positive, got {value}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Rejected value.
        value: usize,
    },

    /// The OS refused to start an actor thread.
    #[error("failed to spawn actor {actor}: {source}")]
    Spawn {
        /// Actor that could not be started.
        actor: usize,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An actor thread panicked, most likely on a room invariant trap.
    #[error("actor {actor} panicked")]
    ActorPanicked {
        /// Actor whose thread panicked.
        actor: usize,
    },
}

impl SimulationError {
    /// Returns true if the run never started because of bad input.
    ///
    /// Anything else happened while actors were running.
    pub fn is_configuration(&self) -> bool {
        match self {
            Self::Config(_) | Self::InvalidParameter { .. } => true,
            Self::Spawn { .. } | Self::ActorPanicked { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_errors_are_configuration() {
        let err = SimulationError::InvalidParameter { name: "actors", value: 0 };
        assert!(err.is_configuration());
        assert_eq!(err.to_string(), "invalid simulation parameter: actors must be positive, got 0");
    }

    #[test]
    fn panics_are_not_configuration() {
        let err = SimulationError::ActorPanicked { actor: 3 };
        assert!(!err.is_configuration());
        assert_eq!(err.to_string(), "actor 3 panicked");
    }

    #[test]
    fn config_errors_convert() {
        let err: SimulationError = ConfigError::ZeroCapacity { capacity: 0 }.into();
        assert!(err.is_configuration());
        assert_eq!(err.to_string(), "invalid room configuration: capacity must be positive, got 0");
    }
}
