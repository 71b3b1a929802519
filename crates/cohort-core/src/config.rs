//! Room construction parameters.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default maximum number of simultaneous same-category occupants.
pub const DEFAULT_CAPACITY: usize = 3;

/// Default streak length after which a waiting opposite category gets
/// priority.
pub const DEFAULT_FAIRNESS_THRESHOLD: usize = 4;

/// Validated room configuration.
///
/// Both values are fixed for the lifetime of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRoomConfig")]
pub struct RoomConfig {
    capacity: usize,
    fairness_threshold: usize,
}

impl RoomConfig {
    /// Build a configuration, rejecting zero values.
    pub fn new(capacity: usize, fairness_threshold: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity { capacity });
        }
        if fairness_threshold == 0 {
            return Err(ConfigError::ZeroFairnessThreshold { threshold: fairness_threshold });
        }
        Ok(Self { capacity, fairness_threshold })
    }

    /// Maximum simultaneous occupants of one category.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Streak length that triggers opposite-category priority.
    pub fn fairness_threshold(&self) -> usize {
        self.fairness_threshold
    }
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self { capacity: DEFAULT_CAPACITY, fairness_threshold: DEFAULT_FAIRNESS_THRESHOLD }
    }
}

/// Unvalidated wire form, so deserialization goes through [`RoomConfig::new`].
#[derive(Deserialize)]
struct RawRoomConfig {
    capacity: usize,
    fairness_threshold: usize,
}

impl TryFrom<RawRoomConfig> for RoomConfig {
    type Error = ConfigError;

    fn try_from(raw: RawRoomConfig) -> Result<Self, Self::Error> {
        Self::new(raw.capacity, raw.fairness_threshold)
    }
}
