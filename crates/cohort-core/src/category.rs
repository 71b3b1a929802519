//! The two mutually exclusive actor categories.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Category of an actor. The room is only ever occupied by one category at
/// a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// First category.
    A,
    /// Second category.
    B,
}

impl Category {
    /// Both categories, in index order.
    pub const ALL: [Self; 2] = [Self::A, Self::B];

    /// The other category.
    pub const fn opposite(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }

    /// Stable index (0 or 1) for per-category tables.
    pub const fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }

    /// Map a single random bit to a category.
    pub const fn from_bit(bit: bool) -> Self {
        if bit { Self::B } else { Self::A }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => f.write_str("A"),
            Self::B => f.write_str("B"),
        }
    }
}
