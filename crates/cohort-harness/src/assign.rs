//! Seeded category assignment.
//!
//! Every actor gets its category from one bit of a ChaCha stream, so a run
//! is reproducible from its seed. The seed must be logged whenever it was
//! not supplied by the caller.

use cohort_core::Category;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic source of actor categories.
#[derive(Debug, Clone)]
pub struct CategoryAssigner {
    seed: u64,
    rng: ChaCha8Rng,
}

impl CategoryAssigner {
    /// Assigner replaying the stream for `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self { seed, rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    /// Assigner with a freshly drawn seed.
    pub fn from_entropy() -> Self {
        let seed = rand::random();
        tracing::info!(seed, "drew fresh category seed");
        Self::with_seed(seed)
    }

    /// Seed this assigner was built from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Category for the next actor.
    pub fn next_category(&mut self) -> Category {
        Category::from_bit(self.rng.next_u32() & 1 == 1)
    }

    /// Categories for `actors` actors, in actor order.
    pub fn assign(&mut self, actors: usize) -> Vec<Category> {
        (0..actors).map(|_| self.next_category()).collect()
    }
}
