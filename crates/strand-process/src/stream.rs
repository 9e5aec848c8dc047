//! Per-instance source of uniform draws.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Private random stream of one process instance.
///
/// Wraps a ChaCha8 generator. [`fork`](Self::fork) copies the complete
/// generator state, so the fork produces the same future draws as the
/// original from the fork point on.
#[derive(Clone, Debug)]
pub struct RandomStream {
    rng: ChaCha8Rng,
    draws: u64,
}

impl RandomStream {
    /// A reproducible stream.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            draws: 0,
        }
    }

    /// A stream seeded from the thread-local entropy source.
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_rng(&mut rand::rng()),
            draws: 0,
        }
    }

    /// Seeded when `seed` is present, from entropy otherwise.
    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }

    /// Next uniform draw in `[0, 1)`.
    pub fn next_draw(&mut self) -> f64 {
        self.draws += 1;
        self.rng.random::<f64>()
    }

    /// Independent copy continuing from the current position.
    pub fn fork(&self) -> Self {
        self.clone()
    }

    /// Number of draws taken so far (including those inherited by a fork).
    pub fn draws(&self) -> u64 {
        self.draws
    }
}
