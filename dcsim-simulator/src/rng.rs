//! Seeded random stream for a simulation run.
//!
//! The engine owns exactly one [`SimulationRng`] and threads it by `&mut`
//! through the workload models, so a seed reproduces the whole run and
//! independent runs never share state.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::Distribution;

#[derive(Debug, Clone)]
pub struct SimulationRng {
    rng: StdRng,
    seed: u64,
}

impl SimulationRng {
    /// Creates a stream from a fixed seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Creates a stream from OS entropy. The drawn seed is kept so the run
    /// can still be reproduced afterwards.
    pub fn from_entropy() -> Self {
        Self::from_seed(rand::random())
    }

    /// Seeded when `seed` is given, entropy-backed otherwise.
    pub fn new(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::from_seed)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Draws one value from `distribution`.
    pub fn sample<T, D: Distribution<T>>(&mut self, distribution: &D) -> T {
        distribution.sample(&mut self.rng)
    }
}
