//! Random number generation for chance rolls.
//!
//! ## Key Features
//!
//! - **Deterministic**: Same seed produces identical rolls (tests, replays)
//! - **Percent rolls**: Uniform samples in `[0, 100)` for activation chances
//! - **Single draw**: every activation check consumes exactly one sample
//!
//! ```
//! use enchant_engine::core::EngineRng;
//!
//! let mut rng = EngineRng::new(42);
//! let roll = rng.roll_percent();
//! assert!((0.0..100.0).contains(&roll));
//!
//! // Weight 100 always passes, weight 0 never does.
//! assert!(rng.passes(100));
//! assert!(!rng.passes(0));
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic RNG backing every chance roll in the engine.
///
/// Uses ChaCha8 for speed while keeping good statistical quality.
#[derive(Clone, Debug)]
pub struct EngineRng {
    inner: ChaCha8Rng,
}

impl EngineRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Create an RNG seeded from the operating system.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    /// Draw one uniform sample in `[0, 100)`.
    pub fn roll_percent(&mut self) -> f64 {
        self.inner.gen_range(0.0..100.0)
    }

    /// Roll against an activation weight in `[0, 100]`.
    ///
    /// Exactly one sample is drawn per call, whatever the weight.
    pub fn passes(&mut self, weight: u8) -> bool {
        self.roll_percent() < f64::from(weight)
    }

    /// Generate a random integer in the given inclusive range.
    pub fn gen_range_inclusive(&mut self, range: std::ops::RangeInclusive<u32>) -> u32 {
        if range.is_empty() {
            return *range.start();
        }
        self.inner.gen_range(range)
    }

    /// Choose a random element from a slice.
    #[must_use]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.inner)
    }
}
