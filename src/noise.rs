//! Injected randomness for measurement noise and engine jitter.
//!
//! The simulation never reaches for a process-wide generator.  Whoever
//! builds an [`EngineController`](crate::controller::EngineController)
//! hands it a [`NoiseSource`]; production seeds one from OS entropy,
//! tests seed one from a constant so runs are reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of bounded uniform draws.
pub trait NoiseSource {
    /// Draw uniformly from `low..=high`.  Returns `low` when the range is
    /// empty or degenerate.
    fn uniform(&mut self, low: f64, high: f64) -> f64;
}

impl<R: Rng + ?Sized> NoiseSource for R {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if low.is_nan() || high.is_nan() || low >= high {
            return low;
        }
        self.gen_range(low..=high)
    }
}

/// Generator seeded from OS entropy.
pub fn from_entropy() -> StdRng {
    StdRng::from_entropy()
}

/// Reproducible generator for tests and replayable sessions.
pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Noise source that always returns the midpoint of the requested range.
///
/// For symmetric ranges this removes noise entirely; for the thrust step
/// range it yields the mean response.
#[derive(Debug, Clone, Copy, Default)]
pub struct Midpoint;

impl NoiseSource for Midpoint {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if low.is_nan() || high.is_nan() || low >= high {
            return low;
        }
        low + (high - low) / 2.0
    }
}
