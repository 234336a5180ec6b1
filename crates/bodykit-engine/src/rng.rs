//! Deterministic RNG wrapper using PCG32.
//!
//! Character randomization MUST use this module for random number generation
//! so that a given seed always produces the same character.

use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use rand_pcg::Pcg32;

/// Wrapper around PCG32 for deterministic random number generation.
#[derive(Clone)]
pub struct DeterministicRng {
    inner: Pcg32,
}

impl DeterministicRng {
    /// Create a new RNG from a 32-bit seed.
    ///
    /// The seed is expanded to 64 bits by duplicating the bits.
    pub fn new(seed: u32) -> Self {
        let seed64 = (seed as u64) | ((seed as u64) << 32);
        Self {
            inner: Pcg32::seed_from_u64(seed64),
        }
    }

    /// Generate a random f64 in the range [0.0, 1.0).
    #[inline]
    pub fn gen_f64(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    /// Generate a random bool with probability 0.5.
    #[inline]
    pub fn gen_bool(&mut self) -> bool {
        self.inner.gen::<bool>()
    }

    /// Sample from a normal distribution with the given mean and deviation.
    #[inline]
    pub fn gen_normal(&mut self, mean: f64, sigma: f64) -> f64 {
        let z: f64 = self.inner.sample(StandardNormal);
        mean + z * sigma
    }

    /// A random value bounded between `min` and `max` by reflecting
    /// out-of-bounds samples back inside.
    ///
    /// Samples Normal(`middle`, `sigma_factor * (max - min)`). For ranges
    /// whose middle sits on a boundary this yields half a normal
    /// distribution, which is exactly what single-sided sliders want.
    pub fn gen_reflected_normal(
        &mut self,
        min: f64,
        max: f64,
        middle: f64,
        sigma_factor: f64,
    ) -> f64 {
        let sigma = sigma_factor * (max - min).abs();
        let mut value = self.gen_normal(middle, sigma);
        if value < min {
            value = min + (value - min).abs();
        } else if value > max {
            value = max - (value - max).abs();
        }
        value.clamp(min, max)
    }

    /// Fisher-Yates shuffle of a slice.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.inner.gen_range(0..=i);
            items.swap(i, j);
        }
    }
}
