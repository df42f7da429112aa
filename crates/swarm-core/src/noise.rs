//! Multiplicative jitter applied to forces and accelerations.
//!
//! Every usage site draws a fresh matrix of factors near 1.0 so that no two
//! particles compute bit-identical trajectories under symmetric inputs.

use crate::constants::{DEFAULT_NOISE_EPSILON, DEFAULT_NOISE_SEED};
use crate::rng;
use ndarray::Array2;
use rand::Rng;
use rand_chacha::ChaCha12Rng;

/// Source of per-element multiplicative factors.
pub trait NoiseSource {
    /// Return a `shape`-sized matrix of independent factors centered at 1.0.
    fn noise(&mut self, shape: (usize, usize)) -> Array2<f64>;
}

/// Seeded uniform jitter in `[1 - epsilon, 1 + epsilon]`.
#[derive(Clone, Debug)]
pub struct EpsilonNoise {
    rng: ChaCha12Rng,
    epsilon: f64,
}

impl EpsilonNoise {
    /// Negative or NaN `epsilon` collapses to zero (identity factors).
    pub fn new(seed: u64, epsilon: f64) -> Self {
        Self::from_rng(rng::create_rng(seed), epsilon)
    }

    pub fn from_rng(rng: ChaCha12Rng, epsilon: f64) -> Self {
        Self {
            rng,
            epsilon: epsilon.max(0.0),
        }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }
}

impl Default for EpsilonNoise {
    fn default() -> Self {
        Self::new(DEFAULT_NOISE_SEED, DEFAULT_NOISE_EPSILON)
    }
}

impl NoiseSource for EpsilonNoise {
    fn noise(&mut self, shape: (usize, usize)) -> Array2<f64> {
        let epsilon = self.epsilon;
        let rng = &mut self.rng;
        Array2::from_shape_fn(shape, |_| 1.0 + rng.random_range(-epsilon..=epsilon))
    }
}

/// Every factor equals the wrapped value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstantNoise(pub f64);

impl ConstantNoise {
    pub fn identity() -> Self {
        Self(1.0)
    }
}

impl NoiseSource for ConstantNoise {
    fn noise(&mut self, shape: (usize, usize)) -> Array2<f64> {
        Array2::from_elem(shape, self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn identity_noise_is_all_ones() {
        let factors = ConstantNoise::identity().noise((3, 2));
        assert_eq!(factors.dim(), (3, 2));
        assert!(factors.iter().all(|&f| f == 1.0));
    }

    #[test]
    fn same_seed_reproduces_stream() {
        let mut a = EpsilonNoise::new(9, 0.05);
        let mut b = EpsilonNoise::new(9, 0.05);
        for _ in 0..4 {
            assert_eq!(a.noise((5, 3)), b.noise((5, 3)));
        }
    }

    #[test]
    fn consecutive_draws_differ() {
        let mut noise = EpsilonNoise::new(9, 0.05);
        let first = noise.noise((5, 3));
        let second = noise.noise((5, 3));
        assert_ne!(first, second);
    }

    #[test]
    fn zero_epsilon_yields_identity() {
        let mut noise = EpsilonNoise::new(1, 0.0);
        assert!(noise.noise((4, 4)).iter().all(|&f| f == 1.0));
    }

    #[test]
    fn negative_epsilon_collapses_to_zero() {
        let noise = EpsilonNoise::new(1, -0.5);
        assert_eq!(noise.epsilon(), 0.0);
    }

    #[test]
    fn empty_shape_is_supported() {
        let mut noise = EpsilonNoise::default();
        assert_eq!(noise.noise((0, 3)).dim(), (0, 3));
    }

    proptest! {
        #[test]
        fn proptest_factors_stay_within_band(
            seed in any::<u64>(),
            epsilon in 0.0f64..0.5,
            rows in 0usize..8,
            cols in 1usize..4,
        ) {
            let mut noise = EpsilonNoise::new(seed, epsilon);
            let factors = noise.noise((rows, cols));
            prop_assert!(factors.iter().all(|f| (f - 1.0).abs() <= epsilon + 1e-12));
        }
    }
}
