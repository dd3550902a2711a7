//! Core traits for the merging core
//!
//! The merging driver depends only on [`BatchDistribution`]; concrete families
//! (and the centric/acentric hybrid posterior) live in `sf-prob`.

use rand::{RngCore, SeedableRng};

use crate::Result;

/// A batch of independent univariate distributions, one per reflection.
///
/// All outward-facing values are `f32`. Implementations never mutate their
/// construction-time parameters.
pub trait BatchDistribution: Send + Sync {
    /// Family name (e.g. "Normal", "RiceWoolfson")
    fn name(&self) -> &str;

    /// Number of elements in the batch
    fn batch_len(&self) -> usize;

    /// Elementwise mean
    fn mean(&self) -> Vec<f32>;

    /// Elementwise variance
    fn variance(&self) -> Vec<f32>;

    /// Elementwise standard deviation
    fn stddev(&self) -> Vec<f32> {
        self.variance().into_iter().map(f32::sqrt).collect()
    }

    /// Elementwise log-density at `x`.
    ///
    /// `x` must have length [`batch_len`](Self::batch_len).
    fn log_prob(&self, x: &[f32]) -> Result<Vec<f32>>;

    /// Elementwise density at `x`.
    fn prob(&self, x: &[f32]) -> Result<Vec<f32>> {
        Ok(self.log_prob(x)?.into_iter().map(f32::exp).collect())
    }

    /// Draw one realization per batch element.
    fn sample(&self, rng: &mut dyn RngCore) -> Vec<f32>;

    /// Draw `n` realizations of the whole batch; the outer index is the draw.
    fn sample_n(&self, n: usize, rng: &mut dyn RngCore) -> Vec<Vec<f32>> {
        (0..n).map(|_| self.sample(rng)).collect()
    }

    /// Same as [`sample_n`](Self::sample_n) with a `StdRng` seeded from `seed`.
    fn sample_seeded(&self, n: usize, seed: u64) -> Vec<Vec<f32>> {
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        self.sample_n(n, &mut rng)
    }
}
