//! Priors over structure-factor amplitudes.
//!
//! A prior is any [`BatchDistribution`] that also reports which [`PriorKind`] it is; the
//! merging driver only ever holds `Box<dyn Prior>`.

use serde::{Deserialize, Serialize};
use sf_core::BatchDistribution;

mod empirical;
mod wilson;

pub use empirical::{LaplaceReferencePrior, NormalReferencePrior, StudentTReferencePrior};
pub use wilson::WilsonPrior;

/// Which prior family a [`Prior`] implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorKind {
    /// Laplace centered on reference amplitudes.
    LaplaceReference,
    /// Normal centered on reference amplitudes.
    NormalReference,
    /// Student-t centered on reference amplitudes.
    StudentTReference,
    /// Wilson's acentric/centric amplitude statistics.
    Wilson,
}

/// Prior contract expected by the merging driver.
pub trait Prior: BatchDistribution {
    /// Family of this prior.
    fn kind(&self) -> PriorKind;
}

/// Forward every [`BatchDistribution`] method of a newtype prior to its `inner` field.
macro_rules! delegate_batch_distribution {
    ($ty:ty) => {
        impl sf_core::BatchDistribution for $ty {
            fn name(&self) -> &str {
                self.inner.name()
            }

            fn batch_len(&self) -> usize {
                self.inner.batch_len()
            }

            fn mean(&self) -> Vec<f32> {
                self.inner.mean()
            }

            fn variance(&self) -> Vec<f32> {
                self.inner.variance()
            }

            fn stddev(&self) -> Vec<f32> {
                self.inner.stddev()
            }

            fn log_prob(&self, x: &[f32]) -> sf_core::Result<Vec<f32>> {
                self.inner.log_prob(x)
            }

            fn prob(&self, x: &[f32]) -> sf_core::Result<Vec<f32>> {
                self.inner.prob(x)
            }

            fn sample(&self, rng: &mut dyn rand::RngCore) -> Vec<f32> {
                self.inner.sample(rng)
            }
        }
    };
}

pub(crate) use delegate_batch_distribution;
