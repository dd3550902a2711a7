//! Wilson prior over normalized structure-factor amplitudes.
//!
//! Acentric amplitudes follow `p(F) = 2F/(εΣ) exp(-F²/(εΣ))`, a Rayleigh law with
//! `σ² = εΣ/2`; centric amplitudes follow `p(F) = sqrt(2/(πεΣ)) exp(-F²/(2εΣ))`, a
//! half-normal with `σ² = εΣ`. Both are the zero-offset members of the Rice and
//! Folded-Normal families, so the prior is a [`RiceWoolfson`] with zero location.

use sf_core::types::check_len;
use sf_core::{BatchDistribution, Error, Result};
use sf_prob::RiceWoolfson;

use super::{Prior, PriorKind, delegate_batch_distribution};

/// Wilson's statistics for a batch of reflections.
#[derive(Debug, Clone)]
pub struct WilsonPrior {
    inner: RiceWoolfson,
    sigma: f32,
}

impl WilsonPrior {
    /// Build from the centric mask, the multiplicity factors `ε` and the mean intensity `Σ`.
    pub fn new(centric: Vec<bool>, epsilon: Vec<f32>, sigma: f32) -> Result<Self> {
        check_len("epsilon", centric.len(), epsilon.len())?;
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(Error::Validation(format!("sigma must be finite and > 0, got {}", sigma)));
        }
        if let Some(e) = epsilon.iter().find(|e| !e.is_finite() || **e <= 0.0) {
            return Err(Error::Validation(format!("epsilon must be finite and > 0, got {}", e)));
        }
        let scale = centric
            .iter()
            .zip(&epsilon)
            .map(|(&c, &e)| if c { (e * sigma).sqrt() } else { (0.5 * e * sigma).sqrt() })
            .collect();
        let inner = RiceWoolfson::new(vec![0.0; centric.len()], scale, centric)?;
        tracing::debug!(n = inner.batch_len(), sigma, "wilson prior");
        Ok(Self { inner, sigma })
    }

    /// Mean intensity `Σ`.
    pub fn sigma(&self) -> f32 {
        self.sigma
    }

    /// Centric mask.
    pub fn centric(&self) -> &[bool] {
        self.inner.centric()
    }
}

delegate_batch_distribution!(WilsonPrior);

impl Prior for WilsonPrior {
    fn kind(&self) -> PriorKind {
        PriorKind::Wilson
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_densities_match_wilson_formulas() {
        let p = WilsonPrior::new(vec![false, true], vec![2.0, 2.0], 1.0).unwrap();
        let f = [1.3f32, 1.3];
        let lp = p.log_prob(&f).unwrap();
        let (x, es) = (1.3f64, 2.0f64);
        let acentric = (2.0 * x / es).ln() - x * x / es;
        let centric = 0.5 * (2.0 / (std::f64::consts::PI * es)).ln() - x * x / (2.0 * es);
        assert_relative_eq!(lp[0] as f64, acentric, epsilon = 1e-5);
        assert_relative_eq!(lp[1] as f64, centric, epsilon = 1e-5);
    }

    #[test]
    fn test_acentric_second_moment_is_eps_sigma() {
        // E[F^2] = εΣ for both classes
        let p = WilsonPrior::new(vec![false, true], vec![3.0, 3.0], 2.0).unwrap();
        let m = p.mean();
        let v = p.variance();
        for i in 0..2 {
            assert_relative_eq!(v[i] + m[i] * m[i], 6.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_validation() {
        assert!(WilsonPrior::new(vec![true], vec![1.0, 1.0], 1.0).is_err());
        assert!(WilsonPrior::new(vec![true], vec![0.0], 1.0).is_err());
        assert!(WilsonPrior::new(vec![true], vec![1.0], -1.0).is_err());
        let p = WilsonPrior::new(vec![true, false], vec![1.0, 2.0], 1.0).unwrap();
        assert_eq!(p.kind(), PriorKind::Wilson);
        assert_eq!(p.centric(), &[true, false]);
        assert_eq!(p.sigma(), 1.0);
    }

    #[test]
    fn test_samples_non_negative_and_finite_log_prob() {
        let p = WilsonPrior::new(vec![true, false, true], vec![1.0, 1.0, 4.0], 1.0).unwrap();
        for draw in p.sample_seeded(500, 31) {
            assert!(draw.iter().all(|&f| f > 0.0));
            assert!(p.log_prob(&draw).unwrap().iter().all(|lp| lp.is_finite()));
        }
    }
}
