//! Normal distribution utilities.

use rand::RngCore;
use sf_core::types::check_len;
use sf_core::{BatchDistribution, Result};

use crate::math::{LOG_INV_SQRT_2PI, standard_normal_cdf, standard_normal_draw};

/// Log-PDF of a Normal distribution `N(mu, sigma)` at `x`.
///
/// `log p(x) = -0.5 * ((x-mu)/sigma)^2 - ln(sigma) - ln(sqrt(2π))`
#[inline]
pub fn logpdf(x: f64, mu: f64, sigma: f64) -> f64 {
    let z = (x - mu) / sigma;
    -0.5 * z * z - sigma.ln() + LOG_INV_SQRT_2PI
}

/// CDF of `N(mu, sigma)` at `x`.
#[inline]
pub fn cdf(x: f64, mu: f64, sigma: f64) -> f64 {
    standard_normal_cdf((x - mu) / sigma)
}

/// One draw from `N(mu, sigma)`.
#[inline]
pub fn sample(mu: f64, sigma: f64, rng: &mut dyn RngCore) -> f64 {
    mu + sigma * standard_normal_draw(rng)
}

/// Batch of independent Normal distributions.
#[derive(Debug, Clone)]
pub struct Normal {
    loc: Vec<f32>,
    scale: Vec<f32>,
}

impl Normal {
    /// Create a batch from equal-length `loc` and `scale`.
    pub fn new(loc: Vec<f32>, scale: Vec<f32>) -> Result<Self> {
        check_len("scale", loc.len(), scale.len())?;
        Ok(Self { loc, scale })
    }

    /// Location parameters.
    pub fn loc(&self) -> &[f32] {
        &self.loc
    }

    /// Scale parameters.
    pub fn scale(&self) -> &[f32] {
        &self.scale
    }

    /// Elementwise CDF at `x`.
    pub fn cdf(&self, x: &[f32]) -> Result<Vec<f32>> {
        check_len("x", self.loc.len(), x.len())?;
        Ok(x.iter()
            .zip(self.loc.iter().zip(&self.scale))
            .map(|(&x, (&mu, &sigma))| cdf(x as f64, mu as f64, sigma as f64) as f32)
            .collect())
    }
}

impl BatchDistribution for Normal {
    fn name(&self) -> &str {
        "Normal"
    }

    fn batch_len(&self) -> usize {
        self.loc.len()
    }

    fn mean(&self) -> Vec<f32> {
        self.loc.clone()
    }

    fn variance(&self) -> Vec<f32> {
        self.scale.iter().map(|&s| s * s).collect()
    }

    fn stddev(&self) -> Vec<f32> {
        self.scale.clone()
    }

    fn log_prob(&self, x: &[f32]) -> Result<Vec<f32>> {
        check_len("x", self.loc.len(), x.len())?;
        Ok(x.iter()
            .zip(self.loc.iter().zip(&self.scale))
            .map(|(&x, (&mu, &sigma))| logpdf(x as f64, mu as f64, sigma as f64) as f32)
            .collect())
    }

    fn sample(&self, rng: &mut dyn RngCore) -> Vec<f32> {
        self.loc
            .iter()
            .zip(&self.scale)
            .map(|(&mu, &sigma)| sample(mu as f64, sigma as f64, rng) as f32)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;

    #[test]
    fn test_standard_at_zero() {
        let lp = logpdf(0.0, 0.0, 1.0);
        assert!((lp - LOG_INV_SQRT_2PI).abs() < 1e-12);
    }

    #[test]
    fn test_symmetry() {
        let lp1 = logpdf(1.3, 0.0, 2.0);
        let lp2 = logpdf(-1.3, 0.0, 2.0);
        assert!((lp1 - lp2).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_sigma_propagates_nan() {
        assert!(logpdf(0.5, 0.0, -1.0).is_nan());
        let d = Normal::new(vec![0.0], vec![-1.0]).unwrap();
        assert!(d.log_prob(&[0.5]).unwrap()[0].is_nan());
    }

    #[test]
    fn test_batch_moments_and_shape_check() {
        let d = Normal::new(vec![1.0, -2.0], vec![0.5, 3.0]).unwrap();
        assert_eq!(d.mean(), vec![1.0, -2.0]);
        assert_eq!(d.variance(), vec![0.25, 9.0]);
        assert_eq!(d.stddev(), vec![0.5, 3.0]);
        assert!(d.log_prob(&[0.0]).is_err());
        assert!(Normal::new(vec![1.0, 2.0], vec![1.0]).is_err());
        let c = d.cdf(&[1.0, -2.0]).unwrap();
        assert_relative_eq!(c[0], 0.5, epsilon = 1e-7);
        assert_relative_eq!(c[1], 0.5, epsilon = 1e-7);
    }

    #[test]
    fn test_sample_moments() {
        let d = Normal::new(vec![3.0], vec![2.0]).unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(11);
        let draws: Vec<f64> = d.sample_n(20_000, &mut rng).iter().map(|s| s[0] as f64).collect();
        let n = draws.len() as f64;
        let mean = draws.iter().sum::<f64>() / n;
        let var = draws.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
        assert_relative_eq!(mean, 3.0, epsilon = 0.06);
        assert_relative_eq!(var, 4.0, epsilon = 0.15);
    }
}
