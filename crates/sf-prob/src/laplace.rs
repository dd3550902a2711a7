//! Laplace distribution utilities.

use rand::RngCore;
use sf_core::types::check_len;
use sf_core::{BatchDistribution, Result};

use crate::math::u01;

/// Log-PDF of `Laplace(mu, b)` at `x`: `-ln(2b) - |x - mu| / b`.
#[inline]
pub fn logpdf(x: f64, mu: f64, b: f64) -> f64 {
    -(2.0 * b).ln() - (x - mu).abs() / b
}

/// CDF of `Laplace(mu, b)` at `x`.
#[inline]
pub fn cdf(x: f64, mu: f64, b: f64) -> f64 {
    let z = (x - mu) / b;
    if z < 0.0 { 0.5 * z.exp() } else { 1.0 - 0.5 * (-z).exp() }
}

/// One draw from `Laplace(mu, b)` by inverting the CDF.
#[inline]
pub fn sample(mu: f64, b: f64, rng: &mut dyn RngCore) -> f64 {
    let u = u01(rng) - 0.5;
    mu - b * u.signum() * (-2.0 * u.abs()).ln_1p()
}

/// Batch of independent Laplace distributions.
#[derive(Debug, Clone)]
pub struct Laplace {
    loc: Vec<f32>,
    scale: Vec<f32>,
}

impl Laplace {
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
            .map(|(&x, (&mu, &b))| cdf(x as f64, mu as f64, b as f64) as f32)
            .collect())
    }
}

impl BatchDistribution for Laplace {
    fn name(&self) -> &str {
        "Laplace"
    }

    fn batch_len(&self) -> usize {
        self.loc.len()
    }

    fn mean(&self) -> Vec<f32> {
        self.loc.clone()
    }

    fn variance(&self) -> Vec<f32> {
        self.scale.iter().map(|&b| 2.0 * b * b).collect()
    }

    fn log_prob(&self, x: &[f32]) -> Result<Vec<f32>> {
        check_len("x", self.loc.len(), x.len())?;
        Ok(x.iter()
            .zip(self.loc.iter().zip(&self.scale))
            .map(|(&x, (&mu, &b))| logpdf(x as f64, mu as f64, b as f64) as f32)
            .collect())
    }

    fn sample(&self, rng: &mut dyn RngCore) -> Vec<f32> {
        self.loc
            .iter()
            .zip(&self.scale)
            .map(|(&mu, &b)| sample(mu as f64, b as f64, rng) as f32)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_peak_density() {
        // p(mu) = 1 / (2b)
        assert_relative_eq!(logpdf(1.0, 1.0, 0.5).exp(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_cdf_median_and_tails() {
        assert_relative_eq!(cdf(2.0, 2.0, 1.5), 0.5, epsilon = 1e-12);
        assert!(cdf(-100.0, 0.0, 1.0) < 1e-40);
        assert_relative_eq!(cdf(100.0, 0.0, 1.0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_variance_is_two_b_squared() {
        let d = Laplace::new(vec![0.0, 5.0], vec![1.0, 2.0f32.sqrt()]).unwrap();
        let v = d.variance();
        assert_relative_eq!(v[0], 2.0);
        assert_relative_eq!(v[1], 4.0, epsilon = 1e-6);
    }

    #[test]
    fn test_sample_moments() {
        let d = Laplace::new(vec![-1.0], vec![0.5]).unwrap();
        let draws: Vec<f64> = d.sample_seeded(20_000, 3).iter().map(|s| s[0] as f64).collect();
        let n = draws.len() as f64;
        let mean = draws.iter().sum::<f64>() / n;
        let var = draws.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
        assert_relative_eq!(mean, -1.0, epsilon = 0.03);
        assert_relative_eq!(var, 0.5, epsilon = 0.04);
    }
}
