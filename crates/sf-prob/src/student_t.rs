//! Student-t distribution utilities.

use rand::RngCore;
use rand_distr::{ChiSquared, Distribution};
use sf_core::types::check_len;
use sf_core::{BatchDistribution, Error, Result};
use statrs::function::gamma::ln_gamma;

use crate::math::standard_normal_draw;

/// Natural log of π.
const LN_PI: f64 = 1.144_729_885_849_400_2;

/// Log-PDF of a Student-t distribution at `x` with location `mu`, scale `sigma`, and dof `nu`.
pub fn logpdf(x: f64, mu: f64, sigma: f64, nu: f64) -> f64 {
    let z = (x - mu) / sigma;
    let half_nu = 0.5 * nu;
    let a = ln_gamma(0.5 * (nu + 1.0)) - ln_gamma(half_nu);
    let b = -0.5 * (nu.ln() + LN_PI);
    let c = -sigma.ln();
    let d = -0.5 * (nu + 1.0) * (z * z / nu).ln_1p();
    a + b + c + d
}

/// Mean: `mu` for `nu > 1`, undefined (`NaN`) otherwise.
#[inline]
pub fn mean(mu: f64, nu: f64) -> f64 {
    if nu > 1.0 { mu } else { f64::NAN }
}

/// Variance: `sigma^2 nu / (nu - 2)` for `nu > 2`, `+inf` for `1 < nu <= 2`, `NaN` otherwise.
#[inline]
pub fn variance(sigma: f64, nu: f64) -> f64 {
    if nu > 2.0 {
        sigma * sigma * nu / (nu - 2.0)
    } else if nu > 1.0 {
        f64::INFINITY
    } else {
        f64::NAN
    }
}

/// One draw as `mu + sigma * Z / sqrt(V / nu)` with `Z ~ N(0,1)`, `V ~ χ²(nu)`.
pub fn sample(mu: f64, sigma: f64, chi2: &ChiSquared<f64>, nu: f64, rng: &mut dyn RngCore) -> f64 {
    let z = standard_normal_draw(rng);
    let v: f64 = chi2.sample(rng);
    mu + sigma * z / (v / nu).sqrt()
}

/// Batch of independent Student-t distributions sharing one degrees-of-freedom value.
#[derive(Debug, Clone)]
pub struct StudentT {
    dof: f32,
    loc: Vec<f32>,
    scale: Vec<f32>,
    chi2: ChiSquared<f64>,
}

impl StudentT {
    /// Create a batch; `dof` must be finite and > 0.
    pub fn new(dof: f32, loc: Vec<f32>, scale: Vec<f32>) -> Result<Self> {
        if !dof.is_finite() || dof <= 0.0 {
            return Err(Error::Validation(format!("dof must be finite and > 0, got {}", dof)));
        }
        check_len("scale", loc.len(), scale.len())?;
        let chi2 = ChiSquared::new(dof as f64)
            .map_err(|e| Error::Validation(format!("invalid dof {}: {}", dof, e)))?;
        Ok(Self { dof, loc, scale, chi2 })
    }

    /// Degrees of freedom.
    pub fn dof(&self) -> f32 {
        self.dof
    }

    /// Location parameters.
    pub fn loc(&self) -> &[f32] {
        &self.loc
    }

    /// Scale parameters.
    pub fn scale(&self) -> &[f32] {
        &self.scale
    }
}

impl BatchDistribution for StudentT {
    fn name(&self) -> &str {
        "StudentT"
    }

    fn batch_len(&self) -> usize {
        self.loc.len()
    }

    fn mean(&self) -> Vec<f32> {
        let nu = self.dof as f64;
        self.loc.iter().map(|&mu| mean(mu as f64, nu) as f32).collect()
    }

    fn variance(&self) -> Vec<f32> {
        let nu = self.dof as f64;
        self.scale.iter().map(|&s| variance(s as f64, nu) as f32).collect()
    }

    fn log_prob(&self, x: &[f32]) -> Result<Vec<f32>> {
        check_len("x", self.loc.len(), x.len())?;
        let nu = self.dof as f64;
        Ok(x.iter()
            .zip(self.loc.iter().zip(&self.scale))
            .map(|(&x, (&mu, &s))| logpdf(x as f64, mu as f64, s as f64, nu) as f32)
            .collect())
    }

    fn sample(&self, rng: &mut dyn RngCore) -> Vec<f32> {
        let nu = self.dof as f64;
        self.loc
            .iter()
            .zip(&self.scale)
            .map(|(&mu, &s)| sample(mu as f64, s as f64, &self.chi2, nu, rng) as f32)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cauchy_at_zero() {
        // nu=1 => Cauchy(0,1): pdf(0) = 1/pi
        let lp = logpdf(0.0, 0.0, 1.0, 1.0);
        assert!((lp + std::f64::consts::PI.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_symmetry() {
        let lp1 = logpdf(1.3, 0.0, 2.0, 5.0);
        let lp2 = logpdf(-1.3, 0.0, 2.0, 5.0);
        assert!((lp1 - lp2).abs() < 1e-12);
    }

    #[test]
    fn test_large_dof_approaches_normal() {
        let lp_t = logpdf(0.7, 0.2, 1.5, 1e7);
        let lp_n = crate::normal::logpdf(0.7, 0.2, 1.5);
        assert_relative_eq!(lp_t, lp_n, epsilon = 1e-5);
    }

    #[test]
    fn test_moments_by_dof_regime() {
        assert!(mean(1.0, 1.0).is_nan());
        assert_eq!(mean(1.0, 1.5), 1.0);
        assert!(variance(1.0, 1.0).is_nan());
        assert_eq!(variance(1.0, 2.0), f64::INFINITY);
        assert_relative_eq!(variance(2.0, 4.0), 8.0);
    }

    #[test]
    fn test_invalid_dof() {
        assert!(StudentT::new(0.0, vec![0.0], vec![1.0]).is_err());
        assert!(StudentT::new(f32::NAN, vec![0.0], vec![1.0]).is_err());
        assert!(StudentT::new(4.0, vec![0.0, 1.0], vec![1.0]).is_err());
    }

    #[test]
    fn test_sample_median_near_loc() {
        let d = StudentT::new(4.0, vec![10.0], vec![2.0]).unwrap();
        let mut draws: Vec<f32> = d.sample_seeded(10_001, 5).iter().map(|s| s[0]).collect();
        draws.sort_by(|a, b| a.total_cmp(b));
        assert_relative_eq!(draws[5_000], 10.0, epsilon = 0.1);
    }
}
