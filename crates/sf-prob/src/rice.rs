//! Rice distribution utilities.
//!
//! `Rice(nu, sigma)` is the law of `|(X, Y)|` with `X ~ N(nu, sigma)`, `Y ~ N(0, sigma)`:
//! the amplitude of a complex Gaussian with offset `nu`. It models acentric
//! structure-factor amplitudes. Only `|nu|` enters any formula.

use std::f64::consts::FRAC_PI_2;

use rand::RngCore;
use sf_core::types::check_len;
use sf_core::{BatchDistribution, Result};

use crate::math::{bessel_i0e, bessel_i1e, standard_normal_draw};

/// Log-PDF of `Rice(nu, sigma)` at `x`.
///
/// `log p(x) = ln x - 2 ln sigma - (x - |nu|)^2 / (2 sigma^2) + ln i0e(x |nu| / sigma^2)`
/// for `x > 0`; the density vanishes (`-inf`) for `x <= 0`.
pub fn logpdf(x: f64, nu: f64, sigma: f64) -> f64 {
    if x <= 0.0 {
        return f64::NEG_INFINITY;
    }
    let nu = nu.abs();
    let s2 = sigma * sigma;
    let d = x - nu;
    x.ln() - s2.ln() - 0.5 * d * d / s2 + bessel_i0e(x * nu / s2).ln()
}

/// Laguerre polynomial `L_{1/2}(-t2)` scaled into a closed form, with `t2 = nu^2 / (2 sigma^2)`.
///
/// `L_{1/2}(-2t) = (1 + 2t) i0e(t) + 2t i1e(t)` where `t = nu^2 / (4 sigma^2)`.
fn laguerre_half(nu: f64, sigma: f64) -> f64 {
    let t = nu * nu / (4.0 * sigma * sigma);
    (1.0 + 2.0 * t) * bessel_i0e(t) + 2.0 * t * bessel_i1e(t)
}

/// Mean: `sigma * sqrt(π/2) * L_{1/2}(-nu^2 / (2 sigma^2))`.
pub fn mean(nu: f64, sigma: f64) -> f64 {
    sigma * FRAC_PI_2.sqrt() * laguerre_half(nu, sigma)
}

/// Variance: `2 sigma^2 + nu^2 - mean^2`, clamped at zero against cancellation.
pub fn variance(nu: f64, sigma: f64) -> f64 {
    let m = mean(nu, sigma);
    (2.0 * sigma * sigma + nu * nu - m * m).max(0.0)
}

/// One draw as the norm of two independent normals.
pub fn sample(nu: f64, sigma: f64, rng: &mut dyn RngCore) -> f64 {
    let x = nu + sigma * standard_normal_draw(rng);
    let y = sigma * standard_normal_draw(rng);
    x.hypot(y)
}

/// Batch of independent Rice distributions.
#[derive(Debug, Clone)]
pub struct Rice {
    nu: Vec<f32>,
    sigma: Vec<f32>,
}

impl Rice {
    /// Create a batch from equal-length `nu` (location) and `sigma` (scale).
    pub fn new(nu: Vec<f32>, sigma: Vec<f32>) -> Result<Self> {
        check_len("sigma", nu.len(), sigma.len())?;
        Ok(Self { nu, sigma })
    }

    /// Location parameters.
    pub fn nu(&self) -> &[f32] {
        &self.nu
    }

    /// Scale parameters.
    pub fn sigma(&self) -> &[f32] {
        &self.sigma
    }

    fn map_params(&self, f: impl Fn(f64, f64) -> f64) -> Vec<f32> {
        self.nu.iter().zip(&self.sigma).map(|(&nu, &s)| f(nu as f64, s as f64) as f32).collect()
    }
}

impl BatchDistribution for Rice {
    fn name(&self) -> &str {
        "Rice"
    }

    fn batch_len(&self) -> usize {
        self.nu.len()
    }

    fn mean(&self) -> Vec<f32> {
        self.map_params(mean)
    }

    fn variance(&self) -> Vec<f32> {
        self.map_params(variance)
    }

    fn log_prob(&self, x: &[f32]) -> Result<Vec<f32>> {
        check_len("x", self.nu.len(), x.len())?;
        Ok(x.iter()
            .zip(self.nu.iter().zip(&self.sigma))
            .map(|(&x, (&nu, &s))| logpdf(x as f64, nu as f64, s as f64) as f32)
            .collect())
    }

    fn sample(&self, rng: &mut dyn RngCore) -> Vec<f32> {
        self.nu
            .iter()
            .zip(&self.sigma)
            .map(|(&nu, &s)| sample(nu as f64, s as f64, rng) as f32)
            .collect()
    }
}
