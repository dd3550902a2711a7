//! Folded-Normal ("Woolfson") distribution utilities.
//!
//! `FoldedNormal(mu, sigma)` is the law of `|X|` with `X ~ N(mu, sigma)`. It models
//! centric structure-factor amplitudes.

use std::f64::consts::{FRAC_2_PI, SQRT_2};

use rand::RngCore;
use sf_core::types::check_len;
use sf_core::{BatchDistribution, Result};
use statrs::function::erf::erf;

use crate::math::{log_add_exp, standard_normal_cdf, standard_normal_draw, standard_normal_logpdf};

/// Log-PDF at `x`: `log(N(x; mu, sigma) + N(-x; mu, sigma))` for `x >= 0`, `-inf` below zero.
pub fn logpdf(x: f64, mu: f64, sigma: f64) -> f64 {
    if x < 0.0 {
        return f64::NEG_INFINITY;
    }
    let a = standard_normal_logpdf((x - mu) / sigma);
    let b = standard_normal_logpdf((x + mu) / sigma);
    log_add_exp(a, b) - sigma.ln()
}

/// CDF at `x`: `0.5 * (erf((x + mu)/(sigma √2)) + erf((x - mu)/(sigma √2)))` for `x >= 0`.
pub fn cdf(x: f64, mu: f64, sigma: f64) -> f64 {
    if x < 0.0 {
        return 0.0;
    }
    let s = sigma * SQRT_2;
    0.5 * (erf((x + mu) / s) + erf((x - mu) / s))
}

/// Mean: `sigma sqrt(2/π) exp(-mu^2/(2 sigma^2)) + mu (1 - 2 Φ(-mu/sigma))`.
pub fn mean(mu: f64, sigma: f64) -> f64 {
    let z = mu / sigma;
    sigma * FRAC_2_PI.sqrt() * (-0.5 * z * z).exp() + mu * (1.0 - 2.0 * standard_normal_cdf(-z))
}

/// Variance: `mu^2 + sigma^2 - mean^2`, clamped at zero against cancellation.
pub fn variance(mu: f64, sigma: f64) -> f64 {
    let m = mean(mu, sigma);
    (mu * mu + sigma * sigma - m * m).max(0.0)
}

/// One draw as `|N(mu, sigma)|`.
#[inline]
pub fn sample(mu: f64, sigma: f64, rng: &mut dyn RngCore) -> f64 {
    (mu + sigma * standard_normal_draw(rng)).abs()
}

/// Batch of independent Folded-Normal distributions.
#[derive(Debug, Clone)]
pub struct FoldedNormal {
    loc: Vec<f32>,
    scale: Vec<f32>,
}

impl FoldedNormal {
    /// Create a batch from equal-length `loc` and `scale`.
    pub fn new(loc: Vec<f32>, scale: Vec<f32>) -> Result<Self> {
        check_len("scale", loc.len(), scale.len())?;
        Ok(Self { loc, scale })
    }

    /// Location parameters of the underlying normal.
    pub fn loc(&self) -> &[f32] {
        &self.loc
    }

    /// Scale parameters of the underlying normal.
    pub fn scale(&self) -> &[f32] {
        &self.scale
    }

    /// Elementwise CDF at `x`.
    pub fn cdf(&self, x: &[f32]) -> Result<Vec<f32>> {
        check_len("x", self.loc.len(), x.len())?;
        Ok(x.iter()
            .zip(self.loc.iter().zip(&self.scale))
            .map(|(&x, (&mu, &s))| cdf(x as f64, mu as f64, s as f64) as f32)
            .collect())
    }

    fn map_params(&self, f: impl Fn(f64, f64) -> f64) -> Vec<f32> {
        self.loc.iter().zip(&self.scale).map(|(&mu, &s)| f(mu as f64, s as f64) as f32).collect()
    }
}

impl BatchDistribution for FoldedNormal {
    fn name(&self) -> &str {
        "FoldedNormal"
    }

    fn batch_len(&self) -> usize {
        self.loc.len()
    }

    fn mean(&self) -> Vec<f32> {
        self.map_params(mean)
    }

    fn variance(&self) -> Vec<f32> {
        self.map_params(variance)
    }

    fn log_prob(&self, x: &[f32]) -> Result<Vec<f32>> {
        check_len("x", self.loc.len(), x.len())?;
        Ok(x.iter()
            .zip(self.loc.iter().zip(&self.scale))
            .map(|(&x, (&mu, &s))| logpdf(x as f64, mu as f64, s as f64) as f32)
            .collect())
    }

    fn sample(&self, rng: &mut dyn RngCore) -> Vec<f32> {
        self.loc
            .iter()
            .zip(&self.scale)
            .map(|(&mu, &s)| sample(mu as f64, s as f64, rng) as f32)
            .collect()
    }
}
