//! Truncated normal distribution with a numerically robust sampler.
//!
//! Sampling re-expresses an ordinary normal draw `z ~ N(mu, sigma)` as `u = Φ((z - mu)/sigma)`
//! and pushes it through the truncated inverse CDF
//! `Φ⁻¹(Φ(α) + u (Φ(β) - Φ(α))) * sigma + mu`, with standardized bounds `α`, `β`.
//!
//! When `α < -crossover` and `β > crossover` the truncation is numerically invisible while
//! the inverse-CDF path saturates inside `Φ`, so the plain draw `z` is returned instead.
//!
//! When both bounds sit in the same tail the normalizer and the inverse CDF are carried in
//! log space, so a bound tens of standard deviations out neither underflows `Z` nor
//! saturates draws onto the far bound.

use rand::RngCore;
use sf_core::types::{broadcast, check_len};
use sf_core::{BatchDistribution, Error, Result};

use crate::math::{
    log_add_exp, log_standard_normal_cdf, log_standard_normal_interval, standard_normal_cdf,
    standard_normal_draw, standard_normal_log_quantile, standard_normal_logpdf,
    standard_normal_quantile,
};

/// Standardized distance beyond which both bounds are treated as infinite when sampling.
pub const DEFAULT_CROSSOVER: f64 = 10.0;

/// `φ(t) / Z` given `ln Z`, with `φ(±inf) = 0`.
#[inline]
fn density_ratio(t: f64, log_z: f64) -> f64 {
    if t.is_infinite() { 0.0 } else { (standard_normal_logpdf(t) - log_z).exp() }
}

/// `p (t - m)` with the `t = ±inf` limit taken as zero.
#[inline]
fn bound_term(p: f64, t: f64, m: f64) -> f64 {
    if t.is_infinite() { 0.0 } else { p * (t - m) }
}

/// Standardized bounds and `ln Z`, `Z = Φ(β) - Φ(α)`.
#[inline]
fn standardize(mu: f64, sigma: f64, low: f64, high: f64) -> (f64, f64, f64) {
    let alpha = (low - mu) / sigma;
    let beta = (high - mu) / sigma;
    (alpha, beta, log_standard_normal_interval(alpha, beta))
}

/// Log-PDF of `N(mu, sigma)` truncated to `[low, high]` at `x`.
pub fn logpdf(x: f64, mu: f64, sigma: f64, low: f64, high: f64) -> f64 {
    if x < low || x > high {
        return f64::NEG_INFINITY;
    }
    let (_, _, log_z) = standardize(mu, sigma, low, high);
    standard_normal_logpdf((x - mu) / sigma) - sigma.ln() - log_z
}

/// CDF of the truncated normal at `x`.
pub fn cdf(x: f64, mu: f64, sigma: f64, low: f64, high: f64) -> f64 {
    if x <= low {
        return 0.0;
    }
    if x >= high {
        return 1.0;
    }
    let (alpha, _, log_z) = standardize(mu, sigma, low, high);
    let z = (x - mu) / sigma;
    (log_standard_normal_interval(alpha, z) - log_z).exp().clamp(0.0, 1.0)
}

/// Mean: `mu + sigma (φ(α) - φ(β)) / Z`.
///
/// The ratios `φ/Z` are formed in log space, so bounds many standard deviations into a
/// tail still give the mean of the mass that actually lies between them.
pub fn mean(mu: f64, sigma: f64, low: f64, high: f64) -> f64 {
    let (alpha, beta, log_z) = standardize(mu, sigma, low, high);
    if log_z == f64::NEG_INFINITY {
        return 0.5 * (low + high);
    }
    mu + sigma * (density_ratio(alpha, log_z) - density_ratio(beta, log_z))
}

/// Variance: `sigma^2 [1 + (α φ(α) - β φ(β)) / Z - ((φ(α) - φ(β)) / Z)^2]`.
///
/// Evaluated as `1 + pα (α - m) - pβ (β - m)` with `p = φ/Z` and `m = pα - pβ`.
pub fn variance(mu: f64, sigma: f64, low: f64, high: f64) -> f64 {
    let (alpha, beta, log_z) = standardize(mu, sigma, low, high);
    if log_z == f64::NEG_INFINITY {
        return 0.0;
    }
    let pa = density_ratio(alpha, log_z);
    let pb = density_ratio(beta, log_z);
    let m = pa - pb;
    let v = sigma * sigma * (1.0 + bound_term(pa, alpha, m) - bound_term(pb, beta, m));
    v.max(0.0)
}

/// Inverse CDF of the standard normal truncated to `[α, β]` with `β <= 0`.
///
/// `ln(Φ(α) + u Z)` is formed in log space and inverted with the log-quantile, so the
/// draw is exact even when `Φ(β)` underflows.
#[inline]
fn lower_tail_inverse_cdf(u: f64, alpha: f64, beta: f64) -> f64 {
    let log_lo = log_standard_normal_cdf(alpha);
    let log_z = log_standard_normal_interval(alpha, beta);
    standard_normal_log_quantile(log_add_exp(log_lo, u.ln() + log_z))
}

/// Map `u ∈ (0, 1)` through the inverse CDF of the standard normal truncated to `[α, β]`.
///
/// Bounds lying entirely in the upper tail are mirrored into the lower tail first.
#[inline]
fn standardized_inverse_cdf(u: f64, alpha: f64, beta: f64) -> f64 {
    if alpha > 0.0 {
        -lower_tail_inverse_cdf(u, -beta, -alpha)
    } else if beta <= 0.0 {
        lower_tail_inverse_cdf(u, alpha, beta)
    } else {
        let lo = standard_normal_cdf(alpha);
        let hi = standard_normal_cdf(beta);
        standard_normal_quantile(lo + u * (hi - lo))
    }
}

/// Outcome of one truncated-normal draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TruncatedDraw {
    /// Sampled value.
    pub value: f64,
    /// `true` when the plain normal draw was returned (both bounds beyond the crossover).
    pub untruncated: bool,
}

/// One draw from `N(mu, sigma)` truncated to `[low, high]`.
///
/// `crossover` is the standardized distance (in units of `sigma`) past which both bounds are
/// treated as infinite. Transformed values are clamped to `[low, high]` so rounding in `Φ⁻¹`
/// can never leave the support.
pub fn sample(
    mu: f64,
    sigma: f64,
    low: f64,
    high: f64,
    crossover: f64,
    rng: &mut dyn RngCore,
) -> TruncatedDraw {
    let alpha = (low - mu) / sigma;
    let beta = (high - mu) / sigma;

    let normal = mu + sigma * standard_normal_draw(rng);
    if alpha < -crossover && beta > crossover {
        return TruncatedDraw { value: normal, untruncated: true };
    }

    let u = standard_normal_cdf((normal - mu) / sigma);
    let x = standardized_inverse_cdf(u, alpha, beta) * sigma + mu;
    // `max`/`min` rather than `clamp`: NaN bounds must propagate, not panic.
    TruncatedDraw { value: x.max(low).min(high), untruncated: false }
}

/// Batch of independent truncated normal distributions.
#[derive(Debug, Clone)]
pub struct TruncatedNormal {
    loc: Vec<f32>,
    scale: Vec<f32>,
    low: Vec<f32>,
    high: Vec<f32>,
    crossover: f32,
}

impl TruncatedNormal {
    /// Create a batch. `low` and `high` may be length 1 (shared) or match `loc`.
    ///
    /// Fails on shape mismatch or when any `low > high`.
    pub fn new(loc: Vec<f32>, scale: Vec<f32>, low: Vec<f32>, high: Vec<f32>) -> Result<Self> {
        let n = loc.len();
        check_len("scale", n, scale.len())?;
        let low = broadcast("low", low, n)?;
        let high = broadcast("high", high, n)?;
        if let Some(i) = low.iter().zip(&high).position(|(l, h)| l > h) {
            return Err(Error::Validation(format!(
                "truncation bounds must satisfy low <= high, got ({}, {}) at index {}",
                low[i], high[i], i
            )));
        }
        Ok(Self { loc, scale, low, high, crossover: DEFAULT_CROSSOVER as f32 })
    }

    /// Replace the sampling crossover threshold (in standard deviations).
    pub fn with_crossover(mut self, crossover: f32) -> Result<Self> {
        if !crossover.is_finite() || crossover <= 0.0 {
            return Err(Error::Validation(format!(
                "crossover must be finite and > 0, got {}",
                crossover
            )));
        }
        self.crossover = crossover;
        Ok(self)
    }

    /// Location parameters of the parent normal.
    pub fn loc(&self) -> &[f32] {
        &self.loc
    }

    /// Scale parameters of the parent normal.
    pub fn scale(&self) -> &[f32] {
        &self.scale
    }

    /// Lower truncation bounds (broadcast to batch length).
    pub fn low(&self) -> &[f32] {
        &self.low
    }

    /// Upper truncation bounds (broadcast to batch length).
    pub fn high(&self) -> &[f32] {
        &self.high
    }

    /// Sampling crossover threshold.
    pub fn crossover(&self) -> f32 {
        self.crossover
    }

    /// Elementwise CDF at `x`.
    pub fn cdf(&self, x: &[f32]) -> Result<Vec<f32>> {
        check_len("x", self.loc.len(), x.len())?;
        Ok(x.iter()
            .enumerate()
            .map(|(i, &x)| {
                let (mu, s, lo, hi) = self.params(i);
                cdf(x as f64, mu, s, lo, hi) as f32
            })
            .collect())
    }

    #[inline]
    fn params(&self, i: usize) -> (f64, f64, f64, f64) {
        (self.loc[i] as f64, self.scale[i] as f64, self.low[i] as f64, self.high[i] as f64)
    }
}

impl BatchDistribution for TruncatedNormal {
    fn name(&self) -> &str {
        "TruncatedNormal"
    }

    fn batch_len(&self) -> usize {
        self.loc.len()
    }

    fn mean(&self) -> Vec<f32> {
        (0..self.loc.len())
            .map(|i| {
                let (mu, s, lo, hi) = self.params(i);
                mean(mu, s, lo, hi) as f32
            })
            .collect()
    }

    fn variance(&self) -> Vec<f32> {
        (0..self.loc.len())
            .map(|i| {
                let (mu, s, lo, hi) = self.params(i);
                variance(mu, s, lo, hi) as f32
            })
            .collect()
    }

    fn log_prob(&self, x: &[f32]) -> Result<Vec<f32>> {
        check_len("x", self.loc.len(), x.len())?;
        Ok(x.iter()
            .enumerate()
            .map(|(i, &x)| {
                let (mu, s, lo, hi) = self.params(i);
                logpdf(x as f64, mu, s, lo, hi) as f32
            })
            .collect())
    }

    fn sample(&self, rng: &mut dyn RngCore) -> Vec<f32> {
        let crossover = self.crossover as f64;
        let mut n_untruncated = 0usize;
        let out: Vec<f32> = (0..self.loc.len())
            .map(|i| {
                let (mu, s, lo, hi) = self.params(i);
                let draw = sample(mu, s, lo, hi, crossover, rng);
                n_untruncated += draw.untruncated as usize;
                draw.value as f32
            })
            .collect();
        tracing::trace!(n = self.loc.len(), n_untruncated, "truncated normal draw");
        out
    }
}
