//! Monte Carlo KL and ELBO estimates.
//!
//! The driver owns the likelihood (scaling model, observed intensities); this module
//! owns the posterior/prior side of each step:
//!
//! `ELBO ≈ (1/S) Σ_s [log p(data | z_s)] - (1/S) Σ_s Σ_i [log q(z_si) - log p(z_si)]`,
//! with `z_s ~ q`.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use sf_core::types::check_len;
use sf_core::{BatchDistribution, Error, Result};

/// One ELBO estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElboEstimate {
    /// Mean log-likelihood over the posterior samples.
    pub expected_log_likelihood: f64,
    /// KL(q || p) summed over reflections, averaged over samples.
    pub kl: f64,
    /// `expected_log_likelihood - kl`.
    pub elbo: f64,
    /// Number of posterior samples used.
    pub n_samples: usize,
}

impl ElboEstimate {
    /// Loss minimized by the optimizer (`-elbo`).
    pub fn loss(&self) -> f64 {
        -self.elbo
    }
}

fn check_pair<Q, P>(q: &Q, p: &P, n_samples: usize) -> Result<()>
where
    Q: BatchDistribution + ?Sized,
    P: BatchDistribution + ?Sized,
{
    if n_samples == 0 {
        return Err(Error::Validation("n_samples must be > 0".to_string()));
    }
    check_len("prior", q.batch_len(), p.batch_len())
}

/// `log q(z) - log p(z)` per element.
fn log_ratio<Q, P>(q: &Q, p: &P, z: &[f32]) -> Result<Vec<f64>>
where
    Q: BatchDistribution + ?Sized,
    P: BatchDistribution + ?Sized,
{
    let lq = q.log_prob(z)?;
    let lp = p.log_prob(z)?;
    Ok(lq.iter().zip(&lp).map(|(&a, &b)| a as f64 - b as f64).collect())
}

/// Per-element Monte Carlo estimate of `KL(q || p) = E_q[log q - log p]`.
pub fn kl_divergence_mc<Q, P>(
    q: &Q,
    p: &P,
    n_samples: usize,
    rng: &mut dyn RngCore,
) -> Result<Vec<f32>>
where
    Q: BatchDistribution + ?Sized,
    P: BatchDistribution + ?Sized,
{
    check_pair(q, p, n_samples)?;
    let mut acc = vec![0.0f64; q.batch_len()];
    for _ in 0..n_samples {
        let z = q.sample(rng);
        for (a, r) in acc.iter_mut().zip(log_ratio(q, p, &z)?) {
            *a += r;
        }
    }
    let inv = 1.0 / n_samples as f64;
    Ok(acc.into_iter().map(|a| (a * inv) as f32).collect())
}

/// Estimate the ELBO of surrogate posterior `q` under prior `p`.
///
/// `log_likelihood` receives one posterior sample (one amplitude per reflection) and
/// returns the total data log-likelihood for it. A non-finite result is a computation
/// error.
pub fn estimate_elbo<Q, P, F>(
    q: &Q,
    p: &P,
    n_samples: usize,
    rng: &mut dyn RngCore,
    mut log_likelihood: F,
) -> Result<ElboEstimate>
where
    Q: BatchDistribution + ?Sized,
    P: BatchDistribution + ?Sized,
    F: FnMut(&[f32]) -> Result<f64>,
{
    check_pair(q, p, n_samples)?;
    let mut ll = 0.0;
    let mut kl = 0.0;
    for _ in 0..n_samples {
        let z = q.sample(rng);
        ll += log_likelihood(&z)?;
        kl += log_ratio(q, p, &z)?.iter().sum::<f64>();
    }
    let inv = 1.0 / n_samples as f64;
    let (ll, kl) = (ll * inv, kl * inv);
    let elbo = ll - kl;
    tracing::debug!(n_samples, expected_log_likelihood = ll, kl, elbo, "elbo estimate");
    if !elbo.is_finite() {
        return Err(Error::Computation(format!(
            "non-finite ELBO (expected log-likelihood {}, kl {})",
            ll, kl
        )));
    }
    Ok(ElboEstimate { expected_log_likelihood: ll, kl, elbo, n_samples })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use sf_prob::{Normal, RiceWoolfson};

    #[test]
    fn test_kl_of_identical_distributions_is_zero() {
        let q = Normal::new(vec![1.0, 2.0], vec![0.5, 1.5]).unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(0);
        let kl = kl_divergence_mc(&q, &q, 10, &mut rng).unwrap();
        assert_eq!(kl, vec![0.0, 0.0]);
    }

    #[test]
    fn test_kl_matches_normal_closed_form() {
        // KL(N(m1,s1) || N(m2,s2)) = ln(s2/s1) + (s1^2 + (m1-m2)^2)/(2 s2^2) - 1/2
        let (m1, s1, m2, s2) = (1.0f64, 0.5f64, 0.0f64, 1.0f64);
        let q = Normal::new(vec![m1 as f32], vec![s1 as f32]).unwrap();
        let p = Normal::new(vec![m2 as f32], vec![s2 as f32]).unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        let kl = kl_divergence_mc(&q, &p, 50_000, &mut rng).unwrap();
        let exact = (s2 / s1).ln() + (s1 * s1 + (m1 - m2).powi(2)) / (2.0 * s2 * s2) - 0.5;
        assert_relative_eq!(kl[0] as f64, exact, epsilon = 0.02);
    }

    #[test]
    fn test_estimate_elbo_bookkeeping() {
        let q = RiceWoolfson::new(vec![2.0, 3.0], vec![0.5, 0.5], vec![true, false]).unwrap();
        let p = Normal::new(vec![2.0, 3.0], vec![1.0, 1.0]).unwrap();
        let mut calls = 0;
        let mut rng = rand::rngs::StdRng::seed_from_u64(2);
        let est = estimate_elbo(&q, &p, 8, &mut rng, |z| {
            calls += 1;
            assert_eq!(z.len(), 2);
            Ok(-1.0)
        })
        .unwrap();
        assert_eq!(calls, 8);
        assert_eq!(est.n_samples, 8);
        assert_relative_eq!(est.expected_log_likelihood, -1.0);
        assert_relative_eq!(est.elbo, est.expected_log_likelihood - est.kl);
        assert_relative_eq!(est.loss(), -est.elbo);
    }

    #[test]
    fn test_errors() {
        let q = Normal::new(vec![0.0, 1.0], vec![1.0, 1.0]).unwrap();
        let p = Normal::new(vec![0.0], vec![1.0]).unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        assert!(matches!(kl_divergence_mc(&q, &p, 4, &mut rng), Err(Error::ShapeMismatch { .. })));
        assert!(matches!(kl_divergence_mc(&q, &q, 0, &mut rng), Err(Error::Validation(_))));
        let nan = estimate_elbo(&q, &q, 2, &mut rng, |_| Ok(f64::NAN));
        assert!(matches!(nan, Err(Error::Computation(_))));
        let failing = estimate_elbo(&q, &q, 2, &mut rng, |_| {
            Err(Error::Computation("scaling model diverged".into()))
        });
        assert!(failing.is_err());
    }
}
