//! Centric-aware structure-factor posterior.
//!
//! Acentric reflections follow a Rice distribution and centric reflections a
//! Folded-Normal ("Woolfson") distribution. The centric flag is an observed covariate
//! fixed at construction: every statistic is computed densely for both families and then
//! selected elementwise. Densities are the selected family's own density, with no
//! renormalization across the two branches.

use rand::RngCore;
use sf_core::types::{check_len, select};
use sf_core::{BatchDistribution, Error, Result};

use crate::{F32_EPS, FoldedNormal, Rice};

/// Hybrid Rice / Folded-Normal batch selected per element by the centric mask.
#[derive(Debug, Clone)]
pub struct RiceWoolfson {
    centric: Vec<bool>,
    woolfson: FoldedNormal,
    rice: Rice,
    eps: f32,
}

impl RiceWoolfson {
    /// Create a batch from equal-length `loc`, `scale` and `centric`.
    pub fn new(loc: Vec<f32>, scale: Vec<f32>, centric: Vec<bool>) -> Result<Self> {
        let n = loc.len();
        check_len("scale", n, scale.len())?;
        check_len("centric", n, centric.len())?;
        let woolfson = FoldedNormal::new(loc.clone(), scale.clone())?;
        let rice = Rice::new(loc, scale)?;
        Ok(Self { centric, woolfson, rice, eps: F32_EPS })
    }

    /// Replace the positive floor added to centric samples (default `f32::EPSILON`).
    pub fn with_epsilon(mut self, eps: f32) -> Result<Self> {
        if !eps.is_finite() || eps < 0.0 {
            return Err(Error::Validation(format!("epsilon must be finite and >= 0, got {}", eps)));
        }
        self.eps = eps;
        Ok(self)
    }

    /// Centric mask.
    pub fn centric(&self) -> &[bool] {
        &self.centric
    }

    /// Location parameters.
    pub fn loc(&self) -> &[f32] {
        self.woolfson.loc()
    }

    /// Scale parameters.
    pub fn scale(&self) -> &[f32] {
        self.woolfson.scale()
    }

    /// Floor added to centric samples.
    pub fn epsilon(&self) -> f32 {
        self.eps
    }

    /// The Folded-Normal family evaluated over the whole batch.
    pub fn woolfson(&self) -> &FoldedNormal {
        &self.woolfson
    }

    /// The Rice family evaluated over the whole batch.
    pub fn rice(&self) -> &Rice {
        &self.rice
    }

    fn pick(&self, centric: Vec<f32>, acentric: Vec<f32>) -> Vec<f32> {
        select(&self.centric, &centric, &acentric)
    }
}

impl BatchDistribution for RiceWoolfson {
    fn name(&self) -> &str {
        "RiceWoolfson"
    }

    fn batch_len(&self) -> usize {
        self.centric.len()
    }

    fn mean(&self) -> Vec<f32> {
        self.pick(self.woolfson.mean(), self.rice.mean())
    }

    fn variance(&self) -> Vec<f32> {
        self.pick(self.woolfson.variance(), self.rice.variance())
    }

    fn stddev(&self) -> Vec<f32> {
        self.pick(self.woolfson.stddev(), self.rice.stddev())
    }

    fn log_prob(&self, x: &[f32]) -> Result<Vec<f32>> {
        Ok(self.pick(self.woolfson.log_prob(x)?, self.rice.log_prob(x)?))
    }

    fn prob(&self, x: &[f32]) -> Result<Vec<f32>> {
        Ok(self.pick(self.woolfson.prob(x)?, self.rice.prob(x)?))
    }

    fn sample(&self, rng: &mut dyn RngCore) -> Vec<f32> {
        let eps = self.eps;
        let centric: Vec<f32> = self.woolfson.sample(rng).into_iter().map(|f| f + eps).collect();
        let acentric = self.rice.sample(rng);
        self.pick(centric, acentric)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn params() -> (Vec<f32>, Vec<f32>) {
        (vec![0.0, 0.3, 1.0, 2.5, 10.0, 40.0], vec![1.0, 0.5, 2.0, 0.7, 3.0, 1.5])
    }

    #[test]
    fn test_all_centric_equals_folded_normal() {
        let (loc, scale) = params();
        let n = loc.len();
        let rw = RiceWoolfson::new(loc.clone(), scale.clone(), vec![true; n]).unwrap();
        let fnorm = FoldedNormal::new(loc, scale).unwrap();
        let x = vec![0.0, 0.1, 1.0, 2.0, 9.0, 41.0];
        assert_eq!(rw.mean(), fnorm.mean());
        assert_eq!(rw.variance(), fnorm.variance());
        assert_eq!(rw.stddev(), fnorm.stddev());
        assert_eq!(rw.log_prob(&x).unwrap(), fnorm.log_prob(&x).unwrap());
        assert_eq!(rw.prob(&x).unwrap(), fnorm.prob(&x).unwrap());
    }

    #[test]
    fn test_all_acentric_equals_rice() {
        let (loc, scale) = params();
        let n = loc.len();
        let rw = RiceWoolfson::new(loc.clone(), scale.clone(), vec![false; n]).unwrap();
        let rice = Rice::new(loc, scale).unwrap();
        let x = vec![0.5, 0.1, 1.0, 2.0, 9.0, 41.0];
        assert_eq!(rw.mean(), rice.mean());
        assert_eq!(rw.variance(), rice.variance());
        assert_eq!(rw.log_prob(&x).unwrap(), rice.log_prob(&x).unwrap());
        assert_eq!(rw.prob(&x).unwrap(), rice.prob(&x).unwrap());
    }

    #[test]
    fn test_mixed_batch_selects_per_element() {
        let (loc, scale) = params();
        let centric = vec![true, false, false, true, false, true];
        let rw = RiceWoolfson::new(loc.clone(), scale.clone(), centric.clone()).unwrap();
        let fnorm = FoldedNormal::new(loc.clone(), scale.clone()).unwrap();
        let rice = Rice::new(loc, scale).unwrap();
        let x = vec![0.4, 0.2, 1.5, 2.4, 11.0, 39.0];

        let (m, mf, mr) = (rw.mean(), fnorm.mean(), rice.mean());
        let (lp, lpf, lpr) =
            (rw.log_prob(&x).unwrap(), fnorm.log_prob(&x).unwrap(), rice.log_prob(&x).unwrap());
        for i in 0..centric.len() {
            let (want_m, want_lp) = if centric[i] { (mf[i], lpf[i]) } else { (mr[i], lpr[i]) };
            assert_eq!(m[i], want_m, "mean at {}", i);
            assert_eq!(lp[i], want_lp, "log_prob at {}", i);
        }
    }

    #[test]
    fn test_centric_samples_strictly_positive() {
        // loc = 0 puts most of the folded mass right at zero.
        let n = 64;
        let rw = RiceWoolfson::new(vec![0.0; n], vec![1e-3; n], vec![true; n]).unwrap();
        for draw in rw.sample_seeded(2_000, 17) {
            assert!(draw.iter().all(|&f| f > 0.0));
            assert!(rw.log_prob(&draw).unwrap().iter().all(|lp| lp.is_finite()));
        }
    }

    #[test]
    fn test_zero_epsilon_disables_floor() {
        let rw = RiceWoolfson::new(vec![0.0], vec![1.0], vec![true]).unwrap().with_epsilon(0.0).unwrap();
        assert_eq!(rw.epsilon(), 0.0);
        assert!(RiceWoolfson::new(vec![0.0], vec![1.0], vec![true]).unwrap().with_epsilon(-1.0).is_err());
    }

    #[test]
    fn test_sample_mean_tracks_selected_family() {
        let rw = RiceWoolfson::new(vec![1.0, 1.0], vec![1.0, 1.0], vec![true, false]).unwrap();
        let draws = rw.sample_seeded(20_000, 4);
        let n = draws.len() as f64;
        let m0 = draws.iter().map(|d| d[0] as f64).sum::<f64>() / n;
        let m1 = draws.iter().map(|d| d[1] as f64).sum::<f64>() / n;
        assert_relative_eq!(m0, crate::folded_normal::mean(1.0, 1.0), epsilon = 0.03);
        assert_relative_eq!(m1, crate::rice::mean(1.0, 1.0), epsilon = 0.03);
    }

    #[test]
    fn test_shape_mismatch_fails_fast() {
        assert!(matches!(
            RiceWoolfson::new(vec![1.0, 2.0], vec![1.0, 1.0], vec![true]),
            Err(Error::ShapeMismatch { .. })
        ));
        assert!(RiceWoolfson::new(vec![1.0, 2.0], vec![1.0], vec![true, false]).is_err());
        let rw = RiceWoolfson::new(vec![1.0], vec![1.0], vec![false]).unwrap();
        assert!(rw.log_prob(&[1.0, 2.0]).is_err());
    }
}
