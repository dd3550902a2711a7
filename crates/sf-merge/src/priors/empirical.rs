//! Priors centered on amplitudes from an independent reference dataset.

use std::f32::consts::SQRT_2;

use sf_core::types::check_len;
use sf_core::{BatchDistribution, Result};
use sf_prob::{Laplace, Normal, StudentT};

use super::{Prior, PriorKind, delegate_batch_distribution};

fn check_reference(f_obs: &[f32], sig_f_obs: &[f32]) -> Result<()> {
    check_len("SigFobs", f_obs.len(), sig_f_obs.len())
}

/// Laplace prior with `loc = Fobs` and `scale = SigFobs / sqrt(2)`.
///
/// The scale transform makes the prior variance equal `SigFobs^2`.
#[derive(Debug, Clone)]
pub struct LaplaceReferencePrior {
    inner: Laplace,
}

impl LaplaceReferencePrior {
    /// Build from reference amplitudes and their uncertainties.
    pub fn new(f_obs: Vec<f32>, sig_f_obs: Vec<f32>) -> Result<Self> {
        check_reference(&f_obs, &sig_f_obs)?;
        let scale = sig_f_obs.into_iter().map(|s| s / SQRT_2).collect();
        let inner = Laplace::new(f_obs, scale)?;
        tracing::debug!(n = inner.batch_len(), "laplace reference prior");
        Ok(Self { inner })
    }

    /// Laplace location (the reference amplitudes).
    pub fn loc(&self) -> &[f32] {
        self.inner.loc()
    }

    /// Laplace scale.
    pub fn scale(&self) -> &[f32] {
        self.inner.scale()
    }
}

delegate_batch_distribution!(LaplaceReferencePrior);

impl Prior for LaplaceReferencePrior {
    fn kind(&self) -> PriorKind {
        PriorKind::LaplaceReference
    }
}

/// Normal prior with `loc = Fobs` and `scale = SigFobs`.
#[derive(Debug, Clone)]
pub struct NormalReferencePrior {
    inner: Normal,
}

impl NormalReferencePrior {
    /// Build from reference amplitudes and their uncertainties.
    pub fn new(f_obs: Vec<f32>, sig_f_obs: Vec<f32>) -> Result<Self> {
        check_reference(&f_obs, &sig_f_obs)?;
        let inner = Normal::new(f_obs, sig_f_obs)?;
        tracing::debug!(n = inner.batch_len(), "normal reference prior");
        Ok(Self { inner })
    }

    /// Normal location (the reference amplitudes).
    pub fn loc(&self) -> &[f32] {
        self.inner.loc()
    }

    /// Normal scale (the reference uncertainties).
    pub fn scale(&self) -> &[f32] {
        self.inner.scale()
    }
}

delegate_batch_distribution!(NormalReferencePrior);

impl Prior for NormalReferencePrior {
    fn kind(&self) -> PriorKind {
        PriorKind::NormalReference
    }
}

/// Student-t prior with `loc = Fobs`, `scale = SigFobs` and fixed degrees of freedom.
#[derive(Debug, Clone)]
pub struct StudentTReferencePrior {
    inner: StudentT,
}

impl StudentTReferencePrior {
    /// Build from reference amplitudes, their uncertainties and `dof > 0`.
    pub fn new(f_obs: Vec<f32>, sig_f_obs: Vec<f32>, dof: f32) -> Result<Self> {
        check_reference(&f_obs, &sig_f_obs)?;
        let inner = StudentT::new(dof, f_obs, sig_f_obs)?;
        tracing::debug!(n = inner.batch_len(), dof, "student-t reference prior");
        Ok(Self { inner })
    }

    /// Student-t location (the reference amplitudes).
    pub fn loc(&self) -> &[f32] {
        self.inner.loc()
    }

    /// Student-t scale (the reference uncertainties).
    pub fn scale(&self) -> &[f32] {
        self.inner.scale()
    }

    /// Degrees of freedom.
    pub fn dof(&self) -> f32 {
        self.inner.dof()
    }
}

delegate_batch_distribution!(StudentTReferencePrior);

impl Prior for StudentTReferencePrior {
    fn kind(&self) -> PriorKind {
        PriorKind::StudentTReference
    }
}
