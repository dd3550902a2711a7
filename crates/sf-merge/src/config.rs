//! Merge configuration.
//!
//! Everything the merging driver decides once per training configuration: which prior
//! to attach, how many Monte Carlo samples per step, the RNG seed, and the numeric
//! knobs of the surrogate posterior and truncated-normal sampler.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sf_core::types::check_len;
use sf_core::{BatchDistribution, Error, Result};
use sf_prob::truncated_normal::DEFAULT_CROSSOVER;
use sf_prob::{F32_EPS, RiceWoolfson, TruncatedNormal};

use crate::priors::{
    LaplaceReferencePrior, NormalReferencePrior, Prior, StudentTReferencePrior, WilsonPrior,
};

/// Prior selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PriorConfig {
    /// [`LaplaceReferencePrior`]; needs reference data.
    Laplace,
    /// [`NormalReferencePrior`]; needs reference data.
    Normal,
    /// [`StudentTReferencePrior`]; needs reference data.
    StudentT {
        /// Degrees of freedom (> 0).
        dof: f32,
    },
    /// [`WilsonPrior`].
    Wilson {
        /// Mean intensity `Σ` (> 0).
        #[serde(default = "default_wilson_sigma")]
        sigma: f32,
    },
}

fn default_wilson_sigma() -> f32 {
    1.0
}

impl Default for PriorConfig {
    fn default() -> Self {
        Self::Wilson { sigma: default_wilson_sigma() }
    }
}

/// Top-level merge configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Monte Carlo samples drawn from the surrogate posterior per ELBO estimate.
    pub mc_samples: usize,
    /// RNG seed for reproducible sampling.
    pub seed: u64,
    /// Prior over structure-factor amplitudes.
    pub prior: PriorConfig,
    /// Truncated-normal sampling crossover, in standard deviations.
    pub crossover: f32,
    /// Floor added to centric posterior samples.
    pub centric_epsilon: f32,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            mc_samples: 1,
            seed: 1234,
            prior: PriorConfig::default(),
            crossover: DEFAULT_CROSSOVER as f32,
            centric_epsilon: F32_EPS,
        }
    }
}

impl MergeConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading merge config");
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.mc_samples == 0 {
            return Err(Error::Validation("mc_samples must be > 0".to_string()));
        }
        if !self.crossover.is_finite() || self.crossover <= 0.0 {
            return Err(Error::Validation(format!(
                "crossover must be finite and > 0, got {}",
                self.crossover
            )));
        }
        if !self.centric_epsilon.is_finite() || self.centric_epsilon < 0.0 {
            return Err(Error::Validation(format!(
                "centric_epsilon must be finite and >= 0, got {}",
                self.centric_epsilon
            )));
        }
        match self.prior {
            PriorConfig::StudentT { dof } if !dof.is_finite() || dof <= 0.0 => {
                Err(Error::Validation(format!("student_t dof must be finite and > 0, got {}", dof)))
            }
            PriorConfig::Wilson { sigma } if !sigma.is_finite() || sigma <= 0.0 => {
                Err(Error::Validation(format!("wilson sigma must be finite and > 0, got {}", sigma)))
            }
            _ => Ok(()),
        }
    }

    /// Surrogate posterior with this configuration's centric floor.
    pub fn surrogate_posterior(
        &self,
        loc: Vec<f32>,
        scale: Vec<f32>,
        centric: Vec<bool>,
    ) -> Result<RiceWoolfson> {
        RiceWoolfson::new(loc, scale, centric)?.with_epsilon(self.centric_epsilon)
    }

    /// Truncated normal with this configuration's sampling crossover.
    pub fn truncated_normal(
        &self,
        loc: Vec<f32>,
        scale: Vec<f32>,
        low: Vec<f32>,
        high: Vec<f32>,
    ) -> Result<TruncatedNormal> {
        TruncatedNormal::new(loc, scale, low, high)?.with_crossover(self.crossover)
    }
}

/// Amplitudes and uncertainties from an independent reference dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceData {
    /// Reference amplitudes (`Fobs`).
    pub f_obs: Vec<f32>,
    /// Reference amplitude uncertainties (`SigFobs`).
    pub sig_f_obs: Vec<f32>,
}

/// Per-reflection crystallographic metadata supplied by the driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflectionMetadata {
    /// Centric flag per reflection.
    pub centric: Vec<bool>,
    /// Multiplicity factor `ε` per reflection.
    pub epsilon: Vec<f32>,
}

impl ReflectionMetadata {
    /// Number of reflections.
    pub fn len(&self) -> usize {
        self.centric.len()
    }

    /// `true` when there are no reflections.
    pub fn is_empty(&self) -> bool {
        self.centric.is_empty()
    }
}

/// Construct the configured prior for a set of reflections.
///
/// Reference-data priors fail when `reference` is missing or its length differs from
/// the reflection count.
pub fn build_prior(
    config: &PriorConfig,
    reference: Option<&ReferenceData>,
    metadata: &ReflectionMetadata,
) -> Result<Box<dyn Prior>> {
    check_len("epsilon", metadata.centric.len(), metadata.epsilon.len())?;
    let require_reference = |label: &str| -> Result<ReferenceData> {
        let r = reference.ok_or_else(|| {
            Error::Validation(format!("{} prior requires reference data", label))
        })?;
        check_len("Fobs", metadata.len(), r.f_obs.len())?;
        Ok(r.clone())
    };

    let prior: Box<dyn Prior> = match *config {
        PriorConfig::Laplace => {
            let r = require_reference("laplace")?;
            Box::new(LaplaceReferencePrior::new(r.f_obs, r.sig_f_obs)?)
        }
        PriorConfig::Normal => {
            let r = require_reference("normal")?;
            Box::new(NormalReferencePrior::new(r.f_obs, r.sig_f_obs)?)
        }
        PriorConfig::StudentT { dof } => {
            let r = require_reference("student_t")?;
            Box::new(StudentTReferencePrior::new(r.f_obs, r.sig_f_obs, dof)?)
        }
        PriorConfig::Wilson { sigma } => {
            Box::new(WilsonPrior::new(metadata.centric.clone(), metadata.epsilon.clone(), sigma)?)
        }
    };
    tracing::debug!(kind = ?prior.kind(), n = prior.batch_len(), "prior built");
    Ok(prior)
}
