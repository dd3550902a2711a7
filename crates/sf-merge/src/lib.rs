//! # sf-merge
//!
//! The pieces of variational structure-factor merging that sit between the
//! distribution families in `sf-prob` and an external optimization driver:
//! - [`priors`]: reference-data priors (Laplace / Normal / Student-t) and the Wilson prior
//! - [`config`]: serde-backed merge configuration and prior selection
//! - [`elbo`]: Monte Carlo KL and ELBO estimates over a surrogate posterior
//!
//! Reflection-file parsing, symmetry bookkeeping and the scaling model are the
//! driver's concern; this crate only consumes dense per-reflection arrays.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod elbo;
pub mod priors;

pub use config::{MergeConfig, PriorConfig, ReferenceData, ReflectionMetadata, build_prior};
pub use elbo::{ElboEstimate, estimate_elbo, kl_divergence_mc};
pub use priors::{
    LaplaceReferencePrior, NormalReferencePrior, Prior, PriorKind, StudentTReferencePrior,
    WilsonPrior,
};
