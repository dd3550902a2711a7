//! Probability building blocks for structure-factor merging.
//!
//! This crate hosts the distribution families queried by the variational merging loop:
//! - base families (Normal, Laplace, Student-t) used for reference priors
//! - amplitude families (Rice, Folded-Normal) and the centric-aware [`RiceWoolfson`] hybrid
//! - a truncated normal with a sampler that stays stable for very wide bounds
//! - small numeric helpers (stable log/exp, normal cdf/quantile, scaled Bessel functions)
//!
//! Scalar kernels take and return `f64`; the batch types implementing
//! [`sf_core::BatchDistribution`] store and return `f32`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod folded_normal;
pub mod laplace;
pub mod math;
pub mod normal;
pub mod rice;
pub mod rice_woolfson;
pub mod student_t;
pub mod truncated_normal;

pub use folded_normal::FoldedNormal;
pub use laplace::Laplace;
pub use normal::Normal;
pub use rice::Rice;
pub use rice_woolfson::RiceWoolfson;
pub use student_t::StudentT;
pub use truncated_normal::TruncatedNormal;

/// Machine epsilon of the outward-facing float type.
pub const F32_EPS: f32 = f32::EPSILON;
