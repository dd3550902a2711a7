//! # sf-core
//!
//! Shared building blocks for the structure-factor merging crates:
//! - the crate-wide [`Error`] / [`Result`] types
//! - the [`BatchDistribution`] capability set consumed by the merging driver
//! - batch shape helpers (length checks, scalar broadcast, mask select)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use traits::BatchDistribution;
