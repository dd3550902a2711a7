//! Batch shape helpers.
//!
//! Every batch quantity is a flat `[f32]` with one entry per reflection.

use crate::{Error, Result};

/// Fail unless `got == expected`.
pub fn check_len(what: &str, expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(Error::ShapeMismatch { what: what.to_string(), expected, got });
    }
    Ok(())
}

/// Broadcast a length-1 array to length `n`; a length-`n` array passes through.
///
/// Any other length is a shape mismatch. Scalars are the only accepted broadcast.
pub fn broadcast(what: &str, values: Vec<f32>, n: usize) -> Result<Vec<f32>> {
    match values.len() {
        len if len == n => Ok(values),
        1 => Ok(vec![values[0]; n]),
        got => Err(Error::ShapeMismatch { what: what.to_string(), expected: n, got }),
    }
}

/// Elementwise `mask[i] ? on_true[i] : on_false[i]`.
///
/// All three slices must already have the same length.
pub fn select(mask: &[bool], on_true: &[f32], on_false: &[f32]) -> Vec<f32> {
    debug_assert_eq!(mask.len(), on_true.len());
    debug_assert_eq!(mask.len(), on_false.len());
    mask.iter().zip(on_true.iter().zip(on_false)).map(|(&m, (&t, &f))| if m { t } else { f }).collect()
}
