//! Metric trait for label-slice alignment costs.

use burn::tensor::backend::Backend;
use gmseg_core::{RigidParams, Slice};

use crate::error::{RegistrationError, Result};

/// Cost metric between a fixed label slice and a rigidly-moved one.
///
/// Metrics score the disagreement between a reference (consensus) slice
/// and a moving label slice after the candidate transform is applied.
/// Lower values indicate better alignment.
pub trait LabelMetric<B: Backend> {
    /// Evaluate the cost on flat row-major buffers.
    ///
    /// This is the hot path of the direct search: callers extract the
    /// pixel buffers once per alignment and re-evaluate per candidate.
    ///
    /// # Arguments
    /// * `fixed` - Reference pixels
    /// * `moving` - Moving pixels, resampled internally with `params`
    /// * `shape` - The shared slice shape as `[rows, cols]`
    /// * `params` - Candidate rigid parameters
    fn evaluate_buffers(
        &self,
        fixed: &[f32],
        moving: &[f32],
        shape: [usize; 2],
        params: &RigidParams,
    ) -> f64;

    /// Evaluate the cost between two slices.
    ///
    /// # Errors
    /// Returns [`RegistrationError::ShapeMismatch`] when the slices do
    /// not share one shape.
    fn evaluate(&self, fixed: &Slice<B>, moving: &Slice<B>, params: &RigidParams) -> Result<f64> {
        if fixed.shape() != moving.shape() {
            return Err(RegistrationError::shape_mismatch(
                fixed.shape(),
                moving.shape(),
            ));
        }
        Ok(self.evaluate_buffers(&fixed.to_vec(), &moving.to_vec(), fixed.shape(), params))
    }

    /// Get the name of this metric.
    fn name(&self) -> &'static str;
}
