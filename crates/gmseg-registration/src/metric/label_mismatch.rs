//! Pixel-mismatch (L0) cost between label slices.

use burn::tensor::backend::Backend;
use gmseg_core::transform::resample_buffer;
use gmseg_core::RigidParams;

use super::trait_::LabelMetric;

/// Counts the pixels where the fixed and moved slices disagree.
///
/// This is an L0/Hamming-style norm: piecewise constant in the transform
/// parameters and non-differentiable, which is why alignment uses a
/// derivative-free search rather than a gradient optimizer.
#[derive(Debug, Clone, Default)]
pub struct LabelMismatch;

impl LabelMismatch {
    /// Create a new label-mismatch metric.
    pub fn new() -> Self {
        Self
    }
}

impl<B: Backend> LabelMetric<B> for LabelMismatch {
    fn evaluate_buffers(
        &self,
        fixed: &[f32],
        moving: &[f32],
        shape: [usize; 2],
        params: &RigidParams,
    ) -> f64 {
        let moved = resample_buffer(moving, shape, params);
        fixed
            .iter()
            .zip(&moved)
            .filter(|(a, b)| *a != *b)
            .count() as f64
    }

    fn name(&self) -> &'static str {
        "LabelMismatch"
    }
}
