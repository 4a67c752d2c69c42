//! Rigid alignment of one label slice to a consensus map.

use std::marker::PhantomData;

use burn::tensor::backend::Backend;
use gmseg_core::{RigidParams, Slice};

use crate::error::{RegistrationError, Result};
use crate::metric::{LabelMetric, LabelMismatch};
use crate::optimizer::{DirectSearch, NelderMead};

/// Finds the rigid transform aligning a label slice to a consensus map.
///
/// The aligner minimizes the metric's mismatch cost with a derivative-free
/// search starting from the identity transform. No bounds are imposed on
/// the parameters; out-of-range candidates are penalized implicitly by the
/// geometric clamp of the scatter resampler, which drops pixels that leave
/// the grid. The search result is accepted as-is, so a local optimum is a
/// possible (and tolerated) outcome.
pub struct RigidAligner<B: Backend, M = LabelMismatch, S = NelderMead> {
    metric: M,
    search: S,
    _backend: PhantomData<B>,
}

impl<B: Backend> RigidAligner<B> {
    /// Create an aligner with the default label-mismatch metric and
    /// Nelder-Mead search.
    pub fn new() -> Self {
        Self::with_strategy(LabelMismatch::new(), NelderMead::new())
    }
}

impl<B: Backend> Default for RigidAligner<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B, M, S> RigidAligner<B, M, S>
where
    B: Backend,
    M: LabelMetric<B>,
    S: DirectSearch,
{
    /// Create an aligner from an explicit metric and search strategy.
    pub fn with_strategy(metric: M, search: S) -> Self {
        Self {
            metric,
            search,
            _backend: PhantomData,
        }
    }

    /// Estimate the rigid transform aligning `moving` to `consensus`.
    ///
    /// # Errors
    /// Returns [`RegistrationError::ShapeMismatch`] when the slices do
    /// not share one shape.
    pub fn align(&self, consensus: &Slice<B>, moving: &Slice<B>) -> Result<RigidParams> {
        if consensus.shape() != moving.shape() {
            return Err(RegistrationError::shape_mismatch(
                consensus.shape(),
                moving.shape(),
            ));
        }

        let shape = moving.shape();
        let fixed_buf = consensus.to_vec();
        let moving_buf = moving.to_vec();

        let mut cost = |p: &[f64; 3]| {
            self.metric
                .evaluate_buffers(&fixed_buf, &moving_buf, shape, &RigidParams::from_array(*p))
        };
        let best = self
            .search
            .minimize(&mut cost, RigidParams::identity().to_array());
        Ok(RigidParams::from_array(best))
    }
}
