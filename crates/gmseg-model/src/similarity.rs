//! Similarity weighting of a target against the atlas dictionary.

use burn::tensor::backend::Backend;
use gmseg_core::Slice;
use nalgebra::{DMatrix, DVector};

use crate::appearance::AppearanceModel;
use crate::error::{ModelError, Result};

/// Decay constant of the similarity kernel.
///
/// Deliberately small: subspace distance has a gentle effect on the
/// weights rather than a sharp cutoff.
pub const DEFAULT_TAU: f64 = 0.005;

/// Similarity statistics for one projected target.
#[derive(Debug, Clone)]
pub struct SimilarityStats {
    /// Normalized kernel weight per atlas; sums to 1.
    pub beta: DVector<f64>,
    /// Weighted mean coordinate, `omega * beta`.
    pub mu: DVector<f64>,
    /// Per-atlas weighted deviation from the mean coordinate,
    /// accumulated over the retained components. Feeds the downstream
    /// Gaussian-likelihood label-fusion step.
    pub sigma: DVector<f64>,
}

/// Projects a target into the appearance subspace and weights every
/// atlas by its kernel similarity to the target.
///
/// Weights and statistics are ephemeral: they are recomputed for each
/// projected target and never cached across targets.
pub struct SimilarityWeighter<'m> {
    model: &'m AppearanceModel,
    tau: f64,
    target_coord: Option<DVector<f64>>,
}

impl<'m> SimilarityWeighter<'m> {
    /// Create a weighter over a fitted appearance model.
    pub fn new(model: &'m AppearanceModel) -> Self {
        Self {
            model,
            tau: DEFAULT_TAU,
            target_coord: None,
        }
    }

    /// Override the kernel decay constant.
    pub fn with_tau(mut self, tau: f64) -> Self {
        self.tau = tau;
        self
    }

    /// Project a target image and store its subspace coordinate.
    ///
    /// The target must already be coregistered to the common groupwise
    /// space.
    ///
    /// # Errors
    /// Returns [`ModelError::ShapeMismatch`] when the target does not
    /// match the model's grid.
    pub fn project_target<B: Backend>(&mut self, target: &Slice<B>) -> Result<&DVector<f64>> {
        let coord = self.model.project(target)?;
        self.target_coord = Some(coord);
        Ok(self.target_coord.as_ref().expect("just stored"))
    }

    /// The stored target coordinate, if a target has been projected.
    pub fn target_coord(&self) -> Option<&DVector<f64>> {
        self.target_coord.as_ref()
    }

    /// Normalized similarity weights `beta`, one per atlas.
    ///
    /// `beta_j = exp(-tau * ||omega_j - coord||) / Z`, with `Z` the
    /// partition function enforcing a unit sum. Every weight is strictly
    /// positive since the kernel is an exponential of a finite distance.
    ///
    /// # Errors
    /// Returns [`ModelError::MissingProjection`] when no target has been
    /// projected; weights are never silently defaulted to uniform.
    pub fn beta(&self) -> Result<DVector<f64>> {
        let coord = self
            .target_coord
            .as_ref()
            .ok_or(ModelError::MissingProjection)?;
        Ok(kernel_weights(self.model.omega(), coord, self.tau))
    }

    /// Full similarity statistics for the projected target.
    ///
    /// # Errors
    /// Returns [`ModelError::MissingProjection`] when no target has been
    /// projected.
    pub fn stats(&self) -> Result<SimilarityStats> {
        let beta = self.beta()?;
        let omega = self.model.omega();
        let mu = omega * &beta;

        let mut sigma = DVector::<f64>::zeros(omega.ncols());
        for j in 0..omega.ncols() {
            let deviation: f64 = omega
                .column(j)
                .iter()
                .zip(mu.iter())
                .map(|(component, mean)| component - mean)
                .sum();
            sigma[j] = beta[j] * deviation;
        }

        Ok(SimilarityStats { beta, mu, sigma })
    }
}

fn kernel_weights(omega: &DMatrix<f64>, coord: &DVector<f64>, tau: f64) -> DVector<f64> {
    let mut weights = DVector::<f64>::zeros(omega.ncols());
    for j in 0..omega.ncols() {
        let distance = (omega.column(j) - coord).norm();
        weights[j] = (-tau * distance).exp();
    }
    let partition: f64 = weights.sum();
    weights / partition
}
