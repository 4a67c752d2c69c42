//! PCA appearance model over coregistered atlas images.

use burn::tensor::backend::Backend;
use gmseg_core::Slice;
use nalgebra::{DMatrix, DVector, SymmetricEigen};

use crate::error::{ModelError, Result};

/// Reduced-dimensionality linear appearance subspace.
///
/// Built once from the flattened, coregistered atlas images and immutable
/// afterwards. Stores the mean image, the retained orthonormal basis `W`
/// (one column per principal component) and the projected coordinates of
/// every atlas, `omega` (one column per atlas).
///
/// The eigendecomposition uses the J x J Gram-matrix formulation rather
/// than the P x P covariance, since the number of atlases J is far
/// smaller than the flattened image dimension P. The subspaces are
/// identical; only the numerical conditioning differs.
#[derive(Debug, Clone)]
pub struct AppearanceModel {
    mean: DVector<f64>,
    basis: DMatrix<f64>,
    eigenvalues: DVector<f64>,
    omega: DMatrix<f64>,
    shape: [usize; 2],
}

/// Eigenvalues below this fraction of total variance count as rank loss.
const RANK_EPSILON: f64 = 1e-12;

impl AppearanceModel {
    /// Fit the model to a set of coregistered atlas images.
    ///
    /// Retains the smallest prefix of descending-eigenvalue components
    /// whose cumulative variance fraction reaches `retention` (0.8 keeps
    /// the components explaining at least 80% of total variance).
    ///
    /// A degenerate subspace (zero retained components, e.g. all images
    /// identical) is not an error, but it is reported via a warning and
    /// [`AppearanceModel::is_degenerate`], since similarity weighting on
    /// zero components is statistically meaningless.
    ///
    /// # Errors
    /// Returns [`ModelError::EmptyDataset`] for an empty image set and
    /// [`ModelError::ShapeMismatch`] when the images do not share one
    /// shape.
    pub fn fit<B: Backend>(images: &[Slice<B>], retention: f64) -> Result<Self> {
        let first = images.first().ok_or(ModelError::EmptyDataset)?;
        let shape = first.shape();
        let pixels = shape[0] * shape[1];
        let count = images.len();

        let mut data = DMatrix::<f64>::zeros(pixels, count);
        for (j, image) in images.iter().enumerate() {
            if image.shape() != shape {
                return Err(ModelError::shape_mismatch(shape, image.shape()));
            }
            for (i, value) in image.to_vec().into_iter().enumerate() {
                data[(i, j)] = value as f64;
            }
        }

        let mean = data.column_mean();
        let mut centered = data;
        for mut column in centered.column_iter_mut() {
            column -= &mean;
        }

        // Gram matrix (J x J); shares its nonzero spectrum with the
        // P x P covariance.
        let gram = centered.transpose() * &centered / count as f64;
        let eigen = SymmetricEigen::new(gram);

        let mut order: Vec<usize> = (0..count).collect();
        order.sort_by(|&a, &b| {
            eigen.eigenvalues[b]
                .partial_cmp(&eigen.eigenvalues[a])
                .expect("eigenvalues must not be NaN")
        });

        let total: f64 = eigen.eigenvalues.iter().map(|v| v.max(0.0)).sum();
        let mut kept_indices = Vec::new();
        if total > 0.0 {
            let mut cumulative = 0.0;
            for &idx in &order {
                if cumulative / total >= retention {
                    break;
                }
                let value = eigen.eigenvalues[idx];
                if value <= total * RANK_EPSILON {
                    break;
                }
                cumulative += value;
                kept_indices.push(idx);
            }
        }

        let kept = kept_indices.len();
        let mut basis = DMatrix::<f64>::zeros(pixels, kept);
        let mut eigenvalues = DVector::<f64>::zeros(kept);
        for (k, &idx) in kept_indices.iter().enumerate() {
            // Lift the Gram eigenvector into image space and normalize.
            let direction = &centered * eigen.eigenvectors.column(idx);
            let norm = direction.norm();
            basis.set_column(k, &(direction / norm));
            eigenvalues[k] = eigen.eigenvalues[idx];
        }

        let omega = basis.transpose() * &centered;

        if kept == 0 {
            tracing::warn!(
                atlases = count,
                "appearance subspace is degenerate; no components retained"
            );
        } else {
            tracing::info!(
                atlases = count,
                components = kept,
                retention,
                "appearance model fitted"
            );
        }

        Ok(Self {
            mean,
            basis,
            eigenvalues,
            omega,
            shape,
        })
    }

    /// The mean image as a flattened vector.
    pub fn mean(&self) -> &DVector<f64> {
        &self.mean
    }

    /// The retained orthonormal basis `W` (pixels x components).
    pub fn basis(&self) -> &DMatrix<f64> {
        &self.basis
    }

    /// Eigenvalues of the retained components, descending.
    pub fn eigenvalues(&self) -> &DVector<f64> {
        &self.eigenvalues
    }

    /// Projected atlas coordinates (components x atlases).
    pub fn omega(&self) -> &DMatrix<f64> {
        &self.omega
    }

    /// Number of retained components.
    pub fn retained(&self) -> usize {
        self.basis.ncols()
    }

    /// Number of atlases the model was built from.
    pub fn atlas_count(&self) -> usize {
        self.omega.ncols()
    }

    /// The slice shape the model expects.
    pub fn shape(&self) -> [usize; 2] {
        self.shape
    }

    /// Whether the subspace retained no informative component.
    pub fn is_degenerate(&self) -> bool {
        self.retained() == 0
    }

    /// Project a target image onto the subspace: `W^T (target - mean)`.
    ///
    /// The target must already live in the common groupwise space;
    /// coregistering it there is the caller's concern.
    ///
    /// # Errors
    /// Returns [`ModelError::ShapeMismatch`] when the target does not
    /// match the model's grid.
    pub fn project<B: Backend>(&self, target: &Slice<B>) -> Result<DVector<f64>> {
        if target.shape() != self.shape {
            return Err(ModelError::shape_mismatch(self.shape, target.shape()));
        }
        let flattened =
            DVector::from_iterator(self.mean.len(), target.to_vec().into_iter().map(f64::from));
        Ok(self.basis.transpose() * (flattened - &self.mean))
    }

    /// Reconstruct atlas `j` from its stored coordinate: `mean + W omega_j`.
    pub fn reconstruct(&self, j: usize) -> DVector<f64> {
        &self.mean + &self.basis * self.omega.column(j)
    }
}
