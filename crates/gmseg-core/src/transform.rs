//! Rigid 2D transform primitive shared by registration and resampling.
//!
//! The resampling here is a forward (scatter) mapping: every source pixel
//! is pushed to a rotated, folded, translated destination index. It is
//! non-bijective by construction: multiple source pixels may collide on
//! one destination cell (last write wins) and destination cells may stay
//! unfilled (holes). Rotated coordinates are folded into the positive
//! quadrant with an absolute value before translation, so this is an
//! approximation of a rigid motion, not a true one, and becomes lossy for
//! large rotation angles. The groupwise fixed point depends on these exact
//! semantics; do not replace this with an inverse/interpolated resampler.

use burn::tensor::backend::Backend;

use crate::slice::Slice;

/// Rigid transform parameters for a single 2D slice.
///
/// One `RigidParams` is owned by each atlas; it is estimated during the
/// groupwise coregistration and then frozen, after which the same
/// parameters map both the atlas image and its label into common space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidParams {
    /// Translation along the first (row) axis, in pixels.
    pub tx: f64,
    /// Translation along the second (column) axis, in pixels.
    pub ty: f64,
    /// Rotation angle in radians.
    pub theta: f64,
}

impl RigidParams {
    /// Create parameters from explicit components.
    pub fn new(tx: f64, ty: f64, theta: f64) -> Self {
        Self { tx, ty, theta }
    }

    /// The identity transform (no translation, no rotation).
    pub fn identity() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// View the parameters as an optimizer-facing array `[tx, ty, theta]`.
    pub fn to_array(&self) -> [f64; 3] {
        [self.tx, self.ty, self.theta]
    }

    /// Build parameters from an optimizer-facing array `[tx, ty, theta]`.
    pub fn from_array(values: [f64; 3]) -> Self {
        Self::new(values[0], values[1], values[2])
    }
}

impl Default for RigidParams {
    fn default() -> Self {
        Self::identity()
    }
}

/// Apply the forward-scatter rigid mapping to a flat row-major buffer.
///
/// For every source pixel `(i, j)` the destination is
/// `(|i cos θ + j sin θ| + tx, |-i sin θ + j cos θ| + ty)`, truncated to
/// integer indices. Pixels landing outside `[0, rows) x [0, cols)` are
/// dropped; unwritten destination cells stay zero.
///
/// # Arguments
/// * `values` - Row-major source pixels, `shape[0] * shape[1]` long
/// * `shape` - The slice shape as `[rows, cols]`
/// * `params` - The rigid parameters to apply
pub fn resample_buffer(values: &[f32], shape: [usize; 2], params: &RigidParams) -> Vec<f32> {
    let [rows, cols] = shape;
    let mut out = vec![0.0f32; values.len()];
    let (sin_t, cos_t) = params.theta.sin_cos();

    for i in 0..rows {
        for j in 0..cols {
            let fi = i as f64;
            let fj = j as f64;
            let x = (fi * cos_t + fj * sin_t).abs() + params.tx;
            let y = (-fi * sin_t + fj * cos_t).abs() + params.ty;
            if x >= 0.0 && y >= 0.0 {
                let (xi, yi) = (x as usize, y as usize);
                if xi < rows && yi < cols {
                    out[xi * cols + yi] = values[i * cols + j];
                }
            }
        }
    }
    out
}

/// Apply the forward-scatter rigid mapping to a slice.
///
/// See [`resample_buffer`] for the exact semantics.
pub fn apply_rigid<B: Backend>(slice: &Slice<B>, params: &RigidParams) -> Slice<B> {
    let shape = slice.shape();
    let device = slice.data().device();
    let moved = resample_buffer(&slice.to_vec(), shape, params);
    Slice::from_vec(moved, shape, &device).expect("resampled buffer matches source shape")
}
