//! 2D slice type backed by tensor data.
//!
//! A [`Slice`] is a single 2D grid extracted from a volume: either an
//! intensity image or a label map. All slices belonging to one dataset
//! share the same shape.

use burn::tensor::backend::Backend;
use burn::tensor::{Tensor, TensorData};

use crate::error::{CoreError, Result};

/// A 2D numeric grid (height x width).
///
/// The same type represents intensity images and label maps; label maps
/// are valued in a finite label set (here `{0, 1}`).
///
/// # Type Parameters
/// * `B` - The backend (CPU or GPU) for tensor operations
#[derive(Debug, Clone)]
pub struct Slice<B: Backend> {
    data: Tensor<B, 2>,
}

impl<B: Backend> Slice<B> {
    /// Create a slice from an existing tensor.
    pub fn new(data: Tensor<B, 2>) -> Self {
        Self { data }
    }

    /// Create a slice from a flat row-major buffer.
    ///
    /// # Arguments
    /// * `values` - Row-major pixel values, `shape[0] * shape[1]` long
    /// * `shape` - The slice shape as `[rows, cols]`
    /// * `device` - Device to create the tensor on
    pub fn from_vec(values: Vec<f32>, shape: [usize; 2], device: &B::Device) -> Result<Self> {
        if values.len() != shape[0] * shape[1] {
            return Err(CoreError::ShapeMismatch {
                expected: shape,
                actual: [values.len(), 1],
            });
        }
        let data = Tensor::<B, 2>::from_data(TensorData::new(values, shape), device);
        Ok(Self { data })
    }

    /// Create a zero-valued slice.
    pub fn zeros(shape: [usize; 2], device: &B::Device) -> Self {
        Self {
            data: Tensor::<B, 2>::zeros(shape, device),
        }
    }

    /// Get the underlying tensor.
    pub fn data(&self) -> &Tensor<B, 2> {
        &self.data
    }

    /// Get the slice shape as `[rows, cols]`.
    pub fn shape(&self) -> [usize; 2] {
        self.data.dims()
    }

    /// Number of pixels in the slice.
    pub fn len(&self) -> usize {
        let [rows, cols] = self.shape();
        rows * cols
    }

    /// Whether the slice holds no pixels.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy the pixel values into a flat row-major buffer.
    pub fn to_vec(&self) -> Vec<f32> {
        self.data
            .clone()
            .into_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .expect("Slice data must convert to f32")
    }

    /// Exact pixelwise equality against another slice.
    ///
    /// Used as the convergence test of the groupwise fixed point, where
    /// consensus maps hold exact `0.0`/`1.0` values.
    pub fn eq_values(&self, other: &Self) -> bool {
        self.shape() == other.shape() && self.to_vec() == other.to_vec()
    }

    /// Validate that another slice shares this slice's shape.
    pub fn check_same_shape(&self, other: &Self) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(CoreError::shape_mismatch(self.shape(), other.shape()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type B = NdArray<f32>;

    #[test]
    fn test_from_vec_roundtrip() {
        let device = Default::default();
        let values = vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let slice = Slice::<B>::from_vec(values.clone(), [2, 3], &device).unwrap();
        assert_eq!(slice.shape(), [2, 3]);
        assert_eq!(slice.to_vec(), values);
    }

    #[test]
    fn test_from_vec_rejects_wrong_length() {
        let device = Default::default();
        let result = Slice::<B>::from_vec(vec![1.0, 2.0], [2, 3], &device);
        assert!(result.is_err());
    }

    #[test]
    fn test_eq_values() {
        let device = Default::default();
        let a = Slice::<B>::from_vec(vec![0.0, 1.0, 1.0, 0.0], [2, 2], &device).unwrap();
        let b = Slice::<B>::from_vec(vec![0.0, 1.0, 1.0, 0.0], [2, 2], &device).unwrap();
        let c = Slice::<B>::from_vec(vec![0.0, 1.0, 0.0, 0.0], [2, 2], &device).unwrap();
        assert!(a.eq_values(&b));
        assert!(!a.eq_values(&c));
    }

    #[test]
    fn test_zeros() {
        let device = Default::default();
        let slice = Slice::<B>::zeros([3, 3], &device);
        assert_eq!(slice.to_vec(), vec![0.0; 9]);
    }
}
