//! Atlas dictionary data model.
//!
//! An [`Atlas`] pairs one intensity slice with its (optional) label slice.
//! A [`SliceDataset`] is the ordered, shape-homogeneous collection of
//! atlases the groupwise coregistration and the appearance model are built
//! from. Both are immutable once loaded; the coregistration produces new
//! slices instead of mutating the dataset in place.

use burn::tensor::backend::Backend;

use crate::error::{CoreError, Result};
use crate::slice::Slice;

/// One reference image/label pair from the dictionary.
#[derive(Debug, Clone)]
pub struct Atlas<B: Backend> {
    image: Slice<B>,
    label: Option<Slice<B>>,
}

impl<B: Backend> Atlas<B> {
    /// Create an atlas from an image slice and an optional label slice.
    ///
    /// The label is absent when the dictionary was loaded without ground
    /// truth.
    pub fn new(image: Slice<B>, label: Option<Slice<B>>) -> Result<Self> {
        if let Some(label) = &label {
            image.check_same_shape(label)?;
        }
        Ok(Self { image, label })
    }

    /// The intensity image slice.
    pub fn image(&self) -> &Slice<B> {
        &self.image
    }

    /// The label slice, if ground truth was loaded.
    pub fn label(&self) -> Option<&Slice<B>> {
        self.label.as_ref()
    }
}

/// Ordered collection of atlases sharing one slice shape.
#[derive(Debug, Clone)]
pub struct SliceDataset<B: Backend> {
    atlases: Vec<Atlas<B>>,
    shape: [usize; 2],
}

impl<B: Backend> SliceDataset<B> {
    /// Create a dataset, validating shape homogeneity.
    ///
    /// # Errors
    /// Returns [`CoreError::EmptyDataset`] for an empty collection and
    /// [`CoreError::ShapeMismatch`] when any slice deviates from the
    /// shape of the first atlas.
    pub fn new(atlases: Vec<Atlas<B>>) -> Result<Self> {
        let first = atlases.first().ok_or(CoreError::EmptyDataset)?;
        let shape = first.image().shape();
        for atlas in &atlases {
            if atlas.image().shape() != shape {
                return Err(CoreError::shape_mismatch(shape, atlas.image().shape()));
            }
            if let Some(label) = atlas.label() {
                if label.shape() != shape {
                    return Err(CoreError::shape_mismatch(shape, label.shape()));
                }
            }
        }
        Ok(Self { atlases, shape })
    }

    /// Number of atlases (J).
    pub fn len(&self) -> usize {
        self.atlases.len()
    }

    /// Whether the dataset holds no atlases.
    pub fn is_empty(&self) -> bool {
        self.atlases.is_empty()
    }

    /// The common slice shape.
    pub fn shape(&self) -> [usize; 2] {
        self.shape
    }

    /// Get one atlas by index.
    pub fn get(&self, index: usize) -> Option<&Atlas<B>> {
        self.atlases.get(index)
    }

    /// Iterate over the atlases in order.
    pub fn iter(&self) -> impl Iterator<Item = &Atlas<B>> {
        self.atlases.iter()
    }
}

/// Split a slice into mirrored left/right halves along the row axis.
///
/// The dictionary images are roughly left/right symmetric, so splitting
/// doubles the dataset for the appearance model. The right half is
/// returned with its rows reversed so both halves share one orientation.
/// The shared midline row is dropped, which is why an odd row count is
/// required.
///
/// # Errors
/// Returns [`CoreError::SplitRequiresOddRows`] when the row count is even.
pub fn split_slice<B: Backend>(slice: &Slice<B>) -> Result<(Slice<B>, Slice<B>)> {
    let [rows, cols] = slice.shape();
    if rows % 2 == 0 {
        return Err(CoreError::SplitRequiresOddRows { rows });
    }
    let half = rows / 2;
    let values = slice.to_vec();
    let device = slice.data().device();

    let left: Vec<f32> = values[..half * cols].to_vec();
    let mut right = Vec::with_capacity(half * cols);
    for i in (half + 1..rows).rev() {
        right.extend_from_slice(&values[i * cols..(i + 1) * cols]);
    }

    let left = Slice::from_vec(left, [half, cols], &device)?;
    let right = Slice::from_vec(right, [half, cols], &device)?;
    Ok((left, right))
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type B = NdArray<f32>;

    fn slice_of(values: Vec<f32>, shape: [usize; 2]) -> Slice<B> {
        let device = Default::default();
        Slice::from_vec(values, shape, &device).unwrap()
    }

    #[test]
    fn test_dataset_rejects_empty() {
        assert!(matches!(
            SliceDataset::<B>::new(vec![]),
            Err(CoreError::EmptyDataset)
        ));
    }

    #[test]
    fn test_dataset_rejects_mixed_shapes() {
        let a = Atlas::new(slice_of(vec![0.0; 4], [2, 2]), None).unwrap();
        let b = Atlas::new(slice_of(vec![0.0; 6], [2, 3]), None).unwrap();
        assert!(matches!(
            SliceDataset::new(vec![a, b]),
            Err(CoreError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_atlas_rejects_label_shape_mismatch() {
        let image = slice_of(vec![0.0; 4], [2, 2]);
        let label = slice_of(vec![0.0; 6], [2, 3]);
        assert!(Atlas::new(image, Some(label)).is_err());
    }

    #[test]
    fn test_split_odd_rows() {
        // 5x2 slice; rows are [r0, r1, mid, r3, r4].
        let values = vec![
            0.0, 1.0, //
            2.0, 3.0, //
            9.0, 9.0, //
            4.0, 5.0, //
            6.0, 7.0,
        ];
        let slice = slice_of(values, [5, 2]);
        let (left, right) = split_slice(&slice).unwrap();
        assert_eq!(left.shape(), [2, 2]);
        assert_eq!(right.shape(), [2, 2]);
        assert_eq!(left.to_vec(), vec![0.0, 1.0, 2.0, 3.0]);
        // Right half is mirrored: farthest row first.
        assert_eq!(right.to_vec(), vec![6.0, 7.0, 4.0, 5.0]);
    }

    #[test]
    fn test_split_rejects_even_rows() {
        let slice = slice_of(vec![0.0; 8], [4, 2]);
        assert!(matches!(
            split_slice(&slice),
            Err(CoreError::SplitRequiresOddRows { rows: 4 })
        ));
    }
}
