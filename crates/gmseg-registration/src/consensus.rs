//! Majority-vote consensus estimation over label slices.

use burn::tensor::backend::Backend;
use gmseg_core::Slice;

use crate::error::{RegistrationError, Result};

/// Values above this threshold count as the positive label when voting.
///
/// Label slices may carry interpolated or partial-volume values after
/// resampling; binarizing before the vote keeps the consensus in `{0, 1}`.
pub const BINARIZE_THRESHOLD: f32 = 0.2;

/// Computes a per-pixel majority-vote reference label map.
///
/// Given J label slices valued in `{0, 1}`, the estimator produces one
/// consensus slice of identical shape. Exact ties go to the background
/// label (label 0 wins when its vote count is >= the alternative's).
#[derive(Debug, Clone, Default)]
pub struct ConsensusEstimator;

impl ConsensusEstimator {
    /// Create a new consensus estimator.
    pub fn new() -> Self {
        Self
    }

    /// Estimate the consensus label map for a set of label slices.
    ///
    /// # Errors
    /// Returns [`RegistrationError::EmptyInput`] for an empty set and
    /// [`RegistrationError::ShapeMismatch`] when the slices do not share
    /// one shape.
    pub fn estimate<B: Backend>(&self, labels: &[Slice<B>]) -> Result<Slice<B>> {
        let first = labels.first().ok_or(RegistrationError::EmptyInput)?;
        let shape = first.shape();
        let device = first.data().device();
        let pixels = shape[0] * shape[1];

        let mut positive_votes = vec![0usize; pixels];
        for label in labels {
            if label.shape() != shape {
                return Err(RegistrationError::shape_mismatch(shape, label.shape()));
            }
            for (votes, value) in positive_votes.iter_mut().zip(label.to_vec()) {
                if value > BINARIZE_THRESHOLD {
                    *votes += 1;
                }
            }
        }

        let total = labels.len();
        let consensus: Vec<f32> = positive_votes
            .into_iter()
            .map(|votes| if total - votes >= votes { 0.0 } else { 1.0 })
            .collect();

        Ok(Slice::from_vec(consensus, shape, &device)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type B = NdArray<f32>;

    fn label(values: Vec<f32>) -> Slice<B> {
        let device = Default::default();
        Slice::from_vec(values, [2, 2], &device).unwrap()
    }

    #[test]
    fn test_obvious_majority() {
        let estimator = ConsensusEstimator::new();
        let labels = vec![
            label(vec![1.0, 0.0, 1.0, 0.0]),
            label(vec![1.0, 0.0, 1.0, 1.0]),
            label(vec![1.0, 0.0, 0.0, 0.0]),
        ];
        let consensus = estimator.estimate(&labels).unwrap();
        assert_eq!(consensus.to_vec(), vec![1.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_exact_tie_prefers_background() {
        let estimator = ConsensusEstimator::new();
        let labels = vec![label(vec![1.0, 1.0, 0.0, 0.0]), label(vec![0.0, 1.0, 0.0, 1.0])];
        let consensus = estimator.estimate(&labels).unwrap();
        // Pixels 0 and 3 are 1-1 ties: background wins.
        assert_eq!(consensus.to_vec(), vec![0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_binarization_threshold() {
        let estimator = ConsensusEstimator::new();
        // 0.3 counts as positive, 0.2 does not (strictly-greater test).
        let labels = vec![label(vec![0.3, 0.2, 0.21, 0.19])];
        let consensus = estimator.estimate(&labels).unwrap();
        assert_eq!(consensus.to_vec(), vec![1.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_empty_input_fails() {
        let estimator = ConsensusEstimator::new();
        let labels: Vec<Slice<B>> = vec![];
        assert!(matches!(
            estimator.estimate(&labels),
            Err(RegistrationError::EmptyInput)
        ));
    }

    #[test]
    fn test_shape_mismatch_fails() {
        let device = Default::default();
        let estimator = ConsensusEstimator::new();
        let labels = vec![
            label(vec![1.0, 0.0, 1.0, 0.0]),
            Slice::<B>::from_vec(vec![1.0, 0.0], [1, 2], &device).unwrap(),
        ];
        assert!(matches!(
            estimator.estimate(&labels),
            Err(RegistrationError::ShapeMismatch { .. })
        ));
    }
}
