//! Groupwise consensus-based coregistration.
//!
//! Fixed-point iteration: every atlas label is rigidly aligned to the
//! current consensus, the consensus is recomputed from the aligned
//! labels, and the process repeats until the consensus reproduces itself
//! exactly or the pass cap is hit. Both terminal states yield usable
//! transforms; only convergence is silent.

use burn::tensor::backend::Backend;
use gmseg_core::transform::apply_rigid;
use gmseg_core::{RigidParams, Slice, SliceDataset};

use crate::aligner::RigidAligner;
use crate::consensus::ConsensusEstimator;
use crate::error::{RegistrationError, Result};
use crate::metric::{LabelMetric, LabelMismatch};
use crate::optimizer::{DirectSearch, NelderMead};

/// Hard cap on fixed-point passes over the dataset.
pub const MAX_COREGISTRATION_PASSES: usize = 15;

/// Terminal state of the groupwise fixed point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoregistrationOutcome {
    /// The consensus reproduced itself exactly after this many passes.
    Converged { passes: usize },
    /// The pass cap was reached first; the last transforms are still
    /// returned and usable, but degraded.
    MaxPassesReached,
}

impl CoregistrationOutcome {
    /// Whether the fixed point stabilized before the pass cap.
    pub fn is_converged(&self) -> bool {
        matches!(self, Self::Converged { .. })
    }
}

/// The frozen result of a groupwise coregistration.
///
/// Transforms, common-space slices, and the final consensus are indexed
/// like the source dataset. The input dataset itself is never mutated.
#[derive(Debug, Clone)]
pub struct CoregisteredDataset<B: Backend> {
    /// Per-atlas rigid transform into the common groupwise space.
    pub transforms: Vec<RigidParams>,
    /// Atlas images mapped into common space.
    pub images: Vec<Slice<B>>,
    /// Atlas labels mapped into common space.
    pub labels: Vec<Slice<B>>,
    /// Final consensus label map.
    pub consensus: Slice<B>,
    /// How the fixed point terminated.
    pub outcome: CoregistrationOutcome,
}

/// Orchestrates consensus estimation and per-atlas rigid alignment.
pub struct GroupwiseCoregistration<B: Backend, M = LabelMismatch, S = NelderMead> {
    aligner: RigidAligner<B, M, S>,
    consensus: ConsensusEstimator,
}

impl<B: Backend> GroupwiseCoregistration<B> {
    /// Create a coregistration with the default aligner.
    pub fn new() -> Self {
        Self::with_aligner(RigidAligner::new())
    }
}

impl<B: Backend> Default for GroupwiseCoregistration<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B, M, S> GroupwiseCoregistration<B, M, S>
where
    B: Backend,
    M: LabelMetric<B>,
    S: DirectSearch,
{
    /// Create a coregistration around an explicit aligner.
    pub fn with_aligner(aligner: RigidAligner<B, M, S>) -> Self {
        Self {
            aligner,
            consensus: ConsensusEstimator::new(),
        }
    }

    /// Run the fixed-point coregistration over a labeled dataset.
    ///
    /// Every pass re-estimates each atlas transform from the *original*
    /// label slice against the current consensus, so each frozen
    /// transform maps the untransformed atlas straight into common space
    /// and applies identically to the image and the label.
    ///
    /// # Errors
    /// Returns [`RegistrationError::MissingLabels`] when any atlas lacks
    /// a label slice.
    pub fn run(&self, dataset: &SliceDataset<B>) -> Result<CoregisteredDataset<B>> {
        let labels = collect_labels(dataset)?;

        let mut chi = self.consensus.estimate(&labels)?;
        let mut transforms = vec![RigidParams::identity(); labels.len()];
        let mut outcome = CoregistrationOutcome::MaxPassesReached;

        for pass in 1..=MAX_COREGISTRATION_PASSES {
            let mut moved = Vec::with_capacity(labels.len());
            for (transform, label) in transforms.iter_mut().zip(&labels) {
                *transform = self.aligner.align(&chi, label)?;
                moved.push(apply_rigid(label, transform));
            }

            let new_chi = self.consensus.estimate(&moved)?;
            let stable = new_chi.eq_values(&chi);
            chi = new_chi;

            tracing::info!(pass, stable, "groupwise coregistration pass complete");

            if stable {
                outcome = CoregistrationOutcome::Converged { passes: pass };
                break;
            }
        }

        if !outcome.is_converged() {
            tracing::warn!(
                passes = MAX_COREGISTRATION_PASSES,
                "consensus did not stabilize; using the last computed transforms"
            );
        }

        let mut images = Vec::with_capacity(labels.len());
        let mut moved_labels = Vec::with_capacity(labels.len());
        for (atlas, transform) in dataset.iter().zip(&transforms) {
            images.push(apply_rigid(atlas.image(), transform));
            // Image and label are spatially paired and must move together.
            moved_labels.push(apply_rigid(
                atlas.label().expect("labels were validated above"),
                transform,
            ));
        }

        Ok(CoregisteredDataset {
            transforms,
            images,
            labels: moved_labels,
            consensus: chi,
            outcome,
        })
    }
}

fn collect_labels<B: Backend>(dataset: &SliceDataset<B>) -> Result<Vec<Slice<B>>> {
    dataset
        .iter()
        .enumerate()
        .map(|(index, atlas)| {
            atlas
                .label()
                .cloned()
                .ok_or(RegistrationError::MissingLabels { index })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;
    use gmseg_core::Atlas;

    type B = NdArray<f32>;

    fn atlas_from(label_values: Vec<f32>, shape: [usize; 2]) -> Atlas<B> {
        let device = Default::default();
        let label = Slice::from_vec(label_values.clone(), shape, &device).unwrap();
        let image = Slice::from_vec(label_values, shape, &device).unwrap();
        Atlas::new(image, Some(label)).unwrap()
    }

    fn blob(shape: [usize; 2]) -> Vec<f32> {
        let mut values = vec![0.0f32; shape[0] * shape[1]];
        for i in 4..8 {
            for j in 4..8 {
                values[i * shape[1] + j] = 1.0;
            }
        }
        values
    }

    #[test]
    fn test_identical_atlases_converge_in_one_pass() {
        let shape = [12, 12];
        let atlases = (0..4).map(|_| atlas_from(blob(shape), shape)).collect();
        let dataset = SliceDataset::new(atlases).unwrap();

        let result = GroupwiseCoregistration::<B>::new().run(&dataset).unwrap();

        assert_eq!(result.outcome, CoregistrationOutcome::Converged { passes: 1 });
        for transform in &result.transforms {
            assert_eq!(*transform, RigidParams::identity());
        }
        // Common-space labels reproduce the originals bit for bit.
        for (label, atlas) in result.labels.iter().zip(dataset.iter()) {
            assert!(label.eq_values(atlas.label().unwrap()));
        }
    }

    /// Search stub whose answer flips between two translations on
    /// alternating passes, so the consensus can never reproduce itself.
    struct OscillatingSearch {
        calls: std::cell::Cell<usize>,
        atlases: usize,
    }

    impl DirectSearch for OscillatingSearch {
        fn minimize<const N: usize>(
            &self,
            _cost: &mut dyn FnMut(&[f64; N]) -> f64,
            _start: [f64; N],
        ) -> [f64; N] {
            let pass = self.calls.get() / self.atlases;
            self.calls.set(self.calls.get() + 1);
            let mut out = [0.0f64; N];
            out[0] = if pass % 2 == 0 { 1.0 } else { 2.0 };
            out
        }
    }

    #[test]
    fn test_unstable_consensus_hits_the_pass_cap() {
        let shape = [12, 12];
        let atlases = (0..2).map(|_| atlas_from(blob(shape), shape)).collect();
        let dataset = SliceDataset::new(atlases).unwrap();

        let search = OscillatingSearch {
            calls: std::cell::Cell::new(0),
            atlases: dataset.len(),
        };
        let aligner = RigidAligner::with_strategy(LabelMismatch::new(), search);
        let result = GroupwiseCoregistration::with_aligner(aligner)
            .run(&dataset)
            .unwrap();

        assert_eq!(result.outcome, CoregistrationOutcome::MaxPassesReached);
        assert!(!result.outcome.is_converged());

        // The terminal state still carries one usable transform per atlas,
        // and the common-space slices come from those exact transforms.
        assert_eq!(result.transforms.len(), dataset.len());
        assert_eq!(result.labels.len(), dataset.len());
        for (atlas, (transform, label)) in dataset
            .iter()
            .zip(result.transforms.iter().zip(&result.labels))
        {
            assert_eq!(transform.tx, 1.0);
            assert!(label.eq_values(&apply_rigid(atlas.label().unwrap(), transform)));
        }
    }

    #[test]
    fn test_missing_labels_are_rejected() {
        let device = Default::default();
        let image = Slice::<B>::from_vec(vec![0.0; 4], [2, 2], &device).unwrap();
        let dataset = SliceDataset::new(vec![Atlas::new(image, None).unwrap()]).unwrap();

        let result = GroupwiseCoregistration::<B>::new().run(&dataset);
        assert!(matches!(
            result,
            Err(RegistrationError::MissingLabels { index: 0 })
        ));
    }
}
