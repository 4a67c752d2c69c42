//! End-to-end pipeline: coregistration, appearance model, similarity.

use burn_ndarray::NdArray;
use gmseg_core::{split_slice, Atlas, Slice, SliceDataset};
use gmseg_model::{AppearanceModel, SimilarityWeighter};
use gmseg_registration::GroupwiseCoregistration;

type B = NdArray<f32>;

const SHAPE: [usize; 2] = [15, 15];

fn blob(center: [usize; 2], intensity: f32) -> Vec<f32> {
    let mut values = vec![0.0f32; SHAPE[0] * SHAPE[1]];
    let [ci, cj] = center;
    for i in ci - 2..=ci + 2 {
        for j in cj - 2..=cj + 2 {
            values[i * SHAPE[1] + j] = intensity;
        }
    }
    values
}

fn label_of(values: &[f32]) -> Vec<f32> {
    values.iter().map(|v| if *v > 0.2 { 1.0 } else { 0.0 }).collect()
}

fn dataset() -> SliceDataset<B> {
    let device = Default::default();
    let centers = [[7, 7], [7, 7], [8, 7], [7, 8]];
    let intensities = [1.0, 0.8, 0.9, 0.7];
    let atlases = centers
        .iter()
        .zip(intensities)
        .map(|(center, intensity)| {
            let image_values = blob(*center, intensity);
            let label_values = label_of(&image_values);
            let image = Slice::from_vec(image_values, SHAPE, &device).unwrap();
            let label = Slice::from_vec(label_values, SHAPE, &device).unwrap();
            Atlas::new(image, Some(label)).unwrap()
        })
        .collect();
    SliceDataset::new(atlases).unwrap()
}

#[test]
fn test_full_pipeline_produces_normalized_weights() {
    let device = Default::default();
    let dataset = dataset();

    let coregistered = GroupwiseCoregistration::<B>::new().run(&dataset).unwrap();
    assert_eq!(coregistered.transforms.len(), dataset.len());

    let model = AppearanceModel::fit(&coregistered.images, 0.8).unwrap();
    assert!(!model.is_degenerate());
    assert_eq!(model.atlas_count(), dataset.len());

    let target = Slice::<B>::from_vec(blob([7, 7], 0.95), SHAPE, &device).unwrap();
    let mut weighter = SimilarityWeighter::new(&model);
    weighter.project_target(&target).unwrap();

    let stats = weighter.stats().unwrap();
    assert!((stats.beta.sum() - 1.0).abs() < 1e-12);
    for weight in stats.beta.iter() {
        assert!(*weight > 0.0);
    }
    assert_eq!(stats.mu.len(), model.retained());
    assert_eq!(stats.sigma.len(), dataset.len());
}

#[test]
fn test_split_augmentation_feeds_the_model() {
    let device = Default::default();
    // Odd row count so the left/right split is legal.
    let values: Vec<f32> = (0..15 * 15).map(|i| (i % 7) as f32 / 7.0).collect();
    let slice = Slice::<B>::from_vec(values, SHAPE, &device).unwrap();

    let (left, right) = split_slice(&slice).unwrap();
    assert_eq!(left.shape(), [7, 15]);
    assert_eq!(right.shape(), [7, 15]);

    // The halves double the dataset for the appearance model.
    let model = AppearanceModel::fit(&[left, right], 1.0).unwrap();
    assert_eq!(model.atlas_count(), 2);
}
