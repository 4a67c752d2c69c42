//! Demo of the full segmentation-model pipeline on synthetic slices:
//! groupwise coregistration, PCA appearance model, similarity weighting.
//!
//! Run with: cargo run --example pipeline_demo

use burn_ndarray::NdArray;
use gmseg_core::{Atlas, Config, Slice, SliceDataset};
use gmseg_model::{AppearanceModel, SimilarityWeighter};
use gmseg_registration::GroupwiseCoregistration;

type B = NdArray<f32>;

const SHAPE: [usize; 2] = [21, 21];

fn gaussian_blob(center: [f32; 2], radius: f32) -> Vec<f32> {
    let mut values = Vec::with_capacity(SHAPE[0] * SHAPE[1]);
    for i in 0..SHAPE[0] {
        for j in 0..SHAPE[1] {
            let di = i as f32 - center[0];
            let dj = j as f32 - center[1];
            values.push((-(di * di + dj * dj) / (2.0 * radius * radius)).exp());
        }
    }
    values
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = Config::new().with_retention(0.8).with_split(false);
    let device = Default::default();

    // Synthetic dictionary: blobs of varying position and width.
    let specs: [([f32; 2], f32); 5] = [
        ([10.0, 10.0], 3.0),
        ([11.0, 10.0], 3.0),
        ([10.0, 11.0], 2.5),
        ([9.0, 10.0], 3.5),
        ([10.0, 9.0], 3.0),
    ];
    let atlases = specs
        .iter()
        .map(|(center, radius)| {
            let image_values = gaussian_blob(*center, *radius);
            let label_values: Vec<f32> = image_values
                .iter()
                .map(|v| if *v > 0.2 { 1.0 } else { 0.0 })
                .collect();
            let image = Slice::<B>::from_vec(image_values, SHAPE, &device).unwrap();
            let label = Slice::<B>::from_vec(label_values, SHAPE, &device).unwrap();
            Atlas::new(image, Some(label)).unwrap()
        })
        .collect();
    let dataset = SliceDataset::new(atlases).unwrap();

    let coregistered = GroupwiseCoregistration::<B>::new()
        .run(&dataset)
        .expect("coregistration failed");
    println!("coregistration outcome: {:?}", coregistered.outcome);
    for (j, transform) in coregistered.transforms.iter().enumerate() {
        println!(
            "  atlas {j}: tx={:+.3} ty={:+.3} theta={:+.4}",
            transform.tx, transform.ty, transform.theta
        );
    }

    let model = AppearanceModel::fit(&coregistered.images, config.retention)
        .expect("model fit failed");
    println!(
        "appearance model: {} components over {} atlases",
        model.retained(),
        model.atlas_count()
    );

    let target = Slice::<B>::from_vec(gaussian_blob([10.5, 10.0], 3.0), SHAPE, &device).unwrap();
    let mut weighter = SimilarityWeighter::new(&model);
    weighter.project_target(&target).expect("projection failed");

    let stats = weighter.stats().expect("weights failed");
    println!("beta: {:.4?}", stats.beta.as_slice());
    println!("beta sum: {:.6}", stats.beta.sum());
}
