//! Error types for appearance-model operations.

use thiserror::Error;

/// Main error type for appearance-model operations.
#[derive(Error, Debug)]
pub enum ModelError {
    /// Shape mismatch between an input slice and the model's grid.
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: [usize; 2],
        actual: [usize; 2],
    },

    /// A model was requested from an empty image set.
    #[error("Cannot build an appearance model from an empty image set")]
    EmptyDataset,

    /// Similarity weights were requested before any target projection.
    #[error("No target has been projected into the appearance model")]
    MissingProjection,
}

/// Result type for appearance-model operations.
pub type Result<T> = std::result::Result<T, ModelError>;

impl ModelError {
    /// Create a shape mismatch error.
    pub fn shape_mismatch(expected: [usize; 2], actual: [usize; 2]) -> Self {
        Self::ShapeMismatch { expected, actual }
    }
}
