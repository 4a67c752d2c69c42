//! Error types for core data-model operations.

use thiserror::Error;

/// Main error type for core operations.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Shape mismatch between slices that must share a grid.
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: [usize; 2],
        actual: [usize; 2],
    },

    /// A dataset-level operation was requested on an empty dataset.
    #[error("Dataset is empty")]
    EmptyDataset,

    /// Left/right splitting requires an odd number of rows.
    #[error("Left/right split requires an odd number of rows, got {rows}")]
    SplitRequiresOddRows { rows: usize },
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Create a shape mismatch error.
    pub fn shape_mismatch(expected: [usize; 2], actual: [usize; 2]) -> Self {
        Self::ShapeMismatch { expected, actual }
    }
}
