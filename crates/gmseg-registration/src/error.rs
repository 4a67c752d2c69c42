//! Error types for registration operations.

use thiserror::Error;

/// Main error type for registration operations.
#[derive(Error, Debug)]
pub enum RegistrationError {
    /// Shape mismatch between slices participating in one alignment.
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: [usize; 2],
        actual: [usize; 2],
    },

    /// Consensus or coregistration requested on an empty slice set.
    #[error("Cannot register an empty slice set")]
    EmptyInput,

    /// Coregistration requested on a dataset loaded without ground truth.
    #[error("Atlas {index} has no label slice; load the dictionary with ground truth")]
    MissingLabels { index: usize },

    /// Error bubbled up from the core data model.
    #[error(transparent)]
    Core(#[from] gmseg_core::CoreError),
}

/// Result type for registration operations.
pub type Result<T> = std::result::Result<T, RegistrationError>;

impl RegistrationError {
    /// Create a shape mismatch error.
    pub fn shape_mismatch(expected: [usize; 2], actual: [usize; 2]) -> Self {
        Self::ShapeMismatch { expected, actual }
    }
}
