//! Pipeline configuration.
//!
//! Configuration is an explicit value passed into constructors; there is
//! no process-wide state. Verbosity is not configured here; callers
//! install whatever `tracing` subscriber they want.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration for one segmentation-model pipeline run.
///
/// A plain value the caller assembles once and then threads into the
/// individual pipeline stages; no stage takes the whole struct. The
/// caller feeds `retention` to the appearance-model fit, consults
/// `split_data` when deciding whether to run the left/right split over
/// the dataset, and hands `path_dictionary` / `include_ground_truth`
/// to whatever loads the atlases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Location of the atlas dictionary on disk (consumed by the external
    /// loader, carried here so one value describes a full run).
    pub path_dictionary: PathBuf,
    /// Whether ground-truth gray-matter labels are loaded alongside the
    /// images.
    pub include_ground_truth: bool,
    /// Whether each slice is split into mirrored left/right halves to
    /// enlarge the dataset.
    pub split_data: bool,
    /// Fraction of total variance the appearance model must retain.
    pub retention: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path_dictionary: PathBuf::new(),
            include_ground_truth: false,
            split_data: true,
            retention: 0.8,
        }
    }
}

impl Config {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the dictionary location.
    pub fn with_dictionary(mut self, path: impl Into<PathBuf>) -> Self {
        self.path_dictionary = path.into();
        self
    }

    /// Enable or disable ground-truth label loading.
    pub fn with_ground_truth(mut self, include: bool) -> Self {
        self.include_ground_truth = include;
        self
    }

    /// Enable or disable left/right splitting.
    pub fn with_split(mut self, split: bool) -> Self {
        self.split_data = split;
        self
    }

    /// Set the variance retention ratio for the appearance model.
    pub fn with_retention(mut self, retention: f64) -> Self {
        self.retention = retention;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::new();
        assert!(!config.include_ground_truth);
        assert!(config.split_data);
        assert_eq!(config.retention, 0.8);
    }

    #[test]
    fn test_builder() {
        let config = Config::new()
            .with_dictionary("/data/dictionary")
            .with_ground_truth(true)
            .with_split(false)
            .with_retention(0.9);
        assert_eq!(config.path_dictionary, PathBuf::from("/data/dictionary"));
        assert!(config.include_ground_truth);
        assert!(!config.split_data);
        assert_eq!(config.retention, 0.9);
    }
}
