//! Cost metrics for label-based rigid alignment.

pub mod label_mismatch;
pub mod trait_;

pub use label_mismatch::LabelMismatch;
pub use trait_::LabelMetric;
