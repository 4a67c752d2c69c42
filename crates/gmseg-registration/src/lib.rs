pub mod aligner;
pub mod consensus;
pub mod error;
pub mod groupwise;
pub mod metric;
pub mod optimizer;

pub use aligner::RigidAligner;
pub use consensus::ConsensusEstimator;
pub use error::{RegistrationError, Result};
pub use groupwise::{
    CoregisteredDataset, CoregistrationOutcome, GroupwiseCoregistration, MAX_COREGISTRATION_PASSES,
};
pub use metric::{LabelMetric, LabelMismatch};
pub use optimizer::{DirectSearch, NelderMead};
