pub mod config;
pub mod dataset;
pub mod error;
pub mod slice;
pub mod transform;

pub use config::Config;
pub use dataset::{split_slice, Atlas, SliceDataset};
pub use error::{CoreError, Result};
pub use slice::Slice;
pub use transform::RigidParams;
