pub mod appearance;
pub mod error;
pub mod similarity;

pub use appearance::AppearanceModel;
pub use error::{ModelError, Result};
pub use similarity::{SimilarityStats, SimilarityWeighter, DEFAULT_TAU};
