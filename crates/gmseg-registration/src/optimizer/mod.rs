//! Derivative-free optimizers for rigid alignment.
//!
//! The label-mismatch cost is piecewise constant in the transform
//! parameters, so gradient-based optimizers are inapplicable. Searches
//! live behind the [`DirectSearch`] trait so the exact direct-search
//! algorithm can be swapped without touching the aligner or the
//! groupwise loop.

pub mod nelder_mead;
pub mod trait_;

pub use nelder_mead::NelderMead;
pub use trait_::DirectSearch;
