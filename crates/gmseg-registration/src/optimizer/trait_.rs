//! Direct-search trait for derivative-free minimization.

/// Derivative-free minimization strategy.
///
/// Implementations only ever observe cost values, never gradients, so
/// they remain applicable to the piecewise-constant alignment cost.
pub trait DirectSearch {
    /// Minimize `cost` starting from `start`.
    ///
    /// Runs to the strategy's own internal convergence criterion and
    /// returns the best parameters found. The result is accepted as-is
    /// even when the search terminates at a local optimum.
    ///
    /// # Arguments
    /// * `cost` - The objective to minimize
    /// * `start` - Initial parameter vector
    fn minimize<const N: usize>(
        &self,
        cost: &mut dyn FnMut(&[f64; N]) -> f64,
        start: [f64; N],
    ) -> [f64; N];
}
