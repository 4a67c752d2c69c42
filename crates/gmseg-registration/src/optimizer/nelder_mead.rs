//! Nelder-Mead simplex search.

use super::trait_::DirectSearch;

/// Nelder-Mead downhill simplex minimizer.
///
/// A direct search over an N+1-vertex simplex using the standard
/// reflection/expansion/contraction/shrink moves. Coefficients and
/// termination tolerances follow the common defaults; the initial
/// simplex perturbs zero-valued parameters by a full pixel rather than
/// an infinitesimal step, since the alignment cost is constant on
/// unit-sized plateaus and a sub-pixel simplex would terminate at the
/// start point without ever observing a cost change.
#[derive(Debug, Clone)]
pub struct NelderMead {
    /// Absolute tolerance on vertex spread for termination.
    pub xatol: f64,
    /// Absolute tolerance on cost spread for termination.
    pub fatol: f64,
    /// Maximum iterations; defaults to `200 * N` when `None`.
    pub max_iterations: Option<usize>,
    /// Relative perturbation applied to nonzero start parameters.
    pub nonzero_delta: f64,
    /// Absolute perturbation applied to zero start parameters.
    pub zero_delta: f64,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            xatol: 1e-4,
            fatol: 1e-4,
            max_iterations: None,
            nonzero_delta: 0.05,
            zero_delta: 1.0,
        }
    }
}

impl NelderMead {
    /// Create a search with default tolerances.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the termination tolerances.
    pub fn with_tolerances(mut self, xatol: f64, fatol: f64) -> Self {
        self.xatol = xatol;
        self.fatol = fatol;
        self
    }

    /// Set the iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    /// Set the initial simplex perturbations.
    pub fn with_initial_steps(mut self, nonzero_delta: f64, zero_delta: f64) -> Self {
        self.nonzero_delta = nonzero_delta;
        self.zero_delta = zero_delta;
        self
    }

    fn initial_simplex<const N: usize>(&self, start: [f64; N]) -> Vec<[f64; N]> {
        let mut simplex = Vec::with_capacity(N + 1);
        simplex.push(start);
        for k in 0..N {
            let mut vertex = start;
            if vertex[k] != 0.0 {
                vertex[k] *= 1.0 + self.nonzero_delta;
            } else {
                vertex[k] = self.zero_delta;
            }
            simplex.push(vertex);
        }
        simplex
    }
}

// Standard move coefficients.
const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;

impl DirectSearch for NelderMead {
    fn minimize<const N: usize>(
        &self,
        cost: &mut dyn FnMut(&[f64; N]) -> f64,
        start: [f64; N],
    ) -> [f64; N] {
        let mut simplex = self.initial_simplex(start);
        let mut values: Vec<f64> = simplex.iter().map(|v| cost(v)).collect();
        sort_simplex(&mut simplex, &mut values);

        let max_iterations = self.max_iterations.unwrap_or(200 * N.max(1));
        for _ in 0..max_iterations {
            if self.converged(&simplex, &values) {
                break;
            }

            // Centroid of all vertices but the worst.
            let mut centroid = [0.0f64; N];
            for vertex in &simplex[..N] {
                for (c, x) in centroid.iter_mut().zip(vertex) {
                    *c += x / N as f64;
                }
            }
            let worst = simplex[N];

            let reflected = blend(&centroid, &worst, 1.0 + REFLECTION, -REFLECTION);
            let f_reflected = cost(&reflected);

            if f_reflected < values[0] {
                let expanded = blend(
                    &centroid,
                    &worst,
                    1.0 + REFLECTION * EXPANSION,
                    -REFLECTION * EXPANSION,
                );
                let f_expanded = cost(&expanded);
                if f_expanded < f_reflected {
                    simplex[N] = expanded;
                    values[N] = f_expanded;
                } else {
                    simplex[N] = reflected;
                    values[N] = f_reflected;
                }
            } else if f_reflected < values[N - 1] {
                simplex[N] = reflected;
                values[N] = f_reflected;
            } else {
                let mut shrink = false;
                if f_reflected < values[N] {
                    // Outside contraction.
                    let contracted = blend(
                        &centroid,
                        &worst,
                        1.0 + REFLECTION * CONTRACTION,
                        -REFLECTION * CONTRACTION,
                    );
                    let f_contracted = cost(&contracted);
                    if f_contracted <= f_reflected {
                        simplex[N] = contracted;
                        values[N] = f_contracted;
                    } else {
                        shrink = true;
                    }
                } else {
                    // Inside contraction.
                    let contracted = blend(&centroid, &worst, 1.0 - CONTRACTION, CONTRACTION);
                    let f_contracted = cost(&contracted);
                    if f_contracted < values[N] {
                        simplex[N] = contracted;
                        values[N] = f_contracted;
                    } else {
                        shrink = true;
                    }
                }
                if shrink {
                    let best = simplex[0];
                    for k in 1..=N {
                        let vertex = blend(&best, &simplex[k], 1.0 - SHRINK, SHRINK);
                        values[k] = cost(&vertex);
                        simplex[k] = vertex;
                    }
                }
            }

            sort_simplex(&mut simplex, &mut values);
        }

        simplex[0]
    }
}

impl NelderMead {
    fn converged<const N: usize>(&self, simplex: &[[f64; N]], values: &[f64]) -> bool {
        let x_spread = simplex[1..]
            .iter()
            .flat_map(|vertex| {
                vertex
                    .iter()
                    .zip(&simplex[0])
                    .map(|(a, b)| (a - b).abs())
            })
            .fold(0.0f64, f64::max);
        let f_spread = values[1..]
            .iter()
            .map(|f| (f - values[0]).abs())
            .fold(0.0f64, f64::max);
        x_spread <= self.xatol && f_spread <= self.fatol
    }
}

/// Affine combination `a * wa + b * wb`, componentwise.
fn blend<const N: usize>(a: &[f64; N], b: &[f64; N], wa: f64, wb: f64) -> [f64; N] {
    let mut out = [0.0f64; N];
    for k in 0..N {
        out[k] = a[k] * wa + b[k] * wb;
    }
    out
}

/// Stable sort of vertices by ascending cost; ties keep their order so a
/// start vertex that is already optimal stays in front.
fn sort_simplex<const N: usize>(simplex: &mut [[f64; N]], values: &mut [f64]) {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).expect("cost must not be NaN"));
    let sorted_simplex: Vec<[f64; N]> = order.iter().map(|&i| simplex[i]).collect();
    let sorted_values: Vec<f64> = order.iter().map(|&i| values[i]).collect();
    simplex.copy_from_slice(&sorted_simplex);
    values.copy_from_slice(&sorted_values);
}
