//! Finite difference utilities for gradient verification.
//!
//! [`GradCheck`] compares the gradients produced by reverse propagation
//! against central finite differences of a plain `f64` version of the same
//! function.

use crate::variable::Var;

/// Compute gradients using central finite differences.
///
/// Returns `[df/dx_0, df/dx_1, ...]` evaluated at `point`.
///
/// ```
/// use tapegrad::finite_diff_grad;
///
/// let f = |v: &[f64]| v[0] * v[0] + v[1] * v[1];
/// let grads = finite_diff_grad(f, &[3.0, 4.0], 1e-6);
///
/// assert!((grads[0] - 6.0).abs() < 1e-5);
/// assert!((grads[1] - 8.0).abs() < 1e-5);
/// ```
pub fn finite_diff_grad<F>(f: F, point: &[f64], step: f64) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    let mut perturbed = point.to_vec();
    let mut grads = Vec::with_capacity(point.len());

    for i in 0..point.len() {
        perturbed[i] = point[i] + step;
        let f_plus = f(&perturbed);

        perturbed[i] = point[i] - step;
        let f_minus = f(&perturbed);

        perturbed[i] = point[i];
        grads.push((f_plus - f_minus) / (2.0 * step));
    }

    grads
}

/// Step size and tolerances for [`GradCheck::check`].
///
/// An analytic gradient `g` passes when the finite difference estimate lies
/// within `abs_tol + rel_tol * |g|` of it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradCheck {
    pub step: f64,
    pub abs_tol: f64,
    pub rel_tol: f64,
}

impl Default for GradCheck {
    fn default() -> Self {
        Self {
            step: 1e-6,
            abs_tol: 1e-8,
            rel_tol: 1e-4,
        }
    }
}

/// Outcome of one gradient check.
#[derive(Debug, Clone, PartialEq)]
pub struct GradReport {
    /// Gradients from reverse propagation, one per input.
    pub analytic: Vec<f64>,
    /// Central finite difference estimates, one per input.
    pub numeric: Vec<f64>,
    /// Largest absolute difference between the two.
    pub max_error: f64,
    pub passed: bool,
}

impl GradCheck {
    pub fn with_step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    pub fn with_abs_tol(mut self, abs_tol: f64) -> Self {
        self.abs_tol = abs_tol;
        self
    }

    pub fn with_rel_tol(mut self, rel_tol: f64) -> Self {
        self.rel_tol = rel_tol;
        self
    }

    /// Checks `f_var` against `f_f64` at `point`.
    ///
    /// Both closures must compute the same function. `f_var` receives one fresh
    /// leaf per coordinate and its result is seeded with 1.0.
    pub fn check<F, G>(&self, f_f64: F, f_var: G, point: &[f64]) -> GradReport
    where
        F: Fn(&[f64]) -> f64,
        G: Fn(&[Var]) -> Var,
    {
        let inputs: Vec<Var> = point.iter().copied().map(Var::new).collect();
        f_var(&inputs).backward();
        let analytic: Vec<f64> = inputs.iter().map(Var::grad).collect();
        let numeric = finite_diff_grad(f_f64, point, self.step);

        let mut max_error = 0.0_f64;
        let mut passed = true;
        for (a, n) in analytic.iter().zip(&numeric) {
            let error = (a - n).abs();
            max_error = max_error.max(error);
            // NaN never compares as within tolerance
            passed &= error <= self.abs_tol + self.rel_tol * a.abs();
        }

        log::debug!(
            "gradient check over {} inputs: max error {:e}, passed {}",
            point.len(),
            max_error,
            passed
        );

        GradReport {
            analytic,
            numeric,
            max_error,
            passed,
        }
    }
}
