//! Closed-form least squares for models that are linear in their parameters.
//!
//! The quadratic model `a·x² + b·x + c` is linear in `[a, b, c]`, so its
//! least-squares optimum can be computed directly:
//!
//! ```text
//! minimize ‖X p − y‖²,   X_i = [x_i², x_i, 1]
//! ```
//!
//! The simplex fitter never uses this; it exists so a run can show how close the
//! derivative-free search got to the exact optimum.

use nalgebra::{DMatrix, DVector};

use crate::domain::{ModelKind, Params, SampleSet};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    // Tall design matrices are fine for SVD; QR::solve expects square systems.
    let svd = x.clone().svd(true, true);

    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Exact least-squares parameters for `model`, or `None` if the model is not
/// linear in its parameters or there are fewer samples than parameters.
pub fn linear_reference(samples: &SampleSet, model: ModelKind) -> Option<Params> {
    if !model.is_linear() || samples.len() < model.arity() {
        return None;
    }

    let p = model.arity();
    let n = samples.len();
    let mut x = DMatrix::<f64>::zeros(n, p);
    for (i, &xi) in samples.xs.iter().enumerate() {
        let row = model.design_row(xi)?;
        for (j, v) in row.into_iter().enumerate() {
            x[(i, j)] = v;
        }
    }
    let y = DVector::from_column_slice(&samples.ys);

    solve_least_squares(&x, &y).map(|beta| beta.iter().copied().collect())
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert_abs_diff_eq!(beta[0], 2.0, epsilon = 1e-10);
        assert_abs_diff_eq!(beta[1], 3.0, epsilon = 1e-10);
    }

    #[test]
    fn linear_reference_recovers_exact_quadratic() {
        let truth = [-10.0, 15.0, 5.0];
        let xs: Vec<f64> = (0..=10).map(|i| i as f64 * 0.2).collect();
        let ys: Vec<f64> = xs.iter().map(|&x| ModelKind::Poly.evaluate(x, &truth)).collect();
        let samples = SampleSet::new(xs, ys).unwrap();

        let params = linear_reference(&samples, ModelKind::Poly).unwrap();
        for (got, want) in params.iter().zip(truth.iter()) {
            assert_abs_diff_eq!(*got, *want, epsilon = 1e-8);
        }
    }

    #[test]
    fn linear_reference_skips_nonlinear_and_underdetermined() {
        let samples = SampleSet::new(vec![0.0, 1.0], vec![1.0, 2.0]).unwrap();
        assert!(linear_reference(&samples, ModelKind::Sine).is_none());
        assert!(linear_reference(&samples, ModelKind::Poly).is_none());
    }
}
