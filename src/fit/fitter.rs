//! Nonlinear least-squares fitting for a single model.
//!
//! Given samples `(x_i, y_i)`, a model `f(x; p)` and a starting point `p0`, we
//! minimize
//!
//! ```text
//! SSE(p) = Σ (f(x_i; p) − y_i)²
//! ```
//!
//! with argmin's Nelder-Mead simplex. No gradients and no bounds: the model is
//! only ever evaluated.

use argmin::core::{CostFunction, Error as ArgminError, Executor, State, TerminationReason, TerminationStatus};
use argmin::solver::neldermead::NelderMead;
use tracing::{debug, info};

use crate::domain::{FitResult, ModelKind, Params, SampleSet};
use crate::error::CurveError;

pub const DEFAULT_MAX_ITERS: u64 = 10_000;
pub const DEFAULT_SD_TOLERANCE: f64 = 1e-10;

/// Relative offset of each extra simplex vertex from the starting point.
const SIMPLEX_REL_STEP: f64 = 0.05;
/// Absolute offset used instead when a coordinate of the starting point is zero.
const SIMPLEX_ZERO_STEP: f64 = 0.00025;

/// Optimizer settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOptions {
    /// Iteration cap. Reaching it is reported as a failed fit.
    pub max_iters: u64,
    /// The simplex is converged once the standard deviation of its vertex
    /// costs drops below this.
    pub sd_tolerance: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            max_iters: DEFAULT_MAX_ITERS,
            sd_tolerance: DEFAULT_SD_TOLERANCE,
        }
    }
}

/// Sum of squared residuals of `model` at `params` over `samples`.
pub fn sum_of_squares(model: ModelKind, samples: &SampleSet, params: &[f64]) -> f64 {
    samples
        .points()
        .map(|(x, y)| {
            let r = model.evaluate(x, params) - y;
            r * r
        })
        .sum()
}

/// argmin objective. Owns its data so the executor has no borrowed state.
struct SumOfSquares {
    model: ModelKind,
    samples: SampleSet,
}

impl CostFunction for SumOfSquares {
    type Param = Params;
    type Output = f64;

    fn cost(&self, params: &Self::Param) -> Result<Self::Output, ArgminError> {
        let sse = sum_of_squares(self.model, &self.samples, params);
        // Non-finite costs would poison the vertex ordering; treat them as "very bad".
        Ok(if sse.is_finite() { sse } else { f64::MAX })
    }
}

/// Fit `model` to `samples` starting from `initial_guess`.
pub fn fit_model(
    samples: &SampleSet,
    model: ModelKind,
    initial_guess: &[f64],
    opts: &FitOptions,
) -> Result<FitResult, CurveError> {
    if samples.is_empty() || samples.xs.len() != samples.ys.len() {
        return Err(CurveError::InvalidSamples {
            xs: samples.xs.len(),
            ys: samples.ys.len(),
        });
    }
    model.check_arity(initial_guess)?;
    if initial_guess.iter().any(|v| !v.is_finite()) {
        return Err(CurveError::InvalidConfig(format!(
            "initial guess for {model} must be finite"
        )));
    }

    let solver = NelderMead::new(initial_simplex(initial_guess))
        .with_sd_tolerance(opts.sd_tolerance)
        .map_err(|e| optimizer_error(model, e))?;
    let problem = SumOfSquares {
        model,
        samples: samples.clone(),
    };

    debug!(%model, guess = ?initial_guess, max_iters = opts.max_iters, "starting simplex fit");
    let result = Executor::new(problem, solver)
        .configure(|state| state.max_iters(opts.max_iters))
        .run()
        .map_err(|e| optimizer_error(model, e))?;

    let state = result.state();
    let iterations = state.get_iter();
    let termination = accepted_termination(model, iterations, state.get_termination_status())?;

    let params = state
        .get_best_param()
        .cloned()
        .ok_or_else(|| CurveError::Optimizer {
            model,
            message: "solver returned no parameters".to_string(),
        })?;

    let sse = sum_of_squares(model, samples, &params);
    if !sse.is_finite() || params.iter().any(|p| !p.is_finite()) {
        return Err(CurveError::Optimizer {
            model,
            message: "solver converged to a non-finite point".to_string(),
        });
    }
    let rmse = (sse / samples.len() as f64).sqrt();

    info!(%model, ?params, sse, iterations, "fit converged");
    Ok(FitResult {
        model,
        params,
        sse,
        rmse,
        iterations,
        termination,
    })
}

/// Success only for a converged simplex or a reached target cost; the
/// returned label names the reason.
fn accepted_termination(
    model: ModelKind,
    iterations: u64,
    status: &TerminationStatus,
) -> Result<String, CurveError> {
    match status {
        TerminationStatus::Terminated(
            reason @ (TerminationReason::SolverConverged | TerminationReason::TargetCostReached),
        ) => Ok(format!("{reason:?}")),
        TerminationStatus::Terminated(reason) => Err(CurveError::NotConverged {
            model,
            iterations,
            reason: format!("{reason:?}"),
        }),
        TerminationStatus::NotTerminated => Err(CurveError::NotConverged {
            model,
            iterations,
            reason: "not terminated".to_string(),
        }),
    }
}

/// Starting point plus one vertex per coordinate.
fn initial_simplex(guess: &[f64]) -> Vec<Params> {
    let mut vertices = Vec::with_capacity(guess.len() + 1);
    vertices.push(guess.to_vec());
    for i in 0..guess.len() {
        let mut vertex = guess.to_vec();
        vertex[i] = if vertex[i] == 0.0 {
            SIMPLEX_ZERO_STEP
        } else {
            vertex[i] * (1.0 + SIMPLEX_REL_STEP)
        };
        vertices.push(vertex);
    }
    vertices
}

fn optimizer_error(model: ModelKind, err: ArgminError) -> CurveError {
    CurveError::Optimizer {
        model,
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    use super::*;
    use crate::data::SampleGenerator;
    use crate::domain::GenerationConfig;
    use crate::math::linear_reference;

    const POLY_TRUTH: [f64; 3] = [-10.0, 15.0, 5.0];

    fn poly_samples(x_noise: f64, y_noise: f64, seed: u64) -> SampleSet {
        let config = GenerationConfig {
            truth: ModelKind::Poly,
            params: POLY_TRUTH.to_vec(),
            x_noise,
            y_noise,
            origin: 0.0,
            span: 2.0,
            steps: 10,
        };
        SampleGenerator::seeded(seed).generate(&config).unwrap()
    }

    #[test]
    fn zero_noise_poly_fit_recovers_truth() {
        let samples = poly_samples(0.0, 0.0, 1);
        let fit = fit_model(&samples, ModelKind::Poly, &[-1.0, 1.0, 1.0], &FitOptions::default()).unwrap();

        for (got, want) in fit.params.iter().zip(POLY_TRUTH.iter()) {
            assert_abs_diff_eq!(*got, *want, epsilon = 1e-3);
        }
        assert!(fit.sse < 1e-6, "sse={}", fit.sse);
        assert_eq!(fit.model, ModelKind::Poly);
    }

    #[test]
    fn noisy_poly_fit_stays_close_to_truth() {
        let samples = poly_samples(0.001, 0.01, 11);
        let fit = fit_model(&samples, ModelKind::Poly, &[-1.0, 1.0, 1.0], &FitOptions::default()).unwrap();

        for (got, want) in fit.params.iter().zip(POLY_TRUTH.iter()) {
            assert_relative_eq!(*got, *want, max_relative = 0.05);
        }
    }

    #[test]
    fn simplex_agrees_with_closed_form_solution() {
        // Poly fitted to noisy sine data, as in the default run.
        let samples = SampleGenerator::seeded(2024)
            .generate(&GenerationConfig::default())
            .unwrap();
        let fit = fit_model(&samples, ModelKind::Poly, &[-10.0, 15.0, 5.0], &FitOptions::default()).unwrap();
        let exact = linear_reference(&samples, ModelKind::Poly).unwrap();

        for (got, want) in fit.params.iter().zip(exact.iter()) {
            assert_abs_diff_eq!(*got, *want, epsilon = 1e-2);
        }
        assert!(fit.sse <= sum_of_squares(ModelKind::Poly, &samples, &exact) + 1e-6);
    }

    #[test]
    fn zero_noise_sine_fit_from_truth_stays_at_truth() {
        let config = GenerationConfig {
            x_noise: 0.0,
            y_noise: 0.0,
            ..GenerationConfig::default()
        };
        let samples = SampleGenerator::seeded(5).generate(&config).unwrap();
        let fit = fit_model(&samples, ModelKind::Sine, &config.params, &FitOptions::default()).unwrap();

        for (got, want) in fit.params.iter().zip(config.params.iter()) {
            assert_abs_diff_eq!(*got, *want, epsilon = 1e-2);
        }
        assert!(fit.rmse < 1e-3);
    }

    #[test]
    fn iteration_cap_is_a_typed_failure() {
        let samples = poly_samples(0.0, 0.0, 1);
        let opts = FitOptions {
            max_iters: 3,
            ..FitOptions::default()
        };
        let err = fit_model(&samples, ModelKind::Poly, &[-1.0, 1.0, 1.0], &opts).unwrap_err();
        assert!(matches!(err, CurveError::NotConverged { model: ModelKind::Poly, .. }), "{err}");
    }

    #[test]
    fn termination_label_follows_the_solver_reason() {
        let converged = TerminationStatus::Terminated(TerminationReason::SolverConverged);
        assert_eq!(accepted_termination(ModelKind::Poly, 10, &converged).unwrap(), "SolverConverged");

        let target = TerminationStatus::Terminated(TerminationReason::TargetCostReached);
        assert_eq!(accepted_termination(ModelKind::Poly, 10, &target).unwrap(), "TargetCostReached");

        let capped = TerminationStatus::Terminated(TerminationReason::MaxItersReached);
        assert!(matches!(
            accepted_termination(ModelKind::Sine, 10, &capped),
            Err(CurveError::NotConverged { iterations: 10, .. })
        ));
        assert!(accepted_termination(ModelKind::Sine, 0, &TerminationStatus::NotTerminated).is_err());
    }

    #[test]
    fn wrong_guess_length_is_rejected_before_fitting() {
        let samples = poly_samples(0.0, 0.0, 1);
        let err = fit_model(&samples, ModelKind::Sine, &[1.0, 2.0, 3.0], &FitOptions::default()).unwrap_err();
        assert!(matches!(err, CurveError::ArityMismatch { expected: 4, got: 3, .. }));
    }

    #[test]
    fn empty_samples_are_rejected() {
        let samples = SampleSet { xs: vec![], ys: vec![] };
        let err = fit_model(&samples, ModelKind::Poly, &[1.0, 1.0, 1.0], &FitOptions::default()).unwrap_err();
        assert!(matches!(err, CurveError::InvalidSamples { .. }));
    }

    #[test]
    fn initial_simplex_perturbs_each_coordinate() {
        let simplex = initial_simplex(&[2.0, 0.0]);
        assert_eq!(simplex.len(), 3);
        assert_eq!(simplex[0], vec![2.0, 0.0]);
        assert_abs_diff_eq!(simplex[1][0], 2.1, epsilon = 1e-12);
        assert_eq!(simplex[2], vec![2.0, SIMPLEX_ZERO_STEP]);
    }
}
