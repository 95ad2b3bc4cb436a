//! Model evaluation for the sine and quadratic families.
//!
//! The fitter relies on two primitive operations per model:
//! - evaluate `y(x)` for a parameter vector (objective, plots)
//! - solve for the critical point the curve reports for a query `x`
//!
//! The free functions index their parameter slice directly; callers validate
//! the length against [`ModelKind::arity`] first.

use std::f64::consts::{FRAC_PI_2, PI};

use crate::domain::{CriticalPoint, ModelKind};
use crate::error::CurveError;

/// `amp · sin(ω·x + φ) · exp(−λ·x²)` with `ps = [amp, ω, φ, λ]`.
pub fn sine_value(x: f64, ps: &[f64]) -> f64 {
    ps[0] * (ps[1] * x + ps[2]).sin() * (-x * x * ps[3]).exp()
}

/// Critical point of the sine carrier on the half-period bucket of `x`.
///
/// With `k = floor(x / π)` the reported position is the root of
/// `cos(ω·x + φ) = 0` on branch `k`, and the reported value is
/// `amp · cos(ω·k + φ)`: the envelope is evaluated at the bucket index, not at
/// the returned position. `ω == 0` yields a non-finite position.
pub fn sine_critical(x: f64, ps: &[f64]) -> CriticalPoint {
    let k = (x / PI).floor();
    CriticalPoint {
        x: (FRAC_PI_2 + 2.0 * k * PI - ps[2]) / ps[1],
        value: ps[0] * (ps[1] * k + ps[2]).cos(),
    }
}

/// `a·x² + b·x + c` with `ps = [a, b, c]`.
pub fn poly_value(x: f64, ps: &[f64]) -> f64 {
    ps[0] * x * x + ps[1] * x + ps[2]
}

/// Vertex of the parabola. The query point is ignored; `a == 0` yields a
/// non-finite position.
pub fn poly_critical(_x: f64, ps: &[f64]) -> CriticalPoint {
    let x = -ps[1] / (2.0 * ps[0]);
    CriticalPoint {
        x,
        value: poly_value(x, ps),
    }
}

impl ModelKind {
    /// Predict `y(x)`.
    ///
    /// # Panics
    /// Panics if `params.len() < self.arity()`. Use [`ModelKind::check_arity`]
    /// on untrusted input.
    pub fn evaluate(self, x: f64, params: &[f64]) -> f64 {
        match self {
            ModelKind::Sine => sine_value(x, params),
            ModelKind::Poly => poly_value(x, params),
        }
    }

    /// Raw critical-point solve; degenerate parameters propagate as inf/NaN.
    ///
    /// # Panics
    /// Panics if `params.len() < self.arity()`.
    pub fn critical_point(self, x: f64, params: &[f64]) -> CriticalPoint {
        match self {
            ModelKind::Sine => sine_critical(x, params),
            ModelKind::Poly => poly_critical(x, params),
        }
    }

    /// Regressors for models that are linear in their parameters.
    pub fn design_row(self, x: f64) -> Option<Vec<f64>> {
        match self {
            ModelKind::Sine => None,
            ModelKind::Poly => Some(vec![x * x, x, 1.0]),
        }
    }

    pub fn check_arity(self, params: &[f64]) -> Result<(), CurveError> {
        if params.len() == self.arity() {
            Ok(())
        } else {
            Err(CurveError::ArityMismatch {
                model: self,
                expected: self.arity(),
                got: params.len(),
            })
        }
    }
}
