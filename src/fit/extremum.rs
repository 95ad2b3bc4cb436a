//! Extremum lookup on a fitted curve.

use crate::domain::{CriticalPoint, ModelKind};
use crate::error::CurveError;

/// Locate the critical point of `model` at the fitted parameters.
///
/// `query_x` only selects the branch of periodic models; the quadratic has one
/// vertex and ignores it. Degenerate curves (zero leading coefficient, zero
/// frequency) and any non-finite result are reported as
/// [`CurveError::Degenerate`].
pub fn locate(model: ModelKind, fitted: &[f64], query_x: f64) -> Result<CriticalPoint, CurveError> {
    model.check_arity(fitted)?;

    let degenerate = match model {
        ModelKind::Sine if fitted[1] == 0.0 => Some("zero angular frequency"),
        ModelKind::Poly if fitted[0] == 0.0 => Some("zero quadratic coefficient"),
        _ => None,
    };
    if let Some(reason) = degenerate {
        return Err(CurveError::Degenerate {
            model,
            reason: reason.to_string(),
        });
    }

    let point = model.critical_point(query_x, fitted);
    if !point.is_finite() {
        return Err(CurveError::Degenerate {
            model,
            reason: format!("non-finite critical point ({}, {})", point.x, point.value),
        });
    }
    Ok(point)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn poly_extremum_is_the_vertex() {
        let cp = locate(ModelKind::Poly, &[-10.0, 15.0, 5.0], 1.0).unwrap();
        assert_abs_diff_eq!(cp.x, 0.75, epsilon = 1e-12);
        assert_abs_diff_eq!(cp.value, 10.625, epsilon = 1e-12);
    }

    #[test]
    fn sine_extremum_uses_query_bucket() {
        let ps = [10.0, 2.0, 0.0, 0.025];
        // Midpoint of the default plot range falls in bucket 0.
        let cp = locate(ModelKind::Sine, &ps, 1.0).unwrap();
        assert_abs_diff_eq!(cp.x, std::f64::consts::FRAC_PI_4, epsilon = 1e-12);
        assert_abs_diff_eq!(cp.value, 10.0, epsilon = 1e-12);
    }

    #[test]
    fn degenerate_poly_is_signalled() {
        let err = locate(ModelKind::Poly, &[0.0, 2.0, 1.0], 0.0).unwrap_err();
        assert!(matches!(err, CurveError::Degenerate { model: ModelKind::Poly, .. }));
    }

    #[test]
    fn degenerate_sine_is_signalled() {
        let err = locate(ModelKind::Sine, &[10.0, 0.0, 0.0, 0.025], 1.0).unwrap_err();
        assert!(matches!(err, CurveError::Degenerate { model: ModelKind::Sine, .. }));
    }

    #[test]
    fn non_finite_parameters_are_degenerate() {
        let err = locate(ModelKind::Poly, &[1.0, f64::NAN, 1.0], 0.0).unwrap_err();
        assert!(matches!(err, CurveError::Degenerate { .. }));
    }

    #[test]
    fn wrong_arity_is_rejected() {
        assert!(matches!(
            locate(ModelKind::Poly, &[1.0, 2.0], 0.0),
            Err(CurveError::ArityMismatch { .. })
        ));
    }
}
