//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized

use crate::app::pipeline::{ModelOutcome, RunOutput};
use crate::domain::ModelKind;

/// Format the full run summary (generation settings + per-model results).
pub fn format_run_summary(run: &RunOutput) -> String {
    let mut out = String::new();

    out.push_str("=== curvefit - nonlinear fit demo ===\n");
    out.push_str(&format!("Seed: {}\n", run.seed));
    out.push_str(&format!(
        "Generated = {} {}\n",
        run.generation.truth,
        fmt_vec(&run.generation.params)
    ));
    out.push_str(&format!(
        "Samples: n={} | noise x={:.3} y={:.3} | range=[{:.2}, {:.2}] step={:.3}\n",
        run.samples.len(),
        run.generation.x_noise,
        run.generation.y_noise,
        run.generation.origin,
        run.generation.origin + run.generation.span,
        run.generation.step(),
    ));
    out.push_str(&format!("Extremum query x: {:.3}\n", run.query_x));

    for model in &run.models {
        out.push('\n');
        out.push_str(&format_model(model));
    }

    let failures = run.failure_count();
    out.push('\n');
    if failures == 0 {
        out.push_str("All fits and charts succeeded.\n");
    } else {
        out.push_str(&format!("{failures} step(s) failed; see above.\n"));
    }

    out
}

fn format_model(outcome: &ModelOutcome) -> String {
    let model = outcome.target.model;
    let mut out = String::new();

    out.push_str(&format!("[{model}] guess {}\n", fmt_vec(&outcome.target.initial_guess)));
    match &outcome.fit {
        Ok(fit) => {
            out.push_str(&format!("  got ({:>4}) = {}\n", model.name(), fmt_vec(&fit.params)));
            out.push_str(&format!("  {}\n", fmt_named(model, &fit.params)));
            out.push_str(&format!(
                "  SSE={:.6} RMSE={:.6} iterations={}\n",
                fit.sse, fit.rmse, fit.iterations
            ));
        }
        Err(e) => out.push_str(&format!("  FIT FAILED: {e}\n")),
    }

    match &outcome.extremum {
        Some(Ok(cp)) => out.push_str(&format!("  Best: x={:.4} value={:.4}\n", cp.x, cp.value)),
        Some(Err(e)) => out.push_str(&format!("  Best: undefined ({e})\n")),
        None => {}
    }

    if let Some(exact) = &outcome.linear_reference {
        out.push_str(&format!("  closed-form LS = {}\n", fmt_vec(exact)));
    }

    for chart in &outcome.charts {
        match &chart.result {
            Ok(()) => out.push_str(&format!("  {:<4} -> {}\n", chart.stage, chart.path.display())),
            Err(e) => out.push_str(&format!("  {:<4} CHART FAILED: {e}\n", chart.stage)),
        }
    }

    out
}

fn fmt_named(model: ModelKind, values: &[f64]) -> String {
    let parts: Vec<String> = model
        .param_names()
        .iter()
        .zip(values.iter())
        .map(|(name, v)| format!("{name}={v:.4}"))
        .collect();
    parts.join(" ")
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.2}")).collect();
    format!("[{}]", parts.join(" "))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::app::pipeline::StageOutcome;
    use crate::domain::{CriticalPoint, FitResult, FitTarget, GenerationConfig, SampleSet, Stage};
    use crate::error::CurveError;

    fn run_with(models: Vec<ModelOutcome>) -> RunOutput {
        RunOutput {
            seed: 42,
            generation: GenerationConfig::default(),
            samples: SampleSet::new(vec![0.0, 1.0], vec![0.0, 1.0]).unwrap(),
            query_x: 1.0,
            models,
        }
    }

    #[test]
    fn summary_lists_fit_extremum_and_charts() {
        let outcome = ModelOutcome {
            target: FitTarget::reference(ModelKind::Poly),
            fit: Ok(FitResult {
                model: ModelKind::Poly,
                params: vec![-10.0, 15.0, 5.0],
                sse: 0.0,
                rmse: 0.0,
                iterations: 120,
                termination: "SolverConverged".to_string(),
            }),
            extremum: Some(Ok(CriticalPoint { x: 0.75, value: 10.625 })),
            linear_reference: Some(vec![-10.0, 15.0, 5.0]),
            charts: vec![StageOutcome {
                stage: Stage::Raw,
                path: PathBuf::from("testdata/raw_poly.svg"),
                result: Ok(()),
            }],
        };
        let text = format_run_summary(&run_with(vec![outcome]));

        assert!(text.contains("Seed: 42"));
        assert!(text.contains("Generated = sine [10.00 2.00 0.00 0.03]"));
        assert!(text.contains("got (poly) = [-10.00 15.00 5.00]"));
        assert!(text.contains("a=-10.0000 b=15.0000 c=5.0000"));
        assert!(text.contains("Best: x=0.7500"));
        assert!(text.contains("closed-form LS"));
        assert!(text.contains("raw  -> testdata/raw_poly.svg"));
        assert!(text.contains("All fits and charts succeeded."));
    }

    #[test]
    fn summary_reports_failures_per_model_and_stage() {
        let outcome = ModelOutcome {
            target: FitTarget::reference(ModelKind::Sine),
            fit: Err(CurveError::NotConverged {
                model: ModelKind::Sine,
                iterations: 10,
                reason: "MaxItersReached".to_string(),
            }),
            extremum: None,
            linear_reference: None,
            charts: vec![StageOutcome {
                stage: Stage::Raw,
                path: PathBuf::from("x/raw_sine.svg"),
                result: Err(CurveError::Render {
                    path: PathBuf::from("x/raw_sine.svg"),
                    message: "denied".to_string(),
                }),
            }],
        };
        let text = format_run_summary(&run_with(vec![outcome]));

        assert!(text.contains("FIT FAILED: fit for model sine did not converge"));
        assert!(text.contains("raw  CHART FAILED"));
        assert!(text.contains("2 step(s) failed"));
    }
}
