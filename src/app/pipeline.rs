//! Shared "fit pipeline" logic used by both the `run` and `fit` subcommands.
//!
//! sample generation -> per model: fit -> extremum -> linear reference -> charts
//!
//! Failures after generation are recorded per model (fit, extremum) and per
//! chart stage; they never stop the remaining work.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::data::{SampleGenerator, time_seed};
use crate::domain::{CriticalPoint, FitResult, FitTarget, GenerationConfig, Params, RunConfig, SampleSet, Stage};
use crate::error::CurveError;
use crate::fit::{FitOptions, fit_model, locate};
use crate::math::linear_reference;
use crate::plot::{ChartSpec, Renderer, chart_path};

/// One chart file attempt.
#[derive(Debug)]
pub struct StageOutcome {
    pub stage: Stage,
    pub path: PathBuf,
    pub result: Result<(), CurveError>,
}

/// Everything computed for one fit target.
#[derive(Debug)]
pub struct ModelOutcome {
    pub target: FitTarget,
    pub fit: Result<FitResult, CurveError>,
    /// `None` when the fit itself failed.
    pub extremum: Option<Result<CriticalPoint, CurveError>>,
    /// Closed-form least squares, for linear-in-parameter models.
    pub linear_reference: Option<Params>,
    pub charts: Vec<StageOutcome>,
}

impl ModelOutcome {
    /// Number of failed steps (fit, extremum, charts).
    pub fn failure_count(&self) -> usize {
        let fit = usize::from(self.fit.is_err());
        let extremum = usize::from(matches!(self.extremum, Some(Err(_))));
        let charts = self.charts.iter().filter(|c| c.result.is_err()).count();
        fit + extremum + charts
    }
}

/// All computed outputs of a single run.
#[derive(Debug)]
pub struct RunOutput {
    pub seed: u64,
    pub generation: GenerationConfig,
    pub samples: SampleSet,
    /// X value used to pick the extremum branch (midpoint of the plotted range).
    pub query_x: f64,
    pub models: Vec<ModelOutcome>,
}

impl RunOutput {
    pub fn failure_count(&self) -> usize {
        self.models.iter().map(ModelOutcome::failure_count).sum()
    }
}

/// Execute the full pipeline. Charts are skipped when `renderer` is `None`.
///
/// Only configuration and generation problems fail the whole run.
pub fn run(config: &RunConfig, renderer: Option<&dyn Renderer>) -> Result<RunOutput, CurveError> {
    if config.targets.is_empty() {
        return Err(CurveError::InvalidConfig("no models to fit".to_string()));
    }

    // 1) Generate samples.
    let seed = config.seed.unwrap_or_else(time_seed);
    info!(seed, "sample generator seeded");
    let samples = SampleGenerator::seeded(seed).generate(&config.generation)?;

    // 2) Plot range; its midpoint selects the extremum branch.
    let x_bounds = plot_x_bounds(config, &samples);
    let y_bounds = [config.plot.y_min, config.plot.y_max];
    let query_x = (x_bounds[0] + x_bounds[1]) / 2.0;

    if renderer.is_some() {
        if let Err(e) = std::fs::create_dir_all(&config.plot.output_dir) {
            // Each chart will report its own failure.
            warn!(dir = %config.plot.output_dir.display(), error = %e, "cannot create output directory");
        }
    }

    let opts = FitOptions {
        max_iters: config.max_iters,
        sd_tolerance: config.sd_tolerance,
    };

    // 3) Fit, locate and draw each target independently.
    let mut models = Vec::with_capacity(config.targets.len());
    for target in &config.targets {
        let model = target.model;
        let fit = fit_model(&samples, model, &target.initial_guess, &opts);
        if let Err(e) = &fit {
            warn!(%model, error = %e, "fit failed");
        }

        let extremum = fit.as_ref().ok().map(|f| locate(model, &f.params, query_x));
        if let Some(Err(e)) = &extremum {
            warn!(%model, error = %e, "extremum undefined");
        }

        let linear_reference = linear_reference(&samples, model);

        let charts = match renderer {
            Some(renderer) => {
                let chart = ChartSpec {
                    samples: &samples,
                    model,
                    fitted: fit.as_ref().ok().map(|f| f.params.as_slice()),
                    extremum: extremum.as_ref().and_then(|e| e.as_ref().ok().copied()),
                    x_bounds,
                    y_bounds,
                    x_label: &config.plot.x_label,
                    y_label: &config.plot.y_label,
                    curve_samples: config.plot.curve_samples,
                };
                // Without fitted parameters only the raw stage has anything to show.
                let stages: &[Stage] = if fit.is_ok() { &Stage::ALL } else { &[Stage::Raw] };
                stages
                    .iter()
                    .map(|&stage| {
                        let path = chart_path(&config.plot.output_dir, stage, model, renderer.extension());
                        let result = renderer.render(&chart, stage, &path);
                        if let Err(e) = &result {
                            warn!(%model, %stage, error = %e, "chart failed");
                        }
                        StageOutcome { stage, path, result }
                    })
                    .collect()
            }
            None => Vec::new(),
        };

        models.push(ModelOutcome {
            target: target.clone(),
            fit,
            extremum,
            linear_reference,
            charts,
        });
    }

    Ok(RunOutput {
        seed,
        generation: config.generation.clone(),
        samples,
        query_x,
        models,
    })
}

/// Configured X bounds, falling back to the first/last sample x.
fn plot_x_bounds(config: &RunConfig, samples: &SampleSet) -> [f64; 2] {
    let (first, last) = samples.x_span().unwrap_or((0.0, 1.0));
    let x0 = config.plot.x_min.unwrap_or(first);
    let x1 = config.plot.x_max.unwrap_or(last);
    if x1 > x0 {
        [x0, x1]
    } else {
        [x0 - 0.5, x0 + 0.5]
    }
}
