//! Synthetic sample generation from a ground-truth model.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Uniform;
use tracing::{debug, info};

use crate::domain::{GenerationConfig, SampleSet};
use crate::error::CurveError;

/// Produces noisy samples from a known model.
///
/// The random source is owned by the generator so tests can inject a seeded
/// one; nothing here touches process-global RNG state.
#[derive(Debug, Clone)]
pub struct SampleGenerator<R: Rng = StdRng> {
    rng: R,
}

impl SampleGenerator<StdRng> {
    /// Reproducible generator.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> SampleGenerator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Generate `steps + 1` points over the base indices `0, step, .., span`.
    ///
    /// For base index `i`:
    /// - `x = i + origin + U[0,1) · 2 · x_noise`
    /// - `y = truth(i) + U[0,1) · 2 · y_noise`
    ///
    /// The model is evaluated at the base index, not at the perturbed x.
    pub fn generate(&mut self, config: &GenerationConfig) -> Result<SampleSet, CurveError> {
        validate(config)?;

        let unit = Uniform::new(0.0, 1.0);
        let step = config.step();
        let n = point_count(config)
            .ok_or_else(|| CurveError::InvalidConfig(format!("too many points for {} steps", config.steps)))?;

        info!(truth = %config.truth, params = ?config.params, "generating samples");

        let mut xs = Vec::with_capacity(n);
        let mut ys = Vec::with_capacity(n);
        for j in 0..n {
            // Integer-indexed so that the last point lands on `span` exactly.
            let i = j as f64 * step;
            let val = config.truth.evaluate(i, &config.params);

            xs.push(i + config.origin + unit.sample(&mut self.rng) * 2.0 * config.x_noise);
            ys.push(val + unit.sample(&mut self.rng) * 2.0 * config.y_noise);
        }

        debug!(points = n, step, "samples generated");
        SampleSet::new(xs, ys)
    }
}

/// Upper bound on `steps` accepted by the generator.
pub const MAX_STEPS: usize = 1_000_000;

/// `floor(span / step) + 1`, guarded against the quotient landing a hair below
/// an integer. `None` if the count does not fit in `usize`.
pub fn point_count(config: &GenerationConfig) -> Option<usize> {
    let ratio = config.span / config.step();
    ((ratio + 1e-9).floor() as usize).checked_add(1)
}

/// Seed derived from the wall clock, for runs that don't pass `--seed`.
pub fn time_seed() -> u64 {
    let now = chrono::Utc::now();
    now.timestamp_nanos_opt()
        .map(|n| n as u64)
        .unwrap_or_else(|| now.timestamp_micros() as u64)
}

fn validate(config: &GenerationConfig) -> Result<(), CurveError> {
    config.truth.check_arity(&config.params)?;

    if config.params.iter().any(|p| !p.is_finite()) {
        return Err(CurveError::InvalidConfig(
            "ground-truth parameters must be finite".to_string(),
        ));
    }
    if !(config.x_noise.is_finite() && config.x_noise >= 0.0) {
        return Err(CurveError::InvalidConfig(format!(
            "x noise must be finite and >= 0 (got {})",
            config.x_noise
        )));
    }
    if !(config.y_noise.is_finite() && config.y_noise >= 0.0) {
        return Err(CurveError::InvalidConfig(format!(
            "y noise must be finite and >= 0 (got {})",
            config.y_noise
        )));
    }
    if !config.origin.is_finite() {
        return Err(CurveError::InvalidConfig("origin must be finite".to_string()));
    }
    if !(config.span.is_finite() && config.span > 0.0) {
        return Err(CurveError::InvalidConfig(format!(
            "generation span must be finite and > 0 (got {})",
            config.span
        )));
    }
    if config.steps == 0 {
        return Err(CurveError::InvalidConfig("steps must be >= 1".to_string()));
    }
    if config.steps > MAX_STEPS {
        return Err(CurveError::InvalidConfig(format!(
            "steps must be <= {MAX_STEPS} (got {})",
            config.steps
        )));
    }
    Ok(())
}
