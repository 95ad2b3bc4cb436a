//! Shared domain types.
//!
//! These types are plain values: each pipeline stage takes them by reference and
//! returns a fresh value for the next stage. Configuration types are
//! deserializable so a whole run can be described in a JSON file.

use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Ordered model parameters. Position is the only identifier; see
/// [`ModelKind::param_names`] for the meaning of each slot.
pub type Params = Vec<f64>;

/// Supported model families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Gaussian-enveloped sine: `amp · sin(ω·x + φ) · exp(−λ·x²)`.
    Sine,
    /// Quadratic polynomial: `a·x² + b·x + c`.
    Poly,
}

impl ModelKind {
    pub const ALL: [ModelKind; 2] = [ModelKind::Sine, ModelKind::Poly];

    /// Short name used in file names and terminal output.
    pub fn name(self) -> &'static str {
        match self {
            ModelKind::Sine => "sine",
            ModelKind::Poly => "poly",
        }
    }

    /// Number of parameters the model expects.
    pub fn arity(self) -> usize {
        self.param_names().len()
    }

    pub fn param_names(self) -> &'static [&'static str] {
        match self {
            ModelKind::Sine => &["amp", "omega", "phase", "decay"],
            ModelKind::Poly => &["a", "b", "c"],
        }
    }

    /// Whether the model is linear in its parameters (closed-form least squares applies).
    pub fn is_linear(self) -> bool {
        matches!(self, ModelKind::Poly)
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Paired observations: `xs[i]` is the independent variable of point `i`,
/// `ys[i]` its observed value.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSet {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
}

impl SampleSet {
    /// Build a sample set, rejecting empty or mismatched inputs.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> Result<Self, crate::error::CurveError> {
        if xs.is_empty() || xs.len() != ys.len() {
            return Err(crate::error::CurveError::InvalidSamples {
                xs: xs.len(),
                ys: ys.len(),
            });
        }
        Ok(Self { xs, ys })
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.xs.iter().copied().zip(self.ys.iter().copied())
    }

    /// First and last x, in sample order.
    pub fn x_span(&self) -> Option<(f64, f64)> {
        Some((*self.xs.first()?, *self.xs.last()?))
    }
}

/// How the synthetic data set is produced.
///
/// The generation range (`origin`, `span`, `steps`) is independent of the plot
/// display range in [`PlotConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Model that produces the noiseless values.
    pub truth: ModelKind,
    /// Ground-truth parameters for `truth`.
    pub params: Params,
    /// Upper bound of the (uniform, non-negative) x perturbation is `2 · x_noise`.
    pub x_noise: f64,
    /// Upper bound of the (uniform, non-negative) y perturbation is `2 · y_noise`.
    pub y_noise: f64,
    /// Offset added to every base index to form x.
    pub origin: f64,
    /// Length of the index range `[0, span]`.
    pub span: f64,
    /// Number of intervals; `steps + 1` points are produced.
    pub steps: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            truth: ModelKind::Sine,
            params: vec![10.0, 2.0, 0.0, 0.025],
            x_noise: 0.05,
            y_noise: 0.3,
            origin: 0.0,
            span: 2.0,
            steps: 10,
        }
    }
}

impl GenerationConfig {
    /// Distance between neighbouring base indices.
    pub fn step(&self) -> f64 {
        self.span / self.steps as f64
    }
}

/// One model to fit, with its starting point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitTarget {
    pub model: ModelKind,
    pub initial_guess: Params,
}

impl FitTarget {
    /// Reference starting points for each model.
    pub fn reference(model: ModelKind) -> Self {
        let initial_guess = match model {
            ModelKind::Sine => vec![10.0, 2.0, 0.0, 0.025],
            ModelKind::Poly => vec![-10.0, 15.0, 5.0],
        };
        Self {
            model,
            initial_guess,
        }
    }
}

/// Chart layout and output location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub output_dir: PathBuf,
    pub x_label: String,
    pub y_label: String,
    /// X bounds; `None` means "first/last sample x".
    pub x_min: Option<f64>,
    pub x_max: Option<f64>,
    pub y_min: f64,
    pub y_max: f64,
    pub width: u32,
    pub height: u32,
    /// Number of points used to draw each continuous function.
    pub curve_samples: usize,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("testdata"),
            x_label: "some arbitrary RPM".to_string(),
            y_label: "arbitrary CD (Critical Dimension)".to_string(),
            x_min: None,
            x_max: None,
            y_min: -10.0,
            y_max: 13.0,
            width: 800,
            height: 600,
            curve_samples: 100,
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// Built from defaults, then an optional JSON file, then CLI flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub generation: GenerationConfig,
    pub targets: Vec<FitTarget>,
    /// Generator seed; `None` derives one from the clock.
    pub seed: Option<u64>,
    pub max_iters: u64,
    pub sd_tolerance: f64,
    pub plot: PlotConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            generation: GenerationConfig::default(),
            targets: ModelKind::ALL.into_iter().map(FitTarget::reference).collect(),
            seed: None,
            max_iters: crate::fit::DEFAULT_MAX_ITERS,
            sd_tolerance: crate::fit::DEFAULT_SD_TOLERANCE,
            plot: PlotConfig::default(),
        }
    }
}

/// Location and value of a critical point of a model curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CriticalPoint {
    pub x: f64,
    pub value: f64,
}

impl CriticalPoint {
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.value.is_finite()
    }
}

/// Converged fit for a single model.
#[derive(Debug, Clone, PartialEq)]
pub struct FitResult {
    pub model: ModelKind,
    pub params: Params,
    pub sse: f64,
    pub rmse: f64,
    pub iterations: u64,
    /// Optimizer termination reason, for display.
    pub termination: String,
}

/// Chart stages; each adds one overlay to the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Samples only.
    Raw,
    /// Samples and the fitted curve.
    Fit,
    /// Samples, fitted curve and the extremum overlay.
    Best,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Raw, Stage::Fit, Stage::Best];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Raw => "raw",
            Stage::Fit => "fit",
            Stage::Best => "best",
        }
    }

    pub fn shows_fit(self) -> bool {
        matches!(self, Stage::Fit | Stage::Best)
    }

    pub fn shows_extremum(self) -> bool {
        matches!(self, Stage::Best)
    }

    /// `{stage}_{model}.{ext}`
    pub fn file_name(self, model: ModelKind, ext: &str) -> String {
        format!("{}_{}.{}", self.name(), model.name(), ext)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}
