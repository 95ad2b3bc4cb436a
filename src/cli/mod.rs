//! Command-line parsing for the curve fitting demo.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! pipeline. Every option is optional here: unset flags fall through to the
//! config file and then to the built-in defaults (see `app::run_config_from_args`).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::ModelKind;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "curvefit",
    version,
    about = "Generate noisy samples, fit nonlinear models and locate their extrema"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate, fit, locate extrema and write raw/fit/best charts.
    Run(RunArgs),
    /// Same as `run` but without charts (useful for scripting).
    Fit(RunArgs),
}

/// Options shared by `run` and `fit`.
#[derive(Debug, Args, Clone, Default)]
pub struct RunArgs {
    /// JSON file with a full or partial run configuration.
    #[arg(long, value_name = "JSON")]
    pub config: Option<PathBuf>,

    /// Model family that generates the samples.
    #[arg(long, value_enum)]
    pub truth: Option<ModelKind>,

    /// Parameters of the generating model.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, value_name = "P1,P2,..")]
    pub truth_params: Option<Vec<f64>>,

    /// Models to fit, in order.
    #[arg(long, value_enum, value_delimiter = ',')]
    pub models: Option<Vec<ModelKind>>,

    /// Initial guess for the sine fit (amp,omega,phase,lambda).
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, value_name = "P1,P2,..")]
    pub sine_guess: Option<Vec<f64>>,

    /// Initial guess for the polynomial fit (a,b,c).
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, value_name = "P1,P2,..")]
    pub poly_guess: Option<Vec<f64>>,

    /// Random seed for sample generation (default: derived from the clock).
    #[arg(long)]
    pub seed: Option<u64>,

    /// Half-width of the uniform noise added to x.
    #[arg(long)]
    pub x_noise: Option<f64>,

    /// Half-width of the uniform noise added to y.
    #[arg(long)]
    pub y_noise: Option<f64>,

    /// First x of the generated grid.
    #[arg(long, allow_hyphen_values = true)]
    pub origin: Option<f64>,

    /// Width of the generated grid.
    #[arg(long)]
    pub span: Option<f64>,

    /// Number of grid intervals (points = steps + 1).
    #[arg(long)]
    pub steps: Option<usize>,

    /// Nelder-Mead iteration cap per fit.
    #[arg(long)]
    pub max_iters: Option<u64>,

    /// Nelder-Mead convergence tolerance (std. dev. of simplex costs).
    #[arg(long)]
    pub sd_tolerance: Option<f64>,

    /// Directory for chart files.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Lower Y bound of the charts.
    #[arg(long, allow_hyphen_values = true)]
    pub y_min: Option<f64>,

    /// Upper Y bound of the charts.
    #[arg(long, allow_hyphen_values = true)]
    pub y_max: Option<f64>,

    /// Debug-level logging.
    #[arg(short, long)]
    pub verbose: bool,
}
