//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - layers flags over the optional JSON config
//! - runs the generate/fit/locate/render pipeline
//! - prints the run summary

use std::path::Path;

use clap::Parser;
use tracing::Level;

use crate::cli::{Command, RunArgs};
use crate::domain::{FitTarget, ModelKind, RunConfig};
use crate::error::{AppError, CurveError, EXIT_PARTIAL};
use crate::plot::{Renderer, SvgRenderer};

pub mod pipeline;

/// Entry point for the `curvefit` binary.
pub fn run() -> Result<(), AppError> {
    // `curvefit` and `curvefit --seed 3` behave like `curvefit run ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Run(args) => handle_run(args, true),
        Command::Fit(args) => handle_run(args, false),
    }
}

fn handle_run(args: RunArgs, charts: bool) -> Result<(), AppError> {
    init_logging(args.verbose);

    let config = run_config_from_args(&args)?;
    let renderer = SvgRenderer {
        width: config.plot.width,
        height: config.plot.height,
    };
    let renderer: Option<&dyn Renderer> = if charts { Some(&renderer) } else { None };

    let run = pipeline::run(&config, renderer)?;
    println!("{}", crate::report::format_run_summary(&run));

    match run.failure_count() {
        0 => Ok(()),
        n => Err(AppError::new(EXIT_PARTIAL, format!("{n} fit/chart step(s) failed"))),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Read a (possibly partial) `RunConfig` from a JSON file.
pub fn load_config_file(path: &Path) -> Result<RunConfig, CurveError> {
    let text = std::fs::read_to_string(path).map_err(|source| CurveError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text)
        .map_err(|e| CurveError::InvalidConfig(format!("{}: {e}", path.display())))
}

/// Defaults, then `--config`, then individual flags.
pub fn run_config_from_args(args: &RunArgs) -> Result<RunConfig, CurveError> {
    let mut config = match &args.config {
        Some(path) => load_config_file(path)?,
        None => RunConfig::default(),
    };

    let generation = &mut config.generation;
    if let Some(truth) = args.truth {
        if truth != generation.truth && args.truth_params.is_none() {
            generation.params = FitTarget::reference(truth).initial_guess;
        }
        generation.truth = truth;
    }
    if let Some(params) = &args.truth_params {
        generation.params = params.clone();
    }
    if let Some(v) = args.x_noise {
        generation.x_noise = v;
    }
    if let Some(v) = args.y_noise {
        generation.y_noise = v;
    }
    if let Some(v) = args.origin {
        generation.origin = v;
    }
    if let Some(v) = args.span {
        generation.span = v;
    }
    if let Some(v) = args.steps {
        generation.steps = v;
    }

    if let Some(models) = &args.models {
        // Keep guesses already configured for a listed model.
        config.targets = models
            .iter()
            .map(|&model| {
                config
                    .targets
                    .iter()
                    .find(|t| t.model == model)
                    .cloned()
                    .unwrap_or_else(|| FitTarget::reference(model))
            })
            .collect();
    }
    for (model, guess) in [(ModelKind::Sine, &args.sine_guess), (ModelKind::Poly, &args.poly_guess)] {
        if let Some(guess) = guess {
            for target in config.targets.iter_mut().filter(|t| t.model == model) {
                target.initial_guess = guess.clone();
            }
        }
    }

    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(v) = args.max_iters {
        config.max_iters = v;
    }
    if let Some(v) = args.sd_tolerance {
        config.sd_tolerance = v;
    }
    if let Some(dir) = &args.output_dir {
        config.plot.output_dir = dir.clone();
    }
    if let Some(v) = args.y_min {
        config.plot.y_min = v;
    }
    if let Some(v) = args.y_max {
        config.plot.y_max = v;
    }

    if config.max_iters == 0 {
        return Err(CurveError::InvalidConfig("max_iters must be positive".to_string()));
    }
    if !(config.sd_tolerance.is_finite() && config.sd_tolerance > 0.0) {
        return Err(CurveError::InvalidConfig(format!(
            "sd_tolerance must be positive, got {}",
            config.sd_tolerance
        )));
    }

    Ok(config)
}

/// Rewrite argv so `curvefit` defaults to `curvefit run`.
///
/// Rules:
/// - `curvefit`                      -> `curvefit run`
/// - `curvefit --seed 3 ...`         -> `curvefit run --seed 3 ...`
/// - `curvefit --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("run".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    if matches!(arg1.as_str(), "run" | "fit") {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "run".to_string());
    }
    argv
}
