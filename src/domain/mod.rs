//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - model families and parameter vectors (`ModelKind`, `Params`)
//! - sample data (`SampleSet`)
//! - run configuration (`RunConfig`, `GenerationConfig`, `PlotConfig`)
//! - fit outputs (`FitResult`, `CriticalPoint`)

pub mod types;

pub use types::*;
