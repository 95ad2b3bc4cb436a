//! Curve fitting.
//!
//! Responsibilities:
//!
//! - fit a model to samples with the Nelder-Mead simplex (`fitter`)
//! - locate the extremum of a fitted curve (`extremum`)

pub mod extremum;
pub mod fitter;

pub use extremum::*;
pub use fitter::*;
