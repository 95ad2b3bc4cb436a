//! `curvefit` library crate.
//!
//! The binary (`curvefit`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the generator, fitter and extremum solver are reusable on their own
//! - chart rendering sits behind a trait and can be swapped out in tests

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
