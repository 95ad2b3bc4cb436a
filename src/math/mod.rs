//! Mathematical utilities: closed-form least squares.

pub mod ols;

pub use ols::*;
