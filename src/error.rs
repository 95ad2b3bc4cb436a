//! Error types.
//!
//! - `CurveError` is the library error: every stage (generation, fitting,
//!   extremum, rendering) returns it so callers can decide what to do per model.
//! - `AppError` is the binary boundary: a message plus a process exit code.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::ModelKind;

/// Exit code for bad flags / config files.
pub const EXIT_CONFIG: u8 = 2;
/// Exit code for a computation that could not run at all.
pub const EXIT_COMPUTE: u8 = 4;
/// Exit code when the run finished but some fits or charts failed.
pub const EXIT_PARTIAL: u8 = 5;

#[derive(Debug, Error)]
pub enum CurveError {
    #[error("model {model} expects {expected} parameters, got {got}")]
    ArityMismatch {
        model: ModelKind,
        expected: usize,
        got: usize,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("sample set is empty or has mismatched lengths (xs={xs}, ys={ys})")]
    InvalidSamples { xs: usize, ys: usize },

    #[error("optimizer failed for model {model}: {message}")]
    Optimizer { model: ModelKind, message: String },

    #[error("fit for model {model} did not converge after {iterations} iterations ({reason})")]
    NotConverged {
        model: ModelKind,
        iterations: u64,
        reason: String,
    },

    #[error("extremum of model {model} is undefined: {reason}")]
    Degenerate { model: ModelKind, reason: String },

    #[error("failed to render '{}': {message}", path.display())]
    Render { path: PathBuf, message: String },

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CurveError {
    /// Exit code used when this error reaches the binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            CurveError::ArityMismatch { .. } | CurveError::InvalidConfig(_) | CurveError::Io { .. } => {
                EXIT_CONFIG
            }
            _ => EXIT_COMPUTE,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<CurveError> for AppError {
    fn from(err: CurveError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_map_to_config_exit_code() {
        let err = CurveError::ArityMismatch {
            model: ModelKind::Poly,
            expected: 3,
            got: 2,
        };
        let app: AppError = err.into();
        assert_eq!(app.exit_code(), EXIT_CONFIG);
        assert!(app.to_string().contains("expects 3 parameters, got 2"));
    }

    #[test]
    fn compute_errors_map_to_compute_exit_code() {
        let err = CurveError::Degenerate {
            model: ModelKind::Sine,
            reason: "zero frequency".to_string(),
        };
        assert_eq!(err.exit_code(), EXIT_COMPUTE);
    }
}
