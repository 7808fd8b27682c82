//! Module errors

use std::fmt;

#[cfg(feature = "serde-serialize")]
use serde::Serialize;

/// Why a series could not be fitted. Neither case is fatal: the next sample triggers
/// another attempt.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize))]
pub enum FitError {
    /// Fewer samples than parameters. The solver is not run.
    InsufficientData,

    /// The solver ran and did not produce a usable fit.
    FitFailed(String),
}

impl FitError {
    /// Short machine-readable reason
    pub fn reason(&self) -> &'static str {
        match self {
            FitError::InsufficientData => "insufficient_data",
            FitError::FitFailed(_) => "fit_failed",
        }
    }
}

impl fmt::Display for FitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitError::InsufficientData => write!(f, "insufficient data"),
            FitError::FitFailed(e) => write!(f, "fit failed: {}", e),
        }
    }
}

impl std::error::Error for FitError {}

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// The session task is no longer consuming commands.
    Closed,

    /// The session task was started twice.
    AlreadyRunning,
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Closed => write!(f, "session pipeline is closed"),
            PipelineError::AlreadyRunning => write!(f, "session pipeline is already running"),
        }
    }
}

impl std::error::Error for PipelineError {}
