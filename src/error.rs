//! Error types for the beam engine

use thiserror::Error;

/// Main error type for engine operations
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Span index {0} out of range")]
    SpanNotFound(usize),

    #[error("Structure is unstable: {0}")]
    Unstable(String),

    #[error("{0} did not converge after {1} iterations")]
    ConvergenceFailed(String, usize),

    #[error(
        "No feasible section among {candidates} candidates; \
         closest was h = {nearest_height} cm, failing '{check}' at {ratio:.2}x its limit"
    )]
    NoFeasibleSection {
        /// Number of candidate heights evaluated.
        candidates: usize,
        /// Height (cm) of the candidate that came closest to passing.
        nearest_height: f64,
        /// Name of the check that candidate failed.
        check: String,
        /// Worst demand/limit ratio of that candidate.
        ratio: f64,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
