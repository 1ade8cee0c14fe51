//! Error types for blade load mapping

use thiserror::Error;

/// Main error type for load mapping operations
#[derive(Error, Debug)]
pub enum BladeError {
    #[error("CL-alpha curve fit failed: {0}")]
    PolarFit(String),

    #[error("Geometry query failed at span coordinate {span:.3}: {reason}")]
    GeometryQuery { span: f64, reason: String },

    #[error("Solver '{solver}' exceeded its time budget of {seconds} s")]
    SolverTimeout { solver: String, seconds: u64 },

    #[error("Invalid loadcase specification: {0}")]
    InvalidLoadcaseSpec(String),

    #[error("Airfoil '{0}' has no polar - run compute_polar() first")]
    MissingPolar(String),

    #[error("Loadcase '{0}' has not been solved - run calc_loads() first")]
    LoadcaseNotSolved(String),

    #[error("Load envelope not available - run set_load_envelope() first")]
    EnvelopeNotReady,

    #[error("Element {element}: relative chord {value:.4} lies outside the blade section")]
    ChordOutOfRange { element: usize, value: f64 },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Solver error: {0}")]
    Solver(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BladeError {
    /// Whether a fresh solver session may succeed where this one failed
    pub fn is_retryable(&self) -> bool {
        matches!(self, BladeError::SolverTimeout { .. })
    }
}

/// Result type for load mapping operations
pub type BladeResult<T> = Result<T, BladeError>;
