//! Error types for the bike_forecast crate

use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the bike_forecast crate
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input table missing expected columns or carrying the wrong types;
    /// fatal, indicates an upstream contract violation
    #[error("Data shape error: {0}")]
    DataShape(String),

    /// A station's model failed to fit; callers exclude the station and
    /// continue the batch
    #[error("Model fit error for station {station_id}: {reason}")]
    ModelFit { station_id: i64, reason: String },

    /// A fit ran past its configured deadline
    #[error("Model fit exceeded its {budget_ms} ms budget")]
    FitDeadline { budget_ms: u64 },

    /// Read/write failure at a collaborator boundary
    #[error("Persistence error for '{target}': {reason}")]
    Persistence { target: String, reason: String },

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Configuration loading or validation failure
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from the numeric layer
    #[error("Math error: {0}")]
    Math(#[from] station_math::MathError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    Polars(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, PipelineError>;

impl From<PolarsError> for PipelineError {
    fn from(err: PolarsError) -> Self {
        PipelineError::Polars(err.to_string())
    }
}
