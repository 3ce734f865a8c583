//! # Station Math
//!
//! Numeric building blocks for station-level time series modeling.
//! This crate provides ordinary least squares over an explicit design
//! matrix and the differencing helpers used by integrated models.

use thiserror::Error;

// Numeric modules
pub mod ols;
pub mod series;

/// Errors that can occur in numeric calculations
#[derive(Error, Debug)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for numeric operations
pub type Result<T> = std::result::Result<T, MathError>;
