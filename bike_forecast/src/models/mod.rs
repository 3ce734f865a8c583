//! Forecasting models for station stock series

use crate::error::{PipelineError, Result};
use std::fmt::Debug;

/// Forecast result containing predicted values
#[derive(Debug, Clone)]
pub struct ForecastResult {
    /// Forecasted values
    values: Vec<f64>,
    /// Number of periods forecasted
    horizon: usize,
}

impl ForecastResult {
    /// Create a new forecast result
    pub fn new(values: Vec<f64>, horizon: usize) -> Result<Self> {
        if values.len() != horizon {
            return Err(PipelineError::InvalidParameter(format!(
                "values length ({}) doesn't match horizon ({})",
                values.len(),
                horizon
            )));
        }

        Ok(Self { values, horizon })
    }

    /// Get the forecasted values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get the number of periods forecasted
    pub fn horizon(&self) -> usize {
        self.horizon
    }
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// Generate forecasts for future periods, one per step
    fn forecast(&self, horizon: usize) -> Result<ForecastResult>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be fitted to a stock series
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Fit the model to a series in chronological order
    fn fit(&self, series: &[f64]) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

pub mod arima;
