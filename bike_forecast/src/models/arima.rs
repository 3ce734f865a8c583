//! Autoregressive integrated model of fixed order.
//!
//! The fit is a two-stage least-squares estimate: the series is differenced
//! `d` times, autoregressive terms are estimated by OLS, and when `q > 0`
//! residuals from a long autoregression stand in for the unobserved shocks
//! (the Hannan-Rissanen approach). Forecasts run the fitted recurrence
//! forward with future shocks at zero, then invert the differencing.

use crate::error::{PipelineError, Result};
use crate::models::{ForecastModel, ForecastResult, TrainedForecastModel};
use serde::Deserialize;
use station_math::ols::least_squares;
use station_math::series::{difference, integrate};
use std::time::Instant;

/// Fixed (p, d, q) model order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ModelOrder {
    /// Autoregressive lags
    pub p: usize,
    /// Differencing rounds
    pub d: usize,
    /// Moving-average lags
    pub q: usize,
}

/// Engine-specific fitting hyperparameters, passed through opaquely by
/// callers
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FitOptions {
    /// Order of the long autoregression that estimates residuals when
    /// q > 0; defaults to p + q + 2
    pub long_ar_order: Option<usize>,
    /// Abort a fit that runs longer than this many milliseconds
    pub max_fit_millis: Option<u64>,
}

/// Autoregressive integrated model, unfitted
#[derive(Debug, Clone)]
pub struct ArimaModel {
    /// Name of the model
    name: String,
    /// Model order
    order: ModelOrder,
    /// Fitting hyperparameters
    options: FitOptions,
}

/// Fitted model state, sufficient to forecast from the end of its series
#[derive(Debug, Clone)]
pub struct TrainedArimaModel {
    /// Name of the model
    name: String,
    /// Model order
    order: ModelOrder,
    /// Fitted intercept
    intercept: f64,
    /// Fitted AR coefficients
    ar_coefficients: Vec<f64>,
    /// Fitted MA coefficients
    ma_coefficients: Vec<f64>,
    /// The d-times differenced training series
    differenced: Vec<f64>,
    /// Residuals of the differenced series under the fitted coefficients
    residuals: Vec<f64>,
    /// Original training series, needed to invert the differencing
    history: Vec<f64>,
}

struct Deadline {
    started: Instant,
    budget_ms: u64,
}

impl Deadline {
    fn check(deadline: &Option<Self>) -> Result<()> {
        if let Some(deadline) = deadline {
            if deadline.started.elapsed().as_millis() >= u128::from(deadline.budget_ms) {
                return Err(PipelineError::FitDeadline {
                    budget_ms: deadline.budget_ms,
                });
            }
        }
        Ok(())
    }
}

impl ArimaModel {
    /// Create a new model of the given order
    pub fn new(order: ModelOrder, options: FitOptions) -> Result<Self> {
        if order.p == 0 && order.q == 0 {
            return Err(PipelineError::InvalidParameter(
                "model order needs at least one autoregressive or moving-average lag".to_string(),
            ));
        }

        Ok(Self {
            name: format!("ARIMA({},{},{})", order.p, order.d, order.q),
            order,
            options,
        })
    }

    /// The model order
    pub fn order(&self) -> ModelOrder {
        self.order
    }
}

impl ForecastModel for ArimaModel {
    type Trained = TrainedArimaModel;

    fn fit(&self, series: &[f64]) -> Result<TrainedArimaModel> {
        let ModelOrder { p, d, q } = self.order;
        let deadline = self.options.max_fit_millis.map(|budget_ms| Deadline {
            started: Instant::now(),
            budget_ms,
        });

        let differenced = difference(series, d)?;

        // Residual estimates for the moving-average terms come from a long
        // autoregression.
        let shocks = if q > 0 {
            Deadline::check(&deadline)?;
            let long_order = self.options.long_ar_order.unwrap_or(p + q + 2);
            estimate_shocks(&differenced, long_order)?
        } else {
            Vec::new()
        };

        Deadline::check(&deadline)?;
        let max_lag = p.max(q);
        if differenced.len() <= max_lag {
            return Err(PipelineError::InvalidParameter(format!(
                "insufficient data for {}: need more than {} differenced observations",
                self.name, max_lag
            )));
        }

        let mut rows = Vec::with_capacity(differenced.len() - max_lag);
        let mut targets = Vec::with_capacity(differenced.len() - max_lag);
        for t in max_lag..differenced.len() {
            let mut row = Vec::with_capacity(1 + p + q);
            row.push(1.0);
            for i in 0..p {
                row.push(differenced[t - 1 - i]);
            }
            for j in 0..q {
                row.push(shocks[t - 1 - j]);
            }
            rows.push(row);
            targets.push(differenced[t]);
        }
        if rows.len() < 1 + p + q {
            return Err(PipelineError::InvalidParameter(format!(
                "insufficient data for {}: {} usable rows for {} coefficients",
                self.name,
                rows.len(),
                1 + p + q
            )));
        }

        let fit = least_squares(&rows, &targets)?;
        let intercept = fit.coefficients[0];
        let ar_coefficients = fit.coefficients[1..=p].to_vec();
        let ma_coefficients = fit.coefficients[1 + p..1 + p + q].to_vec();

        Deadline::check(&deadline)?;
        // Residuals under the fitted recurrence, warmup lags at zero; the
        // forecast step continues from their tail.
        let mut residuals = vec![0.0; differenced.len()];
        for t in max_lag..differenced.len() {
            let mut value = intercept;
            for i in 0..p {
                value += ar_coefficients[i] * differenced[t - 1 - i];
            }
            for j in 0..q {
                value += ma_coefficients[j] * residuals[t - 1 - j];
            }
            residuals[t] = differenced[t] - value;
        }
        if residuals.iter().any(|r| !r.is_finite()) {
            return Err(PipelineError::InvalidParameter(format!(
                "{} produced non-finite residuals",
                self.name
            )));
        }

        Ok(TrainedArimaModel {
            name: self.name.clone(),
            order: self.order,
            intercept,
            ar_coefficients,
            ma_coefficients,
            differenced,
            residuals,
            history: series.to_vec(),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedForecastModel for TrainedArimaModel {
    fn forecast(&self, horizon: usize) -> Result<ForecastResult> {
        let ModelOrder { p, d, q } = self.order;

        let mut values = self.differenced.clone();
        let mut shocks = self.residuals.clone();
        let mut steps = Vec::with_capacity(horizon);
        for _ in 0..horizon {
            let mut next = self.intercept;
            for i in 0..p {
                next += self.ar_coefficients[i] * values[values.len() - 1 - i];
            }
            for j in 0..q {
                next += self.ma_coefficients[j] * shocks[shocks.len() - 1 - j];
            }
            values.push(next);
            // Future shocks sit at their zero expectation.
            shocks.push(0.0);
            steps.push(next);
        }

        let levels = integrate(&steps, &self.history, d)?;
        ForecastResult::new(levels, horizon)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Estimate the shock sequence of a series from the residuals of a long
/// autoregression, warmup lags at zero.
fn estimate_shocks(series: &[f64], order: usize) -> Result<Vec<f64>> {
    if series.len() < 4 {
        return Err(PipelineError::InvalidParameter(format!(
            "series of {} points is too short for a long autoregression",
            series.len()
        )));
    }
    let order = order.clamp(1, series.len() - 2);

    let mut rows = Vec::with_capacity(series.len() - order);
    let mut targets = Vec::with_capacity(series.len() - order);
    for t in order..series.len() {
        let mut row = Vec::with_capacity(1 + order);
        row.push(1.0);
        for i in 0..order {
            row.push(series[t - 1 - i]);
        }
        rows.push(row);
        targets.push(series[t]);
    }

    let fit = least_squares(&rows, &targets)?;
    let mut shocks = vec![0.0; series.len()];
    for (offset, residual) in fit.residuals.iter().enumerate() {
        shocks[order + offset] = *residual;
    }
    Ok(shocks)
}
