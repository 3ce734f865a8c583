//! Per-station model fitting, holdout evaluation, and horizon forecasting.
//!
//! Every station trains independently, so the loop fans out over a worker
//! pool and the per-station outcomes are concatenated afterwards in stable
//! station order. A station that cannot be modeled never blocks the rest of
//! the batch: short histories are skipped and counted, fit failures are
//! logged with their station id and excluded.

use crate::error::{PipelineError, Result};
use crate::metrics::{cap_mape, mean_absolute_percentage_error};
use crate::models::arima::{ArimaModel, FitOptions, ModelOrder};
use crate::models::{ForecastModel, TrainedForecastModel};
use chrono::{Duration, NaiveDateTime, Timelike};
use rayon::prelude::*;
use station_data::{ForecastRecord, StationScore, StockPoint};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Count of positive-stock hours a station must exceed to be modeled
/// (two weeks of hourly data)
pub const MIN_POSITIVE_HOURS: usize = 336;

/// Length of the held-out tail used for scoring
pub const HOLDOUT_HOURS: usize = 12;

/// Counts reported after the per-station loop completes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainSummary {
    /// Stations that produced a forecast and a score
    pub modeled: usize,
    /// Stations skipped for insufficient history
    pub skipped: usize,
    /// Stations excluded by a fit failure
    pub failed: usize,
}

enum StationOutcome {
    Modeled {
        rows: Vec<ForecastRecord>,
        score: StationScore,
    },
    Skipped,
    Failed {
        station_id: i64,
        error: PipelineError,
    },
}

/// Fit, evaluate, and forecast one model per qualifying station.
///
/// Forecast timestamps run hourly from `horizon_start` (inclusive) to
/// `horizon_end` (exclusive). Returns the forecast rows and holdout scores
/// across all qualifying stations plus the batch summary.
pub fn train_and_forecast(
    stock: &[StockPoint],
    horizon_start: NaiveDateTime,
    horizon_end: NaiveDateTime,
    order: ModelOrder,
    options: &FitOptions,
) -> Result<(Vec<ForecastRecord>, Vec<StationScore>, TrainSummary)> {
    if horizon_end < horizon_start {
        return Err(PipelineError::InvalidParameter(format!(
            "forecast horizon ends ({}) before it starts ({})",
            horizon_end, horizon_start
        )));
    }
    let horizon = hourly_range(horizon_start, horizon_end);
    let model = ArimaModel::new(order, options.clone())?;

    // Chronological per-station sub-series, in stable station order.
    let mut by_station: BTreeMap<i64, Vec<(NaiveDateTime, f64)>> = BTreeMap::new();
    for point in stock {
        by_station
            .entry(point.station_id)
            .or_default()
            .push((point.timestamp, point.stock));
    }
    let stations: Vec<(i64, Vec<f64>)> = by_station
        .into_iter()
        .map(|(station_id, mut pairs)| {
            pairs.sort_by_key(|(timestamp, _)| *timestamp);
            (
                station_id,
                pairs.into_iter().map(|(_, value)| value).collect(),
            )
        })
        .collect();

    info!(
        stations = stations.len(),
        horizon_hours = horizon.len(),
        model = model.name(),
        "training station models"
    );

    let outcomes: Vec<StationOutcome> = stations
        .par_iter()
        .map(|(station_id, values)| train_station(*station_id, values, &model, &horizon))
        .collect();

    let mut forecasts = Vec::new();
    let mut scores = Vec::new();
    let mut summary = TrainSummary {
        modeled: 0,
        skipped: 0,
        failed: 0,
    };
    for outcome in outcomes {
        match outcome {
            StationOutcome::Modeled { rows, score } => {
                summary.modeled += 1;
                forecasts.extend(rows);
                scores.push(score);
            }
            StationOutcome::Skipped => summary.skipped += 1,
            StationOutcome::Failed { station_id, error } => {
                summary.failed += 1;
                warn!(station_id, %error, "station excluded from results");
            }
        }
    }

    info!(
        modeled = summary.modeled,
        skipped = summary.skipped,
        failed = summary.failed,
        "station models trained; skipped stations lacked sufficient history"
    );

    Ok((forecasts, scores, summary))
}

fn train_station(
    station_id: i64,
    values: &[f64],
    model: &ArimaModel,
    horizon: &[NaiveDateTime],
) -> StationOutcome {
    // Only model stations with more than two weeks of positive-inventory
    // hours.
    let positive_hours = values.iter().filter(|&&value| value > 0.0).count();
    if positive_hours <= MIN_POSITIVE_HOURS {
        return StationOutcome::Skipped;
    }

    match fit_evaluate_forecast(station_id, values, model, horizon) {
        Ok(outcome) => outcome,
        Err(err) => StationOutcome::Failed {
            station_id,
            error: PipelineError::ModelFit {
                station_id,
                reason: err.to_string(),
            },
        },
    }
}

fn fit_evaluate_forecast(
    station_id: i64,
    values: &[f64],
    model: &ArimaModel,
    horizon: &[NaiveDateTime],
) -> Result<StationOutcome> {
    // The full-series fit produces the horizon forecast.
    let full_fit = model.fit(values)?;

    // Rough per-station evaluation: refit without the final half day and
    // score against it.
    let split = values.len() - HOLDOUT_HOURS;
    let holdout_fit = model.fit(&values[..split])?;
    let holdout = holdout_fit.forecast(HOLDOUT_HOURS)?;
    let raw_mape = mean_absolute_percentage_error(&values[split..], holdout.values())?;
    if !raw_mape.is_finite() {
        warn!(station_id, "holdout MAPE not finite; reporting the cap");
    }
    let score = StationScore {
        station_id,
        mape: cap_mape(raw_mape),
    };

    let forecast = full_fit.forecast(horizon.len())?;
    let rows = horizon
        .iter()
        .zip(forecast.values().iter())
        .map(|(timestamp, &value)| ForecastRecord {
            station_id,
            date: timestamp.date(),
            hour: timestamp.hour(),
            pred_num_bikes: value.round() as i64,
        })
        .collect();

    Ok(StationOutcome::Modeled { rows, score })
}

/// Hourly timestamps from `start` (inclusive) to `end` (exclusive).
pub fn hourly_range(start: NaiveDateTime, end: NaiveDateTime) -> Vec<NaiveDateTime> {
    let mut timestamps = Vec::new();
    let mut current = start;
    while current < end {
        timestamps.push(current);
        current += Duration::hours(1);
    }
    timestamps
}
