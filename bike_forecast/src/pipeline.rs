//! End-to-end batch run: read, derive, model, assemble, persist.
//!
//! Every run recomputes all three artifacts (stock, predictions, scores)
//! from scratch and replaces them wholesale.

use crate::assemble::assemble;
use crate::config::PipelineConfig;
use crate::data;
use crate::error::Result;
use crate::metrics::average_mape;
use crate::stock::derive_stock;
use crate::store::{self, WriteMode};
use crate::trainer::train_and_forecast;
use tracing::{info, warn};

/// Counts reported after a completed batch
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Rows in the derived stock table
    pub stock_rows: usize,
    /// Rows in the assembled prediction table
    pub forecast_rows: usize,
    /// Stations that produced a forecast and a score
    pub modeled: usize,
    /// Stations skipped for insufficient history
    pub skipped: usize,
    /// Stations excluded by a fit failure
    pub failed: usize,
    /// Mean holdout MAPE across modeled stations
    pub average_mape: Option<f64>,
}

/// Run the full batch against a configuration.
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineReport> {
    info!(
        trips = %config.tables.trips,
        stations = %config.tables.stations,
        "reading input tables"
    );
    let trips = data::flows_from_dataframe(&store::read_table(&config.tables.trips)?)?;
    let stations = data::stations_from_dataframe(&store::read_table(&config.tables.stations)?)?;

    info!(rows = trips.len(), "deriving hourly stock");
    let stock = derive_stock(&trips, &stations, config.stock.rebalancing_proportion)?;
    let mut stock_df = data::stock_to_dataframe(&stock)?;
    store::write_table(&mut stock_df, &config.tables.stock, WriteMode::Replace)?;

    warn!("sparse stations can fit poorly; per-station failures are logged and skipped");
    let (forecasts, scores, summary) = train_and_forecast(
        &stock,
        config.horizon.start,
        config.horizon.end,
        config.model.order,
        &config.model.fit,
    )?;

    let predictions = assemble(&forecasts, &stations);
    let mut predictions_df = data::predictions_to_dataframe(&predictions)?;
    store::write_table(
        &mut predictions_df,
        &config.tables.predictions,
        WriteMode::Replace,
    )?;
    let mut scores_df = data::scores_to_dataframe(&scores)?;
    store::write_table(&mut scores_df, &config.tables.scores, WriteMode::Replace)?;

    let average = average_mape(&scores);
    if let Some(average) = average {
        info!(average_mape = average, "average MAPE across modeled stations");
    }

    Ok(PipelineReport {
        stock_rows: stock.len(),
        forecast_rows: predictions.len(),
        modeled: summary.modeled,
        skipped: summary.skipped,
        failed: summary.failed,
        average_mape: average,
    })
}
