//! Conversions between polars DataFrames and the typed pipeline records.
//!
//! Readers validate table shape here so the rest of the pipeline can rely
//! on well-formed rows; a missing column, a wrong dtype, or an unexpected
//! null surfaces as [`PipelineError::DataShape`]. Writers emit a fixed
//! column order so replace-mode persistence stays byte-identical across
//! re-runs on unchanged input.

use crate::error::{PipelineError, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use station_data::{
    ForecastRecord, PredictionRow, StationFlow, StationMeta, StationScore, StockPoint,
};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn required_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map_err(|_| PipelineError::DataShape(format!("missing required column '{}'", name)))
}

fn null_value(name: &str, row: usize) -> PipelineError {
    PipelineError::DataShape(format!("null value in column '{}' at row {}", name, row))
}

fn require<T>(value: Option<T>, name: &str, row: usize) -> Result<T> {
    value.ok_or_else(|| null_value(name, row))
}

fn int_values(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>> {
    let col = required_column(df, name)?;
    match col.dtype() {
        DataType::Int64 => Ok(col.i64()?.into_iter().collect()),
        DataType::Int32 => Ok(col.i32()?.into_iter().map(|v| v.map(i64::from)).collect()),
        DataType::UInt32 => Ok(col.u32()?.into_iter().map(|v| v.map(i64::from)).collect()),
        DataType::UInt64 => Ok(col
            .u64()?
            .into_iter()
            .map(|v| v.map(|value| value as i64))
            .collect()),
        other => Err(PipelineError::DataShape(format!(
            "column '{}' must be an integer type, got {:?}",
            name, other
        ))),
    }
}

fn float_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let col = required_column(df, name)?;
    match col.dtype() {
        DataType::Float64 => Ok(col.f64()?.into_iter().collect()),
        DataType::Float32 => Ok(col.f32()?.into_iter().map(|v| v.map(f64::from)).collect()),
        DataType::Int64 => Ok(col
            .i64()?
            .into_iter()
            .map(|v| v.map(|value| value as f64))
            .collect()),
        DataType::Int32 => Ok(col.i32()?.into_iter().map(|v| v.map(f64::from)).collect()),
        other => Err(PipelineError::DataShape(format!(
            "column '{}' must be a numeric type, got {:?}",
            name, other
        ))),
    }
}

fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let col = required_column(df, name)?;
    match col.dtype() {
        DataType::Utf8 => Ok(col
            .utf8()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect()),
        other => Err(PipelineError::DataShape(format!(
            "column '{}' must be a string type, got {:?}",
            name, other
        ))),
    }
}

fn date_values(df: &DataFrame, name: &str) -> Result<Vec<Option<NaiveDate>>> {
    let col = required_column(df, name)?;
    match col.dtype() {
        DataType::Utf8 => {
            let mut out = Vec::with_capacity(df.height());
            for value in col.utf8()?.into_iter() {
                match value {
                    Some(raw) => {
                        let parsed = NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| {
                            PipelineError::DataShape(format!(
                                "column '{}' holds an unparseable date '{}'",
                                name, raw
                            ))
                        })?;
                        out.push(Some(parsed));
                    }
                    None => out.push(None),
                }
            }
            Ok(out)
        }
        DataType::Date => {
            let mut out = Vec::with_capacity(df.height());
            for value in col.date()?.into_iter() {
                match value {
                    Some(days) => {
                        let parsed = NaiveDate::from_ymd_opt(1970, 1, 1)
                            .and_then(|epoch| {
                                epoch.checked_add_signed(Duration::days(i64::from(days)))
                            })
                            .ok_or_else(|| {
                                PipelineError::DataShape(format!(
                                    "column '{}' holds an out-of-range date",
                                    name
                                ))
                            })?;
                        out.push(Some(parsed));
                    }
                    None => out.push(None),
                }
            }
            Ok(out)
        }
        other => Err(PipelineError::DataShape(format!(
            "column '{}' must be a date type, got {:?}",
            name, other
        ))),
    }
}

fn timestamp_values(df: &DataFrame, name: &str) -> Result<Vec<Option<NaiveDateTime>>> {
    let col = required_column(df, name)?;
    match col.dtype() {
        DataType::Utf8 => {
            let mut out = Vec::with_capacity(df.height());
            for value in col.utf8()?.into_iter() {
                match value {
                    Some(raw) => {
                        let parsed = NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
                            .map_err(|_| {
                                PipelineError::DataShape(format!(
                                    "column '{}' holds an unparseable timestamp '{}'",
                                    name, raw
                                ))
                            })?;
                        out.push(Some(parsed));
                    }
                    None => out.push(None),
                }
            }
            Ok(out)
        }
        other => Err(PipelineError::DataShape(format!(
            "column '{}' must hold '{}' timestamps, got {:?}",
            name, TIMESTAMP_FORMAT, other
        ))),
    }
}

/// Read hourly flow counts from a table with columns station_id, date,
/// hour, inflows, outflows.
pub fn flows_from_dataframe(df: &DataFrame) -> Result<Vec<StationFlow>> {
    let station_ids = int_values(df, "station_id")?;
    let dates = date_values(df, "date")?;
    let hours = int_values(df, "hour")?;
    let inflows = int_values(df, "inflows")?;
    let outflows = int_values(df, "outflows")?;

    let mut rows = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let station_id = require(station_ids[i], "station_id", i)?;
        let date = require(dates[i], "date", i)?;
        let hour = require(hours[i], "hour", i)?;
        if !(0..=23).contains(&hour) {
            return Err(PipelineError::DataShape(format!(
                "hour {} out of range at row {}",
                hour, i
            )));
        }
        let inflow = require(inflows[i], "inflows", i)?;
        let outflow = require(outflows[i], "outflows", i)?;
        if inflow < 0 || outflow < 0 {
            return Err(PipelineError::DataShape(format!(
                "negative flow count at row {}",
                i
            )));
        }
        rows.push(StationFlow {
            station_id,
            date,
            hour: hour as u32,
            inflows: inflow as u32,
            outflows: outflow as u32,
        });
    }
    Ok(rows)
}

/// Read station metadata from a table keyed by station_id; name,
/// coordinates, and capacity may be partially reported.
pub fn stations_from_dataframe(df: &DataFrame) -> Result<Vec<StationMeta>> {
    let station_ids = int_values(df, "station_id")?;
    let names = string_values(df, "name")?;
    let latitudes = float_values(df, "latitude")?;
    let longitudes = float_values(df, "longitude")?;
    let capacities = int_values(df, "capacity")?;

    let mut rows = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        rows.push(StationMeta {
            station_id: require(station_ids[i], "station_id", i)?,
            name: names[i].clone(),
            latitude: latitudes[i],
            longitude: longitudes[i],
            capacity: capacities[i],
        });
    }
    Ok(rows)
}

/// Read a previously derived stock table.
pub fn stock_from_dataframe(df: &DataFrame) -> Result<Vec<StockPoint>> {
    let station_ids = int_values(df, "station_id")?;
    let timestamps = timestamp_values(df, "date")?;
    let names = string_values(df, "name")?;
    let latitudes = float_values(df, "latitude")?;
    let longitudes = float_values(df, "longitude")?;
    let stocks = float_values(df, "stock")?;

    let mut points = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        points.push(StockPoint {
            station_id: require(station_ids[i], "station_id", i)?,
            timestamp: require(timestamps[i], "date", i)?,
            name: require(names[i].clone(), "name", i)?,
            latitude: require(latitudes[i], "latitude", i)?,
            longitude: require(longitudes[i], "longitude", i)?,
            stock: require(stocks[i], "stock", i)?,
        });
    }
    Ok(points)
}

/// Write the derived stock series; the timestamp lands in the date column.
pub fn stock_to_dataframe(points: &[StockPoint]) -> Result<DataFrame> {
    let station_ids: Vec<i64> = points.iter().map(|p| p.station_id).collect();
    let timestamps: Vec<String> = points
        .iter()
        .map(|p| p.timestamp.format(TIMESTAMP_FORMAT).to_string())
        .collect();
    let names: Vec<String> = points.iter().map(|p| p.name.clone()).collect();
    let latitudes: Vec<f64> = points.iter().map(|p| p.latitude).collect();
    let longitudes: Vec<f64> = points.iter().map(|p| p.longitude).collect();
    let stocks: Vec<f64> = points.iter().map(|p| p.stock).collect();

    let df = DataFrame::new(vec![
        Series::new("station_id", station_ids),
        Series::new("date", timestamps),
        Series::new("name", names),
        Series::new("latitude", latitudes),
        Series::new("longitude", longitudes),
        Series::new("stock", stocks),
    ])?;
    Ok(df)
}

/// Write forecast rows as station_id, date, hour, pred_num_bikes.
pub fn forecasts_to_dataframe(records: &[ForecastRecord]) -> Result<DataFrame> {
    let station_ids: Vec<i64> = records.iter().map(|r| r.station_id).collect();
    let dates: Vec<String> = records
        .iter()
        .map(|r| r.date.format(DATE_FORMAT).to_string())
        .collect();
    let hours: Vec<i64> = records.iter().map(|r| i64::from(r.hour)).collect();
    let predictions: Vec<i64> = records.iter().map(|r| r.pred_num_bikes).collect();

    let df = DataFrame::new(vec![
        Series::new("station_id", station_ids),
        Series::new("date", dates),
        Series::new("hour", hours),
        Series::new("pred_num_bikes", predictions),
    ])?;
    Ok(df)
}

/// Write per-station holdout scores as station_id, MAPE.
pub fn scores_to_dataframe(scores: &[StationScore]) -> Result<DataFrame> {
    let station_ids: Vec<i64> = scores.iter().map(|s| s.station_id).collect();
    let mapes: Vec<f64> = scores.iter().map(|s| s.mape).collect();

    let df = DataFrame::new(vec![
        Series::new("station_id", station_ids),
        Series::new("MAPE", mapes),
    ])?;
    Ok(df)
}

/// Write assembled prediction rows in presentation order.
pub fn predictions_to_dataframe(rows: &[PredictionRow]) -> Result<DataFrame> {
    let station_ids: Vec<i64> = rows.iter().map(|r| r.station_id).collect();
    let names: Vec<Option<String>> = rows.iter().map(|r| r.name.clone()).collect();
    let latitudes: Vec<Option<f64>> = rows.iter().map(|r| r.latitude).collect();
    let longitudes: Vec<Option<f64>> = rows.iter().map(|r| r.longitude).collect();
    let dates: Vec<String> = rows
        .iter()
        .map(|r| r.date.format(DATE_FORMAT).to_string())
        .collect();
    let hours: Vec<i64> = rows.iter().map(|r| i64::from(r.hour)).collect();
    let predictions: Vec<i64> = rows.iter().map(|r| r.pred_num_bikes).collect();

    let df = DataFrame::new(vec![
        Series::new("station_id", station_ids),
        Series::new("name", names),
        Series::new("latitude", latitudes),
        Series::new("longitude", longitudes),
        Series::new("date", dates),
        Series::new("hour", hours),
        Series::new("pred_num_bikes", predictions),
    ])?;
    Ok(df)
}
