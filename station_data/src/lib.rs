//! # Station Data
//!
//! `station_data` holds the record types shared across the bike-share
//! forecasting pipeline, plus the reduction of raw trip events into hourly
//! per-station flow counts.
//!
//! ## Usage Example
//!
//! ```
//! use station_data::flows::{aggregate_hourly_flows, TripEvent};
//! use chrono::NaiveDate;
//!
//! let start = NaiveDate::from_ymd_opt(2020, 3, 1)
//!     .unwrap()
//!     .and_hms_opt(8, 15, 0)
//!     .unwrap();
//! let trips = vec![TripEvent {
//!     start_station_id: 72,
//!     end_station_id: 72,
//!     start_time: start,
//!     stop_time: start + chrono::Duration::minutes(20),
//! }];
//!
//! let flows = aggregate_hourly_flows(&trips).unwrap();
//! assert_eq!(flows[0].inflows, 1);
//! assert_eq!(flows[0].outflows, 1);
//! ```

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Flow aggregation
pub mod flows;

pub use flows::{aggregate_hourly_flows, TripEvent};

/// Errors that can occur while shaping station records
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Invalid trip event: {0}")]
    InvalidEvent(String),
}

/// Hourly inflow/outflow counts observed at one station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationFlow {
    /// Station identifier
    pub station_id: i64,
    /// Calendar date of the observation
    pub date: NaiveDate,
    /// Hour of day, 0-23
    pub hour: u32,
    /// Count of arrivals in the hour
    pub inflows: u32,
    /// Count of departures in the hour
    pub outflows: u32,
}

/// Static station metadata as reported upstream.
///
/// Individual fields may be missing for some records; consumers coalesce
/// them per station before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationMeta {
    /// Station identifier, unique key
    pub station_id: i64,
    /// Display name
    pub name: Option<String>,
    /// Latitude in decimal degrees
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees
    pub longitude: Option<f64>,
    /// Dock capacity
    pub capacity: Option<i64>,
}

/// Reconstructed inventory level for one station at one hour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockPoint {
    /// Station identifier
    pub station_id: i64,
    /// Date and hour of the level, merged into one instant
    pub timestamp: NaiveDateTime,
    /// Station display name
    pub name: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Estimated number of bikes present
    pub stock: f64,
}

/// One forecast hour for one modeled station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    /// Station identifier
    pub station_id: i64,
    /// Calendar date of the forecast hour
    pub date: NaiveDate,
    /// Hour of day, 0-23
    pub hour: u32,
    /// Forecast bike count, rounded to the nearest integer
    pub pred_num_bikes: i64,
}

/// Holdout accuracy for one modeled station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationScore {
    /// Station identifier
    pub station_id: i64,
    /// Mean absolute percentage error over the held-out tail, capped at 100
    pub mape: f64,
}

/// Presentation row: a forecast joined with station metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRow {
    /// Station identifier
    pub station_id: i64,
    /// Station display name, when the station resolved
    pub name: Option<String>,
    /// Latitude in decimal degrees, when the station resolved
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees, when the station resolved
    pub longitude: Option<f64>,
    /// Calendar date of the forecast hour
    pub date: NaiveDate,
    /// Hour of day, 0-23
    pub hour: u32,
    /// Forecast bike count
    pub pred_num_bikes: i64,
}
