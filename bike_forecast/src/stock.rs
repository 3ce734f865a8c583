//! Hourly stock reconstruction from station flow counts.
//!
//! The derived series treats each calendar day as restocked overnight: the
//! day's earliest observed hour resets to a fixed fraction of the station's
//! capacity, and later hours accumulate shifted net flows on top of it.

use crate::error::{PipelineError, Result};
use chrono::NaiveDate;
use station_data::{StationFlow, StationMeta, StockPoint};
use std::collections::HashMap;

struct JoinedRow {
    flow: StationFlow,
    meta: Option<StationMeta>,
    net_flow: f64,
    stock: f64,
}

/// Coalesce raw metadata records field-wise per station, first non-null
/// value winning, so every row of a station carries consistent metadata.
pub(crate) fn coalesce_stations(stations: &[StationMeta]) -> HashMap<i64, StationMeta> {
    let mut by_id: HashMap<i64, StationMeta> = HashMap::new();
    for record in stations {
        let entry = by_id
            .entry(record.station_id)
            .or_insert_with(|| StationMeta {
                station_id: record.station_id,
                name: None,
                latitude: None,
                longitude: None,
                capacity: None,
            });
        if entry.name.is_none() {
            entry.name = record.name.clone();
        }
        if entry.latitude.is_none() {
            entry.latitude = record.latitude;
        }
        if entry.longitude.is_none() {
            entry.longitude = record.longitude;
        }
        if entry.capacity.is_none() {
            entry.capacity = record.capacity;
        }
    }
    by_id
}

/// Derive the hourly stock series from flow counts and station metadata.
///
/// The day's earliest observed hour per station seeds
/// `round(capacity * rebalancing_proportion)`; every other row takes the
/// net flow (outflows minus inflows) of the immediately preceding row in
/// (station, date, hour) order, and a per-(station, day) running sum turns
/// those seeds and deltas into levels. Rows whose station never resolves
/// name, coordinates, or a stock value are dropped.
pub fn derive_stock(
    trips: &[StationFlow],
    stations: &[StationMeta],
    rebalancing_proportion: f64,
) -> Result<Vec<StockPoint>> {
    if !(0.0..=1.0).contains(&rebalancing_proportion) {
        return Err(PipelineError::InvalidParameter(format!(
            "rebalancing proportion must lie in [0, 1], got {}",
            rebalancing_proportion
        )));
    }
    if let Some(flow) = trips.iter().find(|flow| flow.hour > 23) {
        return Err(PipelineError::DataShape(format!(
            "hour {} out of range for station {}",
            flow.hour, flow.station_id
        )));
    }

    let meta = coalesce_stations(stations);

    let mut rows: Vec<JoinedRow> = trips
        .iter()
        .map(|flow| JoinedRow {
            meta: meta.get(&flow.station_id).cloned(),
            net_flow: f64::from(flow.outflows) - f64::from(flow.inflows),
            stock: 0.0,
            flow: flow.clone(),
        })
        .collect();

    // The recurrence below leans on this ordering.
    rows.sort_by(|a, b| {
        (a.flow.station_id, a.flow.date, a.flow.hour)
            .cmp(&(b.flow.station_id, b.flow.date, b.flow.hour))
    });

    // Earliest observed hour per (station, day) marks the rebalancing reset.
    let mut first_hour: HashMap<(i64, NaiveDate), u32> = HashMap::new();
    for row in &rows {
        let slot = first_hour
            .entry((row.flow.station_id, row.flow.date))
            .or_insert(row.flow.hour);
        if row.flow.hour < *slot {
            *slot = row.flow.hour;
        }
    }

    // Seed/delta assignment: the reset takes precedence at the day's
    // earliest hour; everything else shifts net flows by one row across the
    // full sorted sequence.
    for i in 0..rows.len() {
        let key = (rows[i].flow.station_id, rows[i].flow.date);
        if first_hour[&key] == rows[i].flow.hour {
            rows[i].stock = match rows[i].meta.as_ref().and_then(|m| m.capacity) {
                Some(capacity) => (capacity as f64 * rebalancing_proportion).round(),
                None => f64::NAN,
            };
        } else if i > 0 {
            rows[i].stock = rows[i - 1].net_flow;
        } else {
            rows[i].stock = f64::NAN;
        }
    }

    // Per-(station, day) running sum; null seeds stay null without
    // poisoning the rest of the day.
    let mut acc = 0.0;
    let mut current_key: Option<(i64, NaiveDate)> = None;
    for row in rows.iter_mut() {
        let key = (row.flow.station_id, row.flow.date);
        if current_key != Some(key) {
            current_key = Some(key);
            acc = 0.0;
        }
        if row.stock.is_nan() {
            continue;
        }
        acc += row.stock;
        row.stock = acc;
    }

    let mut points = Vec::with_capacity(rows.len());
    for row in rows {
        let meta = match row.meta {
            Some(meta) => meta,
            None => continue,
        };
        let (name, latitude, longitude) = match (meta.name, meta.latitude, meta.longitude) {
            (Some(name), Some(latitude), Some(longitude)) => (name, latitude, longitude),
            _ => continue,
        };
        if row.stock.is_nan() {
            continue;
        }
        let timestamp = row
            .flow
            .date
            .and_hms_opt(row.flow.hour, 0, 0)
            .ok_or_else(|| {
                PipelineError::DataShape(format!(
                    "hour {} out of range for station {}",
                    row.flow.hour, row.flow.station_id
                ))
            })?;
        points.push(StockPoint {
            station_id: row.flow.station_id,
            timestamp,
            name,
            latitude,
            longitude,
            stock: row.stock,
        });
    }

    Ok(points)
}
