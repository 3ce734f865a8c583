//! Prediction table assembly for presentation.

use crate::stock::coalesce_stations;
use station_data::{ForecastRecord, PredictionRow, StationMeta};
use std::cmp::Ordering;

/// Join forecasts with station metadata and order the result for
/// presentation: longitude ascending, then latitude descending (roughly
/// west-to-east, then north-to-south). Rows whose station never resolved
/// order last.
pub fn assemble(forecasts: &[ForecastRecord], stations: &[StationMeta]) -> Vec<PredictionRow> {
    let meta = coalesce_stations(stations);

    let mut rows: Vec<PredictionRow> = forecasts
        .iter()
        .map(|forecast| {
            let station = meta.get(&forecast.station_id);
            PredictionRow {
                station_id: forecast.station_id,
                name: station.and_then(|m| m.name.clone()),
                latitude: station.and_then(|m| m.latitude),
                longitude: station.and_then(|m| m.longitude),
                date: forecast.date,
                hour: forecast.hour,
                pred_num_bikes: forecast.pred_num_bikes,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        compare_coordinate(a.longitude, b.longitude)
            .then_with(|| compare_coordinate(b.latitude, a.latitude))
    });

    rows
}

fn compare_coordinate(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
