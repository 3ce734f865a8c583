//! Reduction of raw trip events into hourly station flow counts.

use crate::{FlowError, StationFlow};
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single completed trip between two stations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripEvent {
    /// Station the bike departed from
    pub start_station_id: i64,
    /// Station the bike arrived at
    pub end_station_id: i64,
    /// Departure instant
    pub start_time: NaiveDateTime,
    /// Arrival instant
    pub stop_time: NaiveDateTime,
}

/// Reduce trips to hourly per-station inflow/outflow counts.
///
/// A trip counts one departure at its start station in the hour it began
/// and one arrival at its end station in the hour it ended. An hour enters
/// the output only when the station saw both at least one arrival and at
/// least one departure in it.
pub fn aggregate_hourly_flows(trips: &[TripEvent]) -> Result<Vec<StationFlow>, FlowError> {
    let mut arrivals: BTreeMap<(i64, NaiveDate, u32), u32> = BTreeMap::new();
    let mut departures: BTreeMap<(i64, NaiveDate, u32), u32> = BTreeMap::new();

    for trip in trips {
        if trip.stop_time < trip.start_time {
            return Err(FlowError::InvalidEvent(format!(
                "trip from station {} to station {} ends before it starts",
                trip.start_station_id, trip.end_station_id
            )));
        }
        let departed = (
            trip.start_station_id,
            trip.start_time.date(),
            trip.start_time.hour(),
        );
        let arrived = (
            trip.end_station_id,
            trip.stop_time.date(),
            trip.stop_time.hour(),
        );
        *departures.entry(departed).or_insert(0) += 1;
        *arrivals.entry(arrived).or_insert(0) += 1;
    }

    let flows = arrivals
        .iter()
        .filter_map(|(&(station_id, date, hour), &inflows)| {
            departures
                .get(&(station_id, date, hour))
                .map(|&outflows| StationFlow {
                    station_id,
                    date,
                    hour,
                    inflows,
                    outflows,
                })
        })
        .collect();

    Ok(flows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 3, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn trip(start: i64, end: i64, from: NaiveDateTime, to: NaiveDateTime) -> TripEvent {
        TripEvent {
            start_station_id: start,
            end_station_id: end,
            start_time: from,
            stop_time: to,
        }
    }

    #[test]
    fn test_counts_both_sides_of_a_trip() {
        let trips = vec![
            trip(1, 2, at(1, 8, 0), at(1, 8, 30)),
            trip(2, 1, at(1, 8, 10), at(1, 8, 50)),
        ];

        let flows = aggregate_hourly_flows(&trips).unwrap();

        assert_eq!(flows.len(), 2);
        for flow in &flows {
            assert_eq!(flow.inflows, 1);
            assert_eq!(flow.outflows, 1);
            assert_eq!(flow.hour, 8);
        }
    }

    #[test]
    fn test_one_sided_hours_are_dropped() {
        // Station 1 only departs, station 2 only arrives.
        let trips = vec![trip(1, 2, at(1, 9, 0), at(1, 9, 20))];

        let flows = aggregate_hourly_flows(&trips).unwrap();

        assert!(flows.is_empty());
    }

    #[test]
    fn test_hour_boundaries_split_counts() {
        // Departure at 7:59, arrival at 8:01 land in different hours.
        let trips = vec![
            trip(5, 5, at(2, 7, 59), at(2, 8, 1)),
            trip(5, 5, at(2, 7, 5), at(2, 7, 45)),
            trip(5, 5, at(2, 8, 5), at(2, 8, 45)),
        ];

        let flows = aggregate_hourly_flows(&trips).unwrap();

        assert_eq!(flows.len(), 2);
        assert_eq!((flows[0].hour, flows[0].inflows, flows[0].outflows), (7, 1, 2));
        assert_eq!((flows[1].hour, flows[1].inflows, flows[1].outflows), (8, 2, 1));
    }

    #[test]
    fn test_backwards_trip_rejected() {
        let trips = vec![trip(1, 2, at(1, 9, 30), at(1, 9, 0))];

        assert!(matches!(
            aggregate_hourly_flows(&trips),
            Err(FlowError::InvalidEvent(_))
        ));
    }
}
