use bike_forecast::stock::derive_stock;
use bike_forecast::PipelineError;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use station_data::{StationFlow, StationMeta};

fn flow(station_id: i64, day: u32, hour: u32, inflows: u32, outflows: u32) -> StationFlow {
    StationFlow {
        station_id,
        date: NaiveDate::from_ymd_opt(2020, 3, day).unwrap(),
        hour,
        inflows,
        outflows,
    }
}

fn station(station_id: i64, capacity: i64) -> StationMeta {
    StationMeta {
        station_id,
        name: Some(format!("Station {}", station_id)),
        latitude: Some(40.75),
        longitude: Some(-73.99),
        capacity: Some(capacity),
    }
}

fn worked_example_flows() -> Vec<StationFlow> {
    vec![
        flow(72, 1, 6, 1, 3),
        flow(72, 1, 9, 6, 3),
        flow(72, 1, 10, 2, 4),
        flow(72, 1, 11, 2, 2),
        flow(72, 1, 12, 3, 5),
        flow(72, 1, 13, 2, 3),
        flow(72, 1, 14, 4, 4),
        flow(72, 1, 15, 4, 4),
    ]
}

#[test]
fn test_worked_example_sequence() {
    let stock = derive_stock(&worked_example_flows(), &[station(72, 39)], 0.65).unwrap();

    let values: Vec<f64> = stock.iter().map(|p| p.stock).collect();
    assert_eq!(values, vec![25.0, 27.0, 24.0, 26.0, 26.0, 28.0, 29.0, 29.0]);

    // Hours merge into the timestamp.
    assert_eq!(
        stock[0].timestamp,
        NaiveDate::from_ymd_opt(2020, 3, 1)
            .unwrap()
            .and_hms_opt(6, 0, 0)
            .unwrap()
    );
    assert_eq!(stock[0].name, "Station 72");
}

#[test]
fn test_daily_reset_invariant() {
    // Three days of observations; each day's earliest hour must sit at the
    // rebalanced level regardless of the previous day's drift.
    let mut flows = Vec::new();
    for day in 1..=3 {
        for hour in [5, 8, 13, 21] {
            flows.push(flow(7, day, hour, (hour % 3) as u32, (hour % 5) as u32));
        }
    }

    let stock = derive_stock(&flows, &[station(7, 31)], 0.65).unwrap();

    let expected_seed = (31.0_f64 * 0.65).round();
    for day in 1..=3 {
        let date = NaiveDate::from_ymd_opt(2020, 3, day).unwrap();
        let first = stock
            .iter()
            .filter(|p| p.timestamp.date() == date)
            .min_by_key(|p| p.timestamp)
            .unwrap();
        assert_eq!(first.stock, expected_seed);
    }
}

#[test]
fn test_cumulative_invariant() {
    let flows = worked_example_flows();
    let stock = derive_stock(&flows, &[station(72, 39)], 0.65).unwrap();

    // Beyond the first row of the day, consecutive stock levels differ by
    // the net flow of the preceding observation.
    for i in 1..stock.len() {
        let net_flow = f64::from(flows[i - 1].outflows) - f64::from(flows[i - 1].inflows);
        assert_eq!(stock[i].stock - stock[i - 1].stock, net_flow);
    }
}

#[test]
fn test_idempotent_on_identical_input() {
    let flows = worked_example_flows();
    let stations = [station(72, 39)];

    let first = derive_stock(&flows, &stations, 0.65).unwrap();
    let second = derive_stock(&flows, &stations, 0.65).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_input_order_does_not_matter() {
    let mut shuffled = worked_example_flows();
    shuffled.reverse();
    shuffled.swap(1, 5);

    let sorted = derive_stock(&worked_example_flows(), &[station(72, 39)], 0.65).unwrap();
    let unsorted = derive_stock(&shuffled, &[station(72, 39)], 0.65).unwrap();

    assert_eq!(sorted, unsorted);
}

#[test]
fn test_unmatched_station_rows_are_dropped() {
    let mut flows = worked_example_flows();
    flows.push(flow(999, 1, 6, 2, 2));
    flows.push(flow(999, 1, 7, 1, 4));

    let stock = derive_stock(&flows, &[station(72, 39)], 0.65).unwrap();

    assert!(stock.iter().all(|p| p.station_id == 72));
    assert_eq!(stock.len(), 8);
}

#[test]
fn test_partial_metadata_records_coalesce() {
    // Name arrives on one record, coordinates and capacity on another.
    let stations = vec![
        StationMeta {
            station_id: 72,
            name: Some("W 52 St & 11 Ave".to_string()),
            latitude: None,
            longitude: None,
            capacity: None,
        },
        StationMeta {
            station_id: 72,
            name: None,
            latitude: Some(40.767),
            longitude: Some(-73.994),
            capacity: Some(39),
        },
    ];

    let stock = derive_stock(&worked_example_flows(), &stations, 0.65).unwrap();

    assert_eq!(stock.len(), 8);
    assert_eq!(stock[0].name, "W 52 St & 11 Ave");
    assert_eq!(stock[0].latitude, 40.767);
    assert_eq!(stock[0].stock, 25.0);
}

#[test]
fn test_rejects_out_of_range_proportion() {
    let result = derive_stock(&worked_example_flows(), &[station(72, 39)], 1.2);
    assert!(matches!(result, Err(PipelineError::InvalidParameter(_))));
}

#[test]
fn test_rejects_out_of_range_hour() {
    let flows = vec![flow(72, 1, 24, 1, 1)];
    let result = derive_stock(&flows, &[station(72, 39)], 0.65);
    assert!(matches!(result, Err(PipelineError::DataShape(_))));
}
