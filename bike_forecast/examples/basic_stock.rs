//! Derive an hourly stock series for a single station and print it.

use bike_forecast::stock::derive_stock;
use chrono::NaiveDate;
use station_data::{StationFlow, StationMeta};

fn main() -> bike_forecast::Result<()> {
    let date = NaiveDate::from_ymd_opt(2020, 3, 1).expect("valid date");
    let observed = [
        (6, 1, 3),
        (9, 6, 3),
        (10, 2, 4),
        (11, 2, 2),
        (12, 3, 5),
        (13, 2, 3),
        (14, 4, 4),
        (15, 4, 4),
    ];
    let flows: Vec<StationFlow> = observed
        .iter()
        .map(|&(hour, inflows, outflows)| StationFlow {
            station_id: 72,
            date,
            hour,
            inflows,
            outflows,
        })
        .collect();
    let stations = vec![StationMeta {
        station_id: 72,
        name: Some("W 52 St & 11 Ave".to_string()),
        latitude: Some(40.767_27),
        longitude: Some(-73.993_93),
        capacity: Some(39),
    }];

    let stock = derive_stock(&flows, &stations, 0.65)?;

    println!("hourly stock for station 72:");
    for point in &stock {
        println!("  {}  {:>5.1}", point.timestamp, point.stock);
    }

    Ok(())
}
