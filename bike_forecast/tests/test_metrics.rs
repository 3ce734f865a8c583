use assert_approx_eq::assert_approx_eq;
use bike_forecast::metrics::{average_mape, cap_mape, mean_absolute_percentage_error, MAPE_CAP};
use station_data::StationScore;

#[test]
fn test_mape_exact_value() {
    let actual = vec![100.0, 100.0];
    let predicted = vec![142.0, 142.0];

    let mape = mean_absolute_percentage_error(&actual, &predicted).unwrap();
    assert_approx_eq!(mape, 42.0);
}

#[test]
fn test_raw_mape_of_150_reports_100() {
    let actual = vec![100.0];
    let predicted = vec![250.0];

    let raw = mean_absolute_percentage_error(&actual, &predicted).unwrap();
    assert_approx_eq!(raw, 150.0);
    assert_eq!(cap_mape(raw), 100.0);
}

#[test]
fn test_raw_mape_of_42_reports_42() {
    assert_eq!(cap_mape(42.0), 42.0);
}

#[test]
fn test_zero_actuals_report_the_cap() {
    let actual = vec![0.0, 0.0];
    let predicted = vec![3.0, 5.0];

    let raw = mean_absolute_percentage_error(&actual, &predicted).unwrap();
    assert!(!raw.is_finite());
    assert_eq!(cap_mape(raw), MAPE_CAP);
}

#[test]
fn test_nan_ratio_reports_the_cap() {
    assert_eq!(cap_mape(f64::NAN), MAPE_CAP);
}

#[test]
fn test_mismatched_lengths_rejected() {
    assert!(mean_absolute_percentage_error(&[1.0, 2.0], &[1.0]).is_err());
    assert!(mean_absolute_percentage_error(&[], &[]).is_err());
}

#[test]
fn test_average_mape() {
    let scores = vec![
        StationScore {
            station_id: 1,
            mape: 20.0,
        },
        StationScore {
            station_id: 2,
            mape: 60.0,
        },
    ];

    assert_approx_eq!(average_mape(&scores).unwrap(), 40.0);
    assert!(average_mape(&[]).is_none());
}
