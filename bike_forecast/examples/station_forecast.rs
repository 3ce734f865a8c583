//! Fit a fixed-order model on a synthetic stock series and forecast ahead.

use bike_forecast::models::arima::{ArimaModel, FitOptions, ModelOrder};
use bike_forecast::models::{ForecastModel, TrainedForecastModel};

fn main() -> bike_forecast::Result<()> {
    // A daily-shaped inventory curve: base load plus a 24-hour cycle.
    let series: Vec<f64> = (0..500)
        .map(|t| 20.0 + 6.0 * (t as f64 * std::f64::consts::TAU / 24.0).sin())
        .collect();

    let order = ModelOrder { p: 2, d: 0, q: 0 };
    let model = ArimaModel::new(order, FitOptions::default())?;
    let trained = model.fit(&series)?;
    let forecast = trained.forecast(12)?;

    println!("{} forecast for the next 12 hours:", trained.name());
    for (step, value) in forecast.values().iter().enumerate() {
        println!("  +{:>2}h  {:>5.1} bikes", step + 1, value);
    }

    Ok(())
}
