//! Accuracy metrics for holdout evaluation

use crate::error::{PipelineError, Result};
use station_data::StationScore;

/// Upper bound applied to reported MAPE values
pub const MAPE_CAP: f64 = 100.0;

/// Mean Absolute Percentage Error, uncapped.
///
/// Zero actuals blow the ratio up to infinity; callers cap the result with
/// [`cap_mape`] before reporting it.
pub fn mean_absolute_percentage_error(actual: &[f64], predicted: &[f64]) -> Result<f64> {
    if actual.len() != predicted.len() || actual.is_empty() {
        return Err(PipelineError::InvalidParameter(
            "actual and predicted values must have the same non-zero length".to_string(),
        ));
    }

    let n = actual.len() as f64;
    let total: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(&a, &f)| ((f - a) / a).abs() * 100.0)
        .sum();

    Ok(total / n)
}

/// Cap a raw MAPE at [`MAPE_CAP`].
///
/// Non-finite blowups from near-zero actuals report the cap as well.
pub fn cap_mape(raw: f64) -> f64 {
    if !raw.is_finite() || raw > MAPE_CAP {
        MAPE_CAP
    } else {
        raw
    }
}

/// Mean of the per-station scores, for the end-of-run summary.
pub fn average_mape(scores: &[StationScore]) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    let total: f64 = scores.iter().map(|score| score.mape).sum();
    Some(total / scores.len() as f64)
}
