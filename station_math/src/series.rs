//! Differencing helpers for integrated models.

use crate::{MathError, Result};

/// Difference a series `order` times.
pub fn difference(series: &[f64], order: usize) -> Result<Vec<f64>> {
    if series.len() <= order {
        return Err(MathError::InsufficientData(format!(
            "cannot difference {} points {} times",
            series.len(),
            order
        )));
    }

    let mut current = series.to_vec();
    for _ in 0..order {
        current = current.windows(2).map(|w| w[1] - w[0]).collect();
    }
    Ok(current)
}

/// Invert [`difference`] for forecast values.
///
/// `forecasts` are steps ahead of `history` at differencing depth `order`;
/// the result is the same steps expressed at the level of the original
/// series.
pub fn integrate(forecasts: &[f64], history: &[f64], order: usize) -> Result<Vec<f64>> {
    if order == 0 {
        return Ok(forecasts.to_vec());
    }
    if history.len() <= order {
        return Err(MathError::InsufficientData(format!(
            "cannot integrate over {} points of history at order {}",
            history.len(),
            order
        )));
    }

    // Last observed value at each differencing depth below `order`.
    let mut tails = Vec::with_capacity(order);
    let mut current = history.to_vec();
    for _ in 0..order {
        tails.push(current[current.len() - 1]);
        current = current.windows(2).map(|w| w[1] - w[0]).collect();
    }

    let mut out = Vec::with_capacity(forecasts.len());
    for &forecast in forecasts {
        let mut value = forecast;
        for tail in tails.iter_mut().rev() {
            value += *tail;
            *tail = value;
        }
        out.push(value);
    }
    Ok(out)
}
