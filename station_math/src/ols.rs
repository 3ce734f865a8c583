//! Ordinary least squares via normal equations.

use crate::{MathError, Result};

/// A fitted least-squares solution
#[derive(Debug, Clone)]
pub struct OlsFit {
    /// Estimated coefficients, one per design-matrix column
    pub coefficients: Vec<f64>,
    /// Per-row residuals (observed minus fitted)
    pub residuals: Vec<f64>,
}

/// Solve `min ||y - X b||` for `b` over the row-major design matrix `rows`.
///
/// Every row must have the same width, and there must be at least as many
/// rows as columns for the normal equations to be determined.
pub fn least_squares(rows: &[Vec<f64>], y: &[f64]) -> Result<OlsFit> {
    if rows.is_empty() {
        return Err(MathError::InsufficientData(
            "empty design matrix".to_string(),
        ));
    }
    if rows.len() != y.len() {
        return Err(MathError::InvalidInput(format!(
            "design matrix has {} rows but {} targets",
            rows.len(),
            y.len()
        )));
    }

    let width = rows[0].len();
    if width == 0 {
        return Err(MathError::InvalidInput(
            "design matrix has no columns".to_string(),
        ));
    }
    if rows.iter().any(|row| row.len() != width) {
        return Err(MathError::InvalidInput(
            "ragged design matrix".to_string(),
        ));
    }
    if rows.len() < width {
        return Err(MathError::InsufficientData(format!(
            "{} rows cannot determine {} coefficients",
            rows.len(),
            width
        )));
    }

    // Accumulate X'X (symmetric, so only the upper triangle) and X'y.
    let mut xtx = vec![vec![0.0; width]; width];
    let mut xty = vec![0.0; width];
    for (row, &target) in rows.iter().zip(y.iter()) {
        for i in 0..width {
            xty[i] += row[i] * target;
            for j in i..width {
                xtx[i][j] += row[i] * row[j];
            }
        }
    }
    for i in 0..width {
        for j in 0..i {
            xtx[i][j] = xtx[j][i];
        }
    }

    let coefficients = solve(xtx, xty)?;
    if coefficients.iter().any(|c| !c.is_finite()) {
        return Err(MathError::CalculationError(
            "non-finite coefficients".to_string(),
        ));
    }

    let residuals = rows
        .iter()
        .zip(y.iter())
        .map(|(row, &target)| {
            let fitted: f64 = row
                .iter()
                .zip(coefficients.iter())
                .map(|(x, b)| x * b)
                .sum();
            target - fitted
        })
        .collect();

    Ok(OlsFit {
        coefficients,
        residuals,
    })
}

/// Gaussian elimination with partial pivoting.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>> {
    let n = b.len();

    for col in 0..n {
        let mut pivot = col;
        for row in col + 1..n {
            if a[row][col].abs() > a[pivot][col].abs() {
                pivot = row;
            }
        }
        if a[pivot][col].abs() < 1e-12 {
            return Err(MathError::CalculationError(
                "singular normal equations".to_string(),
            ));
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        let pivot_row = a[col].clone();
        let pivot_target = b[col];
        for row in col + 1..n {
            let factor = a[row][col] / pivot_row[col];
            b[row] -= factor * pivot_target;
            for k in col..n {
                a[row][k] -= factor * pivot_row[k];
            }
        }
    }

    // Back substitution
    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let mut acc = b[row];
        for k in row + 1..n {
            acc -= a[row][k] * x[k];
        }
        x[row] = acc / a[row][row];
    }

    Ok(x)
}
