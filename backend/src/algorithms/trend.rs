//! Trend fitting and decomposition.
//!
//! All routines are deterministic: the same input always yields bit-identical
//! output, and none of them mutate their input.

use serde::{Deserialize, Serialize};

use crate::error::{SummarizerError, SummarizerResult};
use crate::models::{LinearModel, NumericPoint};

/// Guard for divisions by quantities that may be arbitrarily close to zero.
pub const EPSILON: f64 = 1e-9;

fn ensure_finite(points: &[NumericPoint], operation: &str) -> SummarizerResult<()> {
    if let Some(p) = points.iter().find(|p| p.x.is_nan() || p.y.is_nan()) {
        return Err(SummarizerError::invalid_input(format!(
            "NaN coordinate in point ({}, {})",
            p.x, p.y
        ))
        .with_operation(operation));
    }
    Ok(())
}

/// Ordinary least squares fit over `(x, y)` pairs.
///
/// # Errors
/// - `InvalidInput` if any coordinate is NaN.
/// - `InsufficientData` if fewer than two distinct x values are present.
pub fn fit_linear_model(points: &[NumericPoint]) -> SummarizerResult<LinearModel> {
    ensure_finite(points, "fit_linear_model")?;

    let has_two_distinct_x = points
        .first()
        .map(|first| points.iter().any(|p| p.x != first.x))
        .unwrap_or(false);
    if !has_two_distinct_x {
        return Err(SummarizerError::insufficient_data(format!(
            "linear fit needs at least 2 distinct x values, got {} points",
            points.len()
        ))
        .with_operation("fit_linear_model"));
    }

    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.x).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.y).sum::<f64>() / n;

    let (sxx, sxy) = points.iter().fold((0.0, 0.0), |(sxx, sxy), p| {
        let dx = p.x - mean_x;
        (sxx + dx * dx, sxy + dx * (p.y - mean_y))
    });

    let gradient = sxy / sxx;
    let intercept = mean_y - gradient * mean_x;

    Ok(LinearModel::new(gradient, intercept))
}

/// Centered moving average with `window / 2` neighbours on each side.
///
/// Odd windows average `window` points with equal weight. Even windows use
/// the classical 2×m average: `window + 1` points with half weight on the two
/// outermost ones. Edge points without a full window are dropped; the result
/// keeps the x of each centre point.
pub fn centered_moving_average(
    points: &[NumericPoint],
    window: usize,
) -> SummarizerResult<Vec<NumericPoint>> {
    ensure_finite(points, "centered_moving_average")?;
    if window == 0 {
        return Err(SummarizerError::invalid_input("moving average window must be at least 1")
            .with_operation("centered_moving_average"));
    }

    let half = window / 2;
    if points.len() < 2 * half + 1 {
        return Ok(Vec::new());
    }

    let even = window % 2 == 0;
    let smoothed = (half..points.len() - half)
        .map(|i| {
            let span = &points[i - half..=i + half];
            let sum: f64 = span
                .iter()
                .enumerate()
                .map(|(k, p)| {
                    if even && (k == 0 || k == span.len() - 1) {
                        p.y * 0.5
                    } else {
                        p.y
                    }
                })
                .sum();
            NumericPoint::new(points[i].x, sum / window as f64)
        })
        .collect();

    Ok(smoothed)
}

/// Additive decomposition `observed = trend + seasonal + residual`.
///
/// All four series are aligned and cover only the points retained by the
/// trend's moving average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decomposition {
    pub observed: Vec<NumericPoint>,
    pub trend: Vec<NumericPoint>,
    pub seasonal: Vec<NumericPoint>,
    pub residual: Vec<NumericPoint>,
}

fn phase_of(x: f64, period: usize) -> usize {
    (x.rem_euclid(period as f64).floor() as usize) % period
}

/// Additive decomposition with a seasonal cycle of `period` x-units.
///
/// Trend is the centered moving average with window `period`. The seasonal
/// component at phase `x mod period` is the mean detrended value of all
/// retained points sharing that phase.
pub fn additive_decompose(
    points: &[NumericPoint],
    period: usize,
) -> SummarizerResult<Decomposition> {
    if period == 0 {
        return Err(SummarizerError::invalid_input("seasonal period must be at least 1")
            .with_operation("additive_decompose"));
    }

    let trend = centered_moving_average(points, period)?;
    let half = period / 2;
    let observed: Vec<NumericPoint> = if trend.is_empty() {
        Vec::new()
    } else {
        points[half..half + trend.len()].to_vec()
    };

    let mut phase_sums = vec![0.0; period];
    let mut phase_counts = vec![0usize; period];
    for (o, t) in observed.iter().zip(&trend) {
        let phase = phase_of(o.x, period);
        phase_sums[phase] += o.y - t.y;
        phase_counts[phase] += 1;
    }
    let phase_means: Vec<f64> = phase_sums
        .iter()
        .zip(&phase_counts)
        .map(|(sum, &count)| if count > 0 { sum / count as f64 } else { 0.0 })
        .collect();

    let seasonal: Vec<NumericPoint> = observed
        .iter()
        .map(|o| NumericPoint::new(o.x, phase_means[phase_of(o.x, period)]))
        .collect();

    let residual: Vec<NumericPoint> = observed
        .iter()
        .zip(trend.iter().zip(&seasonal))
        .map(|(o, (t, s))| NumericPoint::new(o.x, o.y - t.y - s.y))
        .collect();

    Ok(Decomposition {
        observed,
        trend,
        seasonal,
        residual,
    })
}

#[cfg(test)]
#[path = "trend_tests.rs"]
mod trend_tests;
