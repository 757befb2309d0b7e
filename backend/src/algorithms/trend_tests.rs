use super::{additive_decompose, centered_moving_average, fit_linear_model};
use crate::error::SummarizerError;
use crate::models::NumericPoint;
use proptest::prelude::*;

fn points(values: &[(f64, f64)]) -> Vec<NumericPoint> {
    values.iter().copied().map(NumericPoint::from).collect()
}

#[test]
fn test_fit_exact_line() {
    let pts: Vec<NumericPoint> = (0..10)
        .map(|i| NumericPoint::new(i as f64, 2.0 * i as f64 + 3.0))
        .collect();
    let model = fit_linear_model(&pts).unwrap();

    assert!((model.gradient - 2.0).abs() < 1e-9);
    assert!((model.intercept - 3.0).abs() < 1e-9);
}

#[test]
fn test_fit_two_points() {
    let model = fit_linear_model(&points(&[(1.0, 1.0), (3.0, -3.0)])).unwrap();
    assert!((model.gradient + 2.0).abs() < 1e-12);
    assert!((model.intercept - 3.0).abs() < 1e-12);
}

#[test]
fn test_fit_requires_two_distinct_x() {
    let err = fit_linear_model(&points(&[(1.0, 1.0), (1.0, 5.0)])).unwrap_err();
    assert!(err.is_insufficient_data());

    assert!(fit_linear_model(&points(&[(1.0, 1.0)]))
        .unwrap_err()
        .is_insufficient_data());
    assert!(fit_linear_model(&[]).unwrap_err().is_insufficient_data());
}

#[test]
fn test_fit_rejects_nan() {
    let err = fit_linear_model(&points(&[(0.0, 1.0), (1.0, f64::NAN)])).unwrap_err();
    assert!(matches!(err, SummarizerError::InvalidInput { .. }));
}

#[test]
fn test_moving_average_odd_window() {
    let pts = points(&[(0.0, 1.0), (1.0, 2.0), (2.0, 3.0), (3.0, 4.0), (4.0, 5.0)]);
    let smoothed = centered_moving_average(&pts, 3).unwrap();

    assert_eq!(smoothed.len(), 3);
    assert_eq!(smoothed[0], NumericPoint::new(1.0, 2.0));
    assert_eq!(smoothed[1], NumericPoint::new(2.0, 3.0));
    assert_eq!(smoothed[2], NumericPoint::new(3.0, 4.0));
}

#[test]
fn test_moving_average_even_window_uses_half_weight_ends() {
    let pts = points(&[(0.0, 0.0), (1.0, 4.0), (2.0, 8.0), (3.0, 0.0), (4.0, 4.0)]);
    let smoothed = centered_moving_average(&pts, 2).unwrap();

    assert_eq!(smoothed.len(), 3);
    // (0.5 * 0 + 4 + 0.5 * 8) / 2
    assert!((smoothed[0].y - 4.0).abs() < 1e-12);
    assert_eq!(smoothed[0].x, 1.0);
}

#[test]
fn test_moving_average_too_short_is_empty() {
    let pts = points(&[(0.0, 1.0), (1.0, 2.0)]);
    assert!(centered_moving_average(&pts, 7).unwrap().is_empty());
}

#[test]
fn test_moving_average_zero_window() {
    let pts = points(&[(0.0, 1.0)]);
    assert!(centered_moving_average(&pts, 0).is_err());
}

#[test]
fn test_decompose_pure_seasonal_signal() {
    // Constant level plus a weekly pattern: trend is flat, residual vanishes.
    let pattern = [1.0, 2.0, 3.0, 0.0, -1.0, -2.0, -3.0];
    let pts: Vec<NumericPoint> = (0..28)
        .map(|i| NumericPoint::new(i as f64, 10.0 + pattern[i % 7]))
        .collect();
    let d = additive_decompose(&pts, 7).unwrap();

    assert_eq!(d.trend.len(), 22);
    for t in &d.trend {
        assert!((t.y - 10.0).abs() < 1e-9);
    }
    for r in &d.residual {
        assert!(r.y.abs() < 1e-9);
    }
    for s in &d.seasonal {
        assert!((s.y - pattern[s.x as usize % 7]).abs() < 1e-9);
    }
}

#[test]
fn test_decompose_is_deterministic() {
    let pts: Vec<NumericPoint> = (0..30)
        .map(|i| NumericPoint::new(i as f64, ((i * 37) % 11) as f64))
        .collect();
    assert_eq!(additive_decompose(&pts, 7).unwrap(), additive_decompose(&pts, 7).unwrap());
}

#[test]
fn test_decompose_short_series_is_empty() {
    let pts = points(&[(0.0, 1.0), (1.0, 2.0)]);
    let d = additive_decompose(&pts, 7).unwrap();
    assert!(d.observed.is_empty());
    assert!(d.residual.is_empty());
}

proptest! {
    #[test]
    fn prop_decomposition_identity(
        values in prop::collection::vec(-1e3..1e3f64, 0..60),
        period in 1usize..10,
    ) {
        let pts: Vec<NumericPoint> = values
            .iter()
            .enumerate()
            .map(|(i, &y)| NumericPoint::new(i as f64, y))
            .collect();
        let d = additive_decompose(&pts, period).unwrap();

        prop_assert_eq!(d.observed.len(), d.trend.len());
        prop_assert_eq!(d.seasonal.len(), d.trend.len());
        prop_assert_eq!(d.residual.len(), d.trend.len());
        for i in 0..d.observed.len() {
            let rebuilt = d.trend[i].y + d.seasonal[i].y + d.residual[i].y;
            prop_assert!((d.observed[i].y - rebuilt).abs() < 1e-6);
        }
    }

    #[test]
    fn prop_fit_recovers_line(
        gradient in -100.0..100.0f64,
        intercept in -100.0..100.0f64,
        n in 2usize..30,
    ) {
        let pts: Vec<NumericPoint> = (0..n)
            .map(|i| NumericPoint::new(i as f64, gradient * i as f64 + intercept))
            .collect();
        let model = fit_linear_model(&pts).unwrap();
        prop_assert!((model.gradient - gradient).abs() < 1e-6);
        prop_assert!((model.intercept - intercept).abs() < 1e-6);
    }
}
