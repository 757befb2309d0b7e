//! Time-series grouping and normalization helpers.

use crate::algorithms::trend::EPSILON;
use crate::error::{SummarizerError, SummarizerResult};
use crate::models::NumericPoint;

/// Length of a week in the day-based x unit of [`NumericPoint`].
pub const WEEK_DAYS: f64 = 7.0;

/// Partition points into contiguous, non-overlapping buckets of
/// `period_length` x-units, counted from `origin`.
///
/// Bucket `i` holds the points with `origin + i * period_length <= x <
/// origin + (i + 1) * period_length`, so its position is the calendar period
/// index. Buckets run up to the one holding the latest point; periods without
/// points are kept as empty buckets and a trailing partial bucket is kept.
/// Points keep their chronological order within a bucket.
///
/// # Errors
/// `InvalidInput` for a non-positive period, a NaN timestamp or a point
/// before `origin`.
pub fn group_by_period(
    points: &[NumericPoint],
    origin: f64,
    period_length: f64,
) -> SummarizerResult<Vec<Vec<NumericPoint>>> {
    if !(period_length.is_finite() && period_length > 0.0) {
        return Err(SummarizerError::invalid_input(format!(
            "period length must be positive, got {}",
            period_length
        ))
        .with_operation("group_by_period"));
    }
    if !origin.is_finite() {
        return Err(SummarizerError::invalid_input(format!(
            "period origin must be finite, got {}",
            origin
        ))
        .with_operation("group_by_period"));
    }
    if points.iter().any(|p| p.x.is_nan()) {
        return Err(SummarizerError::invalid_input("NaN timestamp in series")
            .with_operation("group_by_period"));
    }
    if let Some(early) = points.iter().find(|p| p.x < origin) {
        return Err(SummarizerError::invalid_input(format!(
            "point at {} precedes the period origin {}",
            early.x, origin
        ))
        .with_operation("group_by_period"));
    }

    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x));

    let mut buckets: Vec<Vec<NumericPoint>> = Vec::new();
    for point in sorted {
        let index = ((point.x - origin) / period_length).floor() as usize;
        if buckets.len() <= index {
            buckets.resize_with(index + 1, Vec::new);
        }
        buckets[index].push(point);
    }

    Ok(buckets)
}

/// Group into seven-day weeks counted from `origin`.
pub fn group_by_week(
    points: &[NumericPoint],
    origin: f64,
) -> SummarizerResult<Vec<Vec<NumericPoint>>> {
    group_by_period(points, origin, WEEK_DAYS)
}

fn rescale(value: f64, min: f64, max: f64) -> f64 {
    let range = max - min;
    if range.abs() < EPSILON {
        0.0
    } else {
        (value - min) / range
    }
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

/// Linearly rescale both x and y into [0, 1].
///
/// A constant coordinate maps to 0.
pub fn normalize(points: &[NumericPoint]) -> Vec<NumericPoint> {
    let (x_min, x_max) = bounds(points.iter().map(|p| p.x));
    let (y_min, y_max) = bounds(points.iter().map(|p| p.y));

    points
        .iter()
        .map(|p| NumericPoint::new(rescale(p.x, x_min, x_max), rescale(p.y, y_min, y_max)))
        .collect()
}

/// Rescale only y into [0, 1], keeping x untouched.
pub fn normalize_y(points: &[NumericPoint]) -> Vec<NumericPoint> {
    let (y_min, y_max) = bounds(points.iter().map(|p| p.y));

    points
        .iter()
        .map(|p| NumericPoint::new(p.x, rescale(p.y, y_min, y_max)))
        .collect()
}

pub fn mean_y(points: &[NumericPoint]) -> Option<f64> {
    if points.is_empty() {
        None
    } else {
        Some(points.iter().map(|p| p.y).sum::<f64>() / points.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn daily(n: usize) -> Vec<NumericPoint> {
        (0..n).map(|i| NumericPoint::new(i as f64, i as f64 * 10.0)).collect()
    }

    #[test]
    fn test_fourteen_days_make_two_weeks() {
        let weeks = group_by_week(&daily(14), 0.0).unwrap();

        assert_eq!(weeks.len(), 2);
        assert_eq!(weeks[0].len(), 7);
        assert_eq!(weeks[1].len(), 7);
        assert_eq!(weeks[0][0].x, 0.0);
        assert_eq!(weeks[1][0].x, 7.0);
        assert!(weeks[0].last().unwrap().x < weeks[1][0].x);
    }

    #[test]
    fn test_trailing_partial_week_is_kept() {
        let weeks = group_by_week(&daily(17), 0.0).unwrap();
        assert_eq!(weeks.len(), 3);
        assert_eq!(weeks[2].len(), 3);
    }

    #[test]
    fn test_grouping_sorts_input_without_mutating_it() {
        let mut pts = daily(14);
        pts.reverse();
        let original = pts.clone();

        let weeks = group_by_week(&pts, 0.0).unwrap();
        assert_eq!(pts, original);
        assert_eq!(weeks[0][0].x, 0.0);
        assert_eq!(weeks[1][6].x, 13.0);
    }

    #[test]
    fn test_gap_week_keeps_its_position() {
        let pts = vec![NumericPoint::new(0.0, 1.0), NumericPoint::new(20.0, 2.0)];
        let weeks = group_by_week(&pts, 0.0).unwrap();

        assert_eq!(weeks.len(), 3);
        assert_eq!(weeks[0].len(), 1);
        assert!(weeks[1].is_empty());
        assert_eq!(weeks[2][0].x, 20.0);
    }

    #[test]
    fn test_buckets_count_from_origin() {
        // First observation on day 9 of a range starting on day 0.
        let pts: Vec<NumericPoint> = (9..16).map(|d| NumericPoint::new(d as f64, 1.0)).collect();
        let weeks = group_by_week(&pts, 0.0).unwrap();

        assert_eq!(weeks.len(), 3);
        assert!(weeks[0].is_empty());
        assert_eq!(weeks[1].len(), 5);
        assert_eq!(weeks[2].len(), 2);
    }

    #[test]
    fn test_point_before_origin_is_rejected() {
        let err = group_by_week(&daily(3), 1.0).unwrap_err();
        assert!(matches!(err, SummarizerError::InvalidInput { .. }));
    }

    #[test]
    fn test_grouping_empty_series() {
        assert!(group_by_week(&[], 0.0).unwrap().is_empty());
    }

    #[test]
    fn test_grouping_rejects_bad_period() {
        assert!(group_by_period(&daily(3), 0.0, 0.0).is_err());
        assert!(group_by_period(&daily(3), 0.0, f64::NAN).is_err());
    }

    #[test]
    fn test_normalize_both_axes() {
        let pts = vec![
            NumericPoint::new(10.0, 5.0),
            NumericPoint::new(20.0, 15.0),
            NumericPoint::new(15.0, 10.0),
        ];
        let normalized = normalize(&pts);

        assert_eq!(normalized[0], NumericPoint::new(0.0, 0.0));
        assert_eq!(normalized[1], NumericPoint::new(1.0, 1.0));
        assert_eq!(normalized[2], NumericPoint::new(0.5, 0.5));
    }

    #[test]
    fn test_normalize_constant_series() {
        let pts = vec![NumericPoint::new(1.0, 3.0), NumericPoint::new(2.0, 3.0)];
        let normalized = normalize(&pts);
        assert!(normalized.iter().all(|p| p.y == 0.0));
    }

    #[test]
    fn test_normalize_y_keeps_x() {
        let pts = vec![NumericPoint::new(100.0, 0.0), NumericPoint::new(200.0, 4.0)];
        let normalized = normalize_y(&pts);
        assert_eq!(normalized[1], NumericPoint::new(200.0, 1.0));
    }

    #[test]
    fn test_mean_y() {
        assert_eq!(mean_y(&[]), None);
        assert_eq!(mean_y(&daily(3)), Some(10.0));
    }
}
