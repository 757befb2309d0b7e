use chrono::{DateTime, Datelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// One observation of a time series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub x: DateTime<Utc>,
    pub y: f64,
}

impl TimeSeriesPoint {
    pub fn new(x: DateTime<Utc>, y: f64) -> Self {
        Self { x, y }
    }

    /// Saturday and Sunday observations.
    pub fn is_weekend(&self) -> bool {
        matches!(self.x.weekday(), Weekday::Sat | Weekday::Sun)
    }

    /// Timestamp-normalized form: `x` becomes fractional days since the Unix epoch.
    pub fn to_numeric(&self) -> NumericPoint {
        NumericPoint::new(days_since_epoch(self.x), self.y)
    }
}

/// Numeric point used by the trend and protoform routines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericPoint {
    pub x: f64,
    pub y: f64,
}

impl NumericPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for NumericPoint {
    fn from((x, y): (f64, f64)) -> Self {
        NumericPoint::new(x, y)
    }
}

/// Fractional days since 1970-01-01 00:00:00 UTC.
pub fn days_since_epoch(dt: DateTime<Utc>) -> f64 {
    (dt.timestamp() as f64 + dt.timestamp_subsec_nanos() as f64 / 1e9) / SECONDS_PER_DAY
}

/// Inverse of [`days_since_epoch`].
pub fn datetime_from_days(days: f64) -> DateTime<Utc> {
    let secs = days * SECONDS_PER_DAY;
    let secs_i64 = secs.floor() as i64;
    let nanos = ((secs - secs.floor()) * 1e9) as u32;
    DateTime::from_timestamp(secs_i64, nanos).unwrap_or(DateTime::UNIX_EPOCH)
}

/// Whether day-based `x` falls on a Saturday or Sunday (UTC).
pub fn is_weekend_day(x: f64) -> bool {
    matches!(datetime_from_days(x).weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn to_numeric_points(points: &[TimeSeriesPoint]) -> Vec<NumericPoint> {
    points.iter().map(TimeSeriesPoint::to_numeric).collect()
}
