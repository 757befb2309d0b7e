#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use weekly_summaries::services::{InMemorySource, TimeSeriesSource};
use weekly_summaries::{DatasetId, SummarizerResult, TimeSeriesPoint};

static ENV_LOCK: Mutex<()> = Mutex::new(());

pub const DATASET: &str = "active-users";

/// Evaluates `f` with the engine's environment overrides applied.
///
/// Each `(key, value)` sets `key` when `value` is `Some` and unsets it when
/// `None`. Prior values come back when `f` returns or panics. `ENV_LOCK` is held
/// throughout, since the environment is process-wide.
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _restore = EnvOverride::apply(changes);
    f()
}

fn write_var(key: &str, value: Option<&str>) {
    match value {
        Some(value) => std::env::set_var(key, value),
        None => std::env::remove_var(key),
    }
}

/// Previous values of every overridden key, written back on drop.
struct EnvOverride {
    previous: Vec<(String, Option<String>)>,
}

impl EnvOverride {
    fn apply(changes: &[(&str, Option<&str>)]) -> Self {
        let mut seen = HashSet::new();
        let previous = changes
            .iter()
            .filter(|(key, _)| seen.insert(*key))
            .map(|(key, _)| (key.to_string(), std::env::var(key).ok()))
            .collect();

        changes.iter().for_each(|(key, value)| write_var(key, *value));
        Self { previous }
    }
}

impl Drop for EnvOverride {
    fn drop(&mut self) {
        for (key, value) in &self.previous {
            write_var(key, value.as_deref());
        }
    }
}

/// Installs a test subscriber honouring `RUST_LOG`. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Monday 2021-03-01, midnight UTC.
pub fn monday() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 3, 1, 0, 0, 0).unwrap()
}

pub fn day(offset: i64) -> DateTime<Utc> {
    monday() + chrono::Duration::days(offset)
}

/// One point per day starting on [`monday`].
pub fn daily_series(values: &[f64]) -> Vec<TimeSeriesPoint> {
    values
        .iter()
        .enumerate()
        .map(|(i, &y)| TimeSeriesPoint::new(day(i as i64), y))
        .collect()
}

/// Two weeks: rising by 2 per day from 100, then falling by 3 per day from 130.
pub fn rise_then_fall() -> Vec<TimeSeriesPoint> {
    let values: Vec<f64> = (0..14)
        .map(|i| {
            if i < 7 {
                100.0 + 2.0 * i as f64
            } else {
                130.0 - 3.0 * (i - 7) as f64
            }
        })
        .collect();
    daily_series(&values)
}

/// Source stub counting fetches, optionally delaying each one.
pub struct CountingSource {
    inner: InMemorySource,
    delay: Option<Duration>,
    fetches: AtomicUsize,
}

impl CountingSource {
    pub fn new(points: Vec<TimeSeriesPoint>) -> Self {
        Self {
            inner: InMemorySource::new().with_series(DATASET, points),
            delay: None,
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TimeSeriesSource for CountingSource {
    async fn fetch(
        &self,
        dataset: &DatasetId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> SummarizerResult<Vec<TimeSeriesPoint>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.inner.fetch(dataset, start, end).await
    }
}

/// Source that never answers.
#[derive(Default)]
pub struct PendingSource {
    pub fetches: AtomicUsize,
}

#[async_trait]
impl TimeSeriesSource for PendingSource {
    async fn fetch(
        &self,
        _dataset: &DatasetId,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> SummarizerResult<Vec<TimeSeriesPoint>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        futures::future::pending().await
    }
}

pub fn shared<S: TimeSeriesSource + 'static>(source: S) -> Arc<S> {
    Arc::new(source)
}
