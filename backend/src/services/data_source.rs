//! Time series input boundary.
//!
//! Collaborators implement [`TimeSeriesSource`]; the engine wraps it in a
//! [`DataSourceService`] so every summarizer sharing a config shares a single
//! fetch.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use super::cache::SingleFlightCache;
use super::summarization::SummarizerConfig;
use crate::error::{SummarizerError, SummarizerResult};
use crate::models::{DatasetId, TimeSeriesPoint};

/// Supplier of raw observations for a dataset and date range.
#[async_trait]
pub trait TimeSeriesSource: Send + Sync {
    /// Observations of `dataset` with `start <= x < end`, in any order.
    async fn fetch(
        &self,
        dataset: &DatasetId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> SummarizerResult<Vec<TimeSeriesPoint>>;
}

/// In-memory source for tests and local development.
#[derive(Clone, Default)]
pub struct InMemorySource {
    series: Arc<RwLock<HashMap<DatasetId, Vec<TimeSeriesPoint>>>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the observations stored for `dataset`.
    pub fn insert(&self, dataset: impl Into<DatasetId>, points: Vec<TimeSeriesPoint>) {
        self.series.write().insert(dataset.into(), points);
    }

    pub fn with_series(self, dataset: impl Into<DatasetId>, points: Vec<TimeSeriesPoint>) -> Self {
        self.insert(dataset, points);
        self
    }
}

#[async_trait]
impl TimeSeriesSource for InMemorySource {
    async fn fetch(
        &self,
        dataset: &DatasetId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> SummarizerResult<Vec<TimeSeriesPoint>> {
        let series = self.series.read();
        let points = series.get(dataset).ok_or_else(|| {
            SummarizerError::data_source(format!("unknown dataset '{}'", dataset))
                .with_operation("fetch")
                .with_dataset(dataset)
        })?;

        Ok(points
            .iter()
            .filter(|p| p.x >= start && p.x < end)
            .copied()
            .collect())
    }
}

/// Memoizing wrapper around a [`TimeSeriesSource`].
///
/// Yields the configured range sorted chronologically.
pub struct DataSourceService {
    source: Arc<dyn TimeSeriesSource>,
    cache: SingleFlightCache<SummarizerConfig, Vec<TimeSeriesPoint>>,
}

impl DataSourceService {
    pub fn new(source: Arc<dyn TimeSeriesSource>) -> Self {
        Self {
            source,
            cache: SingleFlightCache::new("DataSource"),
        }
    }

    pub async fn time_series(
        &self,
        config: &SummarizerConfig,
    ) -> SummarizerResult<Arc<Vec<TimeSeriesPoint>>> {
        let source = Arc::clone(&self.source);
        let owned = config.clone();
        self.cache
            .get_or_compute(config, move || async move {
                let mut points = source
                    .fetch(&owned.dataset, owned.start, owned.end)
                    .await
                    .map_err(|e| e.with_dataset(&owned.dataset))?;
                points.sort_by_key(|p| p.x);
                debug!(dataset = %owned.dataset, points = points.len(), "time series delivered");
                Ok(points)
            })
            .await
    }

    pub fn invalidate(&self) {
        self.cache.invalidate();
    }

    /// Number of fetches issued to the underlying source.
    pub fn fetch_count(&self) -> usize {
        self.cache.computation_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 3, 1, 0, 0, 0).unwrap()
    }

    fn daily(n: i64) -> Vec<TimeSeriesPoint> {
        (0..n)
            .map(|i| TimeSeriesPoint::new(start() + Duration::days(i), i as f64))
            .collect()
    }

    #[tokio::test]
    async fn test_in_memory_filters_half_open_range() {
        let source = InMemorySource::new().with_series("users", daily(20));
        let points = source
            .fetch(&"users".into(), start() + Duration::days(2), start() + Duration::days(5))
            .await
            .unwrap();

        let ys: Vec<f64> = points.iter().map(|p| p.y).collect();
        assert_eq!(ys, vec![2.0, 3.0, 4.0]);
    }

    #[tokio::test]
    async fn test_unknown_dataset_is_data_source_error() {
        let source = InMemorySource::new();
        let err = source
            .fetch(&"missing".into(), start(), start() + Duration::days(1))
            .await
            .unwrap_err();
        assert!(matches!(err, SummarizerError::DataSource { .. }));
    }

    #[tokio::test]
    async fn test_service_sorts_and_memoizes() {
        let mut points = daily(10);
        points.reverse();
        let source = Arc::new(InMemorySource::new().with_series("users", points));
        let service = DataSourceService::new(source);
        let config = SummarizerConfig::new("users", start(), start() + Duration::days(10));

        let first = service.time_series(&config).await.unwrap();
        let second = service.time_series(&config).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(service.fetch_count(), 1);
        assert!(first.windows(2).all(|w| w[0].x < w[1].x));
    }
}
