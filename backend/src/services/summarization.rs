//! Analytical service contract shared by every summarizer.
//!
//! A summarizer derives `properties` from a [`SummarizerConfig`] and builds
//! text `summaries` on top of its own and its upstream services' properties.
//! Both are memoized per configuration with single-flight semantics (see
//! [`SingleFlightCache`](super::cache::SingleFlightCache)).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::config::EngineSettings;
use crate::error::{SummarizerError, SummarizerResult};
use crate::models::{DatasetId, SummaryGroup};

const DEFAULT_MEASURE: &str = "active users";

/// Closed set of summarizers the engine can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummarizerKind {
    WeeklyElaboration,
    WeekdayWeekendRelative,
    WeeklyComparisonAverage,
    WeeklyComparisonRate,
}

impl SummarizerKind {
    pub const ALL: [SummarizerKind; 4] = [
        SummarizerKind::WeeklyElaboration,
        SummarizerKind::WeekdayWeekendRelative,
        SummarizerKind::WeeklyComparisonAverage,
        SummarizerKind::WeeklyComparisonRate,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::WeeklyElaboration => "TrendWeeklyElaboration",
            Self::WeekdayWeekendRelative => "WeekdayWeekendRelative",
            Self::WeeklyComparisonAverage => "TrendWeeklyComparisonAverage",
            Self::WeeklyComparisonRate => "TrendWeeklyComparisonRate",
        }
    }

    /// Upstream summarizers whose properties this one consumes.
    pub fn dependencies(&self) -> &'static [SummarizerKind] {
        match self {
            Self::WeeklyElaboration | Self::WeekdayWeekendRelative => &[],
            Self::WeeklyComparisonAverage => &[Self::WeeklyElaboration],
            Self::WeeklyComparisonRate => &[Self::WeekdayWeekendRelative, Self::WeeklyElaboration],
        }
    }
}

#[derive(Clone, Copy, Hash, PartialEq, Eq)]
struct FloatKey(u64);

impl FloatKey {
    fn new(value: f64) -> Self {
        Self(value.to_bits())
    }
}

/// Summarizer input and cache key.
///
/// Two configs are equal iff every field is equal; float thresholds compare by
/// bit pattern so equality and hashing agree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerConfig {
    pub dataset: DatasetId,
    /// Inclusive start of the analysed range.
    pub start: DateTime<Utc>,
    /// Exclusive end of the analysed range.
    pub end: DateTime<Utc>,
    /// Length of one comparison period in days.
    pub period_days: u32,
    /// Breakpoints of the left-shoulder "weekday equals weekend" membership.
    pub weekday_weekend_equal_low: f64,
    pub weekday_weekend_equal_high: f64,
    /// Name of the measured quantity used in generated text.
    pub measure: String,
}

impl SummarizerConfig {
    /// Config over `[start, end)` with default thresholds.
    pub fn new(dataset: impl Into<DatasetId>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::from_settings(dataset, start, end, &EngineSettings::default())
    }

    /// Config over `[start, end)` with thresholds taken from `settings`.
    pub fn from_settings(
        dataset: impl Into<DatasetId>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        settings: &EngineSettings,
    ) -> Self {
        Self {
            dataset: dataset.into(),
            start,
            end,
            period_days: settings.grouping.period_days,
            weekday_weekend_equal_low: settings.weekday_weekend.equal_low,
            weekday_weekend_equal_high: settings.weekday_weekend.equal_high,
            measure: DEFAULT_MEASURE.to_string(),
        }
    }

    pub fn with_period_days(mut self, period_days: u32) -> Self {
        self.period_days = period_days;
        self
    }

    pub fn with_weekday_weekend_breakpoints(mut self, low: f64, high: f64) -> Self {
        self.weekday_weekend_equal_low = low;
        self.weekday_weekend_equal_high = high;
        self
    }

    pub fn with_measure(mut self, measure: impl Into<String>) -> Self {
        self.measure = measure.into();
        self
    }

    /// Check required fields before any computation starts.
    pub fn validate(&self) -> SummarizerResult<()> {
        if self.dataset.is_empty() {
            return Err(SummarizerError::config("dataset id must not be empty"));
        }
        if self.start >= self.end {
            return Err(SummarizerError::config(format!(
                "date range is empty: start {} is not before end {}",
                self.start, self.end
            )));
        }
        if self.period_days == 0 {
            return Err(SummarizerError::config("period_days must be at least 1"));
        }
        let (low, high) = (self.weekday_weekend_equal_low, self.weekday_weekend_equal_high);
        if !(low.is_finite() && high.is_finite()) || low > high {
            return Err(SummarizerError::config(format!(
                "weekday/weekend breakpoints must be finite and ordered, got [{}, {}]",
                low, high
            )));
        }
        if self.measure.trim().is_empty() {
            return Err(SummarizerError::config("measure label must not be empty"));
        }
        Ok(())
    }

    fn key(&self) -> (&DatasetId, i64, u32, i64, u32, u32, FloatKey, FloatKey, &str) {
        (
            &self.dataset,
            self.start.timestamp(),
            self.start.timestamp_subsec_nanos(),
            self.end.timestamp(),
            self.end.timestamp_subsec_nanos(),
            self.period_days,
            FloatKey::new(self.weekday_weekend_equal_low),
            FloatKey::new(self.weekday_weekend_equal_high),
            &self.measure,
        )
    }
}

impl PartialEq for SummarizerConfig {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for SummarizerConfig {}

impl Hash for SummarizerConfig {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

/// Protocol implemented by every summarizer.
#[async_trait]
pub trait SummarizationService: Send + Sync {
    /// Derived aggregate; a pure function of the config.
    type Properties: Send + Sync + 'static;

    fn kind(&self) -> SummarizerKind;

    /// Memoized derived properties for `config`.
    async fn properties(&self, config: &SummarizerConfig)
        -> SummarizerResult<Arc<Self::Properties>>;

    /// Memoized summary groups for `config`.
    async fn summaries(&self, config: &SummarizerConfig) -> SummarizerResult<Arc<Vec<SummaryGroup>>>;

    /// Drop cached results and cancel in-flight work.
    fn invalidate(&self);

    /// Validate `config` on behalf of this summarizer.
    fn prepare_config(&self, config: &SummarizerConfig) -> SummarizerResult<()> {
        config.validate().map_err(|e| {
            e.with_summarizer(self.kind().name())
                .with_dataset(&config.dataset)
                .with_operation("prepare_config")
        })
    }
}
