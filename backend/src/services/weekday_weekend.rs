//! Weekday/weekend relative summarizer.
//!
//! Evaluates the protoform "most periods: weekday level is equal to weekend
//! level". For each period holding both weekday and weekend observations the
//! relative difference of their means is mapped through a left-shoulder
//! membership function; the degrees are aggregated with the sigma-count
//! quantifier. The resulting degree only gates phrasing downstream.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

use super::cache::SingleFlightCache;
use super::data_source::DataSourceService;
use super::summarization::{SummarizationService, SummarizerConfig, SummarizerKind};
use crate::algorithms::format::bold;
use crate::algorithms::time_series::mean_y;
use crate::algorithms::trend::EPSILON;
use crate::algorithms::{group_by_period, sigma_count_qa, MembershipFunction};
use crate::error::SummarizerResult;
use crate::models::time::{days_since_epoch, is_weekend_day, to_numeric_points};
use crate::models::{NumericPoint, Summary, SummaryGroup};

pub const TITLE: &str = "Weekday Weekend Relative";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayWeekendProperties {
    /// Degree in [0, 1] to which weekday and weekend behaviour are indistinguishable.
    pub weekday_weekend_equal_validity: f64,
    /// Relative difference of weekday and weekend means for every period
    /// that has both.
    pub relative_differences: Vec<f64>,
}

/// `|a - b| / max(|a|, |b|)`, guarded against a zero denominator.
pub fn relative_difference(a: f64, b: f64) -> f64 {
    (a - b).abs() / (a.abs().max(b.abs()) + EPSILON)
}

fn split_means(week: &[NumericPoint]) -> Option<(f64, f64)> {
    let (weekend, weekday): (Vec<NumericPoint>, Vec<NumericPoint>) =
        week.iter().partition(|p| is_weekend_day(p.x));
    Some((mean_y(&weekday)?, mean_y(&weekend)?))
}

pub fn weekday_weekend_relation(
    points: &[NumericPoint],
    origin: f64,
    period_days: u32,
    equal: &MembershipFunction,
) -> SummarizerResult<WeekdayWeekendProperties> {
    let weeks = group_by_period(points, origin, period_days as f64)?;
    let relative_differences: Vec<f64> = weeks
        .iter()
        .filter_map(|week| split_means(week))
        .map(|(weekday, weekend)| relative_difference(weekday, weekend))
        .collect();

    let weekday_weekend_equal_validity =
        sigma_count_qa(&relative_differences, |d| equal.degree(*d))?;

    Ok(WeekdayWeekendProperties {
        weekday_weekend_equal_validity,
        relative_differences,
    })
}

fn describe_relation(properties: &WeekdayWeekendProperties, measure: &str) -> Vec<Summary> {
    if properties.relative_differences.is_empty() {
        return Vec::new();
    }

    let validity = properties.weekday_weekend_equal_validity;
    [("similar to", validity), ("different from", 1.0 - validity)]
        .into_iter()
        .map(|(relation, validity)| {
            let text = format!(
                "The {} of {} was {} that of {}.",
                measure,
                bold("weekdays"),
                bold(relation),
                bold("weekends"),
            );
            Summary::new(text, validity)
        })
        .collect()
}

pub struct WeekdayWeekendRelativeService {
    data_source: Arc<DataSourceService>,
    properties: Arc<SingleFlightCache<SummarizerConfig, WeekdayWeekendProperties>>,
    summaries: SingleFlightCache<SummarizerConfig, Vec<SummaryGroup>>,
}

impl WeekdayWeekendRelativeService {
    pub fn new(data_source: Arc<DataSourceService>) -> Self {
        Self {
            data_source,
            properties: Arc::new(SingleFlightCache::new("WeekdayWeekendRelative.properties")),
            summaries: SingleFlightCache::new("WeekdayWeekendRelative.summaries"),
        }
    }

    fn load_properties(
        &self,
        config: &SummarizerConfig,
    ) -> impl Future<Output = SummarizerResult<Arc<WeekdayWeekendProperties>>> + Send + 'static {
        let cache = Arc::clone(&self.properties);
        let data_source = Arc::clone(&self.data_source);
        let config = config.clone();
        async move {
            let key = config.clone();
            cache
                .get_or_compute(&key, move || async move {
                    let series = data_source.time_series(&config).await?;
                    let equal = MembershipFunction::left_shoulder(
                        config.weekday_weekend_equal_low,
                        config.weekday_weekend_equal_high,
                    )?;
                    let properties = weekday_weekend_relation(
                        &to_numeric_points(&series),
                        days_since_epoch(config.start),
                        config.period_days,
                        &equal,
                    )
                    .map_err(|e| {
                        e.with_summarizer(SummarizerKind::WeekdayWeekendRelative.name())
                            .with_dataset(&config.dataset)
                    })?;
                    debug!(
                        dataset = %config.dataset,
                        validity = properties.weekday_weekend_equal_validity,
                        "weekday/weekend relation evaluated"
                    );
                    Ok(properties)
                })
                .await
        }
    }
}

#[async_trait]
impl SummarizationService for WeekdayWeekendRelativeService {
    type Properties = WeekdayWeekendProperties;

    fn kind(&self) -> SummarizerKind {
        SummarizerKind::WeekdayWeekendRelative
    }

    async fn properties(
        &self,
        config: &SummarizerConfig,
    ) -> SummarizerResult<Arc<WeekdayWeekendProperties>> {
        self.prepare_config(config)?;
        self.load_properties(config).await
    }

    async fn summaries(&self, config: &SummarizerConfig) -> SummarizerResult<Arc<Vec<SummaryGroup>>> {
        self.prepare_config(config)?;
        let properties = self.load_properties(config);
        let measure = config.measure.clone();
        self.summaries
            .get_or_compute(config, move || async move {
                let group = match properties.await {
                    Ok(properties) => SummaryGroup::new(TITLE, describe_relation(&properties, &measure)),
                    Err(e) if e.is_insufficient_data() => SummaryGroup::empty(TITLE),
                    Err(e) => return Err(e),
                };
                Ok(vec![group])
            })
            .await
    }

    fn invalidate(&self) {
        self.properties.invalidate();
        self.summaries.invalidate();
    }
}
