//! Week-over-week comparison of average levels.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;

use super::cache::SingleFlightCache;
use super::summarization::{SummarizationService, SummarizerConfig, SummarizerKind};
use super::weekly_elaboration::{TrendWeeklyElaborationService, WeeklyElaborationProperties};
use crate::algorithms::format::{bold, format_y, ordinal};
use crate::algorithms::time_series::mean_y;
use crate::algorithms::trend::EPSILON;
use crate::error::SummarizerResult;
use crate::models::{Summary, SummaryGroup};

pub const TITLE: &str = "Trend Weekly Comparison - Average";

/// Changes at or below this many percent read as "similar".
pub const SIMILAR_PERCENTAGE: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyAverageComparisonProperties {
    /// Mean of `y` per period; `None` for a period without observations.
    pub week_means: Vec<Option<f64>>,
    /// Percentage change from period `i` to `i + 1`; `None` when either
    /// period is empty.
    pub percentage_changes: Vec<Option<f64>>,
}

/// `(next - current) / current * 100`, with a near-zero `current` replaced by epsilon.
pub fn percentage_change(current: f64, next: f64) -> f64 {
    let denominator = if current.abs() < EPSILON {
        EPSILON
    } else {
        current
    };
    (next - current) / denominator * 100.0
}

/// Phrase for a percentage change: "X% more than", "X% less than" or "similar to".
pub fn change_phrase(percentage: f64) -> String {
    if percentage.abs() > SIMILAR_PERCENTAGE {
        let descriptor = if percentage >= 0.0 { "more" } else { "less" };
        format!("{}% {} than", format_y(percentage.abs()), descriptor)
    } else {
        "similar to".to_string()
    }
}

pub fn compare_averages(elaboration: &WeeklyElaborationProperties) -> WeeklyAverageComparisonProperties {
    let week_means: Vec<Option<f64>> = elaboration
        .week_point_arrays
        .iter()
        .map(|week| mean_y(week))
        .collect();
    let percentage_changes = week_means
        .windows(2)
        .map(|pair| match (pair[0], pair[1]) {
            (Some(current), Some(next)) => Some(percentage_change(current, next)),
            _ => None,
        })
        .collect();

    WeeklyAverageComparisonProperties {
        week_means,
        percentage_changes,
    }
}

fn describe_changes(properties: &WeeklyAverageComparisonProperties, measure: &str) -> Vec<Summary> {
    properties
        .percentage_changes
        .iter()
        .enumerate()
        .filter_map(|(i, percentage)| percentage.map(|p| (i, p)))
        .map(|(i, percentage)| {
            let text = format!(
                "The average {} of the {} was {} the {}.",
                measure,
                bold(format!("{} week", ordinal(i + 1))),
                bold(change_phrase(percentage)),
                bold(format!("{} week", ordinal(i))),
            );
            Summary::new(text, 1.0)
        })
        .collect()
}

pub struct TrendWeeklyComparisonAverageService {
    weekly_elaboration: Arc<TrendWeeklyElaborationService>,
    properties: Arc<SingleFlightCache<SummarizerConfig, WeeklyAverageComparisonProperties>>,
    summaries: SingleFlightCache<SummarizerConfig, Vec<SummaryGroup>>,
}

impl TrendWeeklyComparisonAverageService {
    pub fn new(weekly_elaboration: Arc<TrendWeeklyElaborationService>) -> Self {
        Self {
            weekly_elaboration,
            properties: Arc::new(SingleFlightCache::new("TrendWeeklyComparisonAverage.properties")),
            summaries: SingleFlightCache::new("TrendWeeklyComparisonAverage.summaries"),
        }
    }

    fn load_properties(
        &self,
        config: &SummarizerConfig,
    ) -> impl Future<Output = SummarizerResult<Arc<WeeklyAverageComparisonProperties>>> + Send + 'static
    {
        let cache = Arc::clone(&self.properties);
        let weekly_elaboration = Arc::clone(&self.weekly_elaboration);
        let config = config.clone();
        async move {
            let key = config.clone();
            cache
                .get_or_compute(&key, move || async move {
                    let elaboration = weekly_elaboration.properties(&config).await?;
                    Ok(compare_averages(&elaboration))
                })
                .await
        }
    }
}

#[async_trait]
impl SummarizationService for TrendWeeklyComparisonAverageService {
    type Properties = WeeklyAverageComparisonProperties;

    fn kind(&self) -> SummarizerKind {
        SummarizerKind::WeeklyComparisonAverage
    }

    async fn properties(
        &self,
        config: &SummarizerConfig,
    ) -> SummarizerResult<Arc<WeeklyAverageComparisonProperties>> {
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
                    Ok(properties) => SummaryGroup::new(TITLE, describe_changes(&properties, &measure)),
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
