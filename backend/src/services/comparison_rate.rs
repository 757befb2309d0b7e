//! Week-over-week comparison of trend rates (linear model gradients).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;

use super::cache::SingleFlightCache;
use super::summarization::{SummarizationService, SummarizerConfig, SummarizerKind};
use super::weekday_weekend::{WeekdayWeekendProperties, WeekdayWeekendRelativeService};
use super::weekly_elaboration::{TrendWeeklyElaborationService, WeeklyElaborationProperties};
use crate::algorithms::format::{bold, format_y, ordinal};
use crate::error::SummarizerResult;
use crate::models::{Summary, SummaryGroup};

pub const TITLE: &str = "Trend Weekly Comparison - Rate";

/// Added to every gradient so a flat week never divides by zero.
pub const RATE_EPSILON: f64 = 1e-5;

/// Minimum absolute gradient difference (units per day) that counts as a change.
pub const RATE_DIFF_THRESHOLD: f64 = 2.0;

/// Minimum relative change (percent) of the absolute rate that counts as a change.
pub const RATE_PERCENTAGE_THRESHOLD: f64 = 5.0;

/// At or below this weekday/weekend equality degree sentences are qualified "of weekdays".
pub const WEEKDAY_QUALIFIER_VALIDITY: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RateChange {
    /// The trend changed direction between the two weeks.
    Reversal,
    /// The absolute rate changed noticeably.
    Changed {
        /// Signed relative change of the absolute rate, in percent.
        percentage: f64,
        /// Signed change of the absolute rate, in units per day.
        rate_delta: f64,
    },
    SameRate,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateComparison {
    /// Index of the earlier week of the pair.
    pub week_index: usize,
    pub current_rate: f64,
    pub next_rate: f64,
    pub change: RateChange,
}

impl RateComparison {
    pub fn current_increasing(&self) -> bool {
        self.current_rate >= 0.0
    }

    pub fn next_increasing(&self) -> bool {
        self.next_rate >= 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyRateComparisonProperties {
    pub comparisons: Vec<RateComparison>,
    pub weekday_weekend_equal_validity: f64,
}

/// Classify the change between two consecutive week gradients.
pub fn compare_rates(week_index: usize, current_gradient: f64, next_gradient: f64) -> RateComparison {
    let current_rate = current_gradient + RATE_EPSILON;
    let next_rate = next_gradient + RATE_EPSILON;
    let rate_diff = (next_rate - current_rate).abs();

    let change = if rate_diff > RATE_DIFF_THRESHOLD && current_rate * next_rate < 0.0 {
        RateChange::Reversal
    } else {
        let rate_delta = next_rate.abs() - current_rate.abs();
        let percentage = rate_delta / current_rate.abs().max(RATE_EPSILON) * 100.0;
        if percentage.abs() > RATE_PERCENTAGE_THRESHOLD && rate_diff > RATE_DIFF_THRESHOLD {
            RateChange::Changed {
                percentage,
                rate_delta,
            }
        } else {
            RateChange::SameRate
        }
    };

    RateComparison {
        week_index,
        current_rate,
        next_rate,
        change,
    }
}

/// Compare each adjacent pair of weeks that both have a linear model.
pub fn compare_weekly_rates(
    elaboration: &WeeklyElaborationProperties,
    weekday_weekend: &WeekdayWeekendProperties,
) -> WeeklyRateComparisonProperties {
    let comparisons = elaboration
        .week_linear_models
        .windows(2)
        .enumerate()
        .filter_map(|(i, pair)| match (pair[0], pair[1]) {
            (Some(current), Some(next)) => Some(compare_rates(i, current.gradient, next.gradient)),
            _ => None,
        })
        .collect();

    WeeklyRateComparisonProperties {
        comparisons,
        weekday_weekend_equal_validity: weekday_weekend.weekday_weekend_equal_validity,
    }
}

fn direction(increasing: bool) -> &'static str {
    if increasing {
        "increasing"
    } else {
        "decreasing"
    }
}

pub fn describe_comparison(
    comparison: &RateComparison,
    weekday_weekend_equal_validity: f64,
    measure: &str,
) -> String {
    let qualifier = if weekday_weekend_equal_validity > WEEKDAY_QUALIFIER_VALIDITY {
        String::new()
    } else {
        format!("{} ", bold("of weekdays"))
    };
    let current_week = bold(format!("{} week", ordinal(comparison.week_index)));
    let next_week = bold(format!("{} week", ordinal(comparison.week_index + 1)));

    match comparison.change {
        RateChange::Reversal => format!(
            "The {} {}was {} in the {} but {} in the {}.",
            measure,
            qualifier,
            bold(direction(comparison.next_increasing())),
            next_week,
            bold(direction(comparison.current_increasing())),
            current_week,
        ),
        RateChange::Changed {
            percentage,
            rate_delta,
        } => {
            let dynamic = if comparison.current_increasing() {
                "increased"
            } else {
                "decreased"
            };
            let phrase = format!(
                "{}% ({} {} user {} per day) {} than",
                format_y(percentage.abs()),
                format_y(rate_delta.abs()),
                if percentage >= 0.0 { "more" } else { "less" },
                dynamic,
                if percentage >= 0.0 { "faster" } else { "slower" },
            );
            format!(
                "The {} {}in the {} {} {} the {}.",
                measure,
                qualifier,
                next_week,
                dynamic,
                bold(phrase),
                current_week,
            )
        }
        RateChange::SameRate => {
            let dynamic = if comparison.current_increasing() {
                "increased"
            } else {
                "decreased"
            };
            format!(
                "The {} {}in the {} {} {} the {}.",
                measure,
                qualifier,
                next_week,
                dynamic,
                bold("in the same rate as"),
                current_week,
            )
        }
    }
}

pub struct TrendWeeklyComparisonRateService {
    weekday_weekend: Arc<WeekdayWeekendRelativeService>,
    weekly_elaboration: Arc<TrendWeeklyElaborationService>,
    properties: Arc<SingleFlightCache<SummarizerConfig, WeeklyRateComparisonProperties>>,
    summaries: SingleFlightCache<SummarizerConfig, Vec<SummaryGroup>>,
}

impl TrendWeeklyComparisonRateService {
    pub fn new(
        weekday_weekend: Arc<WeekdayWeekendRelativeService>,
        weekly_elaboration: Arc<TrendWeeklyElaborationService>,
    ) -> Self {
        Self {
            weekday_weekend,
            weekly_elaboration,
            properties: Arc::new(SingleFlightCache::new("TrendWeeklyComparisonRate.properties")),
            summaries: SingleFlightCache::new("TrendWeeklyComparisonRate.summaries"),
        }
    }

    fn load_properties(
        &self,
        config: &SummarizerConfig,
    ) -> impl Future<Output = SummarizerResult<Arc<WeeklyRateComparisonProperties>>> + Send + 'static
    {
        let cache = Arc::clone(&self.properties);
        let weekday_weekend = Arc::clone(&self.weekday_weekend);
        let weekly_elaboration = Arc::clone(&self.weekly_elaboration);
        let config = config.clone();
        async move {
            let key = config.clone();
            cache
                .get_or_compute(&key, move || async move {
                    // Both upstream results are required before comparing.
                    let (weekday_weekend, elaboration) = tokio::try_join!(
                        weekday_weekend.properties(&config),
                        weekly_elaboration.properties(&config),
                    )?;
                    Ok(compare_weekly_rates(&elaboration, &weekday_weekend))
                })
                .await
        }
    }
}

#[async_trait]
impl SummarizationService for TrendWeeklyComparisonRateService {
    type Properties = WeeklyRateComparisonProperties;

    fn kind(&self) -> SummarizerKind {
        SummarizerKind::WeeklyComparisonRate
    }

    async fn properties(
        &self,
        config: &SummarizerConfig,
    ) -> SummarizerResult<Arc<WeeklyRateComparisonProperties>> {
        self.prepare_config(config)?;
        self.load_properties(config).await
    }

    async fn summaries(&self, config: &SummarizerConfig) -> SummarizerResult<Arc<Vec<SummaryGroup>>> {
        self.prepare_config(config)?;
        let properties = self.load_properties(config);
        let measure = config.measure.clone();
        self.summaries
            .get_or_compute(config, move || async move {
                let summaries = match properties.await {
                    Ok(properties) => properties
                        .comparisons
                        .iter()
                        .map(|comparison| {
                            let text = describe_comparison(
                                comparison,
                                properties.weekday_weekend_equal_validity,
                                &measure,
                            );
                            Summary::new(text, 1.0)
                        })
                        .collect(),
                    Err(e) if e.is_insufficient_data() => Vec::new(),
                    Err(e) => return Err(e),
                };
                Ok(vec![SummaryGroup::new(TITLE, summaries)])
            })
            .await
    }

    fn invalidate(&self) {
        self.properties.invalidate();
        self.summaries.invalidate();
    }
}

#[cfg(test)]
#[path = "comparison_rate_tests.rs"]
mod comparison_rate_tests;
