//! Weekly elaboration: per-period point groups and their linear trends.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

use super::cache::SingleFlightCache;
use super::data_source::DataSourceService;
use super::summarization::{SummarizationService, SummarizerConfig, SummarizerKind};
use crate::algorithms::format::{bold, format_y, ordinal};
use crate::algorithms::{fit_linear_model, group_by_period};
use crate::error::{SummarizerError, SummarizerResult};
use crate::models::time::{days_since_epoch, to_numeric_points};
use crate::models::{LinearModel, NumericPoint, Summary, SummaryGroup};

pub const TITLE: &str = "Trend Weekly Elaboration";

/// Minimum number of periods holding data; comparisons need at least one pair.
pub const MIN_WEEKS: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyElaborationProperties {
    /// Point groups indexed by calendar period from the range start. A period
    /// without observations is an empty group.
    pub week_point_arrays: Vec<Vec<NumericPoint>>,
    /// Linear trend per period. `None` where the period has fewer than two
    /// distinct timestamps, including empty periods.
    pub week_linear_models: Vec<Option<LinearModel>>,
}

impl WeeklyElaborationProperties {
    pub fn num_weeks(&self) -> usize {
        self.week_point_arrays.len()
    }
}

/// Group `points` into periods of `period_days` counted from `origin` (days
/// since epoch) and fit a line to each.
pub fn elaborate_weeks(
    points: &[NumericPoint],
    origin: f64,
    period_days: u32,
) -> SummarizerResult<WeeklyElaborationProperties> {
    let week_point_arrays = group_by_period(points, origin, period_days as f64)?;
    let populated = week_point_arrays.iter().filter(|week| !week.is_empty()).count();
    if populated < MIN_WEEKS {
        return Err(SummarizerError::insufficient_data(format!(
            "need at least {} periods of data, got {}",
            MIN_WEEKS, populated
        ))
        .with_operation("elaborate_weeks"));
    }

    let mut week_linear_models = Vec::with_capacity(week_point_arrays.len());
    for (index, week) in week_point_arrays.iter().enumerate() {
        match fit_linear_model(week) {
            Ok(model) => week_linear_models.push(Some(model)),
            Err(e) if e.is_insufficient_data() => {
                warn!(week = index, points = week.len(), "skipping linear model: {}", e);
                week_linear_models.push(None);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(WeeklyElaborationProperties {
        week_point_arrays,
        week_linear_models,
    })
}

fn describe_weeks(properties: &WeeklyElaborationProperties, measure: &str) -> Vec<Summary> {
    properties
        .week_linear_models
        .iter()
        .enumerate()
        .filter_map(|(i, model)| model.map(|m| (i, m)))
        .map(|(i, model)| {
            let direction = if model.gradient >= 0.0 {
                "increased"
            } else {
                "decreased"
            };
            let text = format!(
                "The {} {} by {} per day in the {}.",
                measure,
                bold(direction),
                bold(format_y(model.gradient.abs())),
                bold(format!("{} week", ordinal(i))),
            );
            Summary::new(text, 1.0)
        })
        .collect()
}

pub struct TrendWeeklyElaborationService {
    data_source: Arc<DataSourceService>,
    properties: Arc<SingleFlightCache<SummarizerConfig, WeeklyElaborationProperties>>,
    summaries: SingleFlightCache<SummarizerConfig, Vec<SummaryGroup>>,
}

impl TrendWeeklyElaborationService {
    pub fn new(data_source: Arc<DataSourceService>) -> Self {
        Self {
            data_source,
            properties: Arc::new(SingleFlightCache::new("TrendWeeklyElaboration.properties")),
            summaries: SingleFlightCache::new("TrendWeeklyElaboration.summaries"),
        }
    }

    fn load_properties(
        &self,
        config: &SummarizerConfig,
    ) -> impl Future<Output = SummarizerResult<Arc<WeeklyElaborationProperties>>> + Send + 'static
    {
        let cache = Arc::clone(&self.properties);
        let data_source = Arc::clone(&self.data_source);
        let config = config.clone();
        async move {
            let key = config.clone();
            cache
                .get_or_compute(&key, move || async move {
                    let series = data_source.time_series(&config).await?;
                    debug!(dataset = %config.dataset, "elaborating weekly trends");
                    elaborate_weeks(
                        &to_numeric_points(&series),
                        days_since_epoch(config.start),
                        config.period_days,
                    )
                    .map_err(|e| {
                        e.with_summarizer(SummarizerKind::WeeklyElaboration.name())
                            .with_dataset(&config.dataset)
                    })
                })
                .await
        }
    }

    /// Number of property computations started.
    pub fn computation_count(&self) -> usize {
        self.properties.computation_count()
    }
}

#[async_trait]
impl SummarizationService for TrendWeeklyElaborationService {
    type Properties = WeeklyElaborationProperties;

    fn kind(&self) -> SummarizerKind {
        SummarizerKind::WeeklyElaboration
    }

    async fn properties(
        &self,
        config: &SummarizerConfig,
    ) -> SummarizerResult<Arc<WeeklyElaborationProperties>> {
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
                    Ok(properties) => SummaryGroup::new(TITLE, describe_weeks(&properties, &measure)),
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
