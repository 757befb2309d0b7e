//! Output boundary: owns every summarizer and the shared data source.
//!
//! ```ignore
//! let engine = SummarizationEngine::new(Arc::new(source))?;
//! let config = engine.config("active-users", start, end);
//! for group in engine.all_summaries(&config).await? {
//!     println!("{}", group.title);
//! }
//! ```

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::comparison_average::TrendWeeklyComparisonAverageService;
use super::comparison_rate::TrendWeeklyComparisonRateService;
use super::data_source::{DataSourceService, TimeSeriesSource};
use super::summarization::{SummarizationService, SummarizerConfig, SummarizerKind};
use super::weekday_weekend::WeekdayWeekendRelativeService;
use super::weekly_elaboration::TrendWeeklyElaborationService;
use crate::algorithms::{additive_decompose, Decomposition};
use crate::config::EngineSettings;
use crate::error::{SummarizerError, SummarizerResult};
use crate::models::time::to_numeric_points;
use crate::models::{DatasetId, SummaryGroup};

/// Topologically order `nodes` so every node follows its dependencies.
///
/// Fails with `CyclicDependency` when the graph has a cycle or a node depends
/// on something outside `nodes`.
pub fn validate_dependency_graph<N, F>(nodes: &[N], dependencies: F) -> SummarizerResult<Vec<N>>
where
    N: Copy + Eq + Hash + Debug,
    F: Fn(N) -> Vec<N>,
{
    let known: HashSet<N> = nodes.iter().copied().collect();
    let mut in_degree: HashMap<N, usize> = nodes.iter().map(|&n| (n, 0)).collect();
    let mut dependents: HashMap<N, Vec<N>> = HashMap::new();

    for &node in nodes {
        for dependency in dependencies(node) {
            if !known.contains(&dependency) {
                return Err(SummarizerError::cyclic_dependency(format!(
                    "{:?} depends on unregistered {:?}",
                    node, dependency
                ))
                .with_operation("validate_dependency_graph"));
            }
            *in_degree.entry(node).or_insert(0) += 1;
            dependents.entry(dependency).or_default().push(node);
        }
    }

    // Kahn's algorithm with a FIFO queue: ties keep declaration order.
    let mut ready: VecDeque<N> = nodes.iter().copied().filter(|n| in_degree[n] == 0).collect();
    let mut order = Vec::with_capacity(nodes.len());
    while let Some(node) = ready.pop_front() {
        order.push(node);
        for child in dependents.get(&node).into_iter().flatten() {
            if let Some(degree) = in_degree.get_mut(child) {
                *degree -= 1;
                if *degree == 0 {
                    ready.push_back(*child);
                }
            }
        }
    }

    if order.len() != nodes.len() {
        let stuck: Vec<N> = nodes.iter().copied().filter(|n| !order.contains(n)).collect();
        return Err(SummarizerError::cyclic_dependency(format!(
            "dependency cycle among {:?}",
            stuck
        ))
        .with_operation("validate_dependency_graph"));
    }

    Ok(order)
}

pub struct SummarizationEngine {
    settings: EngineSettings,
    order: Vec<SummarizerKind>,
    data_source: Arc<DataSourceService>,
    weekly_elaboration: Arc<TrendWeeklyElaborationService>,
    weekday_weekend: Arc<WeekdayWeekendRelativeService>,
    comparison_average: Arc<TrendWeeklyComparisonAverageService>,
    comparison_rate: Arc<TrendWeeklyComparisonRateService>,
}

impl SummarizationEngine {
    /// Engine with default settings.
    pub fn new(source: Arc<dyn TimeSeriesSource>) -> SummarizerResult<Self> {
        Self::with_settings(source, EngineSettings::default())
    }

    pub fn with_settings(
        source: Arc<dyn TimeSeriesSource>,
        settings: EngineSettings,
    ) -> SummarizerResult<Self> {
        settings.validate()?;
        let order = validate_dependency_graph(&SummarizerKind::ALL, |kind| {
            kind.dependencies().to_vec()
        })?;
        debug!(?order, "summarizer dependency graph validated");

        let data_source = Arc::new(DataSourceService::new(source));
        let weekly_elaboration = Arc::new(TrendWeeklyElaborationService::new(Arc::clone(&data_source)));
        let weekday_weekend = Arc::new(WeekdayWeekendRelativeService::new(Arc::clone(&data_source)));
        let comparison_average = Arc::new(TrendWeeklyComparisonAverageService::new(Arc::clone(
            &weekly_elaboration,
        )));
        let comparison_rate = Arc::new(TrendWeeklyComparisonRateService::new(
            Arc::clone(&weekday_weekend),
            Arc::clone(&weekly_elaboration),
        ));

        Ok(Self {
            settings,
            order,
            data_source,
            weekly_elaboration,
            weekday_weekend,
            comparison_average,
            comparison_rate,
        })
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Summarizers in dependency order.
    pub fn kinds(&self) -> &[SummarizerKind] {
        &self.order
    }

    /// Config over `[start, end)` with this engine's default thresholds.
    pub fn config(
        &self,
        dataset: impl Into<DatasetId>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> SummarizerConfig {
        SummarizerConfig::from_settings(dataset, start, end, &self.settings)
    }

    /// Summary groups of one summarizer.
    pub async fn summaries(
        &self,
        kind: SummarizerKind,
        config: &SummarizerConfig,
    ) -> SummarizerResult<Arc<Vec<SummaryGroup>>> {
        config
            .validate()
            .map_err(|e| e.with_summarizer(kind.name()).with_dataset(&config.dataset))?;

        match kind {
            SummarizerKind::WeeklyElaboration => self.weekly_elaboration.summaries(config).await,
            SummarizerKind::WeekdayWeekendRelative => self.weekday_weekend.summaries(config).await,
            SummarizerKind::WeeklyComparisonAverage => self.comparison_average.summaries(config).await,
            SummarizerKind::WeeklyComparisonRate => self.comparison_rate.summaries(config).await,
        }
    }

    /// Summary groups of every summarizer, in dependency order.
    pub async fn all_summaries(&self, config: &SummarizerConfig) -> SummarizerResult<Vec<SummaryGroup>> {
        config
            .validate()
            .map_err(|e| e.with_operation("all_summaries").with_dataset(&config.dataset))?;

        let (elaboration, weekday_weekend, average, rate) = tokio::try_join!(
            self.weekly_elaboration.summaries(config),
            self.weekday_weekend.summaries(config),
            self.comparison_average.summaries(config),
            self.comparison_rate.summaries(config),
        )?;

        let mut by_kind: HashMap<SummarizerKind, Arc<Vec<SummaryGroup>>> = HashMap::from([
            (SummarizerKind::WeeklyElaboration, elaboration),
            (SummarizerKind::WeekdayWeekendRelative, weekday_weekend),
            (SummarizerKind::WeeklyComparisonAverage, average),
            (SummarizerKind::WeeklyComparisonRate, rate),
        ]);

        Ok(self
            .order
            .iter()
            .filter_map(|kind| by_kind.remove(kind))
            .flat_map(|groups| groups.iter().cloned().collect::<Vec<_>>())
            .collect())
    }

    /// Additive decomposition of the configured series, with the settings'
    /// moving-average window as the seasonal cycle in days.
    pub async fn decompose(&self, config: &SummarizerConfig) -> SummarizerResult<Decomposition> {
        config
            .validate()
            .map_err(|e| e.with_operation("decompose").with_dataset(&config.dataset))?;
        let series = self.data_source.time_series(config).await?;
        additive_decompose(
            &to_numeric_points(&series),
            self.settings.grouping.moving_average_window as usize,
        )
        .map_err(|e| e.with_dataset(&config.dataset))
    }

    /// Session teardown: cancel in-flight work and drop every cached result.
    pub fn invalidate(&self) {
        self.comparison_rate.invalidate();
        self.comparison_average.invalidate();
        self.weekday_weekend.invalidate();
        self.weekly_elaboration.invalidate();
        self.data_source.invalidate();
        info!("summarization caches invalidated");
    }

    pub fn data_source(&self) -> &Arc<DataSourceService> {
        &self.data_source
    }

    pub fn weekly_elaboration(&self) -> &Arc<TrendWeeklyElaborationService> {
        &self.weekly_elaboration
    }

    pub fn weekday_weekend(&self) -> &Arc<WeekdayWeekendRelativeService> {
        &self.weekday_weekend
    }

    pub fn comparison_average(&self) -> &Arc<TrendWeeklyComparisonAverageService> {
        &self.comparison_average
    }

    pub fn comparison_rate(&self) -> &Arc<TrendWeeklyComparisonRateService> {
        &self.comparison_rate
    }
}
