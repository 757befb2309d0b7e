//! Service layer for summarization.
//!
//! Services sit between the raw time series supplied by a
//! [`TimeSeriesSource`] and the summary groups handed to renderers. Each
//! summarizer memoizes its derived properties and summaries per
//! [`SummarizerConfig`]; dependent summarizers consume the properties of
//! their upstream services rather than recomputing them.

pub mod cache;
pub mod comparison_average;
pub mod comparison_rate;
pub mod data_source;
pub mod engine;
pub mod summarization;
pub mod weekday_weekend;
pub mod weekly_elaboration;

pub use cache::SingleFlightCache;
pub use comparison_average::{TrendWeeklyComparisonAverageService, WeeklyAverageComparisonProperties};
pub use comparison_rate::{
    RateChange, RateComparison, TrendWeeklyComparisonRateService, WeeklyRateComparisonProperties,
};
pub use data_source::{DataSourceService, InMemorySource, TimeSeriesSource};
pub use engine::{validate_dependency_graph, SummarizationEngine};
pub use summarization::{SummarizationService, SummarizerConfig, SummarizerKind};
pub use weekday_weekend::{WeekdayWeekendProperties, WeekdayWeekendRelativeService};
pub use weekly_elaboration::{TrendWeeklyElaborationService, WeeklyElaborationProperties};
