//! # Weekly Summaries
//!
//! Linguistic summarization of numeric time series.
//!
//! The engine turns a daily series into short natural-language statements
//! ("the average active users of the second week was 6% more than the first
//! week"), each with a validity degree in [0, 1]. Statements are built from
//! least-squares trends, additive decomposition and fuzzy protoforms evaluated
//! with the sigma-count quantifier.
//!
//! ## Architecture
//!
//! - [`algorithms`]: numeric kernels (membership functions, regression, grouping, formatting)
//! - [`models`]: points, linear models and summary output types
//! - [`services`]: memoized summarizers and the [`SummarizationEngine`](services::SummarizationEngine)
//! - [`config`]: engine settings from TOML and the environment
//! - [`error`]: the [`SummarizerError`] taxonomy
//!
//! ## Caching
//!
//! Every summarizer caches its results per configuration. Concurrent requests
//! for the same configuration share one computation, and
//! [`SummarizationEngine::invalidate`](services::SummarizationEngine::invalidate)
//! cancels running work and clears every cache.

pub mod algorithms;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use config::EngineSettings;
pub use error::{ErrorContext, SummarizerError, SummarizerResult};
pub use models::{DatasetId, LinearModel, NumericPoint, Summary, SummaryGroup, TimeSeriesPoint};
pub use services::{
    InMemorySource, SummarizationEngine, SummarizationService, SummarizerConfig, SummarizerKind,
    TimeSeriesSource,
};
