//! Numeric building blocks of the summarizers.
//!
//! - [`protoform`]: fuzzy membership functions and quantifier affirmation
//! - [`trend`]: least-squares fitting, moving averages, additive decomposition
//! - [`time_series`]: grouping into periods and normalization
//! - [`format`]: number and ordinal formatting for generated text

pub mod format;
pub mod protoform;
pub mod time_series;
pub mod trend;

pub use protoform::{sigma_count_qa, MembershipFunction};
pub use time_series::{group_by_period, group_by_week, normalize, normalize_y};
pub use trend::{additive_decompose, centered_moving_average, fit_linear_model, Decomposition};
