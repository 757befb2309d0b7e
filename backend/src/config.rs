//! Engine settings file and environment support.
//!
//! Settings provide the defaults used when assembling a
//! [`SummarizerConfig`](crate::services::SummarizerConfig). They are read from
//! a TOML file and may be overridden by environment variables.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{SummarizerError, SummarizerResult};

/// Engine settings from file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    #[serde(default)]
    pub grouping: GroupingSettings,
    #[serde(default)]
    pub weekday_weekend: WeekdayWeekendSettings,
}

/// How points are bucketed into periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupingSettings {
    #[serde(default = "default_period_days")]
    pub period_days: u32,
    #[serde(default = "default_moving_average_window")]
    pub moving_average_window: u32,
}

/// Breakpoints of the left-shoulder membership "weekday and weekend are equal",
/// applied to the relative difference of their means.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayWeekendSettings {
    #[serde(default = "default_equal_low")]
    pub equal_low: f64,
    #[serde(default = "default_equal_high")]
    pub equal_high: f64,
}

fn default_period_days() -> u32 {
    7
}

fn default_moving_average_window() -> u32 {
    7
}

fn default_equal_low() -> f64 {
    0.1
}

fn default_equal_high() -> f64 {
    0.3
}

impl Default for GroupingSettings {
    fn default() -> Self {
        Self {
            period_days: default_period_days(),
            moving_average_window: default_moving_average_window(),
        }
    }
}

impl Default for WeekdayWeekendSettings {
    fn default() -> Self {
        Self {
            equal_low: default_equal_low(),
            equal_high: default_equal_high(),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            grouping: GroupingSettings::default(),
            weekday_weekend: WeekdayWeekendSettings::default(),
        }
    }
}

impl EngineSettings {
    /// Load settings from a TOML file.
    ///
    /// # Errors
    /// `Config` if the file cannot be read, parsed or fails validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> SummarizerResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            SummarizerError::config(format!("Failed to read settings file: {}", e))
                .with_operation("load_settings")
        })?;

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> SummarizerResult<Self> {
        let settings: EngineSettings = toml::from_str(content).map_err(|e| {
            SummarizerError::config(format!("Failed to parse settings file: {}", e))
                .with_operation("load_settings")
        })?;

        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the default location.
    ///
    /// Searches for `summaries.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> SummarizerResult<Self> {
        let search_paths = [
            PathBuf::from("summaries.toml"),
            PathBuf::from("backend/summaries.toml"),
            PathBuf::from("../summaries.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(SummarizerError::config("No summaries.toml found in standard locations")
            .with_operation("load_settings"))
    }

    /// Apply environment overrides on top of `self`.
    ///
    /// # Environment Variables
    /// - `SUMMARIES_PERIOD_DAYS` (optional): days per period
    /// - `SUMMARIES_EQUAL_LOW` (optional): full-membership bound of "weekday equals weekend"
    /// - `SUMMARIES_EQUAL_HIGH` (optional): zero-membership bound of "weekday equals weekend"
    pub fn with_env_overrides(mut self) -> SummarizerResult<Self> {
        if let Ok(value) = env::var("SUMMARIES_PERIOD_DAYS") {
            self.grouping.period_days = value.parse().map_err(|_| {
                SummarizerError::config("SUMMARIES_PERIOD_DAYS must be a positive integer")
            })?;
        }
        if let Ok(value) = env::var("SUMMARIES_EQUAL_LOW") {
            self.weekday_weekend.equal_low = value
                .parse()
                .map_err(|_| SummarizerError::config("SUMMARIES_EQUAL_LOW must be a number"))?;
        }
        if let Ok(value) = env::var("SUMMARIES_EQUAL_HIGH") {
            self.weekday_weekend.equal_high = value
                .parse()
                .map_err(|_| SummarizerError::config("SUMMARIES_EQUAL_HIGH must be a number"))?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> SummarizerResult<Self> {
        Self::default().with_env_overrides()
    }

    pub fn validate(&self) -> SummarizerResult<()> {
        if self.grouping.period_days == 0 {
            return Err(SummarizerError::config("period_days must be at least 1"));
        }
        if self.grouping.moving_average_window == 0 {
            return Err(SummarizerError::config("moving_average_window must be at least 1"));
        }
        let WeekdayWeekendSettings {
            equal_low,
            equal_high,
        } = self.weekday_weekend;
        if !(equal_low.is_finite() && equal_high.is_finite()) || equal_low > equal_high {
            return Err(SummarizerError::config(format!(
                "weekday_weekend breakpoints must be finite and ordered, got [{}, {}]",
                equal_low, equal_high
            )));
        }
        Ok(())
    }
}
