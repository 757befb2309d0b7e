//! Output types consumed by renderers.

use serde::{Deserialize, Serialize};
use serde_json::json;

/// Least-squares fit `y = gradient * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub gradient: f64,
    pub intercept: f64,
}

impl LinearModel {
    pub fn new(gradient: f64, intercept: f64) -> Self {
        Self { gradient, intercept }
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.gradient * x + self.intercept
    }
}

/// One generated sentence. `text` may contain `<b>` emphasis spans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub text: String,
    /// Truth degree in [0, 1].
    pub validity: f64,
}

impl Summary {
    /// Creates a summary, clamping `validity` into [0, 1]. NaN becomes 0.
    pub fn new(text: impl Into<String>, validity: f64) -> Self {
        let validity = if validity.is_nan() {
            0.0
        } else {
            validity.clamp(0.0, 1.0)
        };
        Self {
            text: text.into(),
            validity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryGroup {
    pub title: String,
    pub summaries: Vec<Summary>,
}

impl SummaryGroup {
    pub fn new(title: impl Into<String>, summaries: Vec<Summary>) -> Self {
        Self {
            title: title.into(),
            summaries,
        }
    }

    /// A titled group with nothing to report.
    pub fn empty(title: impl Into<String>) -> Self {
        Self::new(title, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }

    /// Renderer payload: `{"title": .., "summaries": [{"text": .., "validity": ..}]}`.
    pub fn to_json(&self) -> serde_json::Value {
        let summaries: Vec<serde_json::Value> = self
            .summaries
            .iter()
            .map(|s| json!({ "text": s.text, "validity": s.validity }))
            .collect();
        json!({ "title": self.title, "summaries": summaries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_validity_is_clamped() {
        assert_eq!(Summary::new("a", 1.5).validity, 1.0);
        assert_eq!(Summary::new("a", -0.2).validity, 0.0);
        assert_eq!(Summary::new("a", f64::NAN).validity, 0.0);
        assert_eq!(Summary::new("a", 0.4).validity, 0.4);
    }

    #[test]
    fn test_linear_model_predict() {
        let model = LinearModel::new(2.0, 3.0);
        assert_eq!(model.predict(4.0), 11.0);
    }

    #[test]
    fn test_empty_group_keeps_title() {
        let group = SummaryGroup::empty("Trend Weekly Comparison - Average");
        assert!(group.is_empty());
        assert_eq!(group.title, "Trend Weekly Comparison - Average");
    }

    #[test]
    fn test_group_serializes_for_renderers() {
        let group = SummaryGroup::new("t", vec![Summary::new("<b>x</b>", 1.0)]);
        let json = serde_json::to_value(&group).unwrap();
        assert_eq!(json["title"], "t");
        assert_eq!(json["summaries"][0]["text"], "<b>x</b>");
        assert_eq!(json["summaries"][0]["validity"], 1.0);
        assert_eq!(group.to_json(), json);
    }
}
