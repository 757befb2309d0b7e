//! Fuzzy membership functions and sigma-count quantifier affirmation.
//!
//! A protoform such as "Q of X are P" is evaluated by mapping each element of
//! X through the membership function of P and aggregating the degrees with a
//! quantifier. The sigma-count quantifier used here is the fuzzy cardinality
//! of P in X divided by |X|.

use serde::{Deserialize, Serialize};

use crate::error::{SummarizerError, SummarizerResult};

/// Trapezoid-family membership function.
///
/// Breakpoints are validated on construction (finite, non-decreasing), so
/// evaluation never divides by a zero-width segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum MembershipFunction {
    /// Rises on `[a, b]`, plateaus on `[b, c]`, falls on `[c, d]`.
    Trapezoid { a: f64, b: f64, c: f64, d: f64 },
    /// Degree 1 up to `c`, falling to 0 at `d`.
    LeftShoulder { c: f64, d: f64 },
    /// Degree 0 up to `a`, rising to 1 at `b`.
    RightShoulder { a: f64, b: f64 },
}

fn check_breakpoints(operation: &str, breakpoints: &[f64]) -> SummarizerResult<()> {
    if breakpoints.iter().any(|v| !v.is_finite()) {
        return Err(SummarizerError::invalid_input(format!(
            "breakpoints must be finite, got {:?}",
            breakpoints
        ))
        .with_operation(operation));
    }
    if breakpoints.windows(2).any(|w| w[0] > w[1]) {
        return Err(SummarizerError::invalid_input(format!(
            "breakpoints must be non-decreasing, got {:?}",
            breakpoints
        ))
        .with_operation(operation));
    }
    Ok(())
}

impl MembershipFunction {
    pub fn trapezoid(a: f64, b: f64, c: f64, d: f64) -> SummarizerResult<Self> {
        check_breakpoints("trapezoid", &[a, b, c, d])?;
        Ok(Self::Trapezoid { a, b, c, d })
    }

    pub fn left_shoulder(c: f64, d: f64) -> SummarizerResult<Self> {
        check_breakpoints("left_shoulder", &[c, d])?;
        Ok(Self::LeftShoulder { c, d })
    }

    pub fn right_shoulder(a: f64, b: f64) -> SummarizerResult<Self> {
        check_breakpoints("right_shoulder", &[a, b])?;
        Ok(Self::RightShoulder { a, b })
    }

    /// Membership degree of `value`, always in [0, 1].
    ///
    /// # Errors
    /// `InvalidInput` when `value` is NaN.
    pub fn degree(&self, value: f64) -> SummarizerResult<f64> {
        if value.is_nan() {
            return Err(SummarizerError::invalid_input("membership of NaN is undefined")
                .with_operation("membership_degree"));
        }

        let degree = match *self {
            Self::Trapezoid { a, b, c, d } => {
                if value < a || value > d {
                    0.0
                } else if value < b {
                    (value - a) / (b - a)
                } else if value <= c {
                    1.0
                } else {
                    (d - value) / (d - c)
                }
            }
            Self::LeftShoulder { c, d } => {
                if value <= c {
                    1.0
                } else if value >= d {
                    0.0
                } else {
                    (d - value) / (d - c)
                }
            }
            Self::RightShoulder { a, b } => {
                if value <= a {
                    0.0
                } else if value >= b {
                    1.0
                } else {
                    (value - a) / (b - a)
                }
            }
        };

        Ok(degree.clamp(0.0, 1.0))
    }
}

/// Sigma-count quantifier affirmation: the mean membership degree of `items`.
///
/// An empty input yields 0, meaning "nothing satisfies the predicate".
pub fn sigma_count_qa<T, F>(items: &[T], mut membership: F) -> SummarizerResult<f64>
where
    F: FnMut(&T) -> SummarizerResult<f64>,
{
    if items.is_empty() {
        return Ok(0.0);
    }

    let mut total = 0.0;
    for item in items {
        total += membership(item)?;
    }

    Ok((total / items.len() as f64).clamp(0.0, 1.0))
}

#[cfg(test)]
#[path = "protoform_tests.rs"]
mod protoform_tests;
