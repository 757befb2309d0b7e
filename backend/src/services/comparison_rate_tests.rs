use super::*;
use crate::models::{LinearModel, NumericPoint};

const MEASURE: &str = "active users";

fn elaboration_with_gradients(gradients: &[Option<f64>]) -> WeeklyElaborationProperties {
    WeeklyElaborationProperties {
        week_point_arrays: gradients
            .iter()
            .map(|_| vec![NumericPoint::new(0.0, 0.0)])
            .collect(),
        week_linear_models: gradients
            .iter()
            .map(|g| g.map(|g| LinearModel::new(g, 0.0)))
            .collect(),
    }
}

fn weekday_weekend(validity: f64) -> WeekdayWeekendProperties {
    WeekdayWeekendProperties {
        weekday_weekend_equal_validity: validity,
        relative_differences: vec![0.0],
    }
}

#[test]
fn test_direction_reversal() {
    let comparison = compare_rates(0, 3.0, -4.0);
    assert_eq!(comparison.change, RateChange::Reversal);

    let text = describe_comparison(&comparison, 1.0, MEASURE);
    assert_eq!(
        text,
        "The active users was <b>decreasing</b> in the <b>second week</b> but <b>increasing</b> in the <b>first week</b>."
    );
    assert!(!text.contains('%'));
}

#[test]
fn test_small_difference_is_same_rate() {
    // ~6.7% faster, but the absolute difference 0.2 is below the threshold
    let comparison = compare_rates(0, 3.0, 3.2);
    assert_eq!(comparison.change, RateChange::SameRate);

    let text = describe_comparison(&comparison, 1.0, MEASURE);
    assert_eq!(
        text,
        "The active users in the <b>second week</b> increased <b>in the same rate as</b> the <b>first week</b>."
    );
}

#[test]
fn test_faster_rate() {
    let comparison = compare_rates(0, 4.0, 10.0);
    match comparison.change {
        RateChange::Changed {
            percentage,
            rate_delta,
        } => {
            assert!((percentage - 150.0).abs() < 1e-3);
            assert!((rate_delta - 6.0).abs() < 1e-9);
        }
        other => panic!("expected a change, got {:?}", other),
    }

    let text = describe_comparison(&comparison, 1.0, MEASURE);
    assert_eq!(
        text,
        "The active users in the <b>second week</b> increased <b>150% (6 more user increased per day) faster than</b> the <b>first week</b>."
    );
}

#[test]
fn test_slower_decline() {
    let comparison = compare_rates(1, -10.0, -4.0);
    let text = describe_comparison(&comparison, 1.0, MEASURE);

    assert!(matches!(comparison.change, RateChange::Changed { .. }));
    assert!(text.contains("decreased"));
    assert!(text.contains("60% (6 less user decreased per day) slower than"));
    assert!(text.contains("<b>third week</b>"));
    assert!(text.contains("<b>second week</b>"));
}

#[test]
fn test_small_reversal_is_not_a_reversal() {
    // Signs differ but |diff| = 1 is below the threshold.
    let comparison = compare_rates(0, 0.5, -0.5);
    assert_eq!(comparison.change, RateChange::SameRate);
}

#[test]
fn test_flat_week_does_not_divide_by_zero() {
    let comparison = compare_rates(0, 0.0, 5.0);
    match comparison.change {
        RateChange::Changed { percentage, .. } => assert!(percentage.is_finite()),
        other => panic!("expected a change, got {:?}", other),
    }
}

#[test]
fn test_weekday_qualifier_gate() {
    let comparison = compare_rates(0, 3.0, 3.2);

    let qualified = describe_comparison(&comparison, 0.7, MEASURE);
    assert!(qualified.starts_with("The active users <b>of weekdays</b> in the"));

    let unqualified = describe_comparison(&comparison, 0.71, MEASURE);
    assert!(!unqualified.contains("of weekdays"));
}

#[test]
fn test_pairs_without_models_are_omitted() {
    let elaboration = elaboration_with_gradients(&[Some(1.0), Some(5.0), None, Some(2.0)]);
    let properties = compare_weekly_rates(&elaboration, &weekday_weekend(0.9));

    assert_eq!(properties.comparisons.len(), 1);
    assert_eq!(properties.comparisons[0].week_index, 0);
    assert_eq!(properties.weekday_weekend_equal_validity, 0.9);
}

#[test]
fn test_one_comparison_per_adjacent_pair() {
    let elaboration = elaboration_with_gradients(&[Some(1.0), Some(5.0), Some(-3.0)]);
    let properties = compare_weekly_rates(&elaboration, &weekday_weekend(1.0));

    let indices: Vec<usize> = properties.comparisons.iter().map(|c| c.week_index).collect();
    assert_eq!(indices, vec![0, 1]);
    assert_eq!(properties.comparisons[1].change, RateChange::Reversal);
}
