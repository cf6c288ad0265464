//! Unit tests for percentage-change calculation

use indicatrix::engine::change::{is_percent_unit, percent_change};

#[test]
fn percent_units_are_detected() {
    assert!(is_percent_unit("%"));
    assert!(is_percent_unit("Percentage"));
    assert!(is_percent_unit("kcal %"));
    assert!(!is_percent_unit("tonnes"));
}

#[test]
fn percent_unit_returns_the_delta_unchanged() {
    // A percentage-point delta already is the percentage change
    assert_eq!(percent_change(Some(5.2), Some(99.0), "%"), Some(5.2));
    assert_eq!(percent_change(Some(-3.0), Some(0.0), "percentage"), Some(-3.0));
    assert_eq!(percent_change(None, Some(42.0), "%"), None);
}

#[test]
fn zero_delta_yields_zero() {
    assert_eq!(percent_change(Some(0.0), Some(50.0), "t"), Some(0.0));
}

#[test]
fn zero_prior_value_yields_zero() {
    // current - delta == 0 leaves no prior to compare against
    assert_eq!(percent_change(Some(10.0), Some(10.0), "t"), Some(0.0));
    assert_eq!(percent_change(Some(0.0), Some(0.0), "t"), Some(0.0));
}

#[test]
fn missing_delta_yields_zero_for_absolute_units() {
    assert_eq!(percent_change(None, Some(90.0), "t"), Some(0.0));
}

#[test]
fn change_is_relative_to_the_recovered_prior_value() {
    // prior = |90 - (-20)| = 110
    assert_eq!(percent_change(Some(-20.0), Some(90.0), "t"), Some(-18.18));
    // prior = |110 - 10| = 100
    assert_eq!(percent_change(Some(10.0), Some(110.0), "t"), Some(10.0));
}
