//! Unit tests for unit-string normalization

use indicatrix::engine::units::{display_unit, normalize_value, round2};

#[test]
fn scales_thousand_prefix() {
    assert_eq!(normalize_value(Some(1.5), "1000 tonnes"), Some(1500.0));
}

#[test]
fn scales_million_prefix() {
    assert_eq!(normalize_value(Some(2.0), "million USD"), Some(2_000_000.0));
}

#[test]
fn scales_hundred_prefix() {
    assert_eq!(normalize_value(Some(0.42), "100 g/capita"), Some(42.0));
}

#[test]
fn thousand_prefix_wins_over_hundred() {
    // "1000" shares a prefix with "100" and must match first
    assert_eq!(normalize_value(Some(2.0), "1000 t"), Some(2000.0));
}

#[test]
fn sign_flip_prefix_keeps_value() {
    assert_eq!(normalize_value(Some(12.5), "- kcal/capita/day"), Some(12.5));
}

#[test]
fn unscaled_unit_rounds_to_two_decimals() {
    assert_eq!(normalize_value(Some(3.14159), "kg"), Some(3.14));
}

#[test]
fn zero_is_a_valid_value() {
    assert_eq!(normalize_value(Some(0.0), "kg"), Some(0.0));
}

#[test]
fn missing_and_non_finite_values_normalize_to_none() {
    assert_eq!(normalize_value(None, "kg"), None);
    assert_eq!(normalize_value(Some(f64::NAN), "kg"), None);
    assert_eq!(normalize_value(Some(f64::INFINITY), "1000 t"), None);
}

#[test]
fn prefix_match_is_case_insensitive() {
    assert_eq!(normalize_value(Some(1.0), "Million tonnes"), Some(1_000_000.0));
    assert_eq!(display_unit("Million tonnes"), "tonnes");
}

#[test]
fn display_strips_recognized_prefixes() {
    assert_eq!(display_unit("1000 tonnes"), "tonnes");
    assert_eq!(display_unit("million USD"), "USD");
    assert_eq!(display_unit("100 g/capita"), "g/capita");
    assert_eq!(display_unit("-%"), "%");
}

#[test]
fn display_passes_unrecognized_units_through() {
    assert_eq!(display_unit("kg"), "kg");
    assert_eq!(display_unit("kcal/capita/day"), "kcal/capita/day");
}

#[test]
fn reprefixed_display_unit_normalizes_like_the_original() {
    // Stripping the prefix and re-prefixing must reproduce the original
    // unit's normalization behavior.
    let value = Some(2.5);
    for unit in ["1000 tonnes", "million USD", "100 index", "- kcal"] {
        let prefix_len = unit.len() - display_unit(unit).len();
        let rebuilt = format!("{}{}", &unit[..prefix_len], display_unit(unit));
        assert_eq!(normalize_value(value, &rebuilt), normalize_value(value, unit));
    }
}

#[test]
fn round2_rounds_half_away() {
    assert_eq!(round2(1.005 + 0.0001), 1.01);
    assert_eq!(round2(-18.1818), -18.18);
}
