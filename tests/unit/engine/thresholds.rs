//! Unit tests for three-tier threshold computation and selection

use indicatrix::engine::thresholds::{
    compute_thresholds, select_thresholds, ALL_AREAS, ALL_ITEMS,
};
use indicatrix::models::{
    Cadence, DimensionColumn, IndicatorSpec, Observation, ThresholdDisplay, ThresholdRow,
    ThresholdScope,
};

fn spec(items: &[&str], commodities: Option<&[&str]>, unit: &str) -> IndicatorSpec {
    IndicatorSpec {
        name: "cereal production".to_string(),
        unit: unit.to_string(),
        dimension_column: DimensionColumn::Element,
        items: items.iter().map(|s| s.to_string()).collect(),
        commodities: commodities.map(|c| c.iter().map(|s| s.to_string()).collect()),
        legends: Vec::new(),
        is_positive: true,
        dimension_count: 1,
        threshold_display: ThresholdDisplay::Country,
        is_three_year_average: false,
        cadence: Cadence::Yearly,
    }
}

fn sample_observations() -> Vec<Observation> {
    vec![
        Observation::new("Egypt", "Production", "Wheat", "2018", 100.0),
        Observation::new("Egypt", "Production", "Wheat", "2019", 110.0),
        Observation::new("Egypt", "Production", "Rice", "2018", 50.0),
        Observation::new("Egypt", "Production", "Rice", "2019", 70.0),
    ]
}

fn find<'a>(
    rows: &'a [ThresholdRow],
    scope: ThresholdScope,
    area: &str,
    commodity: &str,
) -> &'a ThresholdRow {
    rows.iter()
        .find(|r| r.scope == scope && r.area == area && r.commodity == commodity)
        .expect("threshold row present")
}

#[test]
fn per_area_tier_groups_by_area_dimension_and_commodity() {
    let rows = compute_thresholds("PRODUCTION_TRADE", &sample_observations());

    let wheat = find(&rows, ThresholdScope::Area, "Egypt", "Wheat");
    assert_eq!(wheat.mean_value, 105.0);
    // sample stddev of [100, 110]
    assert_eq!(wheat.standard_deviation, 7.07);

    let rice = find(&rows, ThresholdScope::Area, "Egypt", "Rice");
    assert_eq!(rice.mean_value, 60.0);
    assert_eq!(rice.standard_deviation, 14.14);
}

#[test]
fn all_areas_tier_collapses_the_area_to_a_sentinel() {
    let rows = compute_thresholds("PRODUCTION_TRADE", &sample_observations());

    let wheat = find(&rows, ThresholdScope::AllAreas, ALL_AREAS, "Wheat");
    assert_eq!(wheat.mean_value, 105.0);
    assert_eq!(wheat.standard_deviation, 7.07);
}

#[test]
fn all_items_tier_sums_per_period_before_the_statistics() {
    let rows = compute_thresholds("PRODUCTION_TRADE", &sample_observations());

    // Period sums: 2018 -> 150, 2019 -> 180; mean 165, sample stddev 21.21
    let all_items = find(&rows, ThresholdScope::AllItems, "Egypt", ALL_ITEMS);
    assert_eq!(all_items.dimension_value, "Production");
    assert_eq!(all_items.mean_value, 165.0);
    assert_eq!(all_items.standard_deviation, 21.21);
}

#[test]
fn forecast_rows_never_contribute() {
    let mut observations = sample_observations();
    observations
        .push(Observation::new("Egypt", "Production", "Wheat", "2025", 999.0).with_forecast(true));
    let rows = compute_thresholds("PRODUCTION_TRADE", &observations);

    let wheat = find(&rows, ThresholdScope::Area, "Egypt", "Wheat");
    assert_eq!(wheat.mean_value, 105.0);
}

#[test]
fn a_single_observation_has_zero_deviation() {
    let observations = vec![Observation::new("Jordan", "Production", "Barley", "2020", 42.0)];
    let rows = compute_thresholds("PRODUCTION_TRADE", &observations);

    let barley = find(&rows, ThresholdScope::Area, "Jordan", "Barley");
    assert_eq!(barley.mean_value, 42.0);
    assert_eq!(barley.standard_deviation, 0.0);
}

fn threshold_row(mean: f64, stddev: f64) -> ThresholdRow {
    ThresholdRow {
        category_id: "PRODUCTION_TRADE".to_string(),
        scope: ThresholdScope::Area,
        area: "Egypt".to_string(),
        dimension_value: "Production".to_string(),
        commodity: "Wheat".to_string(),
        mean_value: mean,
        standard_deviation: stddev,
    }
}

#[test]
fn single_item_indicators_get_an_anomaly_band() {
    let spec = spec(&["Production"], None, "t");
    let values = select_thresholds(&[threshold_row(105.0, 7.07)], &spec);
    // [|mean - stddev|, mean + stddev], flattened
    assert_eq!(values, vec![97.93, 112.07]);
}

#[test]
fn band_lower_bound_is_clamped_non_negative() {
    let spec = spec(&["Production"], None, "t");
    let values = select_thresholds(&[threshold_row(2.0, 5.0)], &spec);
    assert_eq!(values, vec![3.0, 7.0]);
}

#[test]
fn multi_item_indicators_get_one_mean_per_row() {
    let spec = spec(&["Production", "Import quantity"], None, "t");
    let values = select_thresholds(
        &[threshold_row(105.0, 7.07), threshold_row(60.0, 14.14)],
        &spec,
    );
    assert_eq!(values, vec![105.0, 60.0]);
}

#[test]
fn multi_commodity_indicators_also_flatten_to_means() {
    let spec = spec(&["Import quantity"], Some(&["Urea", "Potash"]), "t");
    let values = select_thresholds(
        &[threshold_row(10.0, 1.0), threshold_row(20.0, 2.0)],
        &spec,
    );
    assert_eq!(values, vec![10.0, 20.0]);
}

#[test]
fn threshold_values_are_normalized_through_the_unit_prefix() {
    let spec = spec(&["Production"], None, "1000 tonnes");
    let values = select_thresholds(&[threshold_row(1.5, 0.5)], &spec);
    assert_eq!(values, vec![1000.0, 2000.0]);
}

#[test]
fn no_matching_rows_yield_an_empty_list() {
    let spec = spec(&["Production"], None, "t");
    assert!(select_thresholds(&[], &spec).is_empty());
}
