//! Unit tests for monthly series assembly

use indicatrix::engine::monthly::build_monthly_area_series;
use indicatrix::models::{
    Cadence, DimensionColumn, IndicatorSpec, RawRecord, ThresholdDisplay,
};

fn spec(items: &[&str], dimension_count: u8, unit: &str) -> IndicatorSpec {
    IndicatorSpec {
        name: "food price inflation".to_string(),
        unit: unit.to_string(),
        dimension_column: DimensionColumn::Element,
        items: items.iter().map(|s| s.to_string()).collect(),
        commodities: None,
        legends: Vec::new(),
        is_positive: false,
        dimension_count,
        threshold_display: ThresholdDisplay::Country,
        is_three_year_average: false,
        cadence: Cadence::Monthly,
    }
}

#[test]
fn latest_month_survives_unsorted_input() {
    let spec = spec(&["Consumer price index"], 1, "%");
    // February deliberately first, January later in the raw input
    let records = vec![
        RawRecord::new("Egypt", "Consumer price index", "2024-02", 112.0)
            .with_unit("%")
            .with_delta(2.0),
        RawRecord::new("Egypt", "Consumer price index", "2024-01", 110.0)
            .with_unit("%")
            .with_delta(1.5),
    ];
    let series = build_monthly_area_series("Egypt".to_string(), &records, &spec);

    assert_eq!(series.latest_year.as_deref(), Some("2024"));
    assert_eq!(series.latest_month.as_deref(), Some("February"));
}

#[test]
fn buckets_come_out_ascending_with_display_fields() {
    let spec = spec(&["Consumer price index"], 1, "%");
    let records = vec![
        RawRecord::new("Egypt", "Consumer price index", "2024-02", 112.0)
            .with_unit("%")
            .with_delta(2.0),
        RawRecord::new("Egypt", "Consumer price index", "2023-12", 108.0)
            .with_unit("%")
            .with_delta(0.8),
        RawRecord::new("Egypt", "Consumer price index", "2024-01", 110.0)
            .with_unit("%")
            .with_delta(1.5),
    ];
    let series = build_monthly_area_series("Egypt".to_string(), &records, &spec);

    let months: Vec<(&str, &str)> = series
        .data
        .iter()
        .map(|b| (b.year.as_str(), b.month.as_str()))
        .collect();
    assert_eq!(
        months,
        vec![("2023", "December"), ("2024", "January"), ("2024", "February")]
    );
}

#[test]
fn entries_use_the_monthly_change_prefix() {
    let spec = spec(&["Consumer price index"], 1, "%");
    let records = vec![RawRecord::new("Egypt", "Consumer price index", "2024-01", 110.0)
        .with_unit("%")
        .with_delta(1.5)];
    let series = build_monthly_area_series("Egypt".to_string(), &records, &spec);

    let bucket = &series.data[0];
    assert_eq!(bucket.entries.get("value"), Some(&Some(110.0)));
    // Percent unit: the stored delta is already the percentage change
    assert_eq!(bucket.entries.get("monthly_change"), Some(&Some(1.5)));
}

#[test]
fn commodity_dimension_keys_are_positional() {
    let mut spec = spec(&["Food price inflation"], 2, "%");
    spec.commodities = Some(vec!["Bread".to_string(), "Rice".to_string()]);
    let records = vec![
        RawRecord::new("Egypt", "Food price inflation", "2024-01", 12.0)
            .with_commodity("Rice")
            .with_unit("%")
            .with_delta(0.5),
    ];
    let series = build_monthly_area_series("Egypt".to_string(), &records, &spec);

    let bucket = &series.data[0];
    assert_eq!(bucket.entries.get("value1"), Some(&Some(12.0)));
    assert_eq!(bucket.entries.get("monthly_change1"), Some(&Some(0.5)));
}

#[test]
fn malformed_periods_are_skipped() {
    let spec = spec(&["Consumer price index"], 1, "%");
    let records = vec![
        RawRecord::new("Egypt", "Consumer price index", "2024", 1.0).with_unit("%"),
        RawRecord::new("Egypt", "Consumer price index", "2024-01", 110.0)
            .with_unit("%")
            .with_delta(1.5),
    ];
    let series = build_monthly_area_series("Egypt".to_string(), &records, &spec);

    assert_eq!(series.data.len(), 1);
    assert_eq!(series.latest_month.as_deref(), Some("January"));
}

#[test]
fn empty_input_yields_an_empty_series() {
    let spec = spec(&["Consumer price index"], 1, "%");
    let series = build_monthly_area_series("Egypt".to_string(), &[], &spec);
    assert!(series.data.is_empty());
    assert_eq!(series.latest_year, None);
    assert_eq!(series.latest_month, None);
}
