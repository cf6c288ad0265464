//! Unit tests for yearly series assembly

use indicatrix::engine::series::{build_area_series, build_series, group_by_area};
use indicatrix::models::{
    Cadence, DimensionColumn, IndicatorSpec, RawRecord, ThresholdDisplay,
};

const NOW_YEAR: i32 = 2024;

fn spec(items: &[&str], dimension_count: u8, unit: &str) -> IndicatorSpec {
    IndicatorSpec {
        name: "cereal production".to_string(),
        unit: unit.to_string(),
        dimension_column: DimensionColumn::Element,
        items: items.iter().map(|s| s.to_string()).collect(),
        commodities: None,
        legends: Vec::new(),
        is_positive: true,
        dimension_count,
        threshold_display: ThresholdDisplay::Country,
        is_three_year_average: false,
        cadence: Cadence::Yearly,
    }
}

fn egypt_wheat_records() -> Vec<RawRecord> {
    vec![
        RawRecord::new("Egypt", "Wheat", "2018", 100.0)
            .with_unit("t")
            .with_delta(0.0),
        RawRecord::new("Egypt", "Wheat", "2019", 110.0)
            .with_unit("t")
            .with_delta(10.0),
        RawRecord::new("Egypt", "Wheat", "2020", 90.0)
            .with_unit("t")
            .with_delta(-20.0),
    ]
}

#[test]
fn three_yearly_rows_build_a_three_bucket_series() {
    let spec = spec(&["Wheat"], 1, "t");
    let series = build_area_series("Egypt".to_string(), &egypt_wheat_records(), &spec, NOW_YEAR);

    assert_eq!(series.area, "Egypt");
    assert_eq!(series.data.len(), 3);
    assert_eq!(series.latest_period.as_deref(), Some("2020"));

    let bucket_2020 = &series.data[2];
    assert_eq!(bucket_2020.period, "2020");
    assert!(!bucket_2020.is_forecast);
    assert_eq!(bucket_2020.entries.get("value"), Some(&Some(90.0)));
    // round(-20 / |90 - (-20)| * 100, 2)
    assert_eq!(bucket_2020.entries.get("yearly_change"), Some(&Some(-18.18)));

    assert_eq!(series.latest_period_change, Some(-18.18));
    // An unfavorable drop for a positive indicator
    assert!(!series.is_favorable_change);
}

#[test]
fn buckets_come_out_ascending_by_period() {
    let spec = spec(&["Wheat"], 1, "t");
    let mut records = egypt_wheat_records();
    records.reverse();
    let series = build_area_series("Egypt".to_string(), &records, &spec, NOW_YEAR);

    let periods: Vec<&str> = series.data.iter().map(|b| b.period.as_str()).collect();
    assert_eq!(periods, vec!["2018", "2019", "2020"]);
}

#[test]
fn future_forecast_rows_never_claim_latest() {
    let spec = spec(&["Wheat"], 1, "t");
    let mut records = egypt_wheat_records();
    records.push(
        RawRecord::new("Egypt", "Wheat", "2026", 120.0)
            .with_unit("t")
            .with_delta(30.0)
            .with_forecast(true),
    );
    let series = build_area_series("Egypt".to_string(), &records, &spec, NOW_YEAR);

    assert_eq!(series.latest_period.as_deref(), Some("2020"));
    // The forecast bucket itself is still present and flagged
    let forecast_bucket = series.data.iter().find(|b| b.period == "2026").unwrap();
    assert!(forecast_bucket.is_forecast);
}

#[test]
fn current_year_forecast_rows_do_claim_latest() {
    let spec = spec(&["Wheat"], 1, "t");
    let mut records = egypt_wheat_records();
    records.push(
        RawRecord::new("Egypt", "Wheat", "2024", 95.0)
            .with_unit("t")
            .with_delta(5.0)
            .with_forecast(true),
    );
    let series = build_area_series("Egypt".to_string(), &records, &spec, NOW_YEAR);

    assert_eq!(series.latest_period.as_deref(), Some("2024"));
    assert_eq!(series.latest_period_change, Some(5.56)); // round(5 / 90 * 100, 2)
    assert!(series.is_favorable_change);
}

#[test]
fn multi_dimension_rows_land_under_positional_keys() {
    let spec = spec(&["Wheat", "Rice"], 2, "t");
    let records = vec![
        RawRecord::new("Egypt", "Wheat", "2020", 100.0)
            .with_unit("t")
            .with_delta(10.0),
        RawRecord::new("Egypt", "Rice", "2020", 50.0)
            .with_unit("t")
            .with_delta(5.0),
    ];
    let series = build_area_series("Egypt".to_string(), &records, &spec, NOW_YEAR);

    assert_eq!(series.data.len(), 1);
    let bucket = &series.data[0];
    assert_eq!(bucket.entries.get("value0"), Some(&Some(100.0)));
    assert_eq!(bucket.entries.get("value1"), Some(&Some(50.0)));
    assert!(bucket.entries.contains_key("yearly_change0"));
    assert!(bucket.entries.contains_key("yearly_change1"));

    // Latest change runs against the bucket total: round(10 / |150 - 10| * 100, 2)
    assert_eq!(series.latest_period_change, Some(7.14));
}

#[test]
fn unmatched_dimension_values_are_skipped_not_miskeyed() {
    let spec = spec(&["Wheat", "Rice"], 2, "t");
    let records = vec![
        RawRecord::new("Egypt", "Wheat", "2020", 100.0)
            .with_unit("t")
            .with_delta(10.0),
        RawRecord::new("Egypt", "Maize", "2020", 77.0)
            .with_unit("t")
            .with_delta(7.0),
    ];
    let series = build_area_series("Egypt".to_string(), &records, &spec, NOW_YEAR);

    let bucket = &series.data[0];
    assert_eq!(bucket.entries.get("value0"), Some(&Some(100.0)));
    // No "value" / "value2" / bare-suffix collision for the stray row
    assert_eq!(bucket.entries.len(), 2);
}

#[test]
fn three_year_average_series_bucket_by_label() {
    let mut spec = spec(&["Prevalence of undernourishment"], 1, "%");
    spec.is_three_year_average = true;
    let records = vec![
        RawRecord::new("Egypt", "Prevalence of undernourishment", "2020", 5.5)
            .with_unit("%")
            .with_period_label("2018-2020")
            .with_delta(0.3),
    ];
    let series = build_area_series("Egypt".to_string(), &records, &spec, NOW_YEAR);

    assert_eq!(series.data[0].period, "2018-2020");
    assert_eq!(series.latest_period.as_deref(), Some("2018-2020"));
    // Percent unit: the delta passes through as the change
    assert_eq!(series.data[0].entries.get("yearly_change"), Some(&Some(0.3)));
}

#[test]
fn grouping_splits_records_per_area() {
    let records = vec![
        RawRecord::new("Egypt", "Wheat", "2020", 1.0),
        RawRecord::new("Jordan", "Wheat", "2020", 2.0),
        RawRecord::new("Egypt", "Wheat", "2021", 3.0),
    ];
    let grouped = group_by_area(records);
    assert_eq!(grouped.len(), 2);
    assert_eq!(grouped["Egypt"].len(), 2);
    assert_eq!(grouped["Jordan"].len(), 1);
}

#[test]
fn build_series_returns_one_series_per_area() {
    let spec = spec(&["Wheat"], 1, "t");
    let records = vec![
        RawRecord::new("Egypt", "Wheat", "2020", 1.0).with_unit("t"),
        RawRecord::new("Jordan", "Wheat", "2020", 2.0).with_unit("t"),
    ];
    let series = build_series(records, &spec, NOW_YEAR);
    assert_eq!(series.len(), 2);
}
