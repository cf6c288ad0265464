//! Unit tests for trend snapshot assembly

use indicatrix::engine::trend::build_trend_rows;
use indicatrix::models::{
    Cadence, DimensionColumn, IndicatorSpec, RawRecord, ThresholdDisplay,
};

const NOW_YEAR: i32 = 2024;

fn spec(unit: &str, is_positive: bool) -> IndicatorSpec {
    IndicatorSpec {
        name: "cereal production".to_string(),
        unit: unit.to_string(),
        dimension_column: DimensionColumn::Element,
        items: vec!["Production".to_string()],
        commodities: None,
        legends: Vec::new(),
        is_positive,
        dimension_count: 1,
        threshold_display: ThresholdDisplay::Country,
        is_three_year_average: false,
        cadence: Cadence::Yearly,
    }
}

fn egypt_records() -> Vec<RawRecord> {
    vec![
        RawRecord::new("Egypt", "Production", "2018", 100.0)
            .with_unit("t")
            .with_delta(0.0),
        RawRecord::new("Egypt", "Production", "2019", 110.0)
            .with_unit("t")
            .with_delta(10.0),
        RawRecord::new("Egypt", "Production", "2020", 90.0)
            .with_unit("t")
            .with_delta(-20.0),
    ]
}

#[test]
fn one_row_per_period_ascending() {
    let spec = spec("t", true);
    let rows = build_trend_rows("PRODUCTION_TRADE", egypt_records(), &spec, Cadence::Yearly, NOW_YEAR);

    assert_eq!(rows.len(), 3);
    let periods: Vec<&str> = rows.iter().map(|r| r.period.as_str()).collect();
    assert_eq!(periods, vec!["2018", "2019", "2020"]);

    let row_2019 = &rows[1];
    assert_eq!(row_2019.category_id, "PRODUCTION_TRADE");
    assert_eq!(row_2019.value, 110.0);
    assert_eq!(row_2019.period_delta, 10.0);
    assert_eq!(row_2019.period_delta_percent, 10.0);
}

#[test]
fn latest_period_is_back_filled_onto_every_row() {
    let spec = spec("t", true);
    let rows = build_trend_rows("PRODUCTION_TRADE", egypt_records(), &spec, Cadence::Yearly, NOW_YEAR);

    for row in &rows {
        assert_eq!(row.latest_period, "2020");
        assert_eq!(row.latest_period_change_percent, -18.18);
        assert!(row.is_positive);
    }
}

#[test]
fn forecast_years_do_not_steal_latest() {
    let spec = spec("t", true);
    let mut records = egypt_records();
    records.push(
        RawRecord::new("Egypt", "Production", "2026", 130.0)
            .with_unit("t")
            .with_delta(40.0)
            .with_forecast(true),
    );
    let rows = build_trend_rows("PRODUCTION_TRADE", records, &spec, Cadence::Yearly, NOW_YEAR);

    assert_eq!(rows.len(), 4);
    for row in &rows {
        assert_eq!(row.latest_period, "2020");
    }
}

#[test]
fn monthly_cadence_tracks_latest_lexicographically() {
    let spec = spec("%", false);
    let records = vec![
        RawRecord::new("Egypt", "Consumer price index", "2024-02", 112.0)
            .with_unit("%")
            .with_delta(2.0),
        RawRecord::new("Egypt", "Consumer price index", "2024-01", 110.0)
            .with_unit("%")
            .with_delta(1.5),
    ];
    let rows = build_trend_rows("FOOD_PRICE", records, &spec, Cadence::Monthly, NOW_YEAR);

    assert_eq!(rows.len(), 2);
    for row in &rows {
        assert_eq!(row.latest_period, "2024-02");
        assert_eq!(row.latest_period_change_percent, 2.0);
        assert!(!row.is_positive);
    }
}

#[test]
fn areas_are_back_filled_independently() {
    let spec = spec("t", true);
    let mut records = egypt_records();
    records.push(
        RawRecord::new("Jordan", "Production", "2019", 40.0)
            .with_unit("t")
            .with_delta(4.0),
    );
    let rows = build_trend_rows("PRODUCTION_TRADE", records, &spec, Cadence::Yearly, NOW_YEAR);

    let jordan: Vec<_> = rows.iter().filter(|r| r.area == "Jordan").collect();
    assert_eq!(jordan.len(), 1);
    assert_eq!(jordan[0].latest_period, "2019");
    // round(4 / |40 - 4| * 100, 2)
    assert_eq!(jordan[0].latest_period_change_percent, 11.11);

    let egypt: Vec<_> = rows.iter().filter(|r| r.area == "Egypt").collect();
    assert!(egypt.iter().all(|r| r.latest_period == "2020"));
}

#[test]
fn rows_without_values_are_skipped() {
    let spec = spec("t", true);
    let mut record = RawRecord::new("Egypt", "Production", "2020", 0.0).with_unit("t");
    record.value = None;
    let rows = build_trend_rows("PRODUCTION_TRADE", vec![record], &spec, Cadence::Yearly, NOW_YEAR);
    assert!(rows.is_empty());
}

#[test]
fn trend_values_are_normalized_before_persisting() {
    let spec = spec("1000 tonnes", true);
    let records = vec![RawRecord::new("Egypt", "Production", "2020", 1.5)
        .with_unit("1000 tonnes")
        .with_delta(0.5)];
    let rows = build_trend_rows("PRODUCTION_TRADE", records, &spec, Cadence::Yearly, NOW_YEAR);

    assert_eq!(rows[0].value, 1500.0);
    assert_eq!(rows[0].period_delta, 500.0);
    // round(500 / |1500 - 500| * 100, 2)
    assert_eq!(rows[0].period_delta_percent, 50.0);
}
