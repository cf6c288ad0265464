//! Trend snapshot assembly.
//!
//! Consumes the full series of a category's designated trend indicator and
//! produces the persistable per-(category, area, period) rows, with the
//! area's latest period and its change percentage back-filled onto every
//! row. The caller replaces the category's previous snapshot wholesale;
//! nothing here is incremental.

use std::collections::BTreeMap;

use tracing::warn;

use crate::engine::change::percent_change;
use crate::engine::period::{is_more_current_month, is_more_current_year};
use crate::engine::series::group_by_area;
use crate::engine::units::{normalize_value, round2};
use crate::models::{Cadence, IndicatorSpec, RawRecord, TrendRow};

/// Build the full trend row set for a category from its trend indicator's
/// records. Rows come out grouped by area, ascending by period within each
/// area.
pub fn build_trend_rows(
    category_id: &str,
    records: Vec<RawRecord>,
    spec: &IndicatorSpec,
    cadence: Cadence,
    now_year: i32,
) -> Vec<TrendRow> {
    let mut rows = Vec::new();
    for (area, records) in group_by_area(records) {
        rows.extend(build_area_trend_rows(
            category_id,
            &area,
            records,
            spec,
            cadence,
            now_year,
        ));
    }
    rows
}

fn build_area_trend_rows(
    category_id: &str,
    area: &str,
    mut records: Vec<RawRecord>,
    spec: &IndicatorSpec,
    cadence: Cadence,
    now_year: i32,
) -> Vec<TrendRow> {
    records.sort_by(|a, b| a.period.cmp(&b.period));

    let mut latest_period: Option<String> = None;
    let mut latest_change_percent = 0.0;
    // BTreeMap keyed by period: one snapshot row per (area, period), the
    // later record winning if the store ever hands back duplicates.
    let mut by_period: BTreeMap<String, TrendRow> = BTreeMap::new();

    for record in &records {
        let value = normalize_value(record.value, &spec.unit);
        let delta = normalize_value(record.period_delta, &spec.unit);
        let Some(value) = value else {
            warn!(
                area = %area,
                period = %record.period,
                category = %category_id,
                "data quality: missing value after normalization, trend row skipped"
            );
            continue;
        };

        let change_percent = percent_change(delta, Some(value), &spec.unit).unwrap_or(0.0);

        let supersedes = match (latest_period.as_deref(), cadence) {
            (None, _) => true,
            (Some(tracked), Cadence::Monthly) => is_more_current_month(tracked, &record.period),
            (Some(tracked), Cadence::Yearly) => {
                is_more_current_year(tracked, &record.period, record.is_forecast, now_year)
            }
        };
        if supersedes {
            latest_period = Some(record.period.clone());
            latest_change_percent = change_percent;
        }

        by_period.insert(
            record.period.clone(),
            TrendRow {
                category_id: category_id.to_string(),
                area: area.to_string(),
                period: record.period.clone(),
                value: round2(value),
                period_delta: delta.unwrap_or(0.0),
                period_delta_percent: round2(change_percent),
                // Back-filled below once the area's fold is complete.
                latest_period: String::new(),
                latest_period_change_percent: 0.0,
                is_positive: spec.is_positive,
            },
        );
    }

    let Some(latest_period) = latest_period else {
        return Vec::new();
    };

    by_period
        .into_values()
        .map(|mut row| {
            row.latest_period = latest_period.clone();
            row.latest_period_change_percent = round2(latest_change_percent);
            row
        })
        .collect()
}
