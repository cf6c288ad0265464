//! Yearly series assembly: fold one area's raw records into ordered period
//! buckets with normalized values, percentage changes and latest-period
//! tracking.

use std::collections::BTreeMap;

use tracing::warn;

use crate::engine::change::percent_change;
use crate::engine::keys::resolve_key;
use crate::engine::period::{bucket_is_forecast, is_more_current_year};
use crate::engine::units::normalize_value;
use crate::models::{AreaSeries, IndicatorSpec, PeriodBucket, RawRecord};

/// Group raw records by area, preserving input order within each area.
/// Areas share no state, so callers may process the groups concurrently.
pub fn group_by_area(records: Vec<RawRecord>) -> BTreeMap<String, Vec<RawRecord>> {
    let mut grouped: BTreeMap<String, Vec<RawRecord>> = BTreeMap::new();
    for record in records {
        grouped.entry(record.area.clone()).or_default().push(record);
    }
    grouped
}

/// Build every area's yearly series sequentially. The per-area fan-out
/// lives in the service layer; this is the deterministic core.
pub fn build_series(
    records: Vec<RawRecord>,
    spec: &IndicatorSpec,
    now_year: i32,
) -> Vec<AreaSeries> {
    group_by_area(records)
        .into_iter()
        .map(|(area, records)| build_area_series(area, &records, spec, now_year))
        .collect()
}

/// Fold one area's records into an [`AreaSeries`].
///
/// Buckets are keyed by absolute year, or by the three-year-average label
/// when the indicator aggregates over a window. The latest period advances
/// under the forecast-aware year comparator; the latest change percentage
/// is derived from the sum of dimension values in the latest bucket, so a
/// multi-dimension indicator reports the change of its total.
pub fn build_area_series(
    area: String,
    records: &[RawRecord],
    spec: &IndicatorSpec,
    now_year: i32,
) -> AreaSeries {
    let mut latest_period: Option<String> = None;
    let mut latest_delta: Option<f64> = None;
    let mut buckets: BTreeMap<String, PeriodBucket> = BTreeMap::new();

    for record in records {
        let bucket_key = bucket_key(record, spec);

        let value = normalize_value(record.value, &spec.unit);
        let delta = normalize_value(record.period_delta, &spec.unit);
        if value.is_none() {
            warn!(
                area = %area,
                period = %bucket_key,
                dimension_value = %record.dimension_value,
                "data quality: missing value after normalization"
            );
        }

        let supersedes = match latest_period.as_deref() {
            None => true,
            Some(tracked) => {
                is_more_current_year(tracked, &bucket_key, record.is_forecast, now_year)
            }
        };
        if supersedes {
            latest_period = Some(bucket_key.clone());
            latest_delta = delta;
        }

        let bucket = buckets.entry(bucket_key.clone()).or_insert_with(|| PeriodBucket {
            period: bucket_key.clone(),
            is_forecast: bucket_is_forecast(&bucket_key, now_year),
            entries: BTreeMap::new(),
        });

        let value_key = resolve_key(
            spec,
            &record.dimension_value,
            record.commodity.as_deref(),
            "value",
        );
        let change_key = resolve_key(
            spec,
            &record.dimension_value,
            record.commodity.as_deref(),
            "yearly_change",
        );
        match (value_key, change_key) {
            (Some(value_key), Some(change_key)) => {
                bucket.entries.insert(value_key, value);
                bucket
                    .entries
                    .insert(change_key, percent_change(delta, value, &spec.unit));
            }
            _ => {
                warn!(
                    area = %area,
                    period = %bucket_key,
                    dimension_value = %record.dimension_value,
                    commodity = record.commodity.as_deref().unwrap_or(""),
                    indicator = %spec.name,
                    "data quality: dimension value not in configured ordering, entry skipped"
                );
            }
        }
    }

    let latest_value = latest_period
        .as_ref()
        .and_then(|period| buckets.get(period))
        .map(|bucket| bucket_value_total(bucket));

    let latest_change = percent_change(latest_delta, latest_value, &spec.unit);
    let is_favorable_change = spec.is_positive == (latest_change.unwrap_or(0.0) > 0.0);

    AreaSeries {
        area,
        latest_period,
        latest_period_change: latest_change,
        is_favorable_change,
        data: buckets.into_values().collect(),
    }
}

fn bucket_key(record: &RawRecord, spec: &IndicatorSpec) -> String {
    if spec.is_three_year_average {
        record
            .period_label
            .clone()
            .unwrap_or_else(|| record.period.clone())
    } else {
        record.period.clone()
    }
}

/// Sum of the dimension `value*` entries of a bucket.
fn bucket_value_total(bucket: &PeriodBucket) -> f64 {
    bucket
        .entries
        .iter()
        .filter(|(key, _)| key.starts_with("value"))
        .filter_map(|(_, value)| *value)
        .sum()
}
