//! Monthly series assembly.
//!
//! Monthly records carry `YYYY-MM` periods. Records are sorted descending
//! by period before the fold so the first bucket encountered is the most
//! recent, and the latest month is still confirmed through the comparator
//! to stay correct under ties or gaps in the input.

use std::collections::BTreeMap;

use tracing::warn;

use crate::engine::change::percent_change;
use crate::engine::keys::resolve_key;
use crate::engine::period::{is_more_current_month, split_year_month};
use crate::engine::units::normalize_value;
use crate::models::{IndicatorSpec, MonthBucket, MonthlyAreaSeries, RawRecord};

/// Fold one area's monthly records into a [`MonthlyAreaSeries`].
pub fn build_monthly_area_series(
    area: String,
    records: &[RawRecord],
    spec: &IndicatorSpec,
) -> MonthlyAreaSeries {
    let mut sorted: Vec<&RawRecord> = records.iter().collect();
    sorted.sort_by(|a, b| b.period.cmp(&a.period));

    let mut latest: Option<String> = None;
    let mut buckets: BTreeMap<String, MonthBucket> = BTreeMap::new();

    for record in sorted {
        let Some((year, month)) = split_year_month(&record.period) else {
            warn!(
                area = %area,
                period = %record.period,
                "data quality: malformed year-month period, row skipped"
            );
            continue;
        };

        match latest.as_deref() {
            Some(tracked) if !is_more_current_month(tracked, &record.period) => {}
            _ => latest = Some(record.period.clone()),
        }

        let value = normalize_value(record.value, &spec.unit);
        let delta = normalize_value(record.period_delta, &spec.unit);

        let bucket = buckets
            .entry(record.period.clone())
            .or_insert_with(|| MonthBucket {
                year,
                month,
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
            "monthly_change",
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
                    period = %record.period,
                    dimension_value = %record.dimension_value,
                    commodity = record.commodity.as_deref().unwrap_or(""),
                    indicator = %spec.name,
                    "data quality: dimension value not in configured ordering, entry skipped"
                );
            }
        }
    }

    let (latest_year, latest_month) = match latest.as_deref().and_then(split_year_month) {
        Some((year, month)) => (Some(year), Some(month)),
        None => (None, None),
    };

    MonthlyAreaSeries {
        area,
        latest_year,
        latest_month,
        data: buckets.into_values().collect(),
    }
}
