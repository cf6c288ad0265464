//! Three-tier anomaly threshold statistics.
//!
//! Every recalculation computes, from the same non-forecast population:
//! per-area statistics, all-areas statistics (area collapsed to a
//! sentinel), and all-items statistics (per-period sums per area and
//! dimension, with the commodity collapsed to a sentinel). Retrieval later
//! selects one tier by the indicator's threshold display and dimension
//! cardinality.

use std::collections::BTreeMap;

use tracing::warn;

use crate::models::{IndicatorSpec, Observation, ThresholdRow, ThresholdScope};

use crate::engine::units::{normalize_value, round2};

/// Sentinel area for the collapsed all-areas tier.
pub const ALL_AREAS: &str = "ALL AREAS";
/// Sentinel commodity for the collapsed all-items tier.
pub const ALL_ITEMS: &str = "ALL ITEMS";

/// Compute all three threshold tiers for a category from its raw
/// observations. Forecast rows and missing values never contribute.
pub fn compute_thresholds(category_id: &str, observations: &[Observation]) -> Vec<ThresholdRow> {
    let observed: Vec<&Observation> = observations
        .iter()
        .filter(|o| !o.is_forecast && o.value.is_some())
        .collect();

    let mut rows = Vec::new();
    rows.extend(per_area_tier(category_id, &observed));
    rows.extend(all_areas_tier(category_id, &observed));
    rows.extend(all_items_tier(category_id, &observed));
    rows
}

/// Mean/stddev per (area, dimension, commodity).
fn per_area_tier(category_id: &str, observed: &[&Observation]) -> Vec<ThresholdRow> {
    let mut groups: BTreeMap<(String, String, String), Vec<f64>> = BTreeMap::new();
    for observation in observed {
        let key = (
            observation.area.clone(),
            observation.dimension_value.clone(),
            observation.commodity.clone(),
        );
        groups.entry(key).or_default().extend(observation.value);
    }

    groups
        .into_iter()
        .map(|((area, dimension_value, commodity), values)| {
            threshold_row(
                category_id,
                ThresholdScope::Area,
                area,
                dimension_value,
                commodity,
                &values,
            )
        })
        .collect()
}

/// Mean/stddev per (dimension, commodity) across every area.
fn all_areas_tier(category_id: &str, observed: &[&Observation]) -> Vec<ThresholdRow> {
    let mut groups: BTreeMap<(String, String), Vec<f64>> = BTreeMap::new();
    for observation in observed {
        let key = (
            observation.dimension_value.clone(),
            observation.commodity.clone(),
        );
        groups.entry(key).or_default().extend(observation.value);
    }

    groups
        .into_iter()
        .map(|((dimension_value, commodity), values)| {
            threshold_row(
                category_id,
                ThresholdScope::AllAreas,
                ALL_AREAS.to_string(),
                dimension_value,
                commodity,
                &values,
            )
        })
        .collect()
}

/// Sum values per (area, dimension, period) first, then take mean/stddev of
/// those period sums per (area, dimension), with the commodity collapsed.
fn all_items_tier(category_id: &str, observed: &[&Observation]) -> Vec<ThresholdRow> {
    let mut period_sums: BTreeMap<(String, String, String), f64> = BTreeMap::new();
    for observation in observed {
        let key = (
            observation.area.clone(),
            observation.dimension_value.clone(),
            observation.period.clone(),
        );
        *period_sums.entry(key).or_insert(0.0) += observation.value.unwrap_or(0.0);
    }

    let mut groups: BTreeMap<(String, String), Vec<f64>> = BTreeMap::new();
    for ((area, dimension_value, _period), sum) in period_sums {
        groups.entry((area, dimension_value)).or_default().push(sum);
    }

    groups
        .into_iter()
        .map(|((area, dimension_value), sums)| {
            threshold_row(
                category_id,
                ThresholdScope::AllItems,
                area,
                dimension_value,
                ALL_ITEMS.to_string(),
                &sums,
            )
        })
        .collect()
}

fn threshold_row(
    category_id: &str,
    scope: ThresholdScope,
    area: String,
    dimension_value: String,
    commodity: String,
    values: &[f64],
) -> ThresholdRow {
    let (mean, stddev) = mean_stddev(values);
    ThresholdRow {
        category_id: category_id.to_string(),
        scope,
        area,
        dimension_value,
        commodity,
        mean_value: round2(mean),
        standard_deviation: round2(stddev),
    }
}

/// Sample mean and standard deviation; fewer than two observations yield a
/// deviation of 0.
fn mean_stddev(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (mean, 0.0);
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, variance.sqrt())
}

/// Shape fetched threshold rows into the flat per-area list consumed by
/// indicator responses and alerts.
///
/// Indicators covering more than one item or commodity get one rounded
/// mean per matched row; single-dimension indicators get an anomaly band
/// `[|mean - stddev|, mean + stddev]`, flattened into two consecutive
/// entries. No matching rows yield an empty list, not an error.
pub fn select_thresholds(rows: &[ThresholdRow], spec: &IndicatorSpec) -> Vec<f64> {
    let multi_valued = spec.items.len() > 1
        || spec
            .commodities
            .as_ref()
            .is_some_and(|commodities| commodities.len() > 1);

    let mut out = Vec::new();
    for row in rows {
        let mean = normalize_value(Some(row.mean_value), &spec.unit);
        let stddev = normalize_value(Some(row.standard_deviation), &spec.unit);
        let (Some(mean), Some(stddev)) = (mean, stddev) else {
            warn!(
                area = %row.area,
                dimension_value = %row.dimension_value,
                indicator = %spec.name,
                "data quality: non-finite threshold statistics, row skipped"
            );
            continue;
        };

        if multi_valued {
            out.push(round2(mean));
        } else {
            out.push(round2(mean - stddev).abs());
            out.push(round2(mean + stddev));
        }
    }
    out
}
