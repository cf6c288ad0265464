//! Positional key suffixes for multi-dimensional series entries.

use crate::models::IndicatorSpec;

/// Resolve the output key for one dimension entry.
///
/// Single-dimension indicators use the bare prefix (`value`,
/// `yearly_change`). Multi-dimension indicators append the positional index
/// of the raw value within the driving dimension list - `commodities` when
/// it is at least as long as `items`, `items` otherwise.
///
/// Returns `None` when the raw value is absent from the configured
/// ordering; callers log that as a data-quality problem and skip the entry
/// rather than writing under a colliding key.
pub fn resolve_key(
    spec: &IndicatorSpec,
    dimension_value: &str,
    commodity: Option<&str>,
    prefix: &str,
) -> Option<String> {
    if spec.dimension_count <= 1 {
        return Some(prefix.to_string());
    }

    let commodities = spec.commodities.as_deref().unwrap_or(&[]);
    let (list, needle) = if commodities.len() >= spec.items.len() {
        (commodities, commodity.unwrap_or(""))
    } else {
        (spec.items.as_slice(), dimension_value)
    };

    index_of_ignore_case(list, needle).map(|index| format!("{}{}", prefix, index))
}

fn index_of_ignore_case(list: &[String], needle: &str) -> Option<usize> {
    list.iter().position(|entry| entry.eq_ignore_ascii_case(needle))
}
