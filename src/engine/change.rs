//! Percentage change of a value against its prior period.

use crate::engine::units::round2;

/// Units that already express a percentage: a percentage-point delta is the
/// percentage change, not something to re-derive.
pub fn is_percent_unit(unit: &str) -> bool {
    unit == "%" || unit.to_lowercase().contains("percent") || unit.contains('%')
}

/// Percent-of-prior-value change.
///
/// `current - delta` recovers the prior-period value without it being
/// stored explicitly. A zero or undefined prior yields 0 rather than an
/// error - that is a property of the data, not of the code.
pub fn percent_change(delta: Option<f64>, current: Option<f64>, unit: &str) -> Option<f64> {
    if is_percent_unit(unit) {
        return delta;
    }
    let delta = delta.unwrap_or(0.0);
    let current = current.unwrap_or(0.0);
    let prior = (current - delta).abs();
    if prior == 0.0 {
        return Some(0.0);
    }
    let pct = delta / prior * 100.0;
    if pct.is_finite() {
        Some(round2(pct))
    } else {
        Some(0.0)
    }
}
