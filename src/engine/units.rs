//! Unit-string normalization.
//!
//! Stored unit strings follow a prefix convention: a leading `-` marks a
//! display sign-flip (value unchanged), while `1000`, `million` and `100`
//! scale the stored value up to its display magnitude. The prefix is
//! stripped from the unit label shown to consumers.

/// Scaling prefix recognized at the head of a unit string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnitPrefix {
    SignFlip,
    Thousand,
    Million,
    Hundred,
}

impl UnitPrefix {
    fn token_len(&self) -> usize {
        match self {
            UnitPrefix::SignFlip => 1,
            UnitPrefix::Thousand => 4,
            UnitPrefix::Million => 7,
            UnitPrefix::Hundred => 3,
        }
    }
}

/// `1000` must be tried before `100`; both before the bare fallback.
fn match_prefix(unit: &str) -> Option<UnitPrefix> {
    let lower = unit.to_lowercase();
    if lower.starts_with('-') {
        Some(UnitPrefix::SignFlip)
    } else if lower.starts_with("1000") {
        Some(UnitPrefix::Thousand)
    } else if lower.starts_with("million") {
        Some(UnitPrefix::Million)
    } else if lower.starts_with("100") {
        Some(UnitPrefix::Hundred)
    } else {
        None
    }
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Scale a stored raw value to its display magnitude per the unit prefix,
/// rounded to two decimals. Missing or non-finite raws normalize to `None`.
pub fn normalize_value(raw: Option<f64>, unit: &str) -> Option<f64> {
    let raw = raw?;
    if !raw.is_finite() {
        return None;
    }
    let scaled = match match_prefix(unit) {
        Some(UnitPrefix::Thousand) => raw * 1_000.0,
        Some(UnitPrefix::Million) => raw * 1_000_000.0,
        Some(UnitPrefix::Hundred) => raw * 100.0,
        // Sign-flip only affects the label; no scaling either way.
        Some(UnitPrefix::SignFlip) | None => raw,
    };
    Some(round2(scaled))
}

/// Strip the matched scaling prefix from a unit string for display.
/// Unit strings without a recognized prefix pass through unchanged.
pub fn display_unit(unit: &str) -> String {
    match match_prefix(unit) {
        Some(prefix) => unit[prefix.token_len()..].trim().to_string(),
        None => unit.to_string(),
    }
}
