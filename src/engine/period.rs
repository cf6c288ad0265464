//! Period comparison and range helpers for yearly and monthly cadences.
//!
//! Periods are strings throughout: four-digit years, `YYYY-MM` year-months,
//! or three-year-average labels like `2018-2020`. Zero-padded digit strings
//! compare correctly lexicographically, which both comparators rely on.

use chrono::{Datelike, Utc};

/// Sort direction requested for a period window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Present calendar year, injected into the comparators by callers so the
/// engine stays deterministic under test.
pub fn current_year() -> i32 {
    Utc::now().year()
}

/// Whether a candidate yearly period supersedes the tracked latest one.
///
/// The current calendar year is always considered current, forecast or not.
/// A later year only supersedes when the candidate is an observed (not
/// forecast) row, so a projection never claims "latest".
pub fn is_more_current_year(
    tracked: &str,
    candidate: &str,
    candidate_is_forecast: bool,
    now_year: i32,
) -> bool {
    candidate.parse::<i32>() == Ok(now_year) || (candidate > tracked && !candidate_is_forecast)
}

/// Whether a candidate `YYYY-MM` period supersedes the tracked one.
pub fn is_more_current_month(tracked: &str, candidate: &str) -> bool {
    candidate > tracked
}

/// Year strings from `from_year` through the current year plus the forecast
/// horizon, ascending or descending.
pub fn year_range(
    from_year: i32,
    forecast_horizon: i32,
    sort: SortDirection,
    now_year: i32,
) -> Vec<String> {
    let end_year = now_year + forecast_horizon;
    let mut years: Vec<String> = (from_year..=end_year).map(|y| y.to_string()).collect();
    if sort == SortDirection::Descending {
        years.reverse();
    }
    years
}

/// Whether a period bucket represents a forecast slot: its leading year is
/// the current calendar year or later. Labels with no parseable leading
/// year (nothing in the data today) are treated as historical.
pub fn bucket_is_forecast(period: &str, now_year: i32) -> bool {
    leading_year(period).is_some_and(|y| y >= now_year)
}

/// Parse the leading four-digit year of a period string or label.
pub fn leading_year(period: &str) -> Option<i32> {
    if period.len() < 4 {
        return None;
    }
    period.get(..4)?.parse().ok()
}

/// Split a `YYYY-MM` period into its year and full English month name.
pub fn split_year_month(year_month: &str) -> Option<(String, String)> {
    let (year, month) = year_month.split_once('-')?;
    let month_index: usize = month.parse().ok()?;
    if !(1..=12).contains(&month_index) {
        return None;
    }
    Some((year.to_string(), MONTH_NAMES[month_index - 1].to_string()))
}
