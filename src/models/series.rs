use std::collections::BTreeMap;

use serde::Serialize;

/// One period bucket of a yearly series. Dimension entries are keyed
/// `value{i}` / `yearly_change{i}` (bare `value` / `yearly_change` for
/// single-dimension indicators) and flattened into the serialized object
/// alongside the period fields.
#[derive(Debug, Clone, Serialize)]
pub struct PeriodBucket {
    #[serde(rename = "year")]
    pub period: String,
    #[serde(rename = "isForecast")]
    pub is_forecast: bool,
    #[serde(flatten)]
    pub entries: BTreeMap<String, Option<f64>>,
}

/// One area's yearly time series, ordered ascending by period.
#[derive(Debug, Clone, Serialize)]
pub struct AreaSeries {
    pub area: String,
    #[serde(rename = "latestYear")]
    pub latest_period: Option<String>,
    #[serde(rename = "latestYearChange")]
    pub latest_period_change: Option<f64>,
    #[serde(rename = "isGreen")]
    pub is_favorable_change: bool,
    pub data: Vec<PeriodBucket>,
}

/// One month bucket of a monthly series. Entries are keyed `value{i}` /
/// `monthly_change{i}`.
#[derive(Debug, Clone, Serialize)]
pub struct MonthBucket {
    pub year: String,
    /// Full English month name ("January", ...).
    pub month: String,
    #[serde(flatten)]
    pub entries: BTreeMap<String, Option<f64>>,
}

/// One area's monthly time series, ordered ascending by year-month.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyAreaSeries {
    pub area: String,
    #[serde(rename = "latestYear")]
    pub latest_year: Option<String>,
    #[serde(rename = "latestMonth")]
    pub latest_month: Option<String>,
    pub data: Vec<MonthBucket>,
}
