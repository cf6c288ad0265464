use serde::{Deserialize, Serialize};

/// One aggregated observation row as returned by the row store for an
/// indicator query.
///
/// `dimension_value` holds the value of whichever raw column the indicator
/// is keyed on; `commodity` holds the secondary dimension value when the
/// indicator has one. `period` is an absolute year, or `YYYY-MM` for
/// monthly rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRecord {
    pub area: String,
    pub dimension_value: String,
    pub commodity: Option<String>,
    pub period: String,
    /// Display label used instead of the absolute year for
    /// three-year-average series (e.g. "2018-2020").
    pub period_label: Option<String>,
    pub is_forecast: bool,
    pub value: Option<f64>,
    pub unit: String,
    /// Precomputed period-over-period delta, in the stored (unscaled) unit.
    pub period_delta: Option<f64>,
}

impl RawRecord {
    pub fn new(area: &str, dimension_value: &str, period: &str, value: f64) -> Self {
        Self {
            area: area.to_string(),
            dimension_value: dimension_value.to_string(),
            commodity: None,
            period: period.to_string(),
            period_label: None,
            is_forecast: false,
            value: Some(value),
            unit: String::new(),
            period_delta: None,
        }
    }

    pub fn with_commodity(mut self, commodity: &str) -> Self {
        self.commodity = Some(commodity.to_string());
        self
    }

    pub fn with_period_label(mut self, label: &str) -> Self {
        self.period_label = Some(label.to_string());
        self
    }

    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = unit.to_string();
        self
    }

    pub fn with_delta(mut self, delta: f64) -> Self {
        self.period_delta = Some(delta);
        self
    }

    pub fn with_forecast(mut self, is_forecast: bool) -> Self {
        self.is_forecast = is_forecast;
        self
    }
}

/// One stored observation in its raw, pre-aggregation form. This is the
/// population the threshold calculator works from: both dimension columns
/// are present, independent of any indicator's keying.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    pub area: String,
    /// Primary (element-like) dimension column value.
    pub dimension_value: String,
    /// Secondary (item-like) dimension column value.
    pub commodity: String,
    pub period: String,
    pub is_forecast: bool,
    pub value: Option<f64>,
}

impl Observation {
    pub fn new(area: &str, dimension_value: &str, commodity: &str, period: &str, value: f64) -> Self {
        Self {
            area: area.to_string(),
            dimension_value: dimension_value.to_string(),
            commodity: commodity.to_string(),
            period: period.to_string(),
            is_forecast: false,
            value: Some(value),
        }
    }

    pub fn with_forecast(mut self, is_forecast: bool) -> Self {
        self.is_forecast = is_forecast;
        self
    }
}
