use serde::{Deserialize, Serialize};

use crate::engine::error::EngineError;

/// Raw attribute an indicator is keyed on. The observation store carries
/// both columns on every row; an indicator reads one of them as its
/// dimension and the other as its commodity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DimensionColumn {
    Element,
    Item,
}

impl DimensionColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            DimensionColumn::Element => "element",
            DimensionColumn::Item => "item",
        }
    }

    /// The other raw column, used as the secondary (commodity) dimension.
    pub fn other(&self) -> DimensionColumn {
        match self {
            DimensionColumn::Element => DimensionColumn::Item,
            DimensionColumn::Item => DimensionColumn::Element,
        }
    }

    pub fn parse(s: &str) -> Option<DimensionColumn> {
        match s.to_lowercase().as_str() {
            "element" => Some(DimensionColumn::Element),
            "item" => Some(DimensionColumn::Item),
            _ => None,
        }
    }
}

/// Whether thresholds are shown per country or once across all areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThresholdDisplay {
    All,
    Country,
}

impl ThresholdDisplay {
    pub fn parse(s: &str) -> ThresholdDisplay {
        if s.eq_ignore_ascii_case("all") {
            ThresholdDisplay::All
        } else {
            ThresholdDisplay::Country
        }
    }
}

/// Period granularity of a category or indicator, resolved once at metadata
/// load instead of re-matching category names per row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    Yearly,
    Monthly,
}

impl Cadence {
    pub fn parse(s: &str) -> Cadence {
        if s.eq_ignore_ascii_case("monthly") {
            Cadence::Monthly
        } else {
            Cadence::Yearly
        }
    }
}

/// Configured shape of one indicator: which column it is keyed on, which
/// dimension values it covers, and how its output is displayed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorSpec {
    pub name: String,
    pub unit: String,
    pub dimension_column: DimensionColumn,
    /// Primary dimension values of interest; ordering defines positional
    /// key suffixes in multi-dimensional series.
    pub items: Vec<String>,
    pub commodities: Option<Vec<String>>,
    pub legends: Vec<String>,
    pub is_positive: bool,
    pub dimension_count: u8,
    pub threshold_display: ThresholdDisplay,
    pub is_three_year_average: bool,
    pub cadence: Cadence,
}

impl IndicatorSpec {
    /// An indicator with no dimension values has undefined filter semantics.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.items.is_empty() {
            return Err(EngineError::EmptyItems(self.name.clone()));
        }
        Ok(())
    }

    /// Labels shown to chart consumers: configured legends when present,
    /// otherwise the raw dimension values.
    pub fn display_items(&self) -> &[String] {
        if self.legends.is_empty() {
            &self.items
        } else {
            &self.legends
        }
    }

    pub fn has_commodities(&self) -> bool {
        self.commodities.as_ref().is_some_and(|c| !c.is_empty())
    }
}

/// Configured shape of one category, including the indicator that drives its
/// trend snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySpec {
    pub id: String,
    pub display_name: String,
    pub default_unit: String,
    pub default_column: DimensionColumn,
    pub trend_indicator: String,
    /// Secondary-dimension constraint applied when building the monthly
    /// trend snapshot.
    pub trend_commodity: Option<String>,
    pub cadence: Cadence,
}
