use serde::{Deserialize, Serialize};

/// Statistical tier a threshold row belongs to. Three tiers are always
/// computed together for a category; retrieval picks the right one by the
/// indicator's threshold display and dimension cardinality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThresholdScope {
    Area,
    AllAreas,
    AllItems,
}

impl ThresholdScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThresholdScope::Area => "AREA",
            ThresholdScope::AllAreas => "ALL_AREAS",
            ThresholdScope::AllItems => "ALL_ITEMS",
        }
    }

    pub fn parse(s: &str) -> ThresholdScope {
        match s {
            "ALL_AREAS" => ThresholdScope::AllAreas,
            "ALL_ITEMS" => ThresholdScope::AllItems,
            _ => ThresholdScope::Area,
        }
    }
}

/// Mean and standard deviation of `value` for one threshold grouping.
/// Sentinel area/commodity values mark the collapsed tiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdRow {
    pub category_id: String,
    pub scope: ThresholdScope,
    pub area: String,
    pub dimension_value: String,
    pub commodity: String,
    pub mean_value: f64,
    pub standard_deviation: f64,
}
