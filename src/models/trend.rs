use serde::{Deserialize, Serialize};

/// One persisted trend snapshot row: the per-(category, area, period)
/// denormalized record backing fast trend lookups.
///
/// The full row set for a category is deleted and regenerated on every
/// recalculation run; `latest_period` and `latest_period_change_percent`
/// are back-filled onto every row of an area.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendRow {
    pub category_id: String,
    pub area: String,
    pub period: String,
    pub value: f64,
    pub period_delta: f64,
    pub period_delta_percent: f64,
    pub latest_period: String,
    pub latest_period_change_percent: f64,
    pub is_positive: bool,
}
