//! Job types for the category recalculation workflow

use serde::{Deserialize, Serialize};

/// Job to recompute period-over-period deltas for a category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecomputeDeltasJob {
    pub category_id: String,
}

/// Job to recompute and replace a category's threshold tiers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeThresholdsJob {
    pub category_id: String,
}

/// Job to rebuild and replace a category's trend snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeTrendsJob {
    pub category_id: String,
}
