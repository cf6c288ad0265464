//! Storage collaborators: the `DataStore` boundary the engine computes
//! against, and its PostgreSQL implementation.

pub mod postgres;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::engine::query::{RowQuery, ThresholdQuery};
use crate::models::{Cadence, Observation, RawRecord, ThresholdRow, TrendRow};

pub use postgres::PostgresStore;

/// Boundary error type: storage failures propagate to the caller as-is, the
/// engine applies no retry policy of its own.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Raw category metadata row, before defaults are applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub id: String,
    pub display_name: String,
    pub unit: String,
    pub column_name: String,
    pub trend_indicator: String,
    pub trend_commodity: Option<String>,
    pub cadence: String,
}

/// Raw indicator metadata row; optional fields fall back to the category's
/// defaults when the spec is resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorRecord {
    pub name: String,
    pub unit: Option<String>,
    pub column_name: Option<String>,
    pub items: Option<Vec<String>>,
    pub commodities: Option<Vec<String>>,
    pub legends: Option<Vec<String>>,
    pub is_positive: bool,
    pub dimension_count: i32,
    pub threshold_display: Option<String>,
    pub is_three_year_average: bool,
    pub cadence: Option<String>,
}

/// Row, threshold, trend and metadata persistence behind the engine.
///
/// `replace_*` operations delete the category's previous rows and insert
/// the new set within one transaction, so the swap is atomic from the
/// caller's perspective.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Fetch aggregated indicator rows matching a declarative predicate.
    async fn fetch_rows(&self, query: &RowQuery) -> Result<Vec<RawRecord>, StoreError>;

    /// Fetch a category's raw observations (the threshold population).
    async fn fetch_observations(&self, category_id: &str)
        -> Result<Vec<Observation>, StoreError>;

    /// Recompute stored period-over-period deltas with an ordered window
    /// over (area, element, item) partitions. Returns rows updated.
    async fn recompute_period_deltas(
        &self,
        category_id: &str,
        cadence: Cadence,
    ) -> Result<u64, StoreError>;

    async fn replace_thresholds(
        &self,
        category_id: &str,
        rows: &[ThresholdRow],
    ) -> Result<(), StoreError>;

    async fn query_thresholds(
        &self,
        query: &ThresholdQuery,
    ) -> Result<Vec<ThresholdRow>, StoreError>;

    async fn replace_trend_rows(
        &self,
        category_id: &str,
        rows: &[TrendRow],
    ) -> Result<(), StoreError>;

    /// Trend snapshot rows for one (category, area), ascending by period.
    async fn fetch_trend_rows(
        &self,
        category_id: &str,
        area: &str,
    ) -> Result<Vec<TrendRow>, StoreError>;

    async fn get_category(&self, id: &str) -> Result<Option<CategoryRecord>, StoreError>;

    async fn get_indicator(&self, name: &str) -> Result<Option<IndicatorRecord>, StoreError>;
}
