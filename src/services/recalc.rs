//! Category recalculation orchestration: period deltas, threshold tiers
//! and the trend snapshot, plus the alert-facing trend lookup.
//!
//! Each stage reads through the store, runs the pure engine computation,
//! and hands the full result set back for an atomic replace. Nothing is
//! persisted incrementally, so a failed stage leaves the previous snapshot
//! intact.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::db::{DataStore, StoreError};
use crate::engine::period::{current_year, SortDirection};
use crate::engine::query::{build_monthly_row_query, build_row_query, QueryOptions};
use crate::engine::thresholds::compute_thresholds;
use crate::engine::trend::build_trend_rows;
use crate::models::Cadence;
use crate::services::MetadataService;

/// Window settings for scheduled recalculation queries.
#[derive(Debug, Clone)]
pub struct RecalcConfig {
    pub from_year: i32,
    pub forecast_horizon: i32,
    pub monthly_window_years: i32,
}

pub struct RecalcService {
    store: Arc<dyn DataStore>,
    metadata: Arc<MetadataService>,
    config: RecalcConfig,
}

impl RecalcService {
    pub fn new(
        store: Arc<dyn DataStore>,
        metadata: Arc<MetadataService>,
        config: RecalcConfig,
    ) -> Self {
        Self {
            store,
            metadata,
            config,
        }
    }

    /// Recompute stored period-over-period deltas for a category.
    pub async fn recompute_deltas(&self, category_id: &str) -> Result<u64, StoreError> {
        let category = self.metadata.category_spec(category_id).await?;
        let updated = self
            .store
            .recompute_period_deltas(&category.id, category.cadence)
            .await?;
        info!(category = %category.id, rows = updated, "Recomputed period deltas");
        Ok(updated)
    }

    /// Recompute and atomically replace all three threshold tiers.
    pub async fn recompute_thresholds(&self, category_id: &str) -> Result<usize, StoreError> {
        let category = self.metadata.category_spec(category_id).await?;
        let observations = self.store.fetch_observations(&category.id).await?;
        let rows = compute_thresholds(&category.id, &observations);
        self.store.replace_thresholds(&category.id, &rows).await?;
        info!(category = %category.id, rows = rows.len(), "Replaced threshold tiers");
        Ok(rows.len())
    }

    /// Rebuild and atomically replace a category's trend snapshot from its
    /// designated trend indicator.
    pub async fn recompute_trends(&self, category_id: &str) -> Result<usize, StoreError> {
        let now_year = current_year();
        let category = self.metadata.category_spec(category_id).await?;
        let spec = self.metadata.indicator_spec(&category, None, None).await?;

        let records = match category.cadence {
            Cadence::Monthly => {
                // The monthly trend series is pinned to the category's
                // configured commodity so one series represents the whole
                // category.
                let mut query_spec = spec.clone();
                if let Some(commodity) = category.trend_commodity.clone() {
                    query_spec.commodities = Some(vec![commodity]);
                }
                let query = build_monthly_row_query(
                    &category.id,
                    &query_spec,
                    None,
                    self.config.monthly_window_years,
                    now_year,
                )?;
                self.store.fetch_rows(&query).await?
            }
            Cadence::Yearly => {
                let options = QueryOptions {
                    area: None,
                    years: None,
                    from_year: self.config.from_year,
                    forecast_horizon: self.config.forecast_horizon,
                    sort: SortDirection::Ascending,
                };
                let query = build_row_query(&category.id, &spec, &options, now_year)?;
                self.store.fetch_rows(&query).await?
            }
        };

        let rows = build_trend_rows(&category.id, records, &spec, category.cadence, now_year);
        self.store.replace_trend_rows(&category.id, &rows).await?;
        info!(category = %category.id, rows = rows.len(), "Replaced trend snapshot");
        Ok(rows.len())
    }

    /// Trend lookup backing alerts: latest period, its change percentage
    /// and the (period, value) points for one (category, area).
    pub async fn alert_trends(
        &self,
        category_id: &str,
        area: &str,
    ) -> Result<AlertTrendResponse, StoreError> {
        let category = self.metadata.category_spec(category_id).await?;
        let rows = self.store.fetch_trend_rows(&category.id, area).await?;

        let Some(first) = rows.first() else {
            return Ok(AlertTrendResponse {
                latest_period: current_year().to_string(),
                latest_period_change: 0.0,
                is_favorable: None,
                trend: Vec::new(),
            });
        };

        Ok(AlertTrendResponse {
            latest_period: first.latest_period.clone(),
            latest_period_change: first.latest_period_change_percent,
            is_favorable: Some(first.is_positive == (first.latest_period_change_percent > 0.0)),
            trend: rows
                .iter()
                .map(|row| TrendPoint {
                    period: row.period.clone(),
                    value: row.value,
                })
                .collect(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendPoint {
    #[serde(rename = "year")]
    pub period: String,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlertTrendResponse {
    #[serde(rename = "latestYear")]
    pub latest_period: String,
    #[serde(rename = "latestYearChange")]
    pub latest_period_change: f64,
    #[serde(rename = "isGreen")]
    pub is_favorable: Option<bool>,
    #[serde(rename = "trendData")]
    pub trend: Vec<TrendPoint>,
}
