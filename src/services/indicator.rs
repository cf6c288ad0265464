//! Indicator query orchestration: fetch rows through the predicate
//! builder, fan out one task per area to assemble series and look up
//! thresholds, and shape the per-area responses.
//!
//! Areas share no mutable state, so the fan-out is a plain spawn + join;
//! a cancelled or failed area discards its partial result and fails the
//! whole request rather than returning a half-computed set.

use std::sync::Arc;

use futures_util::future::join_all;
use serde::Serialize;

use crate::db::{DataStore, StoreError};
use crate::engine::monthly::build_monthly_area_series;
use crate::engine::period::current_year;
use crate::engine::query::{
    build_monthly_row_query, build_row_query, build_threshold_query, QueryOptions,
};
use crate::engine::series::{build_area_series, group_by_area};
use crate::engine::thresholds::select_thresholds;
use crate::engine::units::display_unit;
use crate::models::{
    AreaSeries, CategorySpec, IndicatorSpec, MonthBucket, MonthlyAreaSeries, PeriodBucket,
};

/// One area's yearly indicator payload as served to chart consumers.
#[derive(Debug, Clone, Serialize)]
pub struct AreaIndicatorResponse {
    pub area: String,
    #[serde(rename = "is3YearAverage")]
    pub is_three_year_average: bool,
    pub unit: String,
    #[serde(rename = "latestYear")]
    pub latest_year: Option<String>,
    #[serde(rename = "latestYearChange")]
    pub latest_year_change: Option<f64>,
    #[serde(rename = "isPositive")]
    pub is_positive: bool,
    #[serde(rename = "isGreen")]
    pub is_favorable: bool,
    #[serde(rename = "noOfDimensions")]
    pub dimension_count: u8,
    pub items: Vec<String>,
    pub threshold: Vec<f64>,
    pub data: Vec<PeriodBucket>,
}

impl AreaIndicatorResponse {
    fn from_series(series: AreaSeries, spec: &IndicatorSpec, threshold: Vec<f64>) -> Self {
        Self {
            area: series.area,
            is_three_year_average: spec.is_three_year_average,
            unit: display_unit(&spec.unit),
            latest_year: series.latest_period,
            latest_year_change: series.latest_period_change,
            is_positive: spec.is_positive,
            is_favorable: series.is_favorable_change,
            dimension_count: spec.dimension_count,
            items: spec.display_items().to_vec(),
            threshold,
            data: series.data,
        }
    }
}

/// One area's monthly indicator payload.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyAreaIndicatorResponse {
    pub area: String,
    #[serde(rename = "is3YearAverage")]
    pub is_three_year_average: bool,
    pub unit: String,
    #[serde(rename = "latestYear")]
    pub latest_year: Option<String>,
    #[serde(rename = "latestMonth")]
    pub latest_month: Option<String>,
    #[serde(rename = "isPositive")]
    pub is_positive: bool,
    #[serde(rename = "noOfDimensions")]
    pub dimension_count: u8,
    pub items: Vec<String>,
    pub threshold: Vec<f64>,
    pub data: Vec<MonthBucket>,
}

impl MonthlyAreaIndicatorResponse {
    fn from_series(series: MonthlyAreaSeries, spec: &IndicatorSpec, threshold: Vec<f64>) -> Self {
        Self {
            area: series.area,
            is_three_year_average: spec.is_three_year_average,
            unit: display_unit(&spec.unit),
            latest_year: series.latest_year,
            latest_month: series.latest_month,
            is_positive: spec.is_positive,
            dimension_count: spec.dimension_count,
            items: spec.display_items().to_vec(),
            threshold,
            data: series.data,
        }
    }
}

pub struct IndicatorService {
    store: Arc<dyn DataStore>,
}

impl IndicatorService {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// Yearly indicator: one response per area found in the window.
    pub async fn yearly(
        &self,
        category: &CategorySpec,
        spec: &IndicatorSpec,
        options: &QueryOptions,
    ) -> Result<Vec<AreaIndicatorResponse>, StoreError> {
        let now_year = current_year();
        let query = build_row_query(&category.id, spec, options, now_year)?;
        let records = self.store.fetch_rows(&query).await?;

        let mut tasks = Vec::new();
        for (area, records) in group_by_area(records) {
            let store = self.store.clone();
            let spec = spec.clone();
            let category_id = category.id.clone();
            tasks.push(tokio::spawn(async move {
                let threshold = fetch_area_thresholds(&store, &category_id, &area, &spec).await?;
                let series = build_area_series(area, &records, &spec, now_year);
                Ok::<_, StoreError>(AreaIndicatorResponse::from_series(series, &spec, threshold))
            }));
        }

        collect_area_tasks(join_all(tasks).await)
    }

    /// Monthly indicator: recent-window month series per area.
    pub async fn monthly(
        &self,
        category: &CategorySpec,
        spec: &IndicatorSpec,
        area: Option<&str>,
        window_years: i32,
    ) -> Result<Vec<MonthlyAreaIndicatorResponse>, StoreError> {
        let now_year = current_year();
        let query = build_monthly_row_query(&category.id, spec, area, window_years, now_year)?;
        let records = self.store.fetch_rows(&query).await?;

        let mut tasks = Vec::new();
        for (area, records) in group_by_area(records) {
            let store = self.store.clone();
            let spec = spec.clone();
            let category_id = category.id.clone();
            tasks.push(tokio::spawn(async move {
                let threshold = fetch_area_thresholds(&store, &category_id, &area, &spec).await?;
                let series = build_monthly_area_series(area, &records, &spec);
                Ok::<_, StoreError>(MonthlyAreaIndicatorResponse::from_series(
                    series, &spec, threshold,
                ))
            }));
        }

        collect_area_tasks(join_all(tasks).await)
    }
}

async fn fetch_area_thresholds(
    store: &Arc<dyn DataStore>,
    category_id: &str,
    area: &str,
    spec: &IndicatorSpec,
) -> Result<Vec<f64>, StoreError> {
    let query = build_threshold_query(category_id, area, spec)?;
    let rows = store.query_thresholds(&query).await?;
    Ok(select_thresholds(&rows, spec))
}

fn collect_area_tasks<T>(
    joined: Vec<Result<Result<T, StoreError>, tokio::task::JoinError>>,
) -> Result<Vec<T>, StoreError> {
    let mut out = Vec::with_capacity(joined.len());
    for task in joined {
        out.push(task.map_err(|e| Box::new(e) as StoreError)??);
    }
    Ok(out)
}
