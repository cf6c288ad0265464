//! Declarative filter/grouping predicates handed to the row store.
//!
//! The engine never builds SQL itself; it describes the membership tests,
//! period window, grouping keys and ordering, and the store translates
//! that into its own query language.

use crate::engine::error::EngineError;
use crate::engine::period::{year_range, SortDirection};
use crate::engine::thresholds::ALL_AREAS;
use crate::models::{Cadence, DimensionColumn, IndicatorSpec, ThresholdDisplay};

/// Filter and grouping specification for an indicator row fetch.
///
/// All string membership tests are case-insensitive exact matches.
/// Grouping always includes area, the dimension column and the period,
/// plus unit and forecast flag for yearly rows and the commodity column
/// when a secondary dimension is present; `value` and the stored delta are
/// summed within each group.
#[derive(Debug, Clone)]
pub struct RowQuery {
    pub category_id: String,
    pub cadence: Cadence,
    pub dimension_column: DimensionColumn,
    pub dimension_values: Vec<String>,
    pub commodity_column: Option<DimensionColumn>,
    pub commodity_values: Option<Vec<String>>,
    /// Absolute years (yearly cadence restricts the period to this set;
    /// monthly cadence restricts the month's calendar year).
    pub periods: Vec<String>,
    pub area: Option<String>,
    pub include_forecast: bool,
    pub sort: SortDirection,
}

impl RowQuery {
    /// Column names the store must group by, in order.
    pub fn group_columns(&self) -> Vec<&'static str> {
        let mut columns = vec!["area", self.dimension_column.as_str()];
        match self.cadence {
            Cadence::Yearly => {
                columns.extend(["year_label", "absolute_year", "unit", "is_forecast"])
            }
            Cadence::Monthly => columns.push("year_month"),
        }
        if let Some(commodity_column) = self.commodity_column {
            columns.push(commodity_column.as_str());
        }
        columns
    }
}

/// Options for a yearly indicator fetch.
#[derive(Debug, Clone)]
pub struct QueryOptions {
    pub area: Option<String>,
    /// Explicit year set; when present it overrides the computed
    /// `[from_year .. current year + forecast_horizon]` window.
    pub years: Option<Vec<String>>,
    pub from_year: i32,
    /// Years of forecast rows to include past the current calendar year;
    /// 0 excludes forecast rows entirely.
    pub forecast_horizon: i32,
    pub sort: SortDirection,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            area: None,
            years: None,
            from_year: 2018,
            forecast_horizon: 0,
            sort: SortDirection::Ascending,
        }
    }
}

/// Build the yearly row predicate for an indicator.
///
/// Fails fast on an empty `items` list - the membership test would
/// otherwise match nothing or everything depending on the store.
pub fn build_row_query(
    category_id: &str,
    spec: &IndicatorSpec,
    options: &QueryOptions,
    now_year: i32,
) -> Result<RowQuery, EngineError> {
    spec.validate()?;

    let include_forecast = options.forecast_horizon > 0;
    Ok(RowQuery {
        category_id: category_id.to_string(),
        cadence: Cadence::Yearly,
        dimension_column: spec.dimension_column,
        dimension_values: spec.items.clone(),
        commodity_column: spec
            .has_commodities()
            .then(|| spec.dimension_column.other()),
        commodity_values: spec.has_commodities().then(|| {
            spec.commodities
                .clone()
                .unwrap_or_default()
        }),
        periods: options.years.clone().unwrap_or_else(|| {
            year_range(
                options.from_year,
                options.forecast_horizon,
                options.sort,
                now_year,
            )
        }),
        area: options.area.clone(),
        include_forecast,
        sort: options.sort,
    })
}

/// Build the monthly row predicate for an indicator: a recent-years window
/// of `YYYY-MM` rows, newest first.
pub fn build_monthly_row_query(
    category_id: &str,
    spec: &IndicatorSpec,
    area: Option<&str>,
    window_years: i32,
    now_year: i32,
) -> Result<RowQuery, EngineError> {
    spec.validate()?;

    let first_year = now_year - (window_years - 1).max(0);
    Ok(RowQuery {
        category_id: category_id.to_string(),
        cadence: Cadence::Monthly,
        dimension_column: spec.dimension_column,
        dimension_values: spec.items.clone(),
        commodity_column: spec
            .has_commodities()
            .then(|| spec.dimension_column.other()),
        commodity_values: spec.has_commodities().then(|| {
            spec.commodities
                .clone()
                .unwrap_or_default()
        }),
        periods: (first_year..=now_year).map(|y| y.to_string()).collect(),
        area: area.map(|a| a.to_string()),
        include_forecast: false,
        sort: SortDirection::Descending,
    })
}

/// Filter specification for a threshold lookup.
#[derive(Debug, Clone)]
pub struct ThresholdQuery {
    pub category_id: String,
    /// Resolved area constraint: the all-areas sentinel when the indicator
    /// displays one threshold across areas, else the requested area
    /// (case-insensitive).
    pub area: String,
    pub dimension_column: DimensionColumn,
    pub dimension_values: Vec<String>,
    pub commodity_values: Option<Vec<String>>,
    /// Constrain the commodity column to the all-items sentinel. Applies
    /// when the indicator has no commodities and is keyed on the primary
    /// column, selecting the per-item-collapsed tier.
    pub all_items_sentinel: bool,
}

/// Build the threshold predicate for one area and indicator.
pub fn build_threshold_query(
    category_id: &str,
    area: &str,
    spec: &IndicatorSpec,
) -> Result<ThresholdQuery, EngineError> {
    spec.validate()?;

    let resolved_area = match spec.threshold_display {
        ThresholdDisplay::All => ALL_AREAS.to_string(),
        ThresholdDisplay::Country => area.to_string(),
    };
    let all_items_sentinel =
        !spec.has_commodities() && spec.dimension_column == DimensionColumn::Element;

    Ok(ThresholdQuery {
        category_id: category_id.to_string(),
        area: resolved_area,
        dimension_column: spec.dimension_column,
        dimension_values: spec.items.clone(),
        commodity_values: spec.has_commodities().then(|| {
            spec.commodities
                .clone()
                .unwrap_or_default()
        }),
        all_items_sentinel,
    })
}
