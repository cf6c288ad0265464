//! PostgreSQL implementation of the `DataStore` boundary.

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, NoTls};
use tracing::warn;

use crate::config;
use crate::db::{CategoryRecord, DataStore, IndicatorRecord, StoreError};
use crate::engine::period::SortDirection;
use crate::engine::query::{RowQuery, ThresholdQuery};
use crate::models::{Cadence, Observation, RawRecord, ThresholdRow, ThresholdScope, TrendRow};

pub struct PostgresStore {
    client: Arc<RwLock<Option<Client>>>,
}

fn not_connected() -> StoreError {
    Box::new(std::io::Error::new(
        std::io::ErrorKind::NotConnected,
        "Database connection not available",
    ))
}

impl PostgresStore {
    /// Connect to Postgres (with exponential backoff) and initialize the
    /// schema.
    pub async fn new() -> Result<Self, StoreError> {
        let database_url = config::get_database_url();
        let (client, connection) = (|| async { tokio_postgres::connect(&database_url, NoTls).await })
            .retry(ExponentialBuilder::default())
            .notify(|err: &tokio_postgres::Error, dur: std::time::Duration| {
                warn!(error = %err, retry_in = ?dur, "Postgres connection failed, retrying");
            })
            .await
            .map_err(|e| {
                Box::new(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    format!("Failed to connect to Postgres: {}", e),
                )) as StoreError
            })?;

        // Drive the connection on its own task
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(error = %e, "Postgres connection error");
            }
        });

        let store = Self {
            client: Arc::new(RwLock::new(Some(client))),
        };
        store.init_schema().await?;

        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        let client = self.client.read().await;
        let client = client.as_ref().ok_or_else(not_connected)?;

        client
            .batch_execute(
                "CREATE TABLE IF NOT EXISTS observations (
                    id BIGSERIAL PRIMARY KEY,
                    category_id TEXT NOT NULL,
                    area TEXT NOT NULL,
                    element TEXT NOT NULL,
                    item TEXT NOT NULL,
                    year_label TEXT,
                    absolute_year TEXT NOT NULL,
                    year_month TEXT,
                    unit TEXT NOT NULL DEFAULT '',
                    value DOUBLE PRECISION,
                    yearly_change DOUBLE PRECISION,
                    is_forecast BOOLEAN NOT NULL DEFAULT FALSE
                );
                CREATE INDEX IF NOT EXISTS observations_category_area_idx
                    ON observations (category_id, area);

                CREATE TABLE IF NOT EXISTS thresholds (
                    category_id TEXT NOT NULL,
                    scope TEXT NOT NULL,
                    area TEXT NOT NULL,
                    element TEXT NOT NULL,
                    item TEXT NOT NULL,
                    mean_value DOUBLE PRECISION NOT NULL,
                    standard_deviation DOUBLE PRECISION NOT NULL
                );

                CREATE TABLE IF NOT EXISTS category_trends (
                    category_id TEXT NOT NULL,
                    area TEXT NOT NULL,
                    period TEXT NOT NULL,
                    value DOUBLE PRECISION NOT NULL,
                    period_delta DOUBLE PRECISION NOT NULL,
                    period_delta_percent DOUBLE PRECISION NOT NULL,
                    latest_period TEXT NOT NULL,
                    latest_period_change_percent DOUBLE PRECISION NOT NULL,
                    is_positive BOOLEAN NOT NULL
                );

                CREATE TABLE IF NOT EXISTS categories (
                    id TEXT PRIMARY KEY,
                    display_name TEXT NOT NULL,
                    unit TEXT NOT NULL DEFAULT '',
                    column_name TEXT NOT NULL DEFAULT 'element',
                    trend_indicator TEXT NOT NULL,
                    trend_commodity TEXT,
                    cadence TEXT NOT NULL DEFAULT 'yearly'
                );

                CREATE TABLE IF NOT EXISTS indicators (
                    name TEXT PRIMARY KEY,
                    unit TEXT,
                    column_name TEXT,
                    items TEXT,
                    commodities TEXT,
                    legends TEXT,
                    is_positive BOOLEAN NOT NULL DEFAULT FALSE,
                    no_of_dimensions INT NOT NULL DEFAULT 1,
                    threshold_display TEXT,
                    is_3y_avg BOOLEAN NOT NULL DEFAULT FALSE,
                    cadence TEXT
                );",
            )
            .await
            .map_err(|e| {
                Box::new(std::io::Error::other(format!(
                    "Failed to initialize schema: {}",
                    e
                ))) as StoreError
            })?;

        Ok(())
    }

    /// Check if the Postgres connection is available
    pub async fn is_available(&self) -> bool {
        let client = self.client.read().await;
        client.is_some()
    }
}

#[async_trait]
impl DataStore for PostgresStore {
    async fn fetch_rows(&self, query: &RowQuery) -> Result<Vec<RawRecord>, StoreError> {
        let client = self.client.read().await;
        let client = client.as_ref().ok_or_else(not_connected)?;

        let dimension = query.dimension_column.as_str();
        let commodity = query.commodity_column.map(|c| c.as_str());

        let mut select: Vec<String> = vec![
            "area".to_string(),
            format!("{} AS dimension_value", dimension),
        ];
        match query.cadence {
            Cadence::Yearly => select.extend([
                "year_label".to_string(),
                "absolute_year".to_string(),
                "unit".to_string(),
                "is_forecast".to_string(),
            ]),
            Cadence::Monthly => select.push("year_month".to_string()),
        }
        select.push("SUM(value) AS value".to_string());
        select.push("SUM(yearly_change) AS yearly_change".to_string());
        if let Some(commodity) = commodity {
            select.push(format!("{} AS commodity", commodity));
        }

        let dimension_values: Vec<String> = query
            .dimension_values
            .iter()
            .map(|v| v.to_lowercase())
            .collect();
        let commodity_values: Vec<String> = query
            .commodity_values
            .iter()
            .flatten()
            .map(|v| v.to_lowercase())
            .collect();

        let mut conditions = vec![
            "category_id = $1".to_string(),
            "value IS NOT NULL".to_string(),
            format!("LOWER({}) = ANY($2)", dimension),
            "absolute_year = ANY($3)".to_string(),
        ];
        let mut params: Vec<&(dyn ToSql + Sync)> =
            vec![&query.category_id, &dimension_values, &query.periods];

        if let Some(commodity) = commodity {
            params.push(&commodity_values);
            conditions.push(format!("LOWER({}) = ANY(${})", commodity, params.len()));
        }
        let area = query.area.clone();
        if let Some(ref area) = area {
            params.push(area);
            conditions.push(format!("LOWER(area) = LOWER(${})", params.len()));
        }
        if query.cadence == Cadence::Monthly {
            conditions.push("year_month IS NOT NULL".to_string());
        }
        if query.cadence == Cadence::Yearly && !query.include_forecast {
            conditions.push("is_forecast = FALSE".to_string());
        }

        let order_column = match query.cadence {
            Cadence::Yearly => "absolute_year",
            Cadence::Monthly => "year_month",
        };
        let order_direction = match query.sort {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        };

        let sql = format!(
            "SELECT {} FROM observations WHERE {} GROUP BY {} ORDER BY {} {}",
            select.join(", "),
            conditions.join(" AND "),
            query.group_columns().join(", "),
            order_column,
            order_direction
        );

        let rows = client.query(&sql, &params).await.map_err(|e| {
            Box::new(std::io::Error::other(format!(
                "Failed to query observations: {}",
                e
            ))) as StoreError
        })?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let (period, period_label, is_forecast, unit) = match query.cadence {
                Cadence::Yearly => (
                    row.try_get::<_, String>("absolute_year")?,
                    row.try_get::<_, Option<String>>("year_label")?,
                    row.try_get::<_, bool>("is_forecast")?,
                    row.try_get::<_, String>("unit")?,
                ),
                Cadence::Monthly => (
                    row.try_get::<_, String>("year_month")?,
                    None,
                    false,
                    String::new(),
                ),
            };
            records.push(RawRecord {
                area: row.try_get("area")?,
                dimension_value: row.try_get("dimension_value")?,
                commodity: if commodity.is_some() {
                    row.try_get("commodity")?
                } else {
                    None
                },
                period,
                period_label,
                is_forecast,
                value: row.try_get("value")?,
                unit,
                period_delta: row.try_get("yearly_change")?,
            });
        }

        Ok(records)
    }

    async fn fetch_observations(
        &self,
        category_id: &str,
    ) -> Result<Vec<Observation>, StoreError> {
        let client = self.client.read().await;
        let client = client.as_ref().ok_or_else(not_connected)?;

        let rows = client
            .query(
                "SELECT area, element, item, absolute_year, is_forecast, value
                 FROM observations
                 WHERE category_id = $1",
                &[&category_id],
            )
            .await
            .map_err(|e| {
                Box::new(std::io::Error::other(format!(
                    "Failed to query observations: {}",
                    e
                ))) as StoreError
            })?;

        let mut observations = Vec::with_capacity(rows.len());
        for row in rows {
            observations.push(Observation {
                area: row.try_get("area")?,
                dimension_value: row.try_get("element")?,
                commodity: row.try_get("item")?,
                period: row.try_get("absolute_year")?,
                is_forecast: row.try_get("is_forecast")?,
                value: row.try_get("value")?,
            });
        }

        Ok(observations)
    }

    async fn recompute_period_deltas(
        &self,
        category_id: &str,
        cadence: Cadence,
    ) -> Result<u64, StoreError> {
        let client = self.client.read().await;
        let client = client.as_ref().ok_or_else(not_connected)?;

        let order = match cadence {
            Cadence::Yearly => "absolute_year",
            Cadence::Monthly => "absolute_year, year_month",
        };
        let sql = format!(
            "UPDATE observations AS o
             SET yearly_change = d.delta
             FROM (
                 SELECT id,
                        COALESCE(ROUND((value - LAG(value) OVER (
                            PARTITION BY area, element, item
                            ORDER BY {}
                        ))::numeric, 2)::double precision, 0) AS delta
                 FROM observations
                 WHERE category_id = $1
             ) AS d
             WHERE o.id = d.id AND o.category_id = $1",
            order
        );

        client.execute(&sql, &[&category_id]).await.map_err(|e| {
            Box::new(std::io::Error::other(format!(
                "Failed to recompute period deltas: {}",
                e
            ))) as StoreError
        })
    }

    async fn replace_thresholds(
        &self,
        category_id: &str,
        rows: &[ThresholdRow],
    ) -> Result<(), StoreError> {
        let mut client = self.client.write().await;
        let client = client.as_mut().ok_or_else(not_connected)?;

        let tx = client.transaction().await?;
        tx.execute("DELETE FROM thresholds WHERE category_id = $1", &[&category_id])
            .await?;
        for row in rows {
            tx.execute(
                "INSERT INTO thresholds
                     (category_id, scope, area, element, item, mean_value, standard_deviation)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
                &[
                    &row.category_id,
                    &row.scope.as_str(),
                    &row.area,
                    &row.dimension_value,
                    &row.commodity,
                    &row.mean_value,
                    &row.standard_deviation,
                ],
            )
            .await?;
        }
        tx.commit().await?;

        Ok(())
    }

    async fn query_thresholds(
        &self,
        query: &ThresholdQuery,
    ) -> Result<Vec<ThresholdRow>, StoreError> {
        let client = self.client.read().await;
        let client = client.as_ref().ok_or_else(not_connected)?;

        let dimension = query.dimension_column.as_str();
        let commodity = query.dimension_column.other().as_str();

        let dimension_values: Vec<String> = query
            .dimension_values
            .iter()
            .map(|v| v.to_lowercase())
            .collect();

        let mut conditions = vec![
            "category_id = $1".to_string(),
            "LOWER(area) = LOWER($2)".to_string(),
            format!("LOWER({}) = ANY($3)", dimension),
        ];
        let mut params: Vec<&(dyn ToSql + Sync)> =
            vec![&query.category_id, &query.area, &dimension_values];

        let commodity_values: Vec<String> = query
            .commodity_values
            .iter()
            .flatten()
            .map(|v| v.to_lowercase())
            .collect();
        if query.commodity_values.is_some() {
            params.push(&commodity_values);
            conditions.push(format!("LOWER({}) = ANY(${})", commodity, params.len()));
        } else if query.all_items_sentinel {
            conditions.push(format!("{} = 'ALL ITEMS'", commodity));
        }

        let sql = format!(
            "SELECT category_id, scope, area, element, item, mean_value, standard_deviation
             FROM thresholds WHERE {}",
            conditions.join(" AND ")
        );

        let rows = client.query(&sql, &params).await.map_err(|e| {
            Box::new(std::io::Error::other(format!(
                "Failed to query thresholds: {}",
                e
            ))) as StoreError
        })?;

        let mut thresholds = Vec::with_capacity(rows.len());
        for row in rows {
            let scope: String = row.try_get("scope")?;
            thresholds.push(ThresholdRow {
                category_id: row.try_get("category_id")?,
                scope: ThresholdScope::parse(&scope),
                area: row.try_get("area")?,
                dimension_value: row.try_get("element")?,
                commodity: row.try_get("item")?,
                mean_value: row.try_get("mean_value")?,
                standard_deviation: row.try_get("standard_deviation")?,
            });
        }

        Ok(thresholds)
    }

    async fn replace_trend_rows(
        &self,
        category_id: &str,
        rows: &[TrendRow],
    ) -> Result<(), StoreError> {
        let mut client = self.client.write().await;
        let client = client.as_mut().ok_or_else(not_connected)?;

        let tx = client.transaction().await?;
        tx.execute(
            "DELETE FROM category_trends WHERE category_id = $1",
            &[&category_id],
        )
        .await?;
        for row in rows {
            tx.execute(
                "INSERT INTO category_trends
                     (category_id, area, period, value, period_delta, period_delta_percent,
                      latest_period, latest_period_change_percent, is_positive)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
                &[
                    &row.category_id,
                    &row.area,
                    &row.period,
                    &row.value,
                    &row.period_delta,
                    &row.period_delta_percent,
                    &row.latest_period,
                    &row.latest_period_change_percent,
                    &row.is_positive,
                ],
            )
            .await?;
        }
        tx.commit().await?;

        Ok(())
    }

    async fn fetch_trend_rows(
        &self,
        category_id: &str,
        area: &str,
    ) -> Result<Vec<TrendRow>, StoreError> {
        let client = self.client.read().await;
        let client = client.as_ref().ok_or_else(not_connected)?;

        let rows = client
            .query(
                "SELECT category_id, area, period, value, period_delta, period_delta_percent,
                        latest_period, latest_period_change_percent, is_positive
                 FROM category_trends
                 WHERE category_id = $1 AND LOWER(area) = LOWER($2)
                 ORDER BY period ASC",
                &[&category_id, &area],
            )
            .await
            .map_err(|e| {
                Box::new(std::io::Error::other(format!(
                    "Failed to query category trends: {}",
                    e
                ))) as StoreError
            })?;

        let mut trends = Vec::with_capacity(rows.len());
        for row in rows {
            trends.push(TrendRow {
                category_id: row.try_get("category_id")?,
                area: row.try_get("area")?,
                period: row.try_get("period")?,
                value: row.try_get("value")?,
                period_delta: row.try_get("period_delta")?,
                period_delta_percent: row.try_get("period_delta_percent")?,
                latest_period: row.try_get("latest_period")?,
                latest_period_change_percent: row.try_get("latest_period_change_percent")?,
                is_positive: row.try_get("is_positive")?,
            });
        }

        Ok(trends)
    }

    async fn get_category(&self, id: &str) -> Result<Option<CategoryRecord>, StoreError> {
        let client = self.client.read().await;
        let client = client.as_ref().ok_or_else(not_connected)?;

        let rows = client
            .query(
                "SELECT id, display_name, unit, column_name, trend_indicator, trend_commodity,
                        cadence
                 FROM categories WHERE LOWER(id) = LOWER($1)",
                &[&id],
            )
            .await
            .map_err(|e| {
                Box::new(std::io::Error::other(format!(
                    "Failed to query category: {}",
                    e
                ))) as StoreError
            })?;

        let Some(row) = rows.first() else {
            return Ok(None);
        };
        Ok(Some(CategoryRecord {
            id: row.try_get("id")?,
            display_name: row.try_get("display_name")?,
            unit: row.try_get("unit")?,
            column_name: row.try_get("column_name")?,
            trend_indicator: row.try_get("trend_indicator")?,
            trend_commodity: row.try_get("trend_commodity")?,
            cadence: row.try_get("cadence")?,
        }))
    }

    async fn get_indicator(&self, name: &str) -> Result<Option<IndicatorRecord>, StoreError> {
        let client = self.client.read().await;
        let client = client.as_ref().ok_or_else(not_connected)?;

        let rows = client
            .query(
                "SELECT name, unit, column_name, items, commodities, legends, is_positive,
                        no_of_dimensions, threshold_display, is_3y_avg, cadence
                 FROM indicators WHERE LOWER(name) = LOWER($1)",
                &[&name],
            )
            .await
            .map_err(|e| {
                Box::new(std::io::Error::other(format!(
                    "Failed to query indicator: {}",
                    e
                ))) as StoreError
            })?;

        let Some(row) = rows.first() else {
            return Ok(None);
        };
        Ok(Some(IndicatorRecord {
            name: row.try_get("name")?,
            unit: row.try_get("unit")?,
            column_name: row.try_get("column_name")?,
            items: parse_json_list(row.try_get("items")?)?,
            commodities: parse_json_list(row.try_get("commodities")?)?,
            legends: parse_json_list(row.try_get("legends")?)?,
            is_positive: row.try_get("is_positive")?,
            dimension_count: row.try_get("no_of_dimensions")?,
            threshold_display: row.try_get("threshold_display")?,
            is_three_year_average: row.try_get("is_3y_avg")?,
            cadence: row.try_get("cadence")?,
        }))
    }
}

/// Metadata list columns are stored as JSON arrays of strings.
fn parse_json_list(raw: Option<String>) -> Result<Option<Vec<String>>, StoreError> {
    match raw {
        None => Ok(None),
        Some(raw) => {
            let parsed: Vec<String> = serde_json::from_str(&raw).map_err(|e| {
                Box::new(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("Failed to parse metadata list: {}", e),
                )) as StoreError
            })?;
            Ok(Some(parsed))
        }
    }
}
