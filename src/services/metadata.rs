//! Category and indicator metadata resolution.
//!
//! Metadata lives in Postgres and changes rarely; reads go through an
//! explicit injected Redis cache with a bounded TTL. The engine treats the
//! resolved specs as read-only, eventually-consistent input - a cache miss
//! is transparently re-fetched, never an error.

use std::sync::Arc;

use crate::cache::RedisCache;
use crate::db::{CategoryRecord, DataStore, IndicatorRecord, StoreError};
use crate::engine::EngineError;
use crate::models::{Cadence, CategorySpec, DimensionColumn, IndicatorSpec, ThresholdDisplay};

pub struct MetadataService {
    store: Arc<dyn DataStore>,
    cache: Option<Arc<RedisCache>>,
    ttl_seconds: u64,
}

impl MetadataService {
    pub fn new(
        store: Arc<dyn DataStore>,
        cache: Option<Arc<RedisCache>>,
        ttl_seconds: u64,
    ) -> Self {
        Self {
            store,
            cache,
            ttl_seconds,
        }
    }

    /// Resolve a category spec by id (case-insensitive).
    pub async fn category_spec(&self, category_id: &str) -> Result<CategorySpec, StoreError> {
        let key = format!("metadata:category:{}", category_id.to_uppercase());
        let record = match self.cached_get::<CategoryRecord>(&key).await {
            Some(record) => record,
            None => {
                let record = self
                    .store
                    .get_category(category_id)
                    .await?
                    .ok_or_else(|| EngineError::UnknownCategory(category_id.to_string()))?;
                self.cached_set(&key, &record).await;
                record
            }
        };

        Ok(CategorySpec {
            id: record.id.to_uppercase(),
            display_name: record.display_name,
            default_unit: record.unit,
            default_column: DimensionColumn::parse(&record.column_name)
                .unwrap_or(DimensionColumn::Element),
            trend_indicator: record.trend_indicator,
            trend_commodity: record.trend_commodity,
            cadence: Cadence::parse(&record.cadence),
        })
    }

    /// Resolve an indicator spec, falling back to the category's trend
    /// indicator when none is named and to the category's defaults for
    /// unset fields. A commodity override narrows the spec to that single
    /// commodity with a single dimension.
    pub async fn indicator_spec(
        &self,
        category: &CategorySpec,
        indicator: Option<&str>,
        commodity: Option<&str>,
    ) -> Result<IndicatorSpec, StoreError> {
        let indicator_key = indicator
            .map(|i| i.to_lowercase())
            .unwrap_or_else(|| category.trend_indicator.to_lowercase());

        let key = format!("metadata:indicator:{}", indicator_key);
        let record = match self.cached_get::<IndicatorRecord>(&key).await {
            Some(record) => record,
            None => {
                let record = self
                    .store
                    .get_indicator(&indicator_key)
                    .await?
                    .ok_or_else(|| EngineError::UnknownIndicator(indicator_key.clone()))?;
                self.cached_set(&key, &record).await;
                record
            }
        };

        let mut spec = resolve_indicator_spec(category, &indicator_key, record);
        if let Some(commodity) = commodity {
            spec.commodities = Some(vec![commodity.to_string()]);
            spec.legends = vec![commodity.to_string()];
            spec.dimension_count = 1;
        }

        Ok(spec)
    }

    async fn cached_get<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.cache.as_ref()?.get_json(key).await
    }

    async fn cached_set<T: serde::Serialize>(&self, key: &str, value: &T) {
        if let Some(cache) = self.cache.as_ref() {
            cache.set_json(key, value, self.ttl_seconds).await;
        }
    }
}

fn resolve_indicator_spec(
    category: &CategorySpec,
    indicator_key: &str,
    record: IndicatorRecord,
) -> IndicatorSpec {
    IndicatorSpec {
        name: indicator_key.to_string(),
        unit: record.unit.unwrap_or_else(|| category.default_unit.clone()),
        dimension_column: record
            .column_name
            .as_deref()
            .and_then(DimensionColumn::parse)
            .unwrap_or(category.default_column),
        items: record
            .items
            .filter(|items| !items.is_empty())
            .unwrap_or_else(|| vec![indicator_key.to_string()]),
        commodities: record.commodities,
        legends: record.legends.unwrap_or_default(),
        is_positive: record.is_positive,
        dimension_count: record.dimension_count.clamp(1, 2) as u8,
        threshold_display: record
            .threshold_display
            .as_deref()
            .map(ThresholdDisplay::parse)
            .unwrap_or(ThresholdDisplay::Country),
        is_three_year_average: record.is_three_year_average,
        cadence: record
            .cadence
            .as_deref()
            .map(Cadence::parse)
            .unwrap_or(category.cadence),
    }
}
