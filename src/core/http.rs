//! HTTP endpoint server using Axum

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, Level};

use crate::cache::RedisCache;
use crate::config;
use crate::db::{DataStore, PostgresStore, StoreError};
use crate::engine::period::SortDirection;
use crate::engine::query::QueryOptions;
use crate::engine::EngineError;
use crate::metrics::Metrics;
use crate::models::Cadence;
use crate::services::recalc::RecalcConfig;
use crate::services::{IndicatorService, MetadataService, RecalcService};

/// Service bundle behind the API; absent when the store is unreachable so
/// health and metrics stay available.
pub struct AppServices {
    pub metadata: Arc<MetadataService>,
    pub indicators: IndicatorService,
    pub recalc: RecalcService,
}

#[derive(Clone)]
pub struct AppState {
    pub health: Arc<RwLock<HealthStatus>>,
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
    pub services: Option<Arc<AppServices>>,
}

#[derive(Clone, Debug)]
pub struct HealthStatus {
    pub status: String,
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let health = state.health.read().await;
    let uptime_seconds = state.start_time.elapsed().as_secs();
    Ok(Json(json!({
        "status": health.status,
        "uptime_seconds": uptime_seconds,
        "service": "indicatrix-trend-engine"
    })))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .export()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Middleware to track HTTP request metrics
async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    state.metrics.http_requests_in_flight.inc();

    let response = next.run(request).await;
    let status = response.status();
    let duration = start.elapsed();

    state.metrics.http_requests_in_flight.dec();
    state.metrics.http_requests_total.inc();
    state
        .metrics
        .http_request_duration_seconds
        .observe(duration.as_secs_f64());

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = duration.as_millis(),
            "HTTP request error"
        );
    }

    response
}

/// Configuration errors from metadata lookups map to client errors, store
/// failures to 500.
fn map_store_error(e: &StoreError) -> StatusCode {
    match e.downcast_ref::<EngineError>() {
        Some(EngineError::UnknownCategory(_)) | Some(EngineError::UnknownIndicator(_)) => {
            StatusCode::NOT_FOUND
        }
        Some(EngineError::EmptyItems(_)) => StatusCode::UNPROCESSABLE_ENTITY,
        None => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Debug, Deserialize)]
struct IndicatorQuery {
    area: Option<String>,
    commodity: Option<String>,
    #[serde(rename = "fromYear")]
    from_year: Option<i32>,
    /// Years of forecast rows to include; 0/absent excludes forecasts.
    forecast: Option<i32>,
    sort: Option<String>,
}

fn parse_sort(sort: Option<&str>) -> SortDirection {
    match sort {
        Some(s) if s.eq_ignore_ascii_case("desc") => SortDirection::Descending,
        _ => SortDirection::Ascending,
    }
}

/// Per-area series for one indicator, yearly or monthly per its cadence.
async fn get_indicator(
    State(state): State<AppState>,
    Path((category, indicator)): Path<(String, String)>,
    Query(params): Query<IndicatorQuery>,
) -> Result<Json<Value>, StatusCode> {
    let services = state
        .services
        .as_ref()
        .ok_or(StatusCode::SERVICE_UNAVAILABLE)?;

    let category_spec = services.metadata.category_spec(&category).await.map_err(|e| {
        error!(category = %category, error = %e, "Failed to resolve category");
        map_store_error(&e)
    })?;
    let spec = services
        .metadata
        .indicator_spec(&category_spec, Some(&indicator), params.commodity.as_deref())
        .await
        .map_err(|e| {
            error!(category = %category, indicator = %indicator, error = %e, "Failed to resolve indicator");
            map_store_error(&e)
        })?;

    match spec.cadence {
        Cadence::Monthly => {
            let responses = services
                .indicators
                .monthly(
                    &category_spec,
                    &spec,
                    params.area.as_deref(),
                    config::get_monthly_window_years(),
                )
                .await
                .map_err(|e| {
                    error!(category = %category, indicator = %indicator, error = %e, "Monthly indicator query failed");
                    map_store_error(&e)
                })?;
            Ok(Json(json!(responses)))
        }
        Cadence::Yearly => {
            let options = QueryOptions {
                area: params.area.clone(),
                years: None,
                from_year: params.from_year.unwrap_or_else(config::get_from_year),
                forecast_horizon: params.forecast.unwrap_or(0),
                sort: parse_sort(params.sort.as_deref()),
            };
            let responses = services
                .indicators
                .yearly(&category_spec, &spec, &options)
                .await
                .map_err(|e| {
                    error!(category = %category, indicator = %indicator, error = %e, "Yearly indicator query failed");
                    map_store_error(&e)
                })?;
            Ok(Json(json!(responses)))
        }
    }
}

#[derive(Debug, Deserialize)]
struct TrendQuery {
    area: String,
}

/// Trend snapshot lookup for alerts.
async fn get_category_trends(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(params): Query<TrendQuery>,
) -> Result<Json<Value>, StatusCode> {
    let services = state
        .services
        .as_ref()
        .ok_or(StatusCode::SERVICE_UNAVAILABLE)?;

    let trends = services
        .recalc
        .alert_trends(&category, &params.area)
        .await
        .map_err(|e| {
            error!(category = %category, area = %params.area, error = %e, "Trend lookup failed");
            map_store_error(&e)
        })?;

    Ok(Json(json!(trends)))
}

#[derive(Debug, Deserialize)]
struct CalcQuery {
    category: String,
}

/// Recompute stored period-over-period deltas for a category.
async fn calc_changes(
    State(state): State<AppState>,
    Query(params): Query<CalcQuery>,
) -> Result<(StatusCode, Json<Value>), StatusCode> {
    let services = state
        .services
        .as_ref()
        .ok_or(StatusCode::SERVICE_UNAVAILABLE)?;

    let updated = services
        .recalc
        .recompute_deltas(&params.category)
        .await
        .map_err(|e| {
            error!(category = %params.category, error = %e, "Delta recomputation failed");
            map_store_error(&e)
        })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Period-over-period changes calculated and stored successfully.",
            "rowsUpdated": updated
        })),
    ))
}

/// Recompute and replace a category's threshold tiers.
async fn calc_thresholds(
    State(state): State<AppState>,
    Query(params): Query<CalcQuery>,
) -> Result<(StatusCode, Json<Value>), StatusCode> {
    let services = state
        .services
        .as_ref()
        .ok_or(StatusCode::SERVICE_UNAVAILABLE)?;

    let rows = services
        .recalc
        .recompute_thresholds(&params.category)
        .await
        .map_err(|e| {
            error!(category = %params.category, error = %e, "Threshold recomputation failed");
            map_store_error(&e)
        })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Mean and standard deviation calculated and stored successfully.",
            "rowsStored": rows
        })),
    ))
}

/// Rebuild and replace a category's trend snapshot.
async fn calc_trends(
    State(state): State<AppState>,
    Query(params): Query<CalcQuery>,
) -> Result<(StatusCode, Json<Value>), StatusCode> {
    let services = state
        .services
        .as_ref()
        .ok_or(StatusCode::SERVICE_UNAVAILABLE)?;

    let rows = services
        .recalc
        .recompute_trends(&params.category)
        .await
        .map_err(|e| {
            error!(category = %params.category, error = %e, "Trend recomputation failed");
            map_store_error(&e)
        })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Category trends stored successfully.",
            "rowsStored": rows
        })),
    ))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route(
            "/api/categories/{category}/indicators/{indicator}",
            get(get_indicator),
        )
        .route("/api/categories/{category}/trends", get(get_category_trends))
        .route("/api/calc/changes", post(calc_changes))
        .route("/api/calc/thresholds", post(calc_thresholds))
        .route("/api/calc/trends", post(calc_trends))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Build the service bundle over a connected store.
pub fn build_services(
    store: Arc<dyn DataStore>,
    cache: Option<Arc<RedisCache>>,
) -> Arc<AppServices> {
    let metadata = Arc::new(MetadataService::new(
        store.clone(),
        cache,
        config::get_metadata_ttl_seconds(),
    ));
    let recalc_config = RecalcConfig {
        from_year: config::get_from_year(),
        forecast_horizon: config::get_forecast_horizon(),
        monthly_window_years: config::get_monthly_window_years(),
    };
    Arc::new(AppServices {
        metadata: metadata.clone(),
        indicators: IndicatorService::new(store.clone()),
        recalc: RecalcService::new(store, metadata, recalc_config),
    })
}

pub async fn start_server(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let metrics = Arc::new(Metrics::new()?);
    let start_time = Arc::new(Instant::now());

    // Store is optional - API works without it but data endpoints won't
    let services = match PostgresStore::new().await {
        Ok(store) => {
            info!("Postgres connected for API server");
            metrics.database_connected.set(1.0);
            let cache = match RedisCache::new().await {
                Ok(cache) => {
                    info!("Redis connected for metadata cache");
                    metrics.cache_connected.set(1.0);
                    Some(Arc::new(cache))
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to connect to Redis - metadata cache disabled");
                    None
                }
            };
            Some(build_services(Arc::new(store), cache))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to connect to Postgres for API server - data endpoints will be unavailable");
            None
        }
    };

    let state = AppState {
        health: Arc::new(RwLock::new(HealthStatus::default())),
        metrics: metrics.clone(),
        start_time: start_time.clone(),
        services,
    };
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!(port = port, "HTTP server listening on port {}", port);
    info!(
        "Metrics endpoint available at http://0.0.0.0:{}/metrics",
        port
    );
    axum::serve(listener, app).await?;

    Ok(())
}
