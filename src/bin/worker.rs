//! Indicatrix Worker
//!
//! Processes category recalculation jobs from the Redis queue and enqueues
//! the chain on a schedule. Can be run as a separate process/instance from
//! the API server.

use apalis_redis::RedisStorage;
use dotenvy::dotenv;
use indicatrix::cache::RedisCache;
use indicatrix::config;
use indicatrix::core::runtime::{RecalcRuntime, RuntimeConfig};
use indicatrix::core::scheduler::JobScheduler;
use indicatrix::db::{DataStore, PostgresStore};
use indicatrix::jobs::context::JobContext;
use indicatrix::jobs::types::{ComputeThresholdsJob, ComputeTrendsJob, RecomputeDeltasJob};
use indicatrix::logging;
use indicatrix::metrics::Metrics;
use indicatrix::services::recalc::RecalcConfig;
use indicatrix::services::{MetadataService, RecalcService};
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env if present
    dotenv().ok();

    // Initialize logging based on environment
    logging::init_logging();

    let recalc_interval = config::get_recalc_interval_seconds();
    let categories = config::get_categories();

    let env = config::get_environment();
    info!("Starting Indicatrix Worker");
    info!(environment = %env, "Environment");

    if recalc_interval == 0 {
        return Err("RECALC_INTERVAL_SECONDS must be > 0 for worker".into());
    }
    if categories.is_empty() {
        return Err("CATEGORIES must list at least one category id for worker".into());
    }
    info!(categories = ?categories, "Categories: {}", categories.join(", "));
    info!(
        interval = recalc_interval,
        "Recalculation: every {} seconds", recalc_interval
    );

    // Initialize metrics
    let metrics = Arc::new(Metrics::new()?);

    // Initialize Postgres (required for recalculation)
    info!("Initializing Postgres connection...");
    let store: Arc<dyn DataStore> = match PostgresStore::new().await {
        Ok(store) => {
            info!("Postgres connected");
            metrics.database_connected.set(1.0);
            Arc::new(store)
        }
        Err(e) => {
            warn!(error = %e, "Failed to connect to Postgres");
            warn!("Worker requires Postgres for recalculation - exiting");
            return Err(format!("Postgres connection required for worker: {}", e).into());
        }
    };

    // Initialize Redis metadata cache (optional)
    info!("Initializing Redis metadata cache...");
    let cache = match RedisCache::new().await {
        Ok(cache) => {
            info!("Redis connected");
            metrics.cache_connected.set(1.0);
            Some(Arc::new(cache))
        }
        Err(e) => {
            warn!(error = %e, "Failed to connect to Redis cache - metadata reads go straight to Postgres");
            None
        }
    };

    let metadata = Arc::new(MetadataService::new(
        store.clone(),
        cache,
        config::get_metadata_ttl_seconds(),
    ));
    let recalc = Arc::new(RecalcService::new(
        store.clone(),
        metadata,
        RecalcConfig {
            from_year: config::get_from_year(),
            forecast_horizon: config::get_forecast_horizon(),
            monthly_window_years: config::get_monthly_window_years(),
        },
    ));

    // Initialize Apalis storage backends
    info!("Initializing Apalis Redis storage...");
    let redis_url = config::get_redis_url();
    let conn = apalis_redis::connect(redis_url.clone()).await?;
    let deltas_storage: Arc<RedisStorage<RecomputeDeltasJob>> =
        Arc::new(RedisStorage::new(conn.clone()));
    let thresholds_storage: Arc<RedisStorage<ComputeThresholdsJob>> =
        Arc::new(RedisStorage::new(conn.clone()));
    let trends_storage: Arc<RedisStorage<ComputeTrendsJob>> = Arc::new(RedisStorage::new(conn));
    info!("Apalis Redis storage initialized");

    // Create job context
    let job_context = Arc::new(JobContext::new(recalc, Some(metrics.clone())));

    // Initialize and start job runtime (workers)
    info!("Starting Apalis workers...");
    let runtime_config = RuntimeConfig {
        recalc_interval_seconds: recalc_interval,
        categories: categories.clone(),
    };
    let runtime = RecalcRuntime::new(
        runtime_config,
        job_context,
        deltas_storage.clone(),
        thresholds_storage.clone(),
        trends_storage.clone(),
    );
    let worker_handles = runtime
        .start_workers()
        .await
        .map_err(|e| format!("Failed to start workers: {}", e))?;

    // Initialize and start scheduler
    info!("Starting job scheduler...");
    let scheduler = JobScheduler::new(deltas_storage, categories, recalc_interval)
        .map_err(|e| format!("Failed to create scheduler: {}", e))?;
    scheduler
        .start()
        .await
        .map_err(|e| format!("Failed to start scheduler: {}", e))?;

    // Graceful shutdown
    info!("Worker started, waiting for shutdown signal...");
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down worker...");
            scheduler.stop().await;
            for handle in worker_handles {
                handle.abort();
            }
            info!("Worker stopped");
        }
    }

    Ok(())
}
