//! Environment-backed configuration accessors.
//!
//! Every setting is read through a small function with a sensible default so
//! binaries and tests never have to thread a config struct around.

use std::env;

/// Deployment environment name (`production`, `sandbox`, ...).
pub fn get_environment() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "sandbox".to_string())
}

/// PostgreSQL connection string for the observation store.
pub fn get_database_url() -> String {
    env::var("DATABASE_URL")
        .unwrap_or_else(|_| "host=localhost user=indicatrix dbname=indicatrix".to_string())
}

/// Redis connection string (metadata cache + job queue).
pub fn get_redis_url() -> String {
    env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string())
}

/// HTTP listen port for the API server.
pub fn get_port() -> u16 {
    env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080)
}

/// First year of the default indicator query window.
pub fn get_from_year() -> i32 {
    env::var("FROM_YEAR")
        .ok()
        .and_then(|y| y.parse().ok())
        .unwrap_or(2018)
}

/// Years of forecast rows to include past the current calendar year.
pub fn get_forecast_horizon() -> i32 {
    env::var("FORECAST_HORIZON_YEARS")
        .ok()
        .and_then(|y| y.parse().ok())
        .unwrap_or(2)
}

/// How many calendar years (ending at the current one) a monthly query spans.
pub fn get_monthly_window_years() -> i32 {
    env::var("MONTHLY_WINDOW_YEARS")
        .ok()
        .and_then(|y| y.parse().ok())
        .unwrap_or(2)
}

/// Seconds between scheduled recalculation runs. 0 disables the scheduler.
pub fn get_recalc_interval_seconds() -> u64 {
    env::var("RECALC_INTERVAL_SECONDS")
        .ok()
        .and_then(|i| i.parse().ok())
        .unwrap_or(0)
}

/// TTL for cached category/indicator metadata, in seconds.
pub fn get_metadata_ttl_seconds() -> u64 {
    env::var("METADATA_TTL_SECONDS")
        .ok()
        .and_then(|t| t.parse().ok())
        .unwrap_or(300)
}

/// Comma-separated category ids the worker recalculates on schedule.
pub fn get_categories() -> Vec<String> {
    env::var("CATEGORIES")
        .unwrap_or_default()
        .split(',')
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect()
}
