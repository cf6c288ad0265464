//! Prometheus metrics for the API server and recalculation worker.

use prometheus::{
    Encoder, Gauge, Histogram, HistogramOpts, IntCounter, IntGauge, Registry, TextEncoder,
};

pub struct Metrics {
    registry: Registry,

    pub http_requests_total: IntCounter,
    pub http_requests_in_flight: IntGauge,
    pub http_request_duration_seconds: Histogram,

    pub recalc_runs_total: IntCounter,
    pub recalc_failures_total: IntCounter,
    pub recalc_runs_active: IntGauge,
    pub recalc_duration_seconds: Histogram,

    pub database_connected: Gauge,
    pub cache_connected: Gauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total =
            IntCounter::new("http_requests_total", "Total number of HTTP requests")?;
        let http_requests_in_flight =
            IntGauge::new("http_requests_in_flight", "HTTP requests currently in flight")?;
        let http_request_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        ))?;

        let recalc_runs_total = IntCounter::new(
            "recalc_runs_total",
            "Completed category recalculation stages",
        )?;
        let recalc_failures_total = IntCounter::new(
            "recalc_failures_total",
            "Failed category recalculation stages",
        )?;
        let recalc_runs_active =
            IntGauge::new("recalc_runs_active", "Recalculation stages currently running")?;
        let recalc_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "recalc_duration_seconds",
            "Recalculation stage duration in seconds",
        ))?;

        let database_connected =
            Gauge::new("database_connected", "1 when the Postgres store is connected")?;
        let cache_connected =
            Gauge::new("cache_connected", "1 when the Redis cache is connected")?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(recalc_runs_total.clone()))?;
        registry.register(Box::new(recalc_failures_total.clone()))?;
        registry.register(Box::new(recalc_runs_active.clone()))?;
        registry.register(Box::new(recalc_duration_seconds.clone()))?;
        registry.register(Box::new(database_connected.clone()))?;
        registry.register(Box::new(cache_connected.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_requests_in_flight,
            http_request_duration_seconds,
            recalc_runs_total,
            recalc_failures_total,
            recalc_runs_active,
            recalc_duration_seconds,
            database_connected,
            cache_connected,
        })
    }

    /// Render the registry in the Prometheus text exposition format.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
