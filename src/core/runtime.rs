//! Apalis worker setup for the recalculation job chain

use crate::jobs::context::JobContext;
use crate::jobs::handlers;
use crate::jobs::types::{ComputeThresholdsJob, ComputeTrendsJob, RecomputeDeltasJob};
use apalis::prelude::*;
use apalis_redis::RedisStorage;
use std::sync::Arc;
use tracing::info;

/// Configuration for the recalculation runtime
#[derive(Clone)]
pub struct RuntimeConfig {
    pub recalc_interval_seconds: u64,
    pub categories: Vec<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            recalc_interval_seconds: 86_400,
            categories: Vec::new(),
        }
    }
}

/// Runtime that sets up one Apalis worker per recalculation stage
pub struct RecalcRuntime {
    _config: RuntimeConfig,
    job_context: Arc<JobContext>,
    deltas_storage: Arc<RedisStorage<RecomputeDeltasJob>>,
    thresholds_storage: Arc<RedisStorage<ComputeThresholdsJob>>,
    trends_storage: Arc<RedisStorage<ComputeTrendsJob>>,
}

impl RecalcRuntime {
    pub fn new(
        config: RuntimeConfig,
        job_context: Arc<JobContext>,
        deltas_storage: Arc<RedisStorage<RecomputeDeltasJob>>,
        thresholds_storage: Arc<RedisStorage<ComputeThresholdsJob>>,
        trends_storage: Arc<RedisStorage<ComputeTrendsJob>>,
    ) -> Self {
        Self {
            _config: config,
            job_context,
            deltas_storage,
            thresholds_storage,
            trends_storage,
        }
    }

    /// Start all stage workers and return handles for graceful shutdown
    pub async fn start_workers(
        &self,
    ) -> Result<Vec<tokio::task::JoinHandle<()>>, Box<dyn std::error::Error + Send + Sync>> {
        let mut handles = Vec::new();

        // Worker for RecomputeDeltasJob
        let deltas_storage = (*self.deltas_storage).clone();
        let thresholds_storage = self.thresholds_storage.clone();
        let job_context = self.job_context.clone();
        let deltas_handle = tokio::spawn(async move {
            let worker = WorkerBuilder::new("recompute-deltas-worker")
                .data(job_context.clone())
                .data(thresholds_storage.as_ref().clone())
                .backend(deltas_storage)
                .build_fn(handlers::handle_recompute_deltas);

            info!("RecalcRuntime: RecomputeDeltasJob worker started");
            worker.run().await;
        });
        handles.push(deltas_handle);

        // Worker for ComputeThresholdsJob
        let thresholds_storage_worker = (*self.thresholds_storage).clone();
        let trends_storage = self.trends_storage.clone();
        let job_context_thresholds = self.job_context.clone();
        let thresholds_handle = tokio::spawn(async move {
            let worker = WorkerBuilder::new("compute-thresholds-worker")
                .data(job_context_thresholds.clone())
                .data(trends_storage.as_ref().clone())
                .backend(thresholds_storage_worker)
                .build_fn(handlers::handle_compute_thresholds);

            info!("RecalcRuntime: ComputeThresholdsJob worker started");
            worker.run().await;
        });
        handles.push(thresholds_handle);

        // Worker for ComputeTrendsJob
        let trends_storage_worker = (*self.trends_storage).clone();
        let job_context_trends = self.job_context.clone();
        let trends_handle = tokio::spawn(async move {
            let worker = WorkerBuilder::new("compute-trends-worker")
                .data(job_context_trends.clone())
                .backend(trends_storage_worker)
                .build_fn(handlers::handle_compute_trends);

            info!("RecalcRuntime: ComputeTrendsJob worker started");
            worker.run().await;
        });
        handles.push(trends_handle);

        info!("RecalcRuntime: all workers started");
        Ok(handles)
    }
}
