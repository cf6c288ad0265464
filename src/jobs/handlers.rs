//! Job handlers for the category recalculation workflow
//!
//! The chain per category is
//! RecomputeDeltasJob → ComputeThresholdsJob → ComputeTrendsJob: deltas
//! must land before thresholds and trends read them, and each stage
//! enqueues the next only after its own replace committed.

use crate::jobs::context::JobContext;
use crate::jobs::types::{ComputeThresholdsJob, ComputeTrendsJob, RecomputeDeltasJob};
use apalis::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

fn stage_error(stage: &str, e: impl std::fmt::Display) -> Box<dyn std::error::Error + Send + Sync> {
    Box::new(std::io::Error::other(format!("{} failed: {}", stage, e)))
}

/// Handler for the delta recomputation job
///
/// Runs the windowed delta update, then enqueues ComputeThresholdsJob.
pub async fn handle_recompute_deltas(
    job: RecomputeDeltasJob,
    ctx: Data<Arc<JobContext>>,
    thresholds_storage: Data<apalis_redis::RedisStorage<ComputeThresholdsJob>>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let start = Instant::now();
    if let Some(ref metrics) = ctx.metrics {
        metrics.recalc_runs_active.inc();
    }

    debug!(category = %job.category_id, "RecomputeDeltasJob: starting for {}", job.category_id);

    let result = ctx.recalc.recompute_deltas(&job.category_id).await;
    finish_stage(ctx.metrics.as_deref(), start, result.is_ok());
    let updated = result.map_err(|e| {
        error!(category = %job.category_id, error = %e, "RecomputeDeltasJob: failed for {}", job.category_id);
        stage_error("RecomputeDeltasJob", e)
    })?;

    info!(
        category = %job.category_id,
        rows = updated,
        "RecomputeDeltasJob: updated {} rows for {}",
        updated,
        job.category_id
    );

    let next_job = ComputeThresholdsJob {
        category_id: job.category_id.clone(),
    };
    let mut storage = (*thresholds_storage).clone();
    storage
        .push(next_job)
        .await
        .map_err(|e| stage_error("Enqueue ComputeThresholdsJob", e))?;

    debug!(category = %job.category_id, "RecomputeDeltasJob: enqueued ComputeThresholdsJob");
    Ok(())
}

/// Handler for the threshold recomputation job
///
/// Replaces all three threshold tiers, then enqueues ComputeTrendsJob.
pub async fn handle_compute_thresholds(
    job: ComputeThresholdsJob,
    ctx: Data<Arc<JobContext>>,
    trends_storage: Data<apalis_redis::RedisStorage<ComputeTrendsJob>>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let start = Instant::now();
    if let Some(ref metrics) = ctx.metrics {
        metrics.recalc_runs_active.inc();
    }

    debug!(category = %job.category_id, "ComputeThresholdsJob: starting for {}", job.category_id);

    let result = ctx.recalc.recompute_thresholds(&job.category_id).await;
    finish_stage(ctx.metrics.as_deref(), start, result.is_ok());
    let rows = result.map_err(|e| {
        error!(category = %job.category_id, error = %e, "ComputeThresholdsJob: failed for {}", job.category_id);
        stage_error("ComputeThresholdsJob", e)
    })?;

    info!(
        category = %job.category_id,
        rows = rows,
        "ComputeThresholdsJob: stored {} threshold rows for {}",
        rows,
        job.category_id
    );

    let next_job = ComputeTrendsJob {
        category_id: job.category_id.clone(),
    };
    let mut storage = (*trends_storage).clone();
    storage
        .push(next_job)
        .await
        .map_err(|e| stage_error("Enqueue ComputeTrendsJob", e))?;

    debug!(category = %job.category_id, "ComputeThresholdsJob: enqueued ComputeTrendsJob");
    Ok(())
}

/// Handler for the trend snapshot job
///
/// Rebuilds the category's trend snapshot. Final step in the chain.
pub async fn handle_compute_trends(
    job: ComputeTrendsJob,
    ctx: Data<Arc<JobContext>>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let start = Instant::now();
    if let Some(ref metrics) = ctx.metrics {
        metrics.recalc_runs_active.inc();
    }

    debug!(category = %job.category_id, "ComputeTrendsJob: starting for {}", job.category_id);

    let result = ctx.recalc.recompute_trends(&job.category_id).await;
    finish_stage(ctx.metrics.as_deref(), start, result.is_ok());
    let rows = result.map_err(|e| {
        error!(category = %job.category_id, error = %e, "ComputeTrendsJob: failed for {}", job.category_id);
        stage_error("ComputeTrendsJob", e)
    })?;

    info!(
        category = %job.category_id,
        rows = rows,
        "ComputeTrendsJob: stored {} trend rows for {}",
        rows,
        job.category_id
    );

    Ok(())
}

fn finish_stage(metrics: Option<&crate::metrics::Metrics>, start: Instant, success: bool) {
    if let Some(metrics) = metrics {
        metrics
            .recalc_duration_seconds
            .observe(start.elapsed().as_secs_f64());
        metrics.recalc_runs_active.dec();
        if success {
            metrics.recalc_runs_total.inc();
        } else {
            metrics.recalc_failures_total.inc();
        }
    }
}
