//! Job context for dependency injection

use std::sync::Arc;

use crate::metrics::Metrics;
use crate::services::RecalcService;

/// Context passed to job handlers via Apalis `Data<T>`.
///
/// Jobs only drive the recalculation service and record metrics; they never
/// open connections of their own.
pub struct JobContext {
    pub recalc: Arc<RecalcService>,
    pub metrics: Option<Arc<Metrics>>,
}

impl JobContext {
    pub fn new(recalc: Arc<RecalcService>, metrics: Option<Arc<Metrics>>) -> Self {
        Self { recalc, metrics }
    }
}
