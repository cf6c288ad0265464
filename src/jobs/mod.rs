//! Job queue system for the category recalculation chain

pub mod context;
pub mod handlers;
pub mod types;

pub use context::JobContext;
pub use types::{ComputeThresholdsJob, ComputeTrendsJob, RecomputeDeltasJob};
