//! Indicatrix - indicator aggregation and trend engine for the
//! socio-economic dashboard backend.
//!
//! The `engine` module holds the pure computation core (series assembly,
//! thresholds, trend snapshots); `db`, `cache` and `services` are the
//! storage and metadata collaborators around it; `core` and `jobs` wire
//! the HTTP surface and the recalculation worker.

pub mod cache;
pub mod config;
pub mod core;
pub mod db;
pub mod engine;
pub mod jobs;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
