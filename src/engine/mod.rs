//! Pure computation core: unit normalization, percentage changes, period
//! comparison, dimension keys, series assembly, thresholds and trend
//! snapshots. Nothing in here performs I/O; the storage collaborators feed
//! rows in and persist results out.

pub mod change;
pub mod error;
pub mod keys;
pub mod monthly;
pub mod period;
pub mod query;
pub mod series;
pub mod thresholds;
pub mod trend;
pub mod units;

pub use error::EngineError;
