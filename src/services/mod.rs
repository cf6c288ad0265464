//! Service layer composing the engine with its storage and metadata
//! collaborators.

pub mod indicator;
pub mod metadata;
pub mod recalc;

pub use indicator::IndicatorService;
pub use metadata::MetadataService;
pub use recalc::RecalcService;
