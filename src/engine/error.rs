use std::fmt;

/// Engine-level configuration errors. These are fatal and surfaced
/// immediately; data-quality problems are logged and recovered locally
/// instead of raised through this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// An indicator configured with no dimension values has undefined
    /// filter semantics.
    EmptyItems(String),
    UnknownCategory(String),
    UnknownIndicator(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::EmptyItems(name) => {
                write!(f, "indicator '{}' has an empty items list", name)
            }
            EngineError::UnknownCategory(id) => write!(f, "category '{}' not found", id),
            EngineError::UnknownIndicator(name) => write!(f, "indicator '{}' not found", name),
        }
    }
}

impl std::error::Error for EngineError {}
