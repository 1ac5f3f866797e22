use thiserror::Error;

/// Errors reported by map lookups.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScatterMapError {
    /// Indexed lookup of a missing key on a map whose values cannot
    /// represent absence.
    #[error("cannot find value for key {key}")]
    KeyNotFound { key: String },
}

pub type Result<T> = std::result::Result<T, ScatterMapError>;
