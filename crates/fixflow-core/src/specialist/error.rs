//! Error types for the specialist registry.

/// Errors produced by the specialist layer.
#[derive(Debug, thiserror::Error)]
pub enum SpecialistError {
    #[error("specialist {name} is already registered")]
    DuplicateSpecialist { name: String },

    #[error("unknown specialist: {name}")]
    UnknownSpecialist { name: String },

    /// Kept as a named safety net: `select` falls back to the default
    /// specialist instead of returning it.
    #[error("no registered specialist handles codes {codes:?}")]
    NoApplicableSpecialist { codes: Vec<String> },
}

/// Result type for specialist operations.
pub type SpecialistResult<T> = std::result::Result<T, SpecialistError>;
