//! Error types for component splitting.

use std::time::Duration;

/// Errors returned to the caller of a split.
///
/// Chunk-level failures are not errors of the call; they are reported as
/// [`ChunkError`] values inside the split outcome.
#[derive(Debug, thiserror::Error)]
pub enum SplitError {
    #[error("invalid split config: {0}")]
    InvalidConfig(String),
}

/// Result type for splitter operations.
pub type SplitResult<T> = std::result::Result<T, SplitError>;

/// Why a window contributed no components.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChunkErrorKind {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("scan failed: {0}")]
    Failed(String),

    #[error("cancelled")]
    Cancelled,
}

/// A dropped window. Lines are 1-indexed and inclusive.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("chunk {index} (lines {start_line}-{end_line}) {kind}")]
pub struct ChunkError {
    pub index: usize,
    pub start_line: usize,
    pub end_line: usize,
    pub kind: ChunkErrorKind,
}
