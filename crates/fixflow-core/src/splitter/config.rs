//! Split configuration.

use serde::{Deserialize, Serialize};

use crate::splitter::error::{SplitError, SplitResult};

/// Per-call configuration for [`ComponentSplitter`](crate::splitter::ComponentSplitter).
///
/// Every field is defaulted; there is no hidden global state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// A file longer than this needs splitting.
    pub max_lines: usize,
    /// A file with more function markers than this needs splitting.
    pub max_functions: usize,
    /// A file with more class markers than this needs splitting.
    pub max_classes: usize,
    /// A file whose complexity score exceeds this needs splitting.
    pub max_complexity: f64,
    /// Use overlapping parallel windows for large files.
    pub enable_parallel: bool,
    /// Lines per window.
    pub chunk_size: usize,
    /// Lines shared by consecutive windows.
    pub line_overlap: usize,
    /// Upper bound on windows scanned concurrently in one call.
    pub max_parallel_workers: usize,
    /// Per-window time budget.
    pub chunk_timeout_seconds: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            max_lines: 500,
            max_functions: 20,
            max_classes: 5,
            max_complexity: 50.0,
            enable_parallel: true,
            chunk_size: 500,
            line_overlap: 50,
            max_parallel_workers: 4,
            chunk_timeout_seconds: 60,
        }
    }
}

impl SplitConfig {
    /// Sequential-only configuration.
    pub fn sequential() -> Self {
        Self {
            enable_parallel: false,
            ..Default::default()
        }
    }

    /// Validate window and pool parameters.
    pub fn validate(&self) -> SplitResult<()> {
        if self.chunk_size == 0 {
            return Err(SplitError::InvalidConfig(
                "chunk_size must be > 0".to_string(),
            ));
        }
        if self.line_overlap >= self.chunk_size {
            return Err(SplitError::InvalidConfig(format!(
                "line_overlap ({}) must be smaller than chunk_size ({})",
                self.line_overlap, self.chunk_size
            )));
        }
        if self.max_parallel_workers == 0 {
            return Err(SplitError::InvalidConfig(
                "max_parallel_workers must be > 0".to_string(),
            ));
        }
        if self.chunk_timeout_seconds == 0 {
            return Err(SplitError::InvalidConfig(
                "chunk_timeout_seconds must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_config_default() {
        let config = SplitConfig::default();
        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.max_parallel_workers, 4);
        assert_eq!(config.chunk_timeout_seconds, 60);
        assert!(config.enable_parallel);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overlap_must_be_smaller_than_chunk() {
        let config = SplitConfig {
            chunk_size: 100,
            line_overlap: 100,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("line_overlap"));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let config = SplitConfig {
            max_parallel_workers: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: SplitConfig = toml::from_str("chunk_size = 200\nline_overlap = 20\n").unwrap();
        assert_eq!(config.chunk_size, 200);
        assert_eq!(config.line_overlap, 20);
        assert_eq!(config.max_parallel_workers, 4);
    }
}
