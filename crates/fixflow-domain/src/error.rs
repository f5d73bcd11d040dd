//! Domain-level error taxonomy for fixflow.

/// Errors produced while handling boundary records.
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("malformed fix response: {0}")]
    MalformedResponse(String),

    #[error("invalid line range {start}..={end} for content of {line_count} lines")]
    InvalidRange {
        start: usize,
        end: usize,
        line_count: usize,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for domain operations.
pub type Result<T> = std::result::Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_response_display() {
        let err = DomainError::MalformedResponse("missing field `fixedCode`".to_string());
        let msg = err.to_string();
        assert!(msg.contains("malformed fix response"));
        assert!(msg.contains("fixedCode"));
    }

    #[test]
    fn test_invalid_range_display() {
        let err = DomainError::InvalidRange {
            start: 10,
            end: 4,
            line_count: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("10..=4"));
        assert!(msg.contains("3 lines"));
    }
}
