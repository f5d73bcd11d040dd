//! Error types for the model catalog.

use crate::catalog::ModelKey;

/// Errors produced by catalog lookups and fallback resolution.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("no available backend for strategy {strategy} (tried {})", format_tried(.tried))]
    ModelUnavailable {
        strategy: String,
        tried: Vec<ModelKey>,
    },

    #[error("unknown fallback strategy: {0}")]
    UnknownStrategy(String),

    #[error("unknown model: {0}")]
    UnknownModel(ModelKey),

    #[error("model {0} is already in the catalog")]
    DuplicateModel(ModelKey),
}

fn format_tried(tried: &[ModelKey]) -> String {
    if tried.is_empty() {
        return "nothing".to_string();
    }
    tried
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for catalog operations.
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_lists_attempts() {
        let err = CatalogError::ModelUnavailable {
            strategy: "with_fallback".to_string(),
            tried: vec![ModelKey::new("a", "p1"), ModelKey::new("b", "p2")],
        };
        assert_eq!(
            err.to_string(),
            "no available backend for strategy with_fallback (tried a@p1, b@p2)"
        );
    }

    #[test]
    fn test_empty_chain_display() {
        let err = CatalogError::ModelUnavailable {
            strategy: "local_only".to_string(),
            tried: vec![],
        };
        assert!(err.to_string().ends_with("(tried nothing)"));
    }
}
