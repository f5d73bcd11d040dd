//! Named fallback chains.

use serde::{Deserialize, Serialize};

use crate::catalog::ModelKey;

pub const PRIMARY: &str = "primary";
pub const WITH_FALLBACK: &str = "with_fallback";
pub const LOCAL_ONLY: &str = "local_only";

/// Ordered list of backends to try for one strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FallbackChain {
    entries: Vec<ModelKey>,
}

impl FallbackChain {
    pub fn new(entries: Vec<ModelKey>) -> Self {
        Self { entries }
    }

    /// Build a chain from `(model, provider)` pairs.
    pub fn of(pairs: &[(&str, &str)]) -> Self {
        Self::new(pairs.iter().map(|(m, p)| ModelKey::new(m, p)).collect())
    }

    pub fn entries(&self) -> &[ModelKey] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
