//! Model profiles and their `(model, provider)` keys.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

/// Identity of a backend: a model served by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModelKey {
    pub model: String,
    pub provider: String,
}

impl ModelKey {
    pub fn new(model: &str, provider: &str) -> Self {
        Self {
            model: model.to_string(),
            provider: provider.to_string(),
        }
    }
}

impl std::fmt::Display for ModelKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.model, self.provider)
    }
}

/// A backend model with static release state and probed reachability.
///
/// `release_available` is fixed at construction. `endpoint_available`
/// starts `false` and is written only by availability probes.
#[derive(Debug)]
pub struct ModelProfile {
    key: ModelKey,
    release_available: bool,
    endpoint_available: AtomicBool,
    competency_ratings: BTreeMap<String, f64>,
    recommended_use_cases: Vec<String>,
}

impl ModelProfile {
    pub fn new(model: &str, provider: &str, release_available: bool) -> Self {
        Self {
            key: ModelKey::new(model, provider),
            release_available,
            endpoint_available: AtomicBool::new(false),
            competency_ratings: BTreeMap::new(),
            recommended_use_cases: Vec::new(),
        }
    }

    /// Set the competency for `code`, clamped to `[0, 1]`.
    pub fn with_competency(mut self, code: &str, rating: f64) -> Self {
        let rating = if rating.is_nan() { 0.0 } else { rating.clamp(0.0, 1.0) };
        self.competency_ratings.insert(code.to_string(), rating);
        self
    }

    pub fn with_use_case(mut self, use_case: &str) -> Self {
        self.recommended_use_cases.push(use_case.to_string());
        self
    }

    pub fn key(&self) -> &ModelKey {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.key.model
    }

    pub fn provider(&self) -> &str {
        &self.key.provider
    }

    pub fn release_available(&self) -> bool {
        self.release_available
    }

    pub fn endpoint_available(&self) -> bool {
        self.endpoint_available.load(Ordering::Acquire)
    }

    pub(crate) fn set_endpoint_available(&self, available: bool) {
        self.endpoint_available.store(available, Ordering::Release);
    }

    pub fn competency_ratings(&self) -> &BTreeMap<String, f64> {
        &self.competency_ratings
    }

    pub fn recommended_use_cases(&self) -> &[String] {
        &self.recommended_use_cases
    }

    /// Rating for `code`; unrated codes score 0.
    pub fn competency(&self, code: &str) -> f64 {
        self.competency_ratings.get(code).copied().unwrap_or(0.0)
    }

    /// Mean competency over `codes`; 0 for an empty slice.
    pub fn mean_competency<S: AsRef<str>>(&self, codes: &[S]) -> f64 {
        if codes.is_empty() {
            return 0.0;
        }
        let total: f64 = codes.iter().map(|c| self.competency(c.as_ref())).sum();
        total / codes.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_profile_is_not_reachable_until_probed() {
        let profile = ModelProfile::new("gpt-4o", "openai", true);
        assert!(profile.release_available());
        assert!(!profile.endpoint_available());
        profile.set_endpoint_available(true);
        assert!(profile.endpoint_available());
        assert!(profile.release_available());
    }

    #[test]
    fn test_competency_missing_codes_score_zero() {
        let profile = ModelProfile::new("m", "p", true)
            .with_competency("E501", 0.8)
            .with_competency("F401", 1.7);
        assert_eq!(profile.competency("F401"), 1.0);
        assert_eq!(profile.competency("W291"), 0.0);
        assert!((profile.mean_competency(&["E501", "W291"]) - 0.4).abs() < 1e-9);
        assert_eq!(profile.mean_competency::<&str>(&[]), 0.0);
    }

    #[test]
    fn test_key_display() {
        assert_eq!(ModelKey::new("codellama", "ollama").to_string(), "codellama@ollama");
    }
}
