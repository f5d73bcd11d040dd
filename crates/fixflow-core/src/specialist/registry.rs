//! Specialist registry with per-specialist performance records.

use std::sync::Arc;

use crate::obs;
use crate::specialist::{
    can_handle_codes, Specialist, SpecialistError, SpecialistPerformance, SpecialistResult,
    SpecialistStats,
};

struct Entry {
    specialist: Arc<dyn Specialist>,
    performance: SpecialistPerformance,
}

impl Entry {
    fn new(specialist: Arc<dyn Specialist>) -> Self {
        Self {
            specialist,
            performance: SpecialistPerformance::new(),
        }
    }

    fn stats(&self) -> SpecialistStats {
        SpecialistStats::from_record(
            self.specialist.name(),
            self.specialist.expertise_level(),
            &self.performance.snapshot(),
        )
    }
}

/// Ordered catalog of specialists.
///
/// Iteration yields registered specialists in registration order, then the
/// default specialist last.
pub struct SpecialistRegistry {
    entries: Vec<Entry>,
    default: Entry,
}

impl std::fmt::Debug for SpecialistRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpecialistRegistry")
            .field("specialists", &self.names())
            .field("default", &self.default.specialist.name())
            .finish()
    }
}

impl SpecialistRegistry {
    pub fn new(default: Arc<dyn Specialist>) -> Self {
        Self {
            entries: Vec::new(),
            default: Entry::new(default),
        }
    }

    /// Append a specialist. Names are unique across the registry,
    /// including the default.
    pub fn register(&mut self, specialist: Arc<dyn Specialist>) -> SpecialistResult<()> {
        let name = specialist.name();
        if self.entry(name).is_some() {
            return Err(SpecialistError::DuplicateSpecialist {
                name: name.to_string(),
            });
        }
        self.entries.push(Entry::new(specialist));
        Ok(())
    }

    fn all_entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().chain(std::iter::once(&self.default))
    }

    fn entry(&self, name: &str) -> Option<&Entry> {
        self.all_entries().find(|e| e.specialist.name() == name)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Specialist>> {
        self.entry(name).map(|e| Arc::clone(&e.specialist))
    }

    pub fn default_specialist(&self) -> Arc<dyn Specialist> {
        Arc::clone(&self.default.specialist)
    }

    /// Specialists in selection order (default last).
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Specialist>> {
        self.all_entries().map(|e| &e.specialist)
    }

    pub fn names(&self) -> Vec<&str> {
        self.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len() + 1
    }

    /// Always false: the default specialist is always present.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Specialists that can handle at least one of `codes`, in selection order.
    pub fn specialists_for_codes<S: AsRef<str>>(&self, codes: &[S]) -> Vec<Arc<dyn Specialist>> {
        self.iter()
            .filter(|s| can_handle_codes(s.as_ref(), codes))
            .cloned()
            .collect()
    }

    /// Record one fix attempt for `name`.
    pub fn record(&self, name: &str, success: bool, confidence: f64) -> SpecialistResult<()> {
        let entry = self
            .entry(name)
            .ok_or_else(|| SpecialistError::UnknownSpecialist {
                name: name.to_string(),
            })?;
        entry.performance.record(success, confidence);
        obs::emit_fix_attempt_recorded(name, success, confidence);
        Ok(())
    }

    pub fn stats(&self, name: &str) -> SpecialistResult<SpecialistStats> {
        self.entry(name)
            .map(Entry::stats)
            .ok_or_else(|| SpecialistError::UnknownSpecialist {
                name: name.to_string(),
            })
    }

    pub fn all_stats(&self) -> Vec<SpecialistStats> {
        self.all_entries().map(Entry::stats).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::specialist::{GeneralSpecialist, RuleSpecialist};

    fn registry() -> SpecialistRegistry {
        let mut registry = SpecialistRegistry::new(Arc::new(GeneralSpecialist::new()));
        registry
            .register(Arc::new(RuleSpecialist::new("line_length", ["E501"], "line length")))
            .unwrap();
        registry
            .register(Arc::new(RuleSpecialist::new("imports", ["F401"], "imports")))
            .unwrap();
        registry
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut registry = registry();
        let err = registry
            .register(Arc::new(RuleSpecialist::new("imports", ["F811"], "imports")))
            .unwrap_err();
        assert!(matches!(err, SpecialistError::DuplicateSpecialist { ref name } if name == "imports"));

        let err = registry
            .register(Arc::new(RuleSpecialist::new("general", ["X1"], "x")))
            .unwrap_err();
        assert!(matches!(err, SpecialistError::DuplicateSpecialist { .. }));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_default_is_iterated_last() {
        let registry = registry();
        assert_eq!(registry.names(), vec!["line_length", "imports", "general"]);
        assert!(registry.get("imports").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_specialists_for_codes_prefilter() {
        let registry = registry();
        let names: Vec<_> = registry
            .specialists_for_codes(&["F401"])
            .iter()
            .map(|s| s.name().to_string())
            .collect();
        assert_eq!(names, vec!["imports", "general"]);
    }

    #[test]
    fn test_record_and_stats() {
        let registry = registry();
        registry.record("imports", true, 0.8).unwrap();
        registry.record("imports", false, 0.2).unwrap();

        let stats = registry.stats("imports").unwrap();
        assert_eq!(stats.attempts, 2);
        assert_eq!(stats.successes, 1);
        assert!((stats.success_rate - 0.5).abs() < 1e-9);
        assert!((stats.average_confidence - 0.5).abs() < 1e-9);

        let untouched = registry.stats("line_length").unwrap();
        assert_eq!(untouched.attempts, 0);
        assert_eq!(untouched.success_rate, 0.0);
    }

    #[test]
    fn test_unknown_specialist_errors() {
        let registry = registry();
        assert!(matches!(
            registry.record("nobody", true, 1.0),
            Err(SpecialistError::UnknownSpecialist { .. })
        ));
        assert!(registry.stats("nobody").is_err());
        assert_eq!(registry.all_stats().len(), 3);
    }
}
