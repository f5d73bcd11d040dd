//! Specialist scoring and deterministic selection.
//!
//! A batch of issues is scored against every registered specialist; the
//! strict maximum wins and ties go to the earlier registration. The default
//! specialist is considered last, so a specific specialist that covers the
//! whole batch beats it while partial coverage does not.

use std::sync::Arc;

use fixflow_domain::{count_by_code, Issue};
use tracing::warn;

use crate::metrics::METRICS;
use crate::obs;
use crate::specialist::{Capability, Specialist, SpecialistError, SpecialistRegistry};

/// True when the specialist supports at least one issue code in the batch.
pub fn can_handle(specialist: &dyn Specialist, issues: &[Issue]) -> bool {
    match specialist.capability() {
        Capability::All => true,
        Capability::Codes(codes) => issues.iter().any(|i| codes.contains(&i.code)),
    }
}

/// [`can_handle`] over bare issue codes.
pub fn can_handle_codes<S: AsRef<str>>(specialist: &dyn Specialist, codes: &[S]) -> bool {
    match specialist.capability() {
        Capability::All => true,
        Capability::Codes(supported) => codes.iter().any(|c| supported.contains(c.as_ref())),
    }
}

fn supported_count(capability: &Capability, issues: &[Issue]) -> usize {
    issues.iter().filter(|i| capability.supports(&i.code)).count()
}

/// Fraction of the batch the specialist supports; 0 when it cannot handle
/// the batch or the batch is empty.
pub fn confidence_multiplier(specialist: &dyn Specialist, issues: &[Issue]) -> f64 {
    if issues.is_empty() || !can_handle(specialist, issues) {
        return 0.0;
    }
    supported_count(specialist.capability(), issues) as f64 / issues.len() as f64
}

/// Frequency-weighted share of the batch the specialist covers, in `[0, 1]`.
///
/// Universal specialists score 1.0 for any batch.
pub fn specialization_score(specialist: &dyn Specialist, issues: &[Issue]) -> f64 {
    match specialist.capability() {
        Capability::All => 1.0,
        Capability::Codes(codes) => {
            if issues.is_empty() {
                return 0.0;
            }
            let covered: usize = count_by_code(issues)
                .into_iter()
                .filter(|(code, _)| codes.contains(*code))
                .map(|(_, count)| count)
                .sum();
            covered as f64 / issues.len() as f64
        }
    }
}

/// The chosen specialist and its score.
#[derive(Debug, Clone)]
pub struct Selection {
    pub specialist: Arc<dyn Specialist>,
    pub score: f64,
}

impl Selection {
    pub fn name(&self) -> &str {
        self.specialist.name()
    }
}

/// Selects specialists from a shared registry.
#[derive(Debug, Clone)]
pub struct SpecialistSelector {
    registry: Arc<SpecialistRegistry>,
}

impl SpecialistSelector {
    pub fn new(registry: Arc<SpecialistRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<SpecialistRegistry> {
        &self.registry
    }

    /// Pick the specialist for `issues`.
    pub fn select(&self, issues: &[Issue]) -> Arc<dyn Specialist> {
        self.select_with_score(issues).specialist
    }

    /// Pick the specialist for `issues`, returning its score as well.
    pub fn select_with_score(&self, issues: &[Issue]) -> Selection {
        let selection = self.choose(issues);
        METRICS.inc_specialists_selected();
        obs::emit_specialist_selected(selection.name(), selection.score, issues.len());
        selection
    }

    fn choose(&self, issues: &[Issue]) -> Selection {
        let default = self.registry.default_specialist();
        if issues.is_empty() {
            let score = specialization_score(default.as_ref(), issues);
            return Selection {
                specialist: default,
                score,
            };
        }

        let mut best: Option<Selection> = None;
        for specialist in self.registry.iter() {
            let score = specialization_score(specialist.as_ref(), issues);
            if best.as_ref().map_or(true, |b| score > b.score) {
                best = Some(Selection {
                    specialist: Arc::clone(specialist),
                    score,
                });
            }
        }

        match best {
            Some(selection) if selection.score > 0.0 => selection,
            _ => {
                let err = SpecialistError::NoApplicableSpecialist {
                    codes: fixflow_domain::distinct_codes(issues),
                };
                warn!(error = %err, fallback = %default.name(), "falling back to default specialist");
                let score = specialization_score(default.as_ref(), issues);
                Selection {
                    specialist: default,
                    score,
                }
            }
        }
    }

    /// Every specialist with its score, best first. Ties keep selection order.
    pub fn rank(&self, issues: &[Issue]) -> Vec<(String, f64)> {
        let mut ranked: Vec<(String, f64)> = self
            .registry
            .iter()
            .map(|s| (s.name().to_string(), specialization_score(s.as_ref(), issues)))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}
