//! Fix specialists: capability-bound handlers that turn an issue batch into
//! prompts for the invocation collaborator.
//!
//! # Module layout
//!
//! - [`error`] — `SpecialistError`, `SpecialistResult`
//! - [`prompt`] — shared prompt builders and the response contract text
//! - [`builtin`] — the built-in specialists and `builtin_registry`
//! - [`performance`] — per-specialist attempt/success/confidence records
//! - [`registry`] — `SpecialistRegistry`
//! - [`selector`] — scoring functions and `SpecialistSelector`

pub mod builtin;
pub mod error;
pub mod performance;
pub mod prompt;
pub mod registry;
pub mod selector;

use std::collections::BTreeSet;

use fixflow_domain::Issue;
use serde::{Deserialize, Serialize};

pub use builtin::{builtin_registry, builtin_specialists, GeneralSpecialist, RuleSpecialist};
pub use error::{SpecialistError, SpecialistResult};
pub use performance::{PerformanceRecord, SpecialistPerformance, SpecialistStats};
pub use registry::SpecialistRegistry;
pub use selector::{
    can_handle, can_handle_codes, confidence_multiplier, specialization_score, Selection,
    SpecialistSelector,
};

/// Which issue codes a specialist accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "codes", rename_all = "snake_case")]
pub enum Capability {
    /// Matches every code.
    All,
    /// Matches exactly these codes.
    Codes(BTreeSet<String>),
}

impl Capability {
    /// Build a finite capability from codes.
    pub fn codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Capability::Codes(codes.into_iter().map(Into::into).collect())
    }

    pub fn supports(&self, code: &str) -> bool {
        match self {
            Capability::All => true,
            Capability::Codes(codes) => codes.contains(code),
        }
    }

    pub fn is_universal(&self) -> bool {
        matches!(self, Capability::All)
    }
}

/// Depth of a specialist's focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpertiseLevel {
    General,
    Expert,
}

impl std::fmt::Display for ExpertiseLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ExpertiseLevel::General => "general",
            ExpertiseLevel::Expert => "expert",
        };
        write!(f, "{s}")
    }
}

/// A fix specialist.
///
/// Prompt construction must be a pure function of its inputs.
pub trait Specialist: Send + Sync {
    /// Unique registry name.
    fn name(&self) -> &str;

    fn capability(&self) -> &Capability;

    fn expertise_level(&self) -> ExpertiseLevel;

    /// One-line description used in logs.
    fn description(&self) -> &str {
        ""
    }

    /// Instructions framing the fix request.
    fn system_prompt(&self, issues: &[Issue]) -> String;

    /// The concrete request: file, issues and the code to fix.
    fn user_prompt(&self, file_path: &str, content: &str, issues: &[Issue]) -> String;
}

impl std::fmt::Debug for dyn Specialist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Specialist")
            .field("name", &self.name())
            .field("expertise", &self.expertise_level())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_supports() {
        let codes = Capability::codes(["E501", "W505"]);
        assert!(codes.supports("E501"));
        assert!(!codes.supports("F401"));
        assert!(!codes.is_universal());

        assert!(Capability::All.supports("anything"));
        assert!(Capability::All.is_universal());
    }

    #[test]
    fn test_capability_serde_is_tagged() {
        let json = serde_json::to_value(Capability::codes(["F401"])).unwrap();
        assert_eq!(json["kind"], "codes");
        assert_eq!(json["codes"][0], "F401");

        let all: Capability = serde_json::from_str(r#"{"kind":"all"}"#).unwrap();
        assert_eq!(all, Capability::All);
    }
}
