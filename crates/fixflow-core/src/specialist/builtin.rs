//! Built-in specialists.

use std::sync::Arc;

use fixflow_domain::Issue;
use tracing::warn;

use crate::specialist::{prompt, Capability, ExpertiseLevel, Specialist, SpecialistRegistry};

/// A code-bound specialist described entirely by data.
#[derive(Debug, Clone)]
pub struct RuleSpecialist {
    name: String,
    capability: Capability,
    expertise_level: ExpertiseLevel,
    focus: String,
    guidelines: Vec<&'static str>,
}

impl RuleSpecialist {
    pub fn new<I, S>(name: &str, codes: I, focus: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.to_string(),
            capability: Capability::codes(codes),
            expertise_level: ExpertiseLevel::Expert,
            focus: focus.to_string(),
            guidelines: Vec::new(),
        }
    }

    pub fn with_guidelines(mut self, guidelines: &[&'static str]) -> Self {
        self.guidelines.extend_from_slice(guidelines);
        self
    }

    pub fn with_expertise(mut self, level: ExpertiseLevel) -> Self {
        self.expertise_level = level;
        self
    }

    pub fn focus(&self) -> &str {
        &self.focus
    }
}

impl Specialist for RuleSpecialist {
    fn name(&self) -> &str {
        &self.name
    }

    fn capability(&self) -> &Capability {
        &self.capability
    }

    fn expertise_level(&self) -> ExpertiseLevel {
        self.expertise_level
    }

    fn description(&self) -> &str {
        &self.focus
    }

    fn system_prompt(&self, issues: &[Issue]) -> String {
        prompt::system_prompt(&self.focus, &self.guidelines, issues)
    }

    fn user_prompt(&self, file_path: &str, content: &str, issues: &[Issue]) -> String {
        prompt::user_prompt(file_path, content, issues)
    }
}

/// Handles every code. Registered as the default.
#[derive(Debug, Clone)]
pub struct GeneralSpecialist {
    capability: Capability,
}

impl GeneralSpecialist {
    pub const NAME: &'static str = "general";

    pub fn new() -> Self {
        Self {
            capability: Capability::All,
        }
    }
}

impl Default for GeneralSpecialist {
    fn default() -> Self {
        Self::new()
    }
}

impl Specialist for GeneralSpecialist {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn capability(&self) -> &Capability {
        &self.capability
    }

    fn expertise_level(&self) -> ExpertiseLevel {
        ExpertiseLevel::General
    }

    fn description(&self) -> &str {
        "general code quality"
    }

    fn system_prompt(&self, issues: &[Issue]) -> String {
        prompt::system_prompt(
            "general code quality across all lint categories",
            &[
                "Address every listed issue in a single pass",
                "Prefer the smallest change that silences the warning correctly",
            ],
            issues,
        )
    }

    fn user_prompt(&self, file_path: &str, content: &str, issues: &[Issue]) -> String {
        prompt::user_prompt(file_path, content, issues)
    }
}

/// The built-in expert specialists, in registration order.
pub fn builtin_specialists() -> Vec<RuleSpecialist> {
    vec![
        RuleSpecialist::new("line_length", ["E501", "W505"], "line length").with_guidelines(&[
            "Break long lines at natural boundaries such as arguments or operators",
            "Use implicit continuation inside brackets rather than backslashes",
        ]),
        RuleSpecialist::new("imports", ["F401", "F811", "E401", "I001"], "import hygiene")
            .with_guidelines(&[
                "Remove unused imports only when nothing re-exports them",
                "Put one import per line and keep import groups sorted",
            ]),
        RuleSpecialist::new(
            "whitespace",
            ["W291", "W293", "W391", "E302", "E303", "E305"],
            "whitespace and blank lines",
        )
        .with_guidelines(&[
            "Strip trailing whitespace",
            "Use two blank lines around top-level definitions",
        ]),
        RuleSpecialist::new("variables", ["F841", "F821", "E741"], "variable naming and usage")
            .with_guidelines(&[
                "Remove or use assigned-but-unused variables",
                "Rename ambiguous single-letter names such as l, O and I",
            ]),
        RuleSpecialist::new("comparisons", ["E711", "E712", "E721"], "comparison idioms")
            .with_guidelines(&[
                "Compare to None with `is` / `is not`",
                "Use isinstance() instead of comparing types directly",
            ]),
    ]
}

/// Registry holding every built-in expert plus [`GeneralSpecialist`] as default.
pub fn builtin_registry() -> SpecialistRegistry {
    let mut registry = SpecialistRegistry::new(Arc::new(GeneralSpecialist::new()));
    for specialist in builtin_specialists() {
        if let Err(err) = registry.register(Arc::new(specialist)) {
            warn!(error = %err, "skipping built-in specialist");
        }
    }
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_names_and_order() {
        let registry = builtin_registry();
        let names: Vec<_> = registry.iter().map(|s| s.name().to_string()).collect();
        assert_eq!(
            names,
            vec!["line_length", "imports", "whitespace", "variables", "comparisons", "general"]
        );
        assert_eq!(registry.default_specialist().name(), "general");
    }

    #[test]
    fn test_builtin_experts_are_code_bound() {
        for specialist in builtin_specialists() {
            assert_eq!(specialist.expertise_level(), ExpertiseLevel::Expert);
            assert!(!specialist.capability().is_universal());
        }
        let general = GeneralSpecialist::new();
        assert!(general.capability().is_universal());
        assert_eq!(general.expertise_level(), ExpertiseLevel::General);
    }

    #[test]
    fn test_rule_specialist_prompts_are_pure() {
        let specialist = &builtin_specialists()[0];
        let issues = vec![Issue::new("E501", 3, "line too long (91 > 79)", "x = 1")];
        assert_eq!(specialist.system_prompt(&issues), specialist.system_prompt(&issues));
        assert!(specialist.system_prompt(&issues).contains("line length"));
        assert!(specialist
            .user_prompt("a.py", "x = 1", &issues)
            .contains("line 3 [E501]"));
    }
}
