//! File components produced by decomposition.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, Result};

/// Structural kind of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentType {
    Function,
    Class,
    Section,
    Module,
}

impl std::fmt::Display for ComponentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ComponentType::Function => "function",
            ComponentType::Class => "class",
            ComponentType::Section => "section",
            ComponentType::Module => "module",
        };
        write!(f, "{s}")
    }
}

/// A contiguous, named sub-range of a file.
///
/// `start_line` and `end_line` are 1-indexed and inclusive; they are all a
/// downstream applier needs to splice a replacement back into the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub name: String,
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    pub start_line: usize,
    pub end_line: usize,
    pub content: String,
    /// Heuristic, unbounded (control-flow keyword count / 10).
    pub complexity_score: f64,
    pub dependencies: BTreeSet<String>,
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Component {
    /// Create a component with no dependencies or metadata.
    pub fn new(
        name: impl Into<String>,
        component_type: ComponentType,
        start_line: usize,
        end_line: usize,
        content: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            component_type,
            start_line,
            end_line,
            content: content.into(),
            complexity_score: 0.0,
            dependencies: BTreeSet::new(),
            metadata: BTreeMap::new(),
        }
    }

    /// Number of lines covered by the range.
    pub fn line_count(&self) -> usize {
        self.end_line.saturating_sub(self.start_line) + 1
    }

    /// Whether `line` (1-indexed) falls inside the range.
    pub fn contains_line(&self, line: usize) -> bool {
        line >= self.start_line && line <= self.end_line
    }

    /// SHA-256 hex digest of the component content.
    pub fn digest(&self) -> String {
        content_digest(&self.content)
    }

    /// Replace this component's line range in `original` with `replacement`.
    ///
    /// A trailing newline on `original` is preserved.
    pub fn splice_into(&self, original: &str, replacement: &str) -> Result<String> {
        let lines: Vec<&str> = original.lines().collect();
        if self.start_line == 0 || self.start_line > self.end_line || self.end_line > lines.len()
        {
            return Err(DomainError::InvalidRange {
                start: self.start_line,
                end: self.end_line,
                line_count: lines.len(),
            });
        }

        let mut out: Vec<&str> = Vec::with_capacity(lines.len());
        out.extend_from_slice(&lines[..self.start_line - 1]);
        out.extend(replacement.lines());
        out.extend_from_slice(&lines[self.end_line..]);

        let mut spliced = out.join("\n");
        if original.ends_with('\n') {
            spliced.push('\n');
        }
        Ok(spliced)
    }
}

/// SHA-256 hex digest of arbitrary text.
pub fn content_digest(content: &str) -> String {
    use sha2::Digest as _;
    hex::encode(sha2::Sha256::digest(content.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> &'static str {
        "import os\n\ndef a():\n    return 1\n\ndef b():\n    return 2\n"
    }

    #[test]
    fn test_line_count_and_contains() {
        let c = Component::new("a", ComponentType::Function, 3, 5, "");
        assert_eq!(c.line_count(), 3);
        assert!(c.contains_line(3));
        assert!(c.contains_line(5));
        assert!(!c.contains_line(2));
        assert!(!c.contains_line(6));
    }

    #[test]
    fn test_splice_replaces_only_the_range() {
        let c = Component::new("a", ComponentType::Function, 3, 4, "");
        let out = c
            .splice_into(sample(), "def a():\n    return 42")
            .unwrap();
        assert_eq!(
            out,
            "import os\n\ndef a():\n    return 42\n\ndef b():\n    return 2\n"
        );
    }

    #[test]
    fn test_splice_can_change_line_count() {
        let c = Component::new("b", ComponentType::Function, 6, 7, "");
        let out = c.splice_into(sample(), "def b():\n    x = 2\n    return x").unwrap();
        assert_eq!(out.lines().count(), 8);
        assert!(out.ends_with("    return x\n"));
    }

    #[test]
    fn test_splice_rejects_out_of_range() {
        let c = Component::new("z", ComponentType::Function, 6, 40, "");
        let err = c.splice_into(sample(), "").unwrap_err();
        assert!(matches!(err, DomainError::InvalidRange { end: 40, .. }));

        let zero = Component::new("z", ComponentType::Function, 0, 1, "");
        assert!(zero.splice_into(sample(), "").is_err());
    }

    #[test]
    fn test_component_type_serializes_as_type_field() {
        let c = Component::new("Foo", ComponentType::Class, 1, 2, "class Foo:\n    pass");
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["type"], "class");
        assert_eq!(json["startLine"], 1);
        assert_eq!(json["complexityScore"], 0.0);
    }

    #[test]
    fn test_digest_is_stable() {
        let a = Component::new("a", ComponentType::Function, 1, 1, "def a(): pass");
        let b = Component::new("b", ComponentType::Function, 9, 9, "def a(): pass");
        assert_eq!(a.digest(), b.digest());
        assert_eq!(a.digest().len(), 64);
    }
}
