//! Lint issue records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single detected problem at a file location.
///
/// Issues are produced by the upstream lint run and never mutated by the
/// core. Field names on the wire are camelCase (`lineContent`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// Classification code (e.g. "E501").
    pub code: String,

    /// Line number (1-indexed).
    pub line: usize,

    /// Human-readable message.
    pub message: String,

    /// Text of the offending line.
    pub line_content: String,
}

impl Issue {
    /// Create a new issue.
    pub fn new(
        code: impl Into<String>,
        line: usize,
        message: impl Into<String>,
        line_content: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            line,
            message: message.into(),
            line_content: line_content.into(),
        }
    }
}

/// Count issues per code, ordered by code.
pub fn count_by_code(issues: &[Issue]) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for issue in issues {
        *counts.entry(issue.code.as_str()).or_insert(0) += 1;
    }
    counts
}

/// Distinct codes in first-seen order.
pub fn distinct_codes(issues: &[Issue]) -> Vec<String> {
    let mut seen = Vec::new();
    for issue in issues {
        if !seen.iter().any(|c: &String| c == &issue.code) {
            seen.push(issue.code.clone());
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_uses_camel_case_field_names() {
        let issue = Issue::new("E501", 12, "line too long (95 > 79)", "x = 1");
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["code"], "E501");
        assert_eq!(json["line"], 12);
        assert_eq!(json["lineContent"], "x = 1");
        assert!(json.get("line_content").is_none());
    }

    #[test]
    fn test_count_by_code_groups_duplicates() {
        let issues = vec![
            Issue::new("E501", 1, "", ""),
            Issue::new("F401", 2, "", ""),
            Issue::new("E501", 3, "", ""),
        ];
        let counts = count_by_code(&issues);
        assert_eq!(counts.get("E501"), Some(&2));
        assert_eq!(counts.get("F401"), Some(&1));
    }

    #[test]
    fn test_distinct_codes_preserves_first_seen_order() {
        let issues = vec![
            Issue::new("F401", 1, "", ""),
            Issue::new("E501", 2, "", ""),
            Issue::new("F401", 3, "", ""),
        ];
        assert_eq!(distinct_codes(&issues), vec!["F401", "E501"]);
    }
}
