//! Prompt builders shared by the built-in specialists.

use std::fmt::Write as _;

use fixflow_domain::{count_by_code, Issue};

/// Instructions describing the structured reply every specialist expects.
pub const RESPONSE_CONTRACT: &str = r#"Respond with a single JSON object and nothing else:
{
  "success": true | false,
  "fixedCode": "<the complete corrected code block>",
  "changesMade": ["<one entry per change>"],
  "confidence": <number between 0 and 1>,
  "explanation": "<short rationale>"
}
If you cannot fix the issues safely, set "success" to false and return the original code."#;

/// One line per issue, followed by the offending source line.
pub fn format_issues(issues: &[Issue]) -> String {
    let mut out = String::new();
    for issue in issues {
        let _ = writeln!(out, "- line {} [{}] {}", issue.line, issue.code, issue.message);
        let snippet = issue.line_content.trim_end();
        if !snippet.is_empty() {
            let _ = writeln!(out, "    > {snippet}");
        }
    }
    out
}

/// `E501 (2), F401 (1)` style summary ordered by code.
pub fn code_summary(issues: &[Issue]) -> String {
    count_by_code(issues)
        .into_iter()
        .map(|(code, count)| format!("{code} ({count})"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// System prompt for a focused specialist.
pub fn system_prompt(focus: &str, guidelines: &[&str], issues: &[Issue]) -> String {
    let mut out = format!(
        "You are an automated code-remediation specialist focused on {focus}.\n\
         Fix only the reported issues. Preserve behavior, formatting conventions and comments.\n"
    );
    if !guidelines.is_empty() {
        out.push_str("\nGuidelines:\n");
        for guideline in guidelines {
            let _ = writeln!(out, "- {guideline}");
        }
    }
    if !issues.is_empty() {
        let _ = writeln!(out, "\nIssue codes in this batch: {}", code_summary(issues));
    }
    out.push('\n');
    out.push_str(RESPONSE_CONTRACT);
    out
}

/// User prompt: file path, issue list and the code block to fix.
pub fn user_prompt(file_path: &str, content: &str, issues: &[Issue]) -> String {
    format!(
        "File: {file_path}\n\nIssues to fix ({count}):\n{issues}\nCode:\n```\n{content}\n```\n\n\
         Return the corrected version of the code block above.",
        count = issues.len(),
        issues = format_issues(issues),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issues() -> Vec<Issue> {
        vec![
            Issue::new("F401", 1, "'os' imported but unused", "import os"),
            Issue::new("E501", 7, "line too long (99 > 79)", "x = compute(aaa, bbb)   "),
            Issue::new("E501", 9, "line too long (88 > 79)", ""),
        ]
    }

    #[test]
    fn test_format_issues_includes_snippets() {
        let text = format_issues(&issues());
        assert!(text.contains("- line 1 [F401] 'os' imported but unused"));
        assert!(text.contains("    > x = compute(aaa, bbb)\n"));
        assert_eq!(text.matches("    >").count(), 2);
    }

    #[test]
    fn test_code_summary_counts_per_code() {
        assert_eq!(code_summary(&issues()), "E501 (2), F401 (1)");
        assert_eq!(code_summary(&[]), "");
    }

    #[test]
    fn test_system_prompt_carries_contract() {
        let prompt = system_prompt("line length", &["Wrap at 79 columns"], &issues());
        assert!(prompt.contains("focused on line length"));
        assert!(prompt.contains("- Wrap at 79 columns"));
        assert!(prompt.contains("E501 (2), F401 (1)"));
        assert!(prompt.contains("\"fixedCode\""));
        assert!(prompt.contains("\"changesMade\""));
    }

    #[test]
    fn test_user_prompt_embeds_code() {
        let prompt = user_prompt("app/main.py", "import os\nprint(1)", &issues());
        assert!(prompt.starts_with("File: app/main.py"));
        assert!(prompt.contains("Issues to fix (3):"));
        assert!(prompt.contains("```\nimport os\nprint(1)\n```"));
    }
}
