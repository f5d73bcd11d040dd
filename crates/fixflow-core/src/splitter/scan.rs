//! Sequential boundary scan.
//!
//! Components are found with textual markers, not a parser: a marker line
//! closes the open component and opens a new one, end of input closes the
//! last one.

use std::collections::{BTreeSet, HashSet};
use std::sync::OnceLock;

use fixflow_domain::{Component, ComponentType};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::splitter::config::SplitConfig;

/// Name given to the lines that precede the first marker of a file.
pub const MODULE_PREAMBLE: &str = "<module>";

/// Name given to the lines of a window that precede its first marker.
/// The merge pass folds these into the component they continue.
pub const CONTINUATION: &str = "<continuation>";

/// A detected boundary line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boundary {
    pub name: String,
    pub component_type: ComponentType,
    /// Keyword that matched (e.g. "def", "class", "region").
    pub marker: String,
    /// Leading whitespace width.
    pub indent: usize,
}

fn function_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(\s*)(?:pub(?:\([^)]*\))?\s+)?(?:async\s+)?(def|fn|function|func)\s+([A-Za-z_][A-Za-z0-9_]*)",
        )
        .expect("function marker pattern is valid")
    })
}

fn class_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(\s*)(?:pub(?:\([^)]*\))?\s+)?(class|struct|trait|interface|impl)(?:\s*<[^>]*>)?\s+([A-Za-z_][A-Za-z0-9_]*)",
        )
        .expect("class marker pattern is valid")
    })
}

fn section_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\s*)(?:#|//)\s*(%%|region\b|MARK:)\s*(.*)$")
            .expect("section marker pattern is valid")
    })
}

fn control_flow() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"\b(if|elif|else|for|while|try|except|finally|with|match|case|catch|switch|loop)\b",
        )
        .expect("control-flow pattern is valid")
    })
}

fn call_site() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"([A-Za-z_][A-Za-z0-9_]*)\s*\(").expect("call-site pattern is valid")
    })
}

/// Classify a line as a component boundary.
pub fn detect_boundary(line: &str, line_no: usize) -> Option<Boundary> {
    if let Some(caps) = section_marker().captures(line) {
        let title = caps[3].trim();
        let name = if title.is_empty() {
            format!("section@{line_no}")
        } else {
            title.to_string()
        };
        return Some(Boundary {
            name,
            component_type: ComponentType::Section,
            marker: caps[2].trim_end_matches(':').to_string(),
            indent: caps[1].len(),
        });
    }
    if let Some(caps) = class_marker().captures(line) {
        return Some(Boundary {
            name: caps[3].to_string(),
            component_type: ComponentType::Class,
            marker: caps[2].to_string(),
            indent: caps[1].len(),
        });
    }
    function_marker().captures(line).map(|caps| Boundary {
        name: caps[3].to_string(),
        component_type: ComponentType::Function,
        marker: caps[2].to_string(),
        indent: caps[1].len(),
    })
}

/// Control-flow keyword occurrences divided by ten.
pub fn complexity_score(content: &str) -> f64 {
    control_flow().find_iter(content).count() as f64 / 10.0
}

struct OpenComponent {
    boundary: Boundary,
    start_idx: usize,
}

fn close<S: AsRef<str>>(
    lines: &[S],
    first_line: usize,
    name: String,
    component_type: ComponentType,
    start_idx: usize,
    end_idx: usize,
) -> Component {
    let content = lines[start_idx..=end_idx]
        .iter()
        .map(|line| line.as_ref())
        .collect::<Vec<_>>()
        .join("\n");
    let mut component = Component::new(
        name,
        component_type,
        first_line + start_idx,
        first_line + end_idx,
        content,
    );
    component.complexity_score = complexity_score(&component.content);
    component
}

/// How [`scan_lines`] labels the lines before the first marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leading {
    /// Top of the file: a [`MODULE_PREAMBLE`] component, only when a marker
    /// follows.
    Preamble,
    /// Top of a file that continues past the scanned lines: a
    /// [`MODULE_PREAMBLE`] even when no marker follows, since a later window
    /// may still hold the first one.
    OpenPreamble,
    /// Inside a window: a [`CONTINUATION`] of whatever component was open
    /// when the window began, emitted even when the window has no marker.
    Continuation,
}

/// Scan `lines`, whose first element is file line `first_line` (1-indexed).
///
/// With [`Leading::Preamble`] the scan covers every line of input that has
/// at least one marker; input without markers yields no components.
pub fn scan_lines<S: AsRef<str>>(
    lines: &[S],
    first_line: usize,
    leading: Leading,
) -> Vec<Component> {
    let mut components = Vec::new();
    let mut open: Option<OpenComponent> = None;
    let mut first_marker: Option<usize> = None;

    for (idx, line) in lines.iter().enumerate() {
        let Some(boundary) = detect_boundary(line.as_ref(), first_line + idx) else {
            continue;
        };
        first_marker.get_or_insert(idx);
        if let Some(prev) = open.take() {
            components.push(finish(lines, first_line, prev, idx - 1));
        }
        open = Some(OpenComponent {
            boundary,
            start_idx: idx,
        });
    }
    if let Some(prev) = open.take() {
        components.push(finish(lines, first_line, prev, lines.len() - 1));
    }

    let leading_end = match (leading, first_marker) {
        (_, Some(0)) => None,
        (Leading::Preamble, None) => None,
        (_, Some(first)) => Some(first - 1),
        (Leading::OpenPreamble | Leading::Continuation, None) => lines.len().checked_sub(1),
    };
    if let Some(end_idx) = leading_end {
        let (name, marker) = match leading {
            Leading::Preamble | Leading::OpenPreamble => (MODULE_PREAMBLE, "preamble"),
            Leading::Continuation => (CONTINUATION, "continuation"),
        };
        let mut head = close(
            lines,
            first_line,
            name.to_string(),
            ComponentType::Module,
            0,
            end_idx,
        );
        head.metadata
            .insert("marker".to_string(), serde_json::json!(marker));
        components.insert(0, head);
    }
    components
}

fn finish<S: AsRef<str>>(
    lines: &[S],
    first_line: usize,
    open: OpenComponent,
    end_idx: usize,
) -> Component {
    let OpenComponent {
        boundary,
        start_idx,
    } = open;
    let mut component = close(
        lines,
        first_line,
        boundary.name,
        boundary.component_type,
        start_idx,
        end_idx,
    );
    component
        .metadata
        .insert("marker".to_string(), serde_json::json!(boundary.marker));
    component
        .metadata
        .insert("indent".to_string(), serde_json::json!(boundary.indent));
    component
}

/// Sequential scan over a whole file.
pub fn scan_content(content: &str) -> Vec<Component> {
    let lines: Vec<&str> = content.lines().collect();
    let mut components = scan_lines(&lines, 1, Leading::Preamble);
    link_dependencies(&mut components);
    components
}

/// Record, for each component, the other function/class components it calls.
pub fn link_dependencies(components: &mut [Component]) {
    let names: HashSet<String> = components
        .iter()
        .filter(|c| {
            matches!(
                c.component_type,
                ComponentType::Function | ComponentType::Class
            )
        })
        .map(|c| c.name.clone())
        .collect();

    for component in components.iter_mut() {
        let called: BTreeSet<String> = call_site()
            .captures_iter(&component.content)
            .map(|caps| caps[1].to_string())
            .filter(|name| name != &component.name && names.contains(name))
            .collect();
        component.dependencies.extend(called);
    }
}

/// Structural measurements deciding whether a file needs splitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitAnalysis {
    pub line_count: usize,
    pub function_count: usize,
    pub class_count: usize,
    pub complexity: f64,
    pub needs_split: bool,
}

/// Measure `content` against the thresholds in `config`.
pub fn analyze(content: &str, config: &SplitConfig) -> SplitAnalysis {
    let mut line_count = 0;
    let mut function_count = 0;
    let mut class_count = 0;
    for (idx, line) in content.lines().enumerate() {
        line_count += 1;
        match detect_boundary(line, idx + 1).map(|b| b.component_type) {
            Some(ComponentType::Function) => function_count += 1,
            Some(ComponentType::Class) => class_count += 1,
            _ => {}
        }
    }
    let complexity = complexity_score(content);
    let needs_split = line_count > config.max_lines
        || function_count > config.max_functions
        || class_count > config.max_classes
        || complexity > config.max_complexity;

    SplitAnalysis {
        line_count,
        function_count,
        class_count,
        complexity,
        needs_split,
    }
}
