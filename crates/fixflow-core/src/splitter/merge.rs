//! Merge pass for components gathered from overlapping windows.

use fixflow_domain::{Component, ComponentType};

use crate::splitter::scan::CONTINUATION;

/// Merge duplicates produced by overlapping windows.
///
/// Components are sorted by `start_line` (stable, so window order breaks
/// ties) and an adjacent pair is merged when name and type match and the
/// ranges overlap or touch. A [`CONTINUATION`] is folded into the component
/// before it when the two touch, and dropped otherwise. Merging is
/// idempotent.
pub fn merge_components(mut components: Vec<Component>) -> Vec<Component> {
    components.sort_by_key(|c| c.start_line);

    let mut merged: Vec<Component> = Vec::with_capacity(components.len());
    for next in components {
        let continuation = is_continuation(&next);
        match merged.last_mut() {
            Some(current) if continuation && touches(current, &next) => {
                absorb(current, next)
            }
            Some(current) if mergeable(current, &next) => absorb(current, next),
            _ if continuation => {}
            _ => merged.push(next),
        }
    }
    merged
}

fn is_continuation(component: &Component) -> bool {
    component.component_type == ComponentType::Module && component.name == CONTINUATION
}

fn touches(current: &Component, next: &Component) -> bool {
    current.end_line + 1 >= next.start_line
}

fn mergeable(current: &Component, next: &Component) -> bool {
    current.name == next.name
        && current.component_type == next.component_type
        && touches(current, next)
}

/// Fold `next` into `current`.
///
/// Line numbers are file-absolute in both records, so the lines of `next`
/// already present in `current` are those numbered up to `current.end_line`.
fn absorb(current: &mut Component, next: Component) {
    let shared = (current.end_line + 1).saturating_sub(next.start_line);
    let tail: Vec<&str> = next.content.split('\n').skip(shared).collect();
    if !tail.is_empty() {
        if !current.content.is_empty() {
            current.content.push('\n');
        }
        current.content.push_str(&tail.join("\n"));
    }

    current.end_line = current.end_line.max(next.end_line);
    if !is_continuation(&next) {
        current.metadata.extend(next.metadata);
    }
    current.dependencies.extend(next.dependencies);
    current.complexity_score = current.complexity_score.max(next.complexity_score);
}
