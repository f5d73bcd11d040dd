//! Structured observability hooks for fixflow.
//!
//! This module provides:
//! - The file-scoped span wrapping every plan (`file_span`)
//! - Emission functions for key events: split finished, chunk dropped,
//!   specialist selected, plan built, availability probed, backend resolved
//!
//! Events are emitted at `info!` level (filter via `RUST_LOG`).
//! For JSON output, set `FIXFLOW_LOG_FORMAT=json`.

use tracing::{info, warn};

use crate::splitter::ChunkError;

/// A span tagged with the file path; plans are instrumented with it.
pub fn file_span(file: &str) -> tracing::Span {
    tracing::info_span!("fixflow.file", file = %file)
}

/// Emit event: a split finished.
pub fn emit_split_finished(windows: usize, components: usize, dropped: usize) {
    info!(
        event = "split.finished",
        windows = windows,
        components = components,
        dropped = dropped,
    );
}

/// Emit event: a window contributed no components (warning level).
pub fn emit_chunk_dropped(error: &ChunkError) {
    warn!(
        event = "split.chunk_dropped",
        chunk = error.index,
        start_line = error.start_line,
        end_line = error.end_line,
        reason = %error.kind,
    );
}

/// Emit event: a specialist was chosen for an issue batch.
pub fn emit_specialist_selected(specialist: &str, score: f64, issues: usize) {
    info!(
        event = "specialist.selected",
        specialist = %specialist,
        score = score,
        issues = issues,
    );
}

/// Emit event: a fix attempt outcome was recorded.
pub fn emit_fix_attempt_recorded(specialist: &str, success: bool, confidence: f64) {
    info!(
        event = "specialist.attempt_recorded",
        specialist = %specialist,
        success = success,
        confidence = confidence,
    );
}

/// Emit event: a fix plan was built for a file.
pub fn emit_plan_built(components: usize, requests: usize, unassigned: usize) {
    info!(
        event = "orchestration.plan_built",
        components = components,
        requests = requests,
        unassigned = unassigned,
    );
}

/// Emit event: a model profile was probed.
pub fn emit_availability_probed(model: &str, provider: &str, available: bool, reason: &str) {
    info!(
        event = "catalog.probed",
        model = %model,
        provider = %provider,
        available = available,
        reason = %reason,
    );
}

/// Emit event: a fallback chain resolved to a backend.
pub fn emit_backend_resolved(strategy: &str, model: &str, provider: &str, position: usize) {
    info!(
        event = "catalog.backend_resolved",
        strategy = %strategy,
        model = %model,
        provider = %provider,
        position = position,
    );
}

/// Emit event: every entry of a fallback chain was unreachable (warning level).
pub fn emit_backend_unavailable(strategy: &str, tried: usize) {
    warn!(
        event = "catalog.backend_unavailable",
        strategy = %strategy,
        tried = tried,
    );
}
