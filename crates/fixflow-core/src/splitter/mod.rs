//! Component splitting.
//!
//! Small files are scanned sequentially. Large files are cut into
//! overlapping windows, each window is scanned on the splitter's bounded
//! pool under a time budget, and the per-window results are merged back
//! into one consistent component list.
//!
//! # Module layout
//!
//! - [`config`] — `SplitConfig`
//! - [`error`] — `SplitError`, `ChunkError`, `ChunkErrorKind`
//! - [`scan`] — boundary detection, sequential scan, `analyze`
//! - [`window`] — `plan_windows`, `Window`
//! - [`merge`] — `merge_components`

pub mod config;
pub mod error;
pub mod merge;
pub mod scan;
pub mod window;

use std::sync::Arc;
use std::time::Duration;

use fixflow_domain::Component;
use tokio::sync::{watch, Semaphore};
use tracing::{debug, instrument, warn};

use crate::metrics::METRICS;
use crate::obs::{emit_chunk_dropped, emit_split_finished};

pub use config::SplitConfig;
pub use error::{ChunkError, ChunkErrorKind, SplitError, SplitResult};
pub use merge::merge_components;
pub use scan::{analyze, scan_content, Leading, SplitAnalysis, CONTINUATION, MODULE_PREAMBLE};
pub use window::{plan_windows, Window};

/// Files at or below this many lines are always scanned sequentially.
pub const PARALLEL_THRESHOLD_LINES: usize = 500;

/// Scans one window; receives all file lines and the window bounds.
pub type ChunkScanner = Arc<dyn Fn(&[String], Window) -> Vec<Component> + Send + Sync>;

/// Components of a split plus the windows that contributed nothing.
#[derive(Debug, Clone, Default)]
pub struct SplitOutcome {
    pub components: Vec<Component>,
    pub errors: Vec<ChunkError>,
}

impl SplitOutcome {
    /// True when every window contributed.
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Default window scan: boundary scan with file-absolute line numbers.
///
/// Only the window starting at the top of the file emits the module
/// preamble, and it does so even without a marker when the file goes on
/// past the window. Later windows begin inside a component owned by an
/// earlier one and label their leading lines as a continuation of it.
pub fn scan_window(lines: &[String], window: Window) -> Vec<Component> {
    let leading = match (window.start, window.end < lines.len()) {
        (0, true) => Leading::OpenPreamble,
        (0, false) => Leading::Preamble,
        _ => Leading::Continuation,
    };
    scan::scan_lines(&lines[window.start..window.end], window.first_line(), leading)
}

/// Splits file content into components.
///
/// Owns a long-lived pool of worker permits, sized once at construction and
/// shared by every call. A single call additionally caps its concurrency at
/// `SplitConfig::max_parallel_workers`.
pub struct ComponentSplitter {
    pool: Arc<Semaphore>,
    pool_size: usize,
    scanner: ChunkScanner,
}

impl std::fmt::Debug for ComponentSplitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentSplitter")
            .field("pool_size", &self.pool_size)
            .finish_non_exhaustive()
    }
}

impl Default for ComponentSplitter {
    fn default() -> Self {
        Self::new(SplitConfig::default().max_parallel_workers)
    }
}

impl ComponentSplitter {
    /// Create a splitter with `pool_size` workers (at least one).
    pub fn new(pool_size: usize) -> Self {
        Self::with_scanner(pool_size, Arc::new(scan_window))
    }

    /// Create a splitter sized from a config's `max_parallel_workers`.
    pub fn from_config(config: &SplitConfig) -> Self {
        Self::new(config.max_parallel_workers)
    }

    /// Create a splitter with a custom window scanner.
    pub fn with_scanner(pool_size: usize, scanner: ChunkScanner) -> Self {
        let pool_size = pool_size.max(1);
        Self {
            pool: Arc::new(Semaphore::new(pool_size)),
            pool_size,
            scanner,
        }
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Split `content` into components.
    pub async fn split(&self, content: &str, config: &SplitConfig) -> SplitResult<SplitOutcome> {
        let (_cancel_tx, cancel_rx) = watch::channel(false);
        self.split_with_cancel(content, config, cancel_rx).await
    }

    /// Split `content`, abandoning outstanding windows once `cancel` flips
    /// to `true`. Abandoned windows are reported as
    /// [`ChunkErrorKind::Cancelled`].
    #[instrument(skip_all, fields(lines = tracing::field::Empty))]
    pub async fn split_with_cancel(
        &self,
        content: &str,
        config: &SplitConfig,
        cancel: watch::Receiver<bool>,
    ) -> SplitResult<SplitOutcome> {
        config.validate()?;

        let lines: Vec<String> = content.lines().map(str::to_owned).collect();
        tracing::Span::current().record("lines", lines.len());

        if lines.len() <= PARALLEL_THRESHOLD_LINES || !config.enable_parallel {
            let components = scan_content(content);
            emit_split_finished(1, components.len(), 0);
            return Ok(SplitOutcome {
                components,
                errors: Vec::new(),
            });
        }

        let windows = plan_windows(lines.len(), config.chunk_size, config.line_overlap);
        debug!(windows = windows.len(), "scanning windows in parallel");
        let outcome = self.split_parallel(lines, &windows, config, cancel).await;
        emit_split_finished(windows.len(), outcome.components.len(), outcome.errors.len());
        Ok(outcome)
    }

    async fn split_parallel(
        &self,
        lines: Vec<String>,
        windows: &[Window],
        config: &SplitConfig,
        cancel: watch::Receiver<bool>,
    ) -> SplitOutcome {
        let lines = Arc::new(lines);
        let call_limit = Arc::new(Semaphore::new(config.max_parallel_workers));
        let budget = Duration::from_secs(config.chunk_timeout_seconds);

        let mut errors = Vec::new();
        let mut submitted = Vec::with_capacity(windows.len());

        for &window in windows {
            if *cancel.borrow() {
                let error = window.error(ChunkErrorKind::Cancelled);
                emit_chunk_dropped(&error);
                METRICS.inc_chunks_dropped();
                errors.push(error);
                continue;
            }

            let lines = Arc::clone(&lines);
            let pool = Arc::clone(&self.pool);
            let call_limit = Arc::clone(&call_limit);
            let scanner = Arc::clone(&self.scanner);
            let mut cancel = cancel.clone();

            let task = tokio::spawn(async move {
                tokio::select! {
                    biased;
                    _ = cancelled(&mut cancel) => Err(ChunkErrorKind::Cancelled),
                    result = run_chunk(lines, window, pool, call_limit, scanner, budget) => result,
                }
            });
            submitted.push((window, task));
        }

        // Barrier: every submitted window resolves before merging.
        let (submitted_windows, tasks): (Vec<Window>, Vec<_>) = submitted.into_iter().unzip();
        let results = futures::future::join_all(tasks).await;

        let mut gathered = Vec::new();
        for (window, joined) in submitted_windows.into_iter().zip(results) {
            let result = joined.unwrap_or_else(|e| Err(ChunkErrorKind::Failed(e.to_string())));
            match result {
                Ok(mut components) => {
                    METRICS.inc_chunks_scanned();
                    for component in &mut components {
                        component
                            .metadata
                            .insert("chunk_index".to_string(), serde_json::json!(window.index));
                    }
                    gathered.extend(components);
                }
                Err(kind) => {
                    let error = window.error(kind);
                    warn!(chunk = window.index, error = %error, "dropping chunk");
                    emit_chunk_dropped(&error);
                    METRICS.inc_chunks_dropped();
                    errors.push(error);
                }
            }
        }
        errors.sort_by_key(|e| e.index);

        let mut components = merge_components(gathered);
        // A file without any marker has no components, as in the sequential scan.
        if components.iter().all(|c| c.name == MODULE_PREAMBLE) {
            components.clear();
        }
        scan::link_dependencies(&mut components);
        SplitOutcome { components, errors }
    }
}

async fn run_chunk(
    lines: Arc<Vec<String>>,
    window: Window,
    pool: Arc<Semaphore>,
    call_limit: Arc<Semaphore>,
    scanner: ChunkScanner,
    budget: Duration,
) -> Result<Vec<Component>, ChunkErrorKind> {
    let _pool_permit = pool
        .acquire_owned()
        .await
        .map_err(|e| ChunkErrorKind::Failed(e.to_string()))?;
    let _call_permit = call_limit
        .acquire_owned()
        .await
        .map_err(|e| ChunkErrorKind::Failed(e.to_string()))?;

    let work = tokio::task::spawn_blocking(move || scanner(&lines, window));
    match tokio::time::timeout(budget, work).await {
        Ok(Ok(components)) => Ok(components),
        Ok(Err(join_error)) => Err(ChunkErrorKind::Failed(join_error.to_string())),
        Err(_) => Err(ChunkErrorKind::Timeout(budget)),
    }
}

/// Resolves once the flag reads `true`; never resolves if the sender is
/// dropped without cancelling.
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixflow_domain::ComponentType;

    fn python_file(functions: usize, body_lines: usize) -> String {
        let mut out = String::from("import os\n");
        for i in 0..functions {
            out.push_str(&format!("def f{i}(x):\n"));
            for _ in 0..body_lines {
                out.push_str("    x = x + 1\n");
            }
        }
        out
    }

    #[tokio::test]
    async fn test_small_file_uses_sequential_scan() {
        let splitter = ComponentSplitter::new(2);
        let content = python_file(3, 4);
        let outcome = splitter.split(&content, &SplitConfig::default()).await.unwrap();
        assert!(outcome.is_complete());
        assert_eq!(outcome.components.len(), 4);
        assert!(outcome
            .components
            .iter()
            .all(|c| !c.metadata.contains_key("chunk_index")));
    }

    #[tokio::test]
    async fn test_parallel_split_matches_sequential_ranges() {
        let splitter = ComponentSplitter::new(4);
        let content = python_file(60, 19); // 1 + 60 * 20 = 1201 lines
        let config = SplitConfig::default();

        let parallel = splitter.split(&content, &config).await.unwrap();
        let sequential = scan_content(&content);

        assert!(parallel.is_complete());
        let ranges = |cs: &[Component]| {
            cs.iter()
                .map(|c| (c.name.clone(), c.start_line, c.end_line))
                .collect::<Vec<_>>()
        };
        assert_eq!(ranges(&parallel.components), ranges(&sequential));
        for (p, s) in parallel.components.iter().zip(&sequential) {
            assert_eq!(p.content, s.content, "content differs for {}", p.name);
        }
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let splitter = ComponentSplitter::default();
        let config = SplitConfig {
            chunk_size: 10,
            line_overlap: 10,
            ..Default::default()
        };
        let err = splitter.split("def f():\n    pass\n", &config).await.unwrap_err();
        assert!(matches!(err, SplitError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn test_parallel_disabled_scans_sequentially() {
        let splitter = ComponentSplitter::new(4);
        let content = python_file(60, 19);
        let outcome = splitter
            .split(&content, &SplitConfig::sequential())
            .await
            .unwrap();
        assert_eq!(outcome.components.len(), 61);
        assert_eq!(outcome.components[0].component_type, ComponentType::Module);
    }

    #[tokio::test]
    async fn test_cancel_before_submission_reports_every_window() {
        let splitter = ComponentSplitter::new(2);
        let content = python_file(60, 19);
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();

        let outcome = splitter
            .split_with_cancel(&content, &SplitConfig::default(), rx)
            .await
            .unwrap();
        assert!(outcome.components.is_empty());
        assert_eq!(outcome.errors.len(), 3);
        assert!(outcome
            .errors
            .iter()
            .all(|e| e.kind == ChunkErrorKind::Cancelled));
    }

    #[test]
    fn test_pool_size_is_at_least_one() {
        assert_eq!(ComponentSplitter::new(0).pool_size(), 1);
        assert_eq!(ComponentSplitter::default().pool_size(), 4);
    }
}
