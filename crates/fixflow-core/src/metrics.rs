//! Global atomic counters for fixflow observability.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event (e.g. after a batch of files).

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Lightweight atomic counters. No allocations, no locking.
pub struct Metrics {
    chunks_scanned: AtomicU64,
    chunks_dropped: AtomicU64,
    specialists_selected: AtomicU64,
    probes_run: AtomicU64,
    fallbacks_exhausted: AtomicU64,
    fix_attempts: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            chunks_scanned: AtomicU64::new(0),
            chunks_dropped: AtomicU64::new(0),
            specialists_selected: AtomicU64::new(0),
            probes_run: AtomicU64::new(0),
            fallbacks_exhausted: AtomicU64::new(0),
            fix_attempts: AtomicU64::new(0),
        }
    }

    pub fn inc_chunks_scanned(&self) {
        self.chunks_scanned.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "chunks_scanned", "counter incremented");
    }

    pub fn inc_chunks_dropped(&self) {
        self.chunks_dropped.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "chunks_dropped", "counter incremented");
    }

    pub fn inc_specialists_selected(&self) {
        self.specialists_selected.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "specialists_selected", "counter incremented");
    }

    pub fn inc_probes(&self) {
        self.probes_run.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "probes_run", "counter incremented");
    }

    pub fn inc_fallbacks_exhausted(&self) {
        self.fallbacks_exhausted.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "fallbacks_exhausted", "counter incremented");
    }

    pub fn inc_fix_attempts(&self) {
        self.fix_attempts.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "fix_attempts", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    ///
    /// Call this at natural boundaries (end of a batch, probe tick)
    /// rather than on every increment.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            chunks_scanned = self.chunks_scanned(),
            chunks_dropped = self.chunks_dropped(),
            specialists_selected = self.specialists_selected(),
            probes_run = self.probes_run(),
            fallbacks_exhausted = self.fallbacks_exhausted(),
            fix_attempts = self.fix_attempts(),
        );
    }

    pub fn chunks_scanned(&self) -> u64 {
        self.chunks_scanned.load(Ordering::Relaxed)
    }

    pub fn chunks_dropped(&self) -> u64 {
        self.chunks_dropped.load(Ordering::Relaxed)
    }

    pub fn specialists_selected(&self) -> u64 {
        self.specialists_selected.load(Ordering::Relaxed)
    }

    pub fn probes_run(&self) -> u64 {
        self.probes_run.load(Ordering::Relaxed)
    }

    pub fn fallbacks_exhausted(&self) -> u64 {
        self.fallbacks_exhausted.load(Ordering::Relaxed)
    }

    pub fn fix_attempts(&self) -> u64 {
        self.fix_attempts.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.chunks_scanned.store(0, Ordering::Relaxed);
        self.chunks_dropped.store(0, Ordering::Relaxed);
        self.specialists_selected.store(0, Ordering::Relaxed);
        self.probes_run.store(0, Ordering::Relaxed);
        self.fallbacks_exhausted.store(0, Ordering::Relaxed);
        self.fix_attempts.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_increment() {
        let m = Metrics::new();
        assert_eq!(m.chunks_scanned(), 0);
        m.inc_chunks_scanned();
        m.inc_chunks_scanned();
        assert_eq!(m.chunks_scanned(), 2);

        m.inc_chunks_dropped();
        assert_eq!(m.chunks_dropped(), 1);

        m.inc_probes();
        m.inc_probes();
        m.inc_probes();
        assert_eq!(m.probes_run(), 3);

        m.inc_fallbacks_exhausted();
        m.inc_specialists_selected();
        m.inc_fix_attempts();
        assert_eq!(m.fallbacks_exhausted(), 1);
        assert_eq!(m.specialists_selected(), 1);
        assert_eq!(m.fix_attempts(), 1);
    }

    #[test]
    fn reset_zeroes_all() {
        let m = Metrics::new();
        m.inc_chunks_scanned();
        m.inc_chunks_dropped();
        m.inc_specialists_selected();
        m.inc_probes();
        m.inc_fallbacks_exhausted();
        m.inc_fix_attempts();
        m.reset();
        assert_eq!(m.chunks_scanned(), 0);
        assert_eq!(m.chunks_dropped(), 0);
        assert_eq!(m.specialists_selected(), 0);
        assert_eq!(m.probes_run(), 0);
        assert_eq!(m.fallbacks_exhausted(), 0);
        assert_eq!(m.fix_attempts(), 0);
    }
}
