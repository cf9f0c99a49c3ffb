//! Process-wide certification counters.
//!
//! Counters are bumped at the call site and reported together by
//! [`Metrics::flush`] as one `info!` event, normally when a run finishes.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    cycles: AtomicU64,
    passes: AtomicU64,
    failures: AtomicU64,
    log_write_failures: AtomicU64,
}

/// Point-in-time copy of every counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub cycles: u64,
    pub passes: u64,
    pub failures: u64,
    pub log_write_failures: u64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// All counters at zero. `const` so it can back the static.
    pub const fn new() -> Self {
        Self {
            cycles: AtomicU64::new(0),
            passes: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            log_write_failures: AtomicU64::new(0),
        }
    }

    /// Count one completed certification cycle.
    pub fn inc_cycles(&self) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one evaluation outcome.
    pub fn record_verdict(&self, passed: bool) {
        let (counter, name) = if passed {
            (&self.passes, "passes")
        } else {
            (&self.failures, "failures")
        };
        counter.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = name, "counter incremented");
    }

    /// Count one result-log write that failed.
    pub fn inc_log_write_failures(&self) {
        self.log_write_failures.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "log_write_failures", "counter incremented");
    }

    /// Read every counter.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            cycles: self.cycles.load(Ordering::Relaxed),
            passes: self.passes.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            log_write_failures: self.log_write_failures.load(Ordering::Relaxed),
        }
    }

    /// Emit the current counters as one `info` event.
    pub fn flush(&self) {
        let s = self.snapshot();
        tracing::info!(
            metric = "flush",
            cycles = s.cycles,
            passes = s.passes,
            failures = s.failures,
            log_write_failures = s.log_write_failures,
        );
    }

    /// Zero every counter (tests).
    pub fn reset(&self) {
        self.cycles.store(0, Ordering::Relaxed);
        self.passes.store(0, Ordering::Relaxed);
        self.failures.store(0, Ordering::Relaxed);
        self.log_write_failures.store(0, Ordering::Relaxed);
    }
}
