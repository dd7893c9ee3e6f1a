// Engine metrics module
//
// Lightweight counters for problem scans, auto-sort runs and state traffic

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Session metrics
///
/// Uses atomic operations so the state manager and the classifier can share one
/// instance behind an `Arc` without locking. Logged as a summary on shutdown.
#[derive(Debug)]
pub struct Metrics {
    /// Number of problem detector passes
    pub problem_scans: AtomicU64,

    /// Problems reported by the most recent scan
    pub problems_found: AtomicU64,

    /// Number of auto-sort runs
    pub auto_sorts: AtomicU64,

    /// Auto-sort runs that changed the order
    pub sort_changes: AtomicU64,

    /// Auto-sort runs that hit a cycle and fell back to the baseline
    pub sort_fallbacks: AtomicU64,

    /// Mods moved by move operations
    pub mods_moved: AtomicU64,

    pub classifier_hits: AtomicU64,
    pub classifier_misses: AtomicU64,

    /// Number of state updates performed
    pub state_updates: AtomicU64,

    /// Number of state broadcasts sent
    pub state_broadcasts: AtomicU64,

    /// Number of state broadcast errors (no receivers)
    pub state_broadcast_errors: AtomicU64,

    /// Total time spent in auto-sort in microseconds
    pub total_sort_time_us: AtomicU64,

    start_time: Instant,
}

/// Plain copy of the counters at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub problem_scans: u64,
    pub problems_found: u64,
    pub auto_sorts: u64,
    pub sort_changes: u64,
    pub sort_fallbacks: u64,
    pub mods_moved: u64,
    pub classifier_hits: u64,
    pub classifier_misses: u64,
    pub state_updates: u64,
    pub state_broadcasts: u64,
    pub state_broadcast_errors: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            problem_scans: AtomicU64::new(0),
            problems_found: AtomicU64::new(0),
            auto_sorts: AtomicU64::new(0),
            sort_changes: AtomicU64::new(0),
            sort_fallbacks: AtomicU64::new(0),
            mods_moved: AtomicU64::new(0),
            classifier_hits: AtomicU64::new(0),
            classifier_misses: AtomicU64::new(0),
            state_updates: AtomicU64::new(0),
            state_broadcasts: AtomicU64::new(0),
            state_broadcast_errors: AtomicU64::new(0),
            total_sort_time_us: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a problem scan and how many problems it found
    pub fn record_problem_scan(&self, found: usize) {
        self.problem_scans.fetch_add(1, Ordering::Relaxed);
        self.problems_found.store(found as u64, Ordering::Relaxed);
    }

    /// Record an auto-sort run
    pub fn record_auto_sort(&self, changed: bool, used_fallback: bool, duration: Duration) {
        self.auto_sorts.fetch_add(1, Ordering::Relaxed);
        if changed {
            self.sort_changes.fetch_add(1, Ordering::Relaxed);
        }
        if used_fallback {
            self.sort_fallbacks.fetch_add(1, Ordering::Relaxed);
        }
        self.total_sort_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn record_moved(&self, count: usize) {
        self.mods_moved.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_classifier_hit(&self) {
        self.classifier_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_classifier_miss(&self) {
        self.classifier_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a state update
    pub fn record_state_update(&self) {
        self.state_updates.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a state broadcast
    pub fn record_state_broadcast(&self) {
        self.state_broadcasts.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a state broadcast error
    pub fn record_state_broadcast_error(&self) {
        self.state_broadcast_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total uptime
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Average auto-sort time in milliseconds
    pub fn avg_sort_time_ms(&self) -> f64 {
        let total = self.total_sort_time_us.load(Ordering::Relaxed);
        let count = self.auto_sorts.load(Ordering::Relaxed);
        if count > 0 {
            total as f64 / count as f64 / 1000.0
        } else {
            0.0
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            problem_scans: self.problem_scans.load(Ordering::Relaxed),
            problems_found: self.problems_found.load(Ordering::Relaxed),
            auto_sorts: self.auto_sorts.load(Ordering::Relaxed),
            sort_changes: self.sort_changes.load(Ordering::Relaxed),
            sort_fallbacks: self.sort_fallbacks.load(Ordering::Relaxed),
            mods_moved: self.mods_moved.load(Ordering::Relaxed),
            classifier_hits: self.classifier_hits.load(Ordering::Relaxed),
            classifier_misses: self.classifier_misses.load(Ordering::Relaxed),
            state_updates: self.state_updates.load(Ordering::Relaxed),
            state_broadcasts: self.state_broadcasts.load(Ordering::Relaxed),
            state_broadcast_errors: self.state_broadcast_errors.load(Ordering::Relaxed),
        }
    }

    /// Log metrics summary
    pub fn log_summary(&self) {
        let s = self.snapshot();
        tracing::info!("=== Session Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Problem scans: {}, problems in last scan: {}",
            s.problem_scans,
            s.problems_found
        );
        tracing::info!(
            "Auto-sorts: {} ({} changed, {} cycle fallbacks, avg {:.2}ms)",
            s.auto_sorts,
            s.sort_changes,
            s.sort_fallbacks,
            self.avg_sort_time_ms()
        );
        tracing::info!(
            "Mods moved: {}, classifier cache: {} hits / {} misses",
            s.mods_moved,
            s.classifier_hits,
            s.classifier_misses
        );
        tracing::info!(
            "State updates: {}, broadcasts: {}, errors: {}",
            s.state_updates,
            s.state_broadcasts,
            s.state_broadcast_errors
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
