// Performance metrics module
//
// Lightweight counters for scan activity, logged on shutdown

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Process-wide scan metrics
///
/// Uses atomic operations for thread-safe tracking without locks. One instance is
/// created at startup and shared through an `Arc`.
#[derive(Debug)]
pub struct Metrics {
    /// Files renamed in place
    pub files_renamed: AtomicUsize,

    /// Files whose rename failed
    pub rename_failures: AtomicUsize,

    /// Files moved into the completion folder
    pub files_moved: AtomicUsize,

    /// Files whose move failed
    pub move_failures: AtomicUsize,

    /// Media type scans that aborted on folder validation
    pub configuration_errors: AtomicUsize,

    /// Runs that held the lock and completed
    pub runs_completed: AtomicUsize,

    /// Triggers dropped because a run was in progress
    pub runs_skipped: AtomicUsize,

    /// Total time spent in runs in milliseconds
    pub total_run_time_ms: AtomicU64,

    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            files_renamed: AtomicUsize::new(0),
            rename_failures: AtomicUsize::new(0),
            files_moved: AtomicUsize::new(0),
            move_failures: AtomicUsize::new(0),
            configuration_errors: AtomicUsize::new(0),
            runs_completed: AtomicUsize::new(0),
            runs_skipped: AtomicUsize::new(0),
            total_run_time_ms: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_renamed(&self, count: usize) {
        self.files_renamed.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_rename_failures(&self, count: usize) {
        self.rename_failures.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_moved(&self, count: usize) {
        self.files_moved.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_move_failures(&self, count: usize) {
        self.move_failures.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_configuration_error(&self) {
        self.configuration_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a finished run and its duration
    pub fn record_run(&self, duration: Duration) {
        self.runs_completed.fetch_add(1, Ordering::Relaxed);
        self.total_run_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn record_run_skipped(&self) {
        self.runs_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Average run time in milliseconds
    pub fn avg_run_time_ms(&self) -> f64 {
        let total = self.total_run_time_ms.load(Ordering::Relaxed);
        let count = self.runs_completed.load(Ordering::Relaxed);
        if count > 0 {
            total as f64 / count as f64
        } else {
            0.0
        }
    }

    pub fn log_summary(&self) {
        tracing::info!("=== Scan Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Runs: {} completed, {} skipped (avg: {:.2}ms per run)",
            self.runs_completed.load(Ordering::Relaxed),
            self.runs_skipped.load(Ordering::Relaxed),
            self.avg_run_time_ms()
        );
        tracing::info!(
            "Files: {} renamed ({} failed), {} moved ({} failed)",
            self.files_renamed.load(Ordering::Relaxed),
            self.rename_failures.load(Ordering::Relaxed),
            self.files_moved.load(Ordering::Relaxed),
            self.move_failures.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Configuration errors: {}",
            self.configuration_errors.load(Ordering::Relaxed)
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
