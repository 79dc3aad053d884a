// Recurring scan trigger
//
// A tokio interval fires ScanTrigger::Scheduled into the same ScanRunner the
// command loop uses. The scan itself runs on the blocking pool.

use crate::models::ScanTrigger;
use crate::services::ScanRunner;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Handle to a running scheduler task
///
/// Dropping the handle does not stop the task; call [`shutdown`](Self::shutdown).
pub struct SchedulerHandle {
    active_tx: watch::Sender<bool>,
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
    runner: Arc<ScanRunner>,
    period: Duration,
}

impl SchedulerHandle {
    /// Start the timer task on the current tokio runtime.
    ///
    /// The first scheduled scan fires one `period` after start.
    pub fn spawn(runner: Arc<ScanRunner>, period: Duration, start_active: bool) -> Self {
        let (active_tx, active_rx) = watch::channel(start_active);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        runner.state().set_timer_active(start_active);
        tracing::info!(
            "Timer started: every {}s, {}",
            period.as_secs(),
            if start_active { "active" } else { "paused" }
        );

        let task = tokio::spawn(run_timer(
            Arc::clone(&runner),
            period,
            active_rx,
            shutdown_rx,
        ));

        Self {
            active_tx,
            shutdown_tx,
            task,
            runner,
            period,
        }
    }

    pub fn pause(&self) {
        if self.active_tx.send_replace(false) {
            tracing::info!("Timer paused");
        }
        self.runner.state().set_timer_active(false);
    }

    /// Resume the timer; the next scan fires one full period from now
    pub fn resume(&self) {
        if !self.active_tx.send_replace(true) {
            tracing::info!("Timer resumed");
        }
        self.runner.state().set_timer_active(true);
    }

    pub fn is_active(&self) -> bool {
        *self.active_tx.borrow()
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Stop the timer and wait for an in-flight scheduled scan to finish
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await {
            tracing::error!("Timer task ended abnormally: {}", e);
        }
        self.runner.state().set_timer_active(false);
        tracing::info!("Timer stopped");
    }
}

async fn run_timer(
    runner: Arc<ScanRunner>,
    period: Duration,
    mut active_rx: watch::Receiver<bool>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                if !*active_rx.borrow() {
                    continue;
                }

                let runner = Arc::clone(&runner);
                let scan = tokio::task::spawn_blocking(move || runner.run(ScanTrigger::Scheduled));
                if let Err(e) = scan.await {
                    tracing::error!("Scheduled scan failed: {}", e);
                }
            }
            changed = active_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                if *active_rx.borrow_and_update() {
                    interval.reset();
                }
            }
            _ = shutdown_rx.changed() => {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigManager;
    use crate::metrics::Metrics;
    use crate::services::{RecordingNotifier, ScanPipeline};
    use crate::services::history::MockHistoryStore;
    use crate::state::{ScanCoordinator, StateChange, StateManager};
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    fn runner(temp: &TempDir) -> Arc<ScanRunner> {
        let dir = Utf8PathBuf::try_from(temp.path().to_path_buf()).unwrap();
        let config_manager = ConfigManager::new(dir)
            .unwrap()
            .with_environment(config::Map::new());
        let metrics = Arc::new(Metrics::new());
        let pipeline = ScanPipeline::new(
            Arc::new(MockHistoryStore::new()),
            Arc::new(RecordingNotifier::new()),
            Arc::clone(&metrics),
        );
        Arc::new(ScanRunner::new(
            Arc::new(ScanCoordinator::new()),
            config_manager,
            pipeline,
            StateManager::new(),
            metrics,
        ))
    }

    #[tokio::test]
    async fn test_active_timer_triggers_scans() {
        let temp = TempDir::new().unwrap();
        let runner = runner(&temp);

        let handle = SchedulerHandle::spawn(Arc::clone(&runner), Duration::from_millis(20), true);
        tokio::time::sleep(Duration::from_millis(200)).await;
        handle.shutdown().await;

        assert!(runner.state().read(|s| s.scans_completed) >= 1);
    }

    #[tokio::test]
    async fn test_paused_timer_does_not_scan() {
        let temp = TempDir::new().unwrap();
        let runner = runner(&temp);

        let handle = SchedulerHandle::spawn(Arc::clone(&runner), Duration::from_millis(20), false);
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(runner.state().read(|s| s.scans_completed), 0);

        handle.resume();
        assert!(handle.is_active());
        tokio::time::sleep(Duration::from_millis(200)).await;
        handle.shutdown().await;

        assert!(runner.state().read(|s| s.scans_completed) >= 1);
    }

    #[tokio::test]
    async fn test_pause_resume_emit_timer_events() {
        let temp = TempDir::new().unwrap();
        let runner = runner(&temp);
        let mut rx = runner.state().subscribe();

        let handle = SchedulerHandle::spawn(Arc::clone(&runner), Duration::from_secs(3600), true);
        handle.pause();
        handle.resume();
        handle.shutdown().await;

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert_eq!(
            events,
            vec![
                StateChange::TimerChanged { active: true },
                StateChange::TimerChanged { active: false },
                StateChange::TimerChanged { active: true },
                StateChange::TimerChanged { active: false },
            ]
        );
    }
}
