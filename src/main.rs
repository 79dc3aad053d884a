//! FolderExtractor - files freshly extracted media into a completion tree
//!
//! Main entry point for the command-line application.
//!
//! # Overview
//!
//! The binary initializes:
//! - Logging infrastructure (daily file rotation + console output)
//! - Settings ([`ConfigManager`], `Settings/` directory, defaults written on first run)
//! - The run lock, state manager, metrics and scan pipeline
//! - The recurring timer ([`SchedulerHandle`]) when `use_timer` is on
//! - The stdin command loop ([`CommandController`])
//!
//! # Execution Flow
//!
//! 1. Initialize logging -> Logs/FileExtractor.<date>
//! 2. Create the settings directory and any missing settings file
//! 3. Build the shared run lock, state, metrics, history and notifier
//! 4. Start the timer, then read commands until `exit` or end of input
//! 5. Log the metrics summary and shut the runtime down
//!
//! Pass `--debug` for debug-level logs.

use anyhow::{Context, Result};
use folder_extractor::logging::{self, LOG_DIR, LOG_PREFIX};
use folder_extractor::metrics::Metrics;
use folder_extractor::scheduler::SchedulerHandle;
use folder_extractor::services::{FileHistory, LogNotifier};
use folder_extractor::ui::CommandController;
use folder_extractor::{
    APP_NAME, ConfigManager, ScanCoordinator, ScanPipeline, ScanRunner, StateManager, VERSION,
};
use std::sync::Arc;
use std::time::Duration;

const SETTINGS_DIR: &str = "Settings";

fn main() -> Result<()> {
    let debug_mode = std::env::args().any(|arg| arg == "--debug");
    let _guard = logging::setup_logging_with_console(LOG_DIR, LOG_PREFIX, debug_mode, true)?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let config_manager = ConfigManager::new(SETTINGS_DIR)?;
    config_manager
        .ensure_defaults()
        .context("Failed to create default settings")?;
    let general = config_manager.load_general_settings()?;

    let metrics = Arc::new(Metrics::new());
    let history = FileHistory::new(&general.history_file);
    let pipeline = ScanPipeline::new(
        Arc::new(history.clone()),
        Arc::new(LogNotifier),
        Arc::clone(&metrics),
    );
    let runner = Arc::new(ScanRunner::new(
        Arc::new(ScanCoordinator::new()),
        config_manager,
        pipeline,
        StateManager::new(),
        Arc::clone(&metrics),
    ));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(2)
        .thread_name("extractor-worker")
        .build()
        .context("Failed to create the tokio runtime")?;

    let result = runtime.block_on(async {
        let scheduler = general.use_timer.then(|| {
            let minutes = general.timer_interval_minutes.max(1);
            SchedulerHandle::spawn(
                Arc::clone(&runner),
                Duration::from_secs(minutes * 60),
                true,
            )
        });
        if scheduler.is_none() {
            tracing::info!("Timer disabled, scans run on request only");
        }

        CommandController::new(Arc::clone(&runner), scheduler, history, LOG_DIR)
            .run()
            .await
    });

    metrics.log_summary();
    runtime.shutdown_timeout(Duration::from_secs(5));
    tracing::info!("Application shutdown complete");

    result
}
