use crate::config::ConfigManager;
use crate::metrics::Metrics;
use crate::models::{MediaType, ScanReport, ScanTrigger};
use crate::services::pipeline::ScanPipeline;
use crate::state::{ScanCoordinator, StateManager};
use std::sync::Arc;
use std::time::Instant;

/// Logged after every run that held the lock
pub const RUN_SEPARATOR: &str = "-----------------------------------";

/// What became of one trigger
#[derive(Debug)]
pub enum RunResult {
    /// Another run held the lock; nothing was touched
    Skipped,

    /// The general settings could not be loaded; no media type was scanned
    SettingsUnavailable(String),

    /// One report per media type, in scan order
    Completed(Vec<ScanReport>),
}

impl RunResult {
    pub fn reports(&self) -> &[ScanReport] {
        match self {
            RunResult::Completed(reports) => reports,
            _ => &[],
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, RunResult::Skipped)
    }
}

/// Single entry point for scheduled and manual triggers.
///
/// Takes the run lock, reloads the settings and scans every media type in
/// fixed order. A trigger that finds the lock held is dropped. A media type whose
/// settings file cannot be read is reported as aborted and the others still run.
pub struct ScanRunner {
    coordinator: Arc<ScanCoordinator>,
    config_manager: ConfigManager,
    pipeline: ScanPipeline,
    state: StateManager,
    metrics: Arc<Metrics>,
}

impl ScanRunner {
    pub fn new(
        coordinator: Arc<ScanCoordinator>,
        config_manager: ConfigManager,
        pipeline: ScanPipeline,
        state: StateManager,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            coordinator,
            config_manager,
            pipeline,
            state,
            metrics,
        }
    }

    pub fn config_manager(&self) -> &ConfigManager {
        &self.config_manager
    }

    pub fn state(&self) -> &StateManager {
        &self.state
    }

    pub fn run(&self, trigger: ScanTrigger) -> RunResult {
        let Some(_guard) = self.coordinator.try_lock() else {
            tracing::info!("A scan is already running, skipping {} trigger", trigger);
            self.metrics.record_run_skipped();
            self.state.record_skipped(trigger);
            return RunResult::Skipped;
        };

        let start = Instant::now();
        self.state.start_scan(trigger);

        let general = match self.config_manager.load_general_settings() {
            Ok(general) => general,
            Err(e) => {
                let message = format!("{:#}", e);
                tracing::error!("Failed to load settings: {}", message);
                self.state.finish_scan(Vec::new());
                tracing::info!("{}", RUN_SEPARATOR);
                return RunResult::SettingsUnavailable(message);
            }
        };

        let mut reports = Vec::with_capacity(MediaType::ALL.len());
        for media_type in MediaType::ALL {
            self.state.set_media_type(media_type);
            let report = match self.config_manager.load_type_settings(media_type) {
                Ok(config) => self.pipeline.run_scan(&config, &general, trigger),
                Err(e) => {
                    let message = format!("{:#}", e);
                    tracing::error!("Failed to load {} settings: {}", media_type, message);
                    self.metrics.record_configuration_error();
                    ScanReport::aborted(media_type, trigger, message)
                }
            };
            reports.push(report);
        }

        let titles: Vec<String> = reports
            .iter()
            .flat_map(|report| report.titles())
            .collect();
        self.state.finish_scan(titles);
        self.metrics.record_run(start.elapsed());
        tracing::info!("{}", RUN_SEPARATOR);

        RunResult::Completed(reports)
    }
}
