// Command controller - line-based replacement for the tray menu
//
// Each stdin line is looked up in an ordered command table and executed against
// the shared ScanRunner and SchedulerHandle. Scans run on the blocking pool so the
// loop stays responsive; a `scan` issued during a scheduled run is dropped by the
// run lock like any other overlapping trigger.

use crate::logging::{LOG_PREFIX, latest_log_file};
use crate::models::{ScanOutcome, ScanTrigger};
use crate::scheduler::SchedulerHandle;
use crate::services::{FileHistory, RunResult, ScanRunner};
use crate::state::{StateChange, StateManager};
use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use indexmap::IndexMap;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

/// Number of history lines shown by the `history` command
const HISTORY_LINES: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Scan,
    Pause,
    Resume,
    History,
    Log,
    Settings,
    Help,
    Exit,
}

/// Whether the loop keeps reading after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResponse {
    pub flow: Flow,
    pub lines: Vec<String>,
}

impl CommandResponse {
    fn lines(lines: Vec<String>) -> Self {
        Self {
            flow: Flow::Continue,
            lines,
        }
    }

    fn line(line: impl Into<String>) -> Self {
        Self::lines(vec![line.into()])
    }
}

/// Command names in the order `help` lists them, with their descriptions
pub fn command_table() -> IndexMap<&'static str, (Command, &'static str)> {
    let mut table = IndexMap::new();
    table.insert("scan", (Command::Scan, "scan every media type now"));
    table.insert("pause", (Command::Pause, "pause the timer"));
    table.insert("resume", (Command::Resume, "resume the timer"));
    table.insert("history", (Command::History, "show the most recent history entries"));
    table.insert("log", (Command::Log, "show the path of the current log file"));
    table.insert("settings", (Command::Settings, "show the loaded settings"));
    table.insert("help", (Command::Help, "list the commands"));
    table.insert("exit", (Command::Exit, "stop the timer and quit"));
    table
}

/// Dispatches commands to the runner and the timer
pub struct CommandController {
    runner: Arc<ScanRunner>,
    scheduler: Option<SchedulerHandle>,
    history: FileHistory,
    log_dir: Utf8PathBuf,
    commands: IndexMap<&'static str, (Command, &'static str)>,
}

impl CommandController {
    pub fn new(
        runner: Arc<ScanRunner>,
        scheduler: Option<SchedulerHandle>,
        history: FileHistory,
        log_dir: impl Into<Utf8PathBuf>,
    ) -> Self {
        Self {
            runner,
            scheduler,
            history,
            log_dir: log_dir.into(),
            commands: command_table(),
        }
    }

    /// Case-insensitive lookup of a trimmed input line
    pub fn parse(&self, line: &str) -> Option<Command> {
        let name = line.trim().to_lowercase();
        self.commands.get(name.as_str()).map(|(command, _)| *command)
    }

    pub async fn execute(&self, command: Command) -> CommandResponse {
        match command {
            Command::Scan => self.scan().await,
            Command::Pause => match &self.scheduler {
                Some(scheduler) => {
                    scheduler.pause();
                    CommandResponse::line("Timer paused")
                }
                None => CommandResponse::line("Timer is disabled"),
            },
            Command::Resume => match &self.scheduler {
                Some(scheduler) => {
                    scheduler.resume();
                    CommandResponse::line(format!(
                        "Timer resumed, next scan in {} minutes",
                        scheduler.period().as_secs() / 60
                    ))
                }
                None => CommandResponse::line("Timer is disabled"),
            },
            Command::History => self.show_history(),
            Command::Log => match latest_log_file(&self.log_dir, LOG_PREFIX) {
                Some(path) => CommandResponse::line(path.to_string()),
                None => CommandResponse::line(format!("No log file in {}", self.log_dir)),
            },
            Command::Settings => self.show_settings(),
            Command::Help => CommandResponse::lines(
                self.commands
                    .iter()
                    .map(|(name, (_, description))| format!("{:<10}{}", name, description))
                    .collect(),
            ),
            Command::Exit => CommandResponse {
                flow: Flow::Exit,
                lines: vec!["Exiting".to_string()],
            },
        }
    }

    async fn scan(&self) -> CommandResponse {
        let runner = Arc::clone(&self.runner);
        let result = match tokio::task::spawn_blocking(move || runner.run(ScanTrigger::Manual)).await
        {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("Manual scan failed: {}", e);
                return CommandResponse::line(format!("Scan failed: {}", e));
            }
        };

        match result {
            RunResult::Skipped => CommandResponse::line("A scan is already running"),
            RunResult::SettingsUnavailable(message) => {
                CommandResponse::line(format!("Settings could not be loaded: {}", message))
            }
            RunResult::Completed(reports) => CommandResponse::lines(
                reports
                    .iter()
                    .map(|report| match &report.outcome {
                        ScanOutcome::Aborted(message) => {
                            format!("{}: {}", report.media_type, message)
                        }
                        ScanOutcome::Completed => format!(
                            "{}: {} found, {} renamed, {} moved, {} failed",
                            report.media_type,
                            report.discovered,
                            report.renamed.len(),
                            report.moved.len(),
                            report.rename_failures.len() + report.move_failures.len()
                        ),
                    })
                    .collect(),
            ),
        }
    }

    fn show_history(&self) -> CommandResponse {
        match self.history.recent(HISTORY_LINES) {
            Ok(lines) if lines.is_empty() => CommandResponse::line("History is empty"),
            Ok(lines) => CommandResponse::lines(lines),
            Err(e) => CommandResponse::line(e.to_string()),
        }
    }

    fn show_settings(&self) -> CommandResponse {
        let config_manager = self.runner.config_manager();
        let settings = match config_manager.load_settings() {
            Ok(settings) => settings,
            Err(e) => return CommandResponse::line(format!("{:#}", e)),
        };

        let general = &settings.general;
        let mut lines = vec![
            format!("Settings folder: {}", config_manager.config_dir()),
            format!(
                "Moving: {}, Cleanup: {}, History: {}, Popups: {}, Timer: {} ({} min)",
                general.use_file_moving,
                general.use_cleanup,
                general.use_history,
                general.popups_enabled(),
                general.use_timer,
                general.timer_interval_minutes
            ),
        ];
        lines.extend(settings.types.iter().map(|config| {
            format!(
                "{}: '{}' -> '{}', {} exceptions",
                config.media_type,
                config.extraction_path,
                config.completion_path,
                config.exceptions.len()
            )
        }));

        CommandResponse::lines(lines)
    }

    /// Read commands from stdin until `exit` or end of input, then stop the timer.
    pub async fn run(mut self) -> Result<()> {
        let listener = spawn_state_listener(self.runner.state());
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        println!("Type 'help' for the list of commands.");
        while let Some(line) = lines
            .next_line()
            .await
            .context("Failed to read from stdin")?
        {
            if line.trim().is_empty() {
                continue;
            }

            let Some(command) = self.parse(&line) else {
                println!("Unknown command '{}', type 'help'", line.trim());
                continue;
            };

            tracing::debug!("Command: {:?}", command);
            let response = self.execute(command).await;
            for line in &response.lines {
                println!("{}", line);
            }
            if response.flow == Flow::Exit {
                break;
            }
        }

        if let Some(scheduler) = self.scheduler.take() {
            scheduler.shutdown().await;
        }
        listener.abort();

        Ok(())
    }
}

/// Log every state change at debug level
fn spawn_state_listener(state: &StateManager) -> tokio::task::JoinHandle<()> {
    let mut rx = state.subscribe();

    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(StateChange::ScanSkipped { trigger }) => {
                    tracing::debug!("Dropped {} trigger while a scan was running", trigger);
                }
                Ok(change) => tracing::debug!("State change: {:?}", change),
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!("State listener missed {} events", missed);
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigManager;
    use crate::metrics::Metrics;
    use crate::models::{HistoryEntry, MediaType, MediaTypeConfig};
    use crate::services::history::HistoryStore;
    use crate::services::{RecordingNotifier, ScanPipeline};
    use crate::state::ScanCoordinator;
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        root: Utf8PathBuf,
        coordinator: Arc<ScanCoordinator>,
        controller: CommandController,
    }

    fn fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(temp.path().to_path_buf()).unwrap();
        let config_manager = ConfigManager::new(root.join("Settings"))
            .unwrap()
            .with_environment(config::Map::new());
        let history = FileHistory::new(root.join("Logs/History.txt"));
        let metrics = Arc::new(Metrics::new());
        let pipeline = ScanPipeline::new(
            Arc::new(history.clone()),
            Arc::new(RecordingNotifier::new()),
            Arc::clone(&metrics),
        );
        let coordinator = Arc::new(ScanCoordinator::new());
        let runner = Arc::new(ScanRunner::new(
            Arc::clone(&coordinator),
            config_manager,
            pipeline,
            StateManager::new(),
            metrics,
        ));
        let controller = CommandController::new(runner, None, history, root.join("Logs"));

        Fixture {
            _temp: temp,
            root,
            coordinator,
            controller,
        }
    }

    #[test]
    fn test_parse_is_case_insensitive_and_trims() {
        let fx = fixture();
        assert_eq!(fx.controller.parse("  SCAN \n"), Some(Command::Scan));
        assert_eq!(fx.controller.parse("Exit"), Some(Command::Exit));
        assert_eq!(fx.controller.parse("rescan"), None);
    }

    #[test]
    fn test_command_table_order() {
        let names: Vec<&str> = command_table().keys().copied().collect();
        assert_eq!(
            names,
            vec!["scan", "pause", "resume", "history", "log", "settings", "help", "exit"]
        );
    }

    #[tokio::test]
    async fn test_help_lists_every_command() {
        let fx = fixture();
        let response = fx.controller.execute(Command::Help).await;

        assert_eq!(response.flow, Flow::Continue);
        assert_eq!(response.lines.len(), 8);
        assert!(response.lines[0].starts_with("scan"));
    }

    #[test]
    fn test_exit_stops_loop() {
        let fx = fixture();
        let response = tokio_test::block_on(fx.controller.execute(Command::Exit));
        assert_eq!(response.flow, Flow::Exit);
    }

    #[tokio::test]
    async fn test_timer_commands_without_timer() {
        let fx = fixture();
        let response = fx.controller.execute(Command::Pause).await;
        assert_eq!(response.lines, vec!["Timer is disabled".to_string()]);
    }

    #[tokio::test]
    async fn test_scan_reports_each_media_type() {
        let fx = fixture();
        let response = fx.controller.execute(Command::Scan).await;

        assert_eq!(response.lines.len(), 3);
        assert!(response.lines[0].starts_with("Anime: ExtractionFolder"));
    }

    #[tokio::test]
    async fn test_scan_while_locked_is_dropped() {
        let fx = fixture();
        let _guard = fx.coordinator.try_lock().unwrap();

        let response = fx.controller.execute(Command::Scan).await;
        assert_eq!(response.lines, vec!["A scan is already running".to_string()]);
    }

    #[tokio::test]
    async fn test_history_shows_recent_entries() {
        let fx = fixture();
        assert_eq!(
            fx.controller.execute(Command::History).await.lines,
            vec!["History is empty".to_string()]
        );

        FileHistory::new(fx.root.join("Logs/History.txt"))
            .append(&[HistoryEntry::now("Movie Title", MediaType::Movie)])
            .unwrap();

        let lines = fx.controller.execute(Command::History).await.lines;
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("| Movie | Movie Title"));
    }

    #[tokio::test]
    async fn test_settings_lists_types() {
        let fx = fixture();
        fx.controller
            .runner
            .config_manager()
            .save_type_settings(&MediaTypeConfig::with_paths(MediaType::Series, "/in", "/out"))
            .unwrap();

        let lines = fx.controller.execute(Command::Settings).await.lines;
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[3], "Series: '/in' -> '/out', 0 exceptions");
    }
}
