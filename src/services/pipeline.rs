use crate::metrics::Metrics;
use crate::models::{
    DiscoveredFile, FileFailure, GeneralSettings, HistoryEntry, MediaTypeConfig, Notification,
    ProcessedMedium, ScanOutcome, ScanReport, ScanTrigger, split_file_name,
};
use crate::services::destination::resolve_layout;
use crate::services::error::ScanError;
use crate::services::filesystem::{
    FolderLister, MediaFilter, is_valid_folder, move_file, remove_empty_folders, rename_in_place,
};
use crate::services::history::HistoryStore;
use crate::services::normalizer::NameNormalizer;
use crate::services::notifier::Notifier;
use camino::Utf8PathBuf;
use std::sync::Arc;

/// Scans one media type: discover, rename, move, clean up, record and notify.
///
/// Every step after folder validation isolates failures per file; a failed
/// rename drops the file from the rest of the scan, a failed move leaves the
/// renamed file where it is. Nothing here returns an error to the caller, the
/// [`ScanReport`] carries what went wrong.
pub struct ScanPipeline {
    normalizer: NameNormalizer,
    filter: MediaFilter,
    history: Arc<dyn HistoryStore>,
    notifier: Arc<dyn Notifier>,
    metrics: Arc<Metrics>,
}

impl ScanPipeline {
    pub fn new(
        history: Arc<dyn HistoryStore>,
        notifier: Arc<dyn Notifier>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            normalizer: NameNormalizer::new(),
            filter: MediaFilter::new(),
            history,
            notifier,
            metrics,
        }
    }

    /// Replace the default media filter
    pub fn with_filter(mut self, filter: MediaFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn run_scan(
        &self,
        config: &MediaTypeConfig,
        general: &GeneralSettings,
        trigger: ScanTrigger,
    ) -> ScanReport {
        let mut report = ScanReport::new(config.media_type, trigger);

        match trigger {
            ScanTrigger::Manual => tracing::info!("Checking for {} (manually):", config.media_type),
            ScanTrigger::Scheduled => tracing::info!("Checking for {}:", config.media_type),
        }
        if general.use_extended_logging {
            tracing::info!(
                "Type: '{}', ExtractionPath: '{}', CompletionPath: '{}', SeriesFolder: '{}', SeasonFolder: '{}', CurrentlyWatchingCheck: '{}'.",
                config.media_type,
                config.extraction_path,
                config.completion_path,
                config.use_series_folder,
                config.use_season_folder,
                config.use_currently_watching_check
            );
        }

        if let Err(error) = validate_folders(config) {
            let message = error.to_string();
            tracing::error!("{}", message);
            self.metrics.record_configuration_error();
            if general.popups_enabled() {
                self.notifier.notify(&Notification::error(message.clone()));
            }
            report.outcome = ScanOutcome::Aborted(message);
            return report;
        }

        let lister = if config.use_currently_watching_check {
            FolderLister::with_currently_watching_marker(&config.currently_watching_marker)
        } else {
            FolderLister::new()
        };
        let folders = lister.list_subfolders(&config.extraction_path);
        let files = lister.list_files(&folders, true);
        let files = lister.list_files_directly_in(&config.extraction_path, files);

        let mut files = self.filter.filter(files);
        files.sort_by(|a, b| a.path.as_str().cmp(b.path.as_str()));
        report.discovered = files.len();
        tracing::info!("Number of entries to process: '{}'.", files.len());

        let (renamed, rename_failures) = self.rename_files(&files, config);
        self.metrics.record_renamed(renamed.len());
        self.metrics.record_rename_failures(rename_failures.len());
        report.rename_failures = rename_failures;

        let completed = if general.use_file_moving {
            let (moved, move_failures) = self.move_files(&renamed, config);
            self.metrics.record_moved(moved.len());
            self.metrics.record_move_failures(move_failures.len());
            report.move_failures = move_failures;
            report.moved = moved.clone();
            moved
        } else {
            renamed.clone()
        };

        if general.use_cleanup {
            let (removed, failures) = remove_empty_folders(&folders);
            report.removed_folders = removed;
            if !failures.is_empty() {
                tracing::warn!("{} folders could not be removed", failures.len());
            }
        }

        if general.use_history && !completed.is_empty() {
            let entries: Vec<HistoryEntry> = completed
                .iter()
                .map(|medium| HistoryEntry::now(medium.title.clone(), medium.media_type))
                .collect();
            match self.history.append(&entries) {
                Ok(()) => report.history_appended = entries.len(),
                Err(e) => tracing::error!("{}", e),
            }
        }

        report.renamed = renamed;
        report.notification = Notification::extracted(&report.titles());
        if let Some(ref notification) = report.notification {
            if general.popups_enabled() {
                self.notifier.notify(notification);
            }
        }

        report
    }

    fn rename_files(
        &self,
        files: &[DiscoveredFile],
        config: &MediaTypeConfig,
    ) -> (Vec<ProcessedMedium>, Vec<FileFailure>) {
        let mut renamed = Vec::new();
        let mut failures = Vec::new();

        for file in files {
            let (stem, extension) = split_file_name(file.file_name());
            let name = self.normalizer.normalize(stem, config.media_type);
            let new_file_name = format!("{}{}", name.stem, extension);

            match rename_in_place(file, &new_file_name) {
                Ok(current_path) => renamed.push(ProcessedMedium {
                    original_path: file.path.clone(),
                    current_path,
                    title: name.stem,
                    file_name: new_file_name,
                    media_type: config.media_type,
                    series_name: name.series_name,
                    season: name.season,
                    destination: None,
                }),
                Err(e) => {
                    tracing::error!("{}", e);
                    failures.push(FileFailure {
                        path: file.path.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        (renamed, failures)
    }

    fn move_files(
        &self,
        media: &[ProcessedMedium],
        config: &MediaTypeConfig,
    ) -> (Vec<ProcessedMedium>, Vec<FileFailure>) {
        let mut moved = Vec::new();
        let mut failures = Vec::new();

        for medium in media {
            let destination: Utf8PathBuf = resolve_layout(
                &medium.file_name,
                medium.series_name.as_deref(),
                medium.season,
                config,
            );

            match move_file(&medium.current_path, &destination) {
                Ok(()) => {
                    tracing::info!("Moved '{}' to '{}'", medium.title, destination);
                    moved.push(ProcessedMedium {
                        current_path: destination.clone(),
                        destination: Some(destination),
                        ..medium.clone()
                    });
                }
                Err(e) => {
                    tracing::error!("{}", e);
                    failures.push(FileFailure {
                        path: medium.current_path.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        (moved, failures)
    }
}

fn validate_folders(config: &MediaTypeConfig) -> Result<(), ScanError> {
    if !is_valid_folder(&config.extraction_path) {
        return Err(ScanError::InvalidExtractionFolder(config.extraction_path.clone()));
    }
    if !is_valid_folder(&config.completion_path) {
        return Err(ScanError::InvalidCompletionFolder(config.completion_path.clone()));
    }
    Ok(())
}
