use crate::models::{MediaType, ProcessedMedium};
use camino::Utf8PathBuf;
use std::fmt;

/// Origin of a scan request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanTrigger {
    Manual,
    Scheduled,
}

impl fmt::Display for ScanTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanTrigger::Manual => f.write_str("manual"),
            ScanTrigger::Scheduled => f.write_str("scheduled"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

/// Payload handed to the notification collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub severity: Severity,
}

impl Notification {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            title: "FileExtractor".to_string(),
            body: message.into(),
            severity: Severity::Error,
        }
    }

    /// Summary of newly extracted titles.
    ///
    /// Up to two titles are listed one per line, larger batches collapse to a count.
    pub fn extracted(titles: &[String]) -> Option<Self> {
        let (title, body) = match titles.len() {
            0 => return None,
            1 => ("Extracted new file".to_string(), titles[0].clone()),
            2 => (
                "Extracted 2 new files".to_string(),
                titles.join("\n"),
            ),
            count => (
                format!("Extracted {} new files", count),
                format!("{} new files", count),
            ),
        };

        Some(Self {
            title,
            body,
            severity: Severity::Info,
        })
    }
}

/// A single file that could not be renamed, moved, or cleaned up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub path: Utf8PathBuf,
    pub error: String,
}

/// How a scan for one media type ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Completed,
    /// Settings or folder validation failed; nothing was touched
    Aborted(String),
}

/// Everything one scan of one media type did
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub media_type: MediaType,
    pub trigger: ScanTrigger,
    pub outcome: ScanOutcome,
    pub discovered: usize,
    pub renamed: Vec<ProcessedMedium>,
    pub rename_failures: Vec<FileFailure>,
    pub moved: Vec<ProcessedMedium>,
    pub move_failures: Vec<FileFailure>,
    pub removed_folders: Vec<Utf8PathBuf>,
    pub history_appended: usize,
    pub notification: Option<Notification>,
}

impl ScanReport {
    pub fn new(media_type: MediaType, trigger: ScanTrigger) -> Self {
        Self {
            media_type,
            trigger,
            outcome: ScanOutcome::Completed,
            discovered: 0,
            renamed: Vec::new(),
            rename_failures: Vec::new(),
            moved: Vec::new(),
            move_failures: Vec::new(),
            removed_folders: Vec::new(),
            history_appended: 0,
            notification: None,
        }
    }

    /// A scan that stopped before touching any file
    pub fn aborted(
        media_type: MediaType,
        trigger: ScanTrigger,
        message: impl Into<String>,
    ) -> Self {
        Self {
            outcome: ScanOutcome::Aborted(message.into()),
            ..Self::new(media_type, trigger)
        }
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self.outcome, ScanOutcome::Aborted(_))
    }

    /// Titles of every file that made it through the rename step
    pub fn titles(&self) -> Vec<String> {
        self.renamed.iter().map(|m| m.title.clone()).collect()
    }
}
