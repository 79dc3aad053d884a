use crate::models::MediaType;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Local};

/// A regular file found during enumeration, together with the folder it sits in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DiscoveredFile {
    pub path: Utf8PathBuf,
    pub parent: Utf8PathBuf,
}

impl DiscoveredFile {
    pub fn new(path: Utf8PathBuf) -> Self {
        let parent = path
            .parent()
            .map(Utf8Path::to_path_buf)
            .unwrap_or_default();
        Self { path, parent }
    }

    pub fn file_name(&self) -> &str {
        self.path.file_name().unwrap_or_default()
    }
}

/// Split a file name at its last `.`.
///
/// The extension keeps its leading dot. A name without any `.` has an empty
/// extension and is returned whole as the stem.
pub fn split_file_name(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(index) => file_name.split_at(index),
        None => (file_name, ""),
    }
}

/// A file that was renamed successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedMedium {
    pub original_path: Utf8PathBuf,
    /// Path after the in-place rename
    pub current_path: Utf8PathBuf,
    /// Cleaned stem, used for history and notifications
    pub title: String,
    pub file_name: String,
    pub media_type: MediaType,
    /// Series or anime title for series-folder layouts
    pub series_name: Option<String>,
    pub season: Option<u32>,
    /// Resolved destination below the completion root, set when moving is enabled
    pub destination: Option<Utf8PathBuf>,
}

/// One line of the append-only history log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub title: String,
    pub media_type: MediaType,
    pub timestamp: DateTime<Local>,
}

impl HistoryEntry {
    pub fn now(title: impl Into<String>, media_type: MediaType) -> Self {
        Self {
            title: title.into(),
            media_type,
            timestamp: Local::now(),
        }
    }

    /// `2026-10-19 08:15:00 | Series | Show Name - S01E02`
    pub fn to_line(&self) -> String {
        format!(
            "{} | {} | {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.media_type,
            self.title
        )
    }
}
