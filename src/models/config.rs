use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Media category a set of folders is configured for.
///
/// The order of [`MediaType::ALL`] is the order in which a run scans the types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaType {
    Anime,
    Series,
    Movie,
}

impl MediaType {
    pub const ALL: [MediaType; 3] = [MediaType::Anime, MediaType::Series, MediaType::Movie];

    /// Name used for the settings file and in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Anime => "Anime",
            MediaType::Series => "Series",
            MediaType::Movie => "Movie",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-name destination override.
///
/// A file whose name starts with `name_prefix` (case-insensitive) is moved below
/// `override_path` instead of directly into the completion folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionRule {
    #[serde(rename = "Name")]
    pub name_prefix: String,

    #[serde(rename = "Path")]
    pub override_path: String,
}

impl ExceptionRule {
    pub fn new(name_prefix: impl Into<String>, override_path: impl Into<String>) -> Self {
        Self {
            name_prefix: name_prefix.into(),
            override_path: override_path.into(),
        }
    }

    /// Case-insensitive "file name starts with prefix" test
    pub fn matches(&self, file_name: &str) -> bool {
        file_name
            .to_lowercase()
            .starts_with(&self.name_prefix.to_lowercase())
    }
}

/// Settings for one media type, stored in `<Type>.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaTypeConfig {
    #[serde(rename = "Type")]
    pub media_type: MediaType,

    #[serde(rename = "ExtractionPath", default)]
    pub extraction_path: Utf8PathBuf,

    #[serde(rename = "CompletionPath", default)]
    pub completion_path: Utf8PathBuf,

    #[serde(rename = "UseSeriesFolder", default)]
    pub use_series_folder: bool,

    #[serde(rename = "UseSeasonFolder", default)]
    pub use_season_folder: bool,

    #[serde(rename = "UseCurrentlyWatchingCheck", default)]
    pub use_currently_watching_check: bool,

    #[serde(
        rename = "CurrentlyWatchingMarker",
        default = "default_currently_watching_marker"
    )]
    pub currently_watching_marker: String,

    #[serde(rename = "Exceptions", default)]
    pub exceptions: Vec<ExceptionRule>,
}

impl MediaTypeConfig {
    /// Empty settings for a media type; paths must be filled in before a scan can run
    pub fn new(media_type: MediaType) -> Self {
        Self {
            media_type,
            extraction_path: Utf8PathBuf::new(),
            completion_path: Utf8PathBuf::new(),
            use_series_folder: false,
            use_season_folder: false,
            use_currently_watching_check: false,
            currently_watching_marker: default_currently_watching_marker(),
            exceptions: Vec::new(),
        }
    }

    pub fn with_paths(
        media_type: MediaType,
        extraction_path: impl Into<Utf8PathBuf>,
        completion_path: impl Into<Utf8PathBuf>,
    ) -> Self {
        Self {
            extraction_path: extraction_path.into(),
            completion_path: completion_path.into(),
            ..Self::new(media_type)
        }
    }
}

fn default_currently_watching_marker() -> String {
    "[Watching]".to_string()
}

fn default_timer_interval_minutes() -> u64 {
    5
}

fn default_history_file() -> Utf8PathBuf {
    Utf8PathBuf::from("Logs/History.txt")
}

/// Feature toggles shared by every media type, stored in `General.yaml`.
///
/// Keys are snake_case so that `EXTRACTOR_<KEY>` environment variables map onto
/// them one to one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    pub use_file_moving: bool,
    pub use_cleanup: bool,
    pub use_history: bool,
    pub use_system_tray: bool,
    pub use_popup_notification: bool,
    pub use_extended_logging: bool,
    pub use_timer: bool,

    #[serde(default = "default_timer_interval_minutes")]
    pub timer_interval_minutes: u64,

    #[serde(default = "default_history_file")]
    pub history_file: Utf8PathBuf,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            use_file_moving: true,
            use_cleanup: true,
            use_history: true,
            use_system_tray: true,
            use_popup_notification: true,
            use_extended_logging: false,
            use_timer: true,
            timer_interval_minutes: default_timer_interval_minutes(),
            history_file: default_history_file(),
        }
    }
}

impl GeneralSettings {
    /// Popups need both the tray and the popup toggle
    pub fn popups_enabled(&self) -> bool {
        self.use_system_tray && self.use_popup_notification
    }
}

/// Snapshot of all settings, reloaded at the start of every run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub general: GeneralSettings,
    pub types: Vec<MediaTypeConfig>,
}
