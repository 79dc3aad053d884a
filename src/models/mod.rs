//! Data models for the FolderExtractor application.
//!
//! - [`MediaTypeConfig`] / [`GeneralSettings`]: settings loaded from the YAML files in `Settings/`
//! - [`ExceptionRule`]: per-name destination override
//! - [`DiscoveredFile`], [`ProcessedMedium`], [`HistoryEntry`]: what a scan finds, renames and records
//! - [`ScanReport`]: result of scanning one media type
//! - [`AppState`]: observable runtime state held by [`StateManager`](crate::state::StateManager)

pub mod app_state;
pub mod config;
pub mod medium;
pub mod report;

pub use app_state::AppState;
pub use self::config::{ExceptionRule, GeneralSettings, MediaType, MediaTypeConfig, Settings};
pub use medium::{DiscoveredFile, HistoryEntry, ProcessedMedium, split_file_name};
pub use report::{FileFailure, Notification, ScanOutcome, ScanReport, ScanTrigger, Severity};
