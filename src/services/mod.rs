//! Services module - the scan, classify, rename and move pipeline.
//!
//! The services have no dependency on the command loop or the scheduler and can
//! be driven directly from tests.
//!
//! # Components
//!
//! - [`NameNormalizer`]: cleans a file stem with the grammar of its media type
//!   (anime release tags, `SxxEyy` series names, plain movie titles) after
//!   stripping quality tokens such as `1080p` or `x264`.
//! - [`destination`]: pure resolution of the folder a renamed file belongs in,
//!   honoring exception-path overrides and series/season sub-folders.
//! - [`filesystem`]: folder enumeration, the media filter, in-place rename,
//!   cross-device move and empty-folder cleanup.
//! - [`HistoryStore`] / [`FileHistory`]: append-only record of processed files.
//! - [`Notifier`] / [`LogNotifier`]: user-facing notifications.
//! - [`ScanPipeline`]: one scan of one media type, producing a [`ScanReport`].
//! - [`ScanRunner`]: takes the run lock, reloads settings and scans every media
//!   type in fixed order.
//!
//! # Usage Example
//!
//! ```ignore
//! use folder_extractor::services::ScanPipeline;
//!
//! let pipeline = ScanPipeline::new(history, notifier, metrics);
//! let report = pipeline.run_scan(&series_config, &general, ScanTrigger::Manual);
//! for failure in &report.rename_failures {
//!     println!("{}: {}", failure.path, failure.error);
//! }
//! ```
//!
//! [`ScanReport`]: crate::models::ScanReport

pub mod destination;
pub mod error;
pub mod filesystem;
pub mod history;
pub mod normalizer;
pub mod notifier;
pub mod pipeline;
pub mod runner;

pub use error::ScanError;
pub use filesystem::{FolderLister, MediaFilter};
pub use history::{FileHistory, HistoryStore};
pub use normalizer::{NameNormalizer, NormalizedName};
pub use notifier::{LogNotifier, Notifier, RecordingNotifier};
pub use pipeline::ScanPipeline;
pub use runner::{RUN_SEPARATOR, RunResult, ScanRunner};
