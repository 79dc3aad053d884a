// FolderExtractor - files freshly extracted media into a completion tree
//
// This is the library crate containing the core business logic and data structures.
// The binary crate (main.rs) wires it to the timer and the stdin command loop.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod scheduler;
pub mod services;
pub mod state;
pub mod ui;

// Re-export commonly used types for convenience
pub use crate::config::ConfigManager;
pub use models::{AppState, GeneralSettings, MediaType, MediaTypeConfig, ScanReport, ScanTrigger};
pub use services::{ScanPipeline, ScanRunner};
pub use state::{ScanCoordinator, StateChange, StateManager};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
