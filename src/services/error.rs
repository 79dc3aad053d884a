use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur during a scan
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("ExtractionFolder '{0}' is not valid.")]
    InvalidExtractionFolder(Utf8PathBuf),

    #[error("CompletionFolder '{0}' is not valid.")]
    InvalidCompletionFolder(Utf8PathBuf),

    #[error("Failed to rename '{from}' to '{to}': {source}")]
    Rename {
        from: Utf8PathBuf,
        to: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to rename '{from}': '{to}' already exists")]
    RenameCollision { from: Utf8PathBuf, to: Utf8PathBuf },

    #[error("Failed to move '{from}' to '{to}': {source}")]
    Move {
        from: Utf8PathBuf,
        to: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove folder '{path}': {source}")]
    Cleanup {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write history to '{path}': {source}")]
    History {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

