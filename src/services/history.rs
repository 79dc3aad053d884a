use crate::models::HistoryEntry;
use crate::services::error::ScanError;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs::{self, OpenOptions};
use std::io::Write;

/// Append-only record of every file that reached its destination
#[cfg_attr(test, mockall::automock)]
pub trait HistoryStore: Send + Sync {
    fn append(&self, entries: &[HistoryEntry]) -> Result<(), ScanError>;
}

/// History kept as one line per entry in a text file.
#[derive(Debug, Clone)]
pub struct FileHistory {
    path: Utf8PathBuf,
}

impl FileHistory {
    pub fn new<P: AsRef<Utf8Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// The last `limit` lines, oldest first. A missing file has no lines.
    pub fn recent(&self, limit: usize) -> Result<Vec<String>, ScanError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(ScanError::History {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let lines: Vec<String> = content.lines().map(str::to_string).collect();
        let skip = lines.len().saturating_sub(limit);
        Ok(lines.into_iter().skip(skip).collect())
    }

    fn write_lines(&self, entries: &[HistoryEntry]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        for entry in entries {
            writeln!(file, "{}", entry.to_line())?;
        }
        file.flush()
    }
}

impl HistoryStore for FileHistory {
    fn append(&self, entries: &[HistoryEntry]) -> Result<(), ScanError> {
        if entries.is_empty() {
            return Ok(());
        }

        self.write_lines(entries).map_err(|source| ScanError::History {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!("Appended {} entries to {}", entries.len(), self.path);
        Ok(())
    }
}
