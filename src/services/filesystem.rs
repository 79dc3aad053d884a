//! File system collaborators of the scan pipeline: folder and file enumeration,
//! the media filter, in-place renames, moves and empty-folder cleanup.

use crate::models::{DiscoveredFile, FileFailure};
use crate::services::error::ScanError;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashSet;
use std::fs;
use std::io;
use walkdir::{DirEntry, WalkDir};

/// Extensions treated as media, lowercase without the dot
pub const MEDIA_EXTENSIONS: [&str; 14] = [
    "mkv", "mp4", "avi", "m4v", "mov", "wmv", "mpg", "mpeg", "ts", "m2ts", "webm", "flv", "ogm",
    "divx",
];

/// Check that a configured folder exists and is a directory
pub fn is_valid_folder(path: &Utf8Path) -> bool {
    !path.as_str().is_empty() && path.is_dir()
}

/// Lists folders and files below an extraction folder.
///
/// When a currently-watching marker is set, every folder or file whose name
/// contains it (case-insensitive) is left out together with its contents.
#[derive(Debug, Clone, Default)]
pub struct FolderLister {
    currently_watching_marker: Option<String>,
}

impl FolderLister {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_currently_watching_marker(marker: impl Into<String>) -> Self {
        let marker = marker.into().to_lowercase();
        Self {
            currently_watching_marker: (!marker.is_empty()).then_some(marker),
        }
    }

    fn is_excluded(&self, entry: &DirEntry) -> bool {
        match &self.currently_watching_marker {
            Some(marker) => entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.to_lowercase().contains(marker.as_str())),
            None => false,
        }
    }

    fn walk<'a>(
        &'a self,
        root: &Utf8Path,
        max_depth: usize,
    ) -> impl Iterator<Item = (Utf8PathBuf, fs::FileType)> + 'a {
        WalkDir::new(root)
            .min_depth(1)
            .max_depth(max_depth)
            .follow_links(false)
            .into_iter()
            .filter_entry(move |entry| !self.is_excluded(entry))
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter_map(|entry| {
                let file_type = entry.file_type();
                match Utf8PathBuf::try_from(entry.into_path()) {
                    Ok(path) => Some((path, file_type)),
                    Err(e) => {
                        tracing::warn!("Skipping non UTF-8 path: {}", e.into_path_buf().display());
                        None
                    }
                }
            })
    }

    /// Immediate subfolders of `root`, sorted by path
    pub fn list_subfolders(&self, root: &Utf8Path) -> Vec<Utf8PathBuf> {
        let mut folders: Vec<Utf8PathBuf> = self
            .walk(root, 1)
            .filter(|(_, file_type)| file_type.is_dir())
            .map(|(path, _)| path)
            .collect();
        folders.sort();
        folders
    }

    /// Regular files inside `folders`, descending into nested folders when `recursive`
    pub fn list_files(&self, folders: &[Utf8PathBuf], recursive: bool) -> Vec<DiscoveredFile> {
        let max_depth = if recursive { usize::MAX } else { 1 };
        folders
            .iter()
            .flat_map(|folder| self.walk(folder, max_depth))
            .filter(|(_, file_type)| file_type.is_file())
            .map(|(path, _)| DiscoveredFile::new(path))
            .collect()
    }

    /// Add the regular files directly inside `root` to `existing`
    pub fn list_files_directly_in(
        &self,
        root: &Utf8Path,
        mut existing: Vec<DiscoveredFile>,
    ) -> Vec<DiscoveredFile> {
        existing.extend(self.list_files(&[root.to_path_buf()], false));
        existing
    }
}

/// Keeps media files and drops everything else.
///
/// A file is media when its extension is on the allow-list. Sample clips are
/// dropped as well: files inside a `Sample` folder and files whose stem ends in
/// `sample`.
#[derive(Debug, Clone)]
pub struct MediaFilter {
    extensions: HashSet<String>,
}

impl MediaFilter {
    pub fn new() -> Self {
        Self::with_extensions(MEDIA_EXTENSIONS)
    }

    pub fn with_extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    pub fn is_media(&self, file: &DiscoveredFile) -> bool {
        let Some(extension) = file.path.extension() else {
            return false;
        };
        if !self.extensions.contains(&extension.to_lowercase()) {
            return false;
        }

        let in_sample_folder = file
            .parent
            .file_name()
            .is_some_and(|name| name.eq_ignore_ascii_case("sample"));
        let is_sample_clip = file
            .path
            .file_stem()
            .is_some_and(|stem| stem.to_lowercase().ends_with("sample"));

        !in_sample_folder && !is_sample_clip
    }

    pub fn filter(&self, files: Vec<DiscoveredFile>) -> Vec<DiscoveredFile> {
        files.into_iter().filter(|f| self.is_media(f)).collect()
    }
}

impl Default for MediaFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// Rename `file` to `new_name` inside its current folder.
///
/// Renaming onto an existing different file is refused instead of overwriting it.
pub fn rename_in_place(file: &DiscoveredFile, new_name: &str) -> Result<Utf8PathBuf, ScanError> {
    let target = file.parent.join(new_name);
    if target == file.path {
        return Ok(target);
    }

    let same_file_other_case =
        cfg!(windows) && target.as_str().to_lowercase() == file.path.as_str().to_lowercase();
    if target.exists() && !same_file_other_case {
        return Err(ScanError::RenameCollision {
            from: file.path.clone(),
            to: target,
        });
    }

    fs::rename(&file.path, &target).map_err(|source| ScanError::Rename {
        from: file.path.clone(),
        to: target.clone(),
        source,
    })?;

    tracing::debug!("Renamed {} -> {}", file.path, target);
    Ok(target)
}

/// Move `from` to `to`, replacing an existing file and creating missing folders.
///
/// Falls back to copy and delete when the destination is on another file system.
pub fn move_file(from: &Utf8Path, to: &Utf8Path) -> Result<(), ScanError> {
    let move_error = |source: io::Error| ScanError::Move {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(move_error)?;
    }

    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            tracing::debug!("Cross-device move, copying {} -> {}", from, to);
            fs::copy(from, to).map_err(move_error)?;
            fs::remove_file(from).map_err(move_error)
        }
        Err(e) => Err(move_error(e)),
    }
}

/// Remove every folder in `folders` that no longer contains any file.
///
/// Nested empty folders are removed bottom-up first. Folders that still hold
/// files are left alone.
pub fn remove_empty_folders(folders: &[Utf8PathBuf]) -> (Vec<Utf8PathBuf>, Vec<FileFailure>) {
    let mut removed = Vec::new();
    let mut failures = Vec::new();

    for folder in folders {
        if !folder.is_dir() {
            continue;
        }

        let nested: Vec<Utf8PathBuf> = WalkDir::new(folder)
            .contents_first(true)
            .follow_links(false)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_dir())
            .filter_map(|entry| Utf8PathBuf::try_from(entry.into_path()).ok())
            .collect();

        for dir in nested {
            if !is_empty_dir(&dir) {
                continue;
            }
            match fs::remove_dir(&dir) {
                Ok(()) => {
                    tracing::debug!("Removed empty folder {}", dir);
                    removed.push(dir);
                }
                Err(source) => {
                    let error = ScanError::Cleanup {
                        path: dir.clone(),
                        source,
                    };
                    tracing::error!("{}", error);
                    failures.push(FileFailure {
                        path: dir,
                        error: error.to_string(),
                    });
                }
            }
        }
    }

    (removed, failures)
}

fn is_empty_dir(path: &Utf8Path) -> bool {
    fs::read_dir(path).is_ok_and(|mut entries| entries.next().is_none())
}
