//! Portal fences: live mirrors of a folder.
//!
//! A Portal fence's items are never persisted; they are read from its folder
//! every time the folder changes. The watcher runs on a `notify` thread and
//! only signals "changed"; the listing itself is re-read on the UI thread.

use std::cmp::Ordering;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::platform::path::unique_path;

/// One file or folder inside a mirrored folder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortalEntry {
    pub path: PathBuf,
    pub name: String,
    pub is_dir: bool,
}

/// Whether `path` can back a Portal fence.
#[must_use]
pub fn is_valid_portal_path(path: Option<&str>) -> bool {
    path.map(str::trim).filter(|p| !p.is_empty()).is_some_and(|p| Path::new(p).is_dir())
}

/// Lists a folder: folders first, then files, each in natural order.
/// Dot-files are skipped.
pub fn list_folder(path: &Path) -> io::Result<Vec<PortalEntry>> {
    let mut entries: Vec<PortalEntry> = fs::read_dir(path)?
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                return None;
            }
            let is_dir = entry.file_type().is_ok_and(|t| t.is_dir());
            Some(PortalEntry { path: entry.path(), name, is_dir })
        })
        .collect();

    entries.sort_by(|a, b| match (a.is_dir, b.is_dir) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => natord::compare_ignore_case(&a.name, &b.name),
    });

    Ok(entries)
}

/// Copies a file or folder into `dir`, renaming on collision.
///
/// Returns the path of the copy.
pub fn copy_into(dir: &Path, source: &Path) -> io::Result<PathBuf> {
    let name = source
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "source has no file name"))?;
    let destination = unique_path(dir, name);

    if source.is_dir() {
        copy_dir_recursive(source, &destination)?;
    } else {
        fs::copy(source, &destination)?;
    }
    Ok(destination)
}

fn copy_dir_recursive(source: &Path, destination: &Path) -> io::Result<()> {
    fs::create_dir_all(destination)?;
    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let target = destination.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// The folder behind a Portal fence, optionally watched for changes.
///
/// Dropping the mirror stops its watcher.
pub struct PortalMirror {
    path: PathBuf,
    watcher: Option<RecommendedWatcher>,
}

impl std::fmt::Debug for PortalMirror {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortalMirror")
            .field("path", &self.path)
            .field("watching", &self.watcher.is_some())
            .finish()
    }
}

impl PortalMirror {
    /// A mirror that is only read on demand.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into(), watcher: None } }

    /// A mirror that calls `on_change` from the watcher thread whenever the
    /// folder's contents change.
    ///
    /// If the watcher cannot be created the mirror still works, it just
    /// does not refresh by itself.
    pub fn watched<F>(path: impl Into<PathBuf>, on_change: F) -> Self
    where F: Fn() + Send + 'static {
        let path = path.into();

        let handler = move |result: notify::Result<notify::Event>| match result {
            Ok(event) => {
                if matches!(
                    event.kind,
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                ) {
                    on_change();
                }
            }
            Err(err) => {
                tracing::warn!(target: crate::logging::UI, error = %err, "portal watch error");
            }
        };

        let watcher = match notify::recommended_watcher(handler) {
            Ok(mut watcher) => match watcher.watch(&path, RecursiveMode::NonRecursive) {
                Ok(()) => Some(watcher),
                Err(err) => {
                    tracing::warn!(
                        target: crate::logging::UI,
                        path = %path.display(),
                        error = %err,
                        "failed to watch portal folder"
                    );
                    None
                }
            },
            Err(err) => {
                tracing::warn!(target: crate::logging::UI, error = %err, "failed to create portal watcher");
                None
            }
        };

        Self { path, watcher }
    }

    #[must_use]
    pub fn path(&self) -> &Path { &self.path }

    #[must_use]
    pub const fn is_watching(&self) -> bool { self.watcher.is_some() }

    /// Reads the current folder listing.
    pub fn entries(&self) -> io::Result<Vec<PortalEntry>> { list_folder(&self.path) }

    /// Copies a dropped file or folder into the mirrored folder.
    pub fn copy_in(&self, source: &Path) -> io::Result<PathBuf> { copy_into(&self.path, source) }
}
