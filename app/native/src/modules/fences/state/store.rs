//! The fence record store.
//!
//! Owns the ordered record list and its JSON document. Every save rewrites
//! the whole file; there is no incremental or atomic write.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use super::record::{FenceRecord, ItemRecord};

/// Errors raised while reading or writing the fence document.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to access fence document {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Fence document {path} is not a fence array or fence object: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize fences: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// In-memory fence records backed by a JSON document.
#[derive(Debug)]
pub struct FenceStore {
    path: PathBuf,
    records: Vec<FenceRecord>,
}

impl FenceStore {
    /// Creates an empty store writing to `path`. Nothing is read.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into(), records: Vec::new() } }

    /// Loads the store from `path`.
    ///
    /// A missing or empty document yields one default fence. A document that
    /// is neither an array of fences nor a single fence object is an error.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records = read_document(&path)?;
        Ok(Self { path, records })
    }

    /// Replaces the records with a freshly read document.
    pub fn reload(&mut self) -> Result<(), StoreError> {
        self.records = read_document(&self.path)?;
        Ok(())
    }

    /// Writes every record to the document, replacing its contents.
    pub fn save(&self) -> Result<(), StoreError> {
        let json = to_document(&self.records)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        fs::write(&self.path, json).map_err(|source| StoreError::Io { path: self.path.clone(), source })
    }

    #[must_use]
    pub fn path(&self) -> &Path { &self.path }

    #[must_use]
    pub fn records(&self) -> &[FenceRecord] { &self.records }

    /// A copy of every record, for consumers outside the UI thread.
    #[must_use]
    pub fn snapshot(&self) -> Vec<FenceRecord> { self.records.clone() }

    /// Replaces all records.
    pub fn replace_all(&mut self, records: Vec<FenceRecord>) { self.records = records; }

    pub fn add(&mut self, record: FenceRecord) { self.records.push(record); }

    /// Removes the record with `id`, returning it.
    pub fn remove(&mut self, id: &str) -> Option<FenceRecord> {
        let index = self.position(id)?;
        Some(self.records.remove(index))
    }

    #[must_use]
    pub fn find_by_id(&self, id: &str) -> Option<&FenceRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut FenceRecord> {
        self.records.iter_mut().find(|record| record.id == id)
    }

    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|record| record.id == id)
    }

    /// Drops every record the predicate rejects, returning the removed ones.
    pub fn retain<F>(&mut self, mut keep: F) -> Vec<FenceRecord>
    where F: FnMut(&FenceRecord) -> bool {
        let (kept, removed) = std::mem::take(&mut self.records).into_iter().partition(|r| keep(r));
        self.records = kept;
        removed
    }

    /// Finds the fence whose items contain `filename`.
    #[must_use]
    pub fn find_item(&self, filename: &str) -> Option<(&FenceRecord, &ItemRecord)> {
        self.records.iter().find_map(|record| {
            record.items().iter().find(|item| item.filename == filename).map(|item| (record, item))
        })
    }

    #[must_use]
    pub fn len(&self) -> usize { self.records.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.records.is_empty() }
}

/// Reads and decodes the document at `path`.
///
/// Used by [`FenceStore::load`] and by background reloads, which parse off
/// the UI thread and hand the records over afterwards.
pub fn read_document(path: &Path) -> Result<Vec<FenceRecord>, StoreError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            tracing::info!(
                target: crate::logging::GENERAL,
                path = %path.display(),
                "no fence document found, starting with a default fence"
            );
            return Ok(vec![FenceRecord::default_data_fence()]);
        }
        Err(source) => return Err(StoreError::Io { path: path.to_path_buf(), source }),
    };

    let records = parse_document(&content).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    if records.is_empty() {
        tracing::info!(
            target: crate::logging::GENERAL,
            path = %path.display(),
            "fence document is empty, starting with a default fence"
        );
        return Ok(vec![FenceRecord::default_data_fence()]);
    }

    Ok(records)
}

/// Decodes document text.
///
/// An array of fences is the current format; a single fence object is the
/// legacy format and is wrapped into a one-element list. Blank text is an
/// empty list.
pub fn parse_document(content: &str) -> Result<Vec<FenceRecord>, serde_json::Error> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    match serde_json::from_str::<Vec<FenceRecord>>(content) {
        Ok(records) => Ok(records),
        Err(array_err) => match serde_json::from_str::<FenceRecord>(content) {
            Ok(record) => {
                tracing::info!(
                    target: crate::logging::MIGRATION,
                    fence_id = %record.id,
                    "read legacy single-fence document"
                );
                Ok(vec![record])
            }
            Err(_) => Err(array_err),
        },
    }
}

/// Encodes records as pretty-printed document text.
pub fn to_document(records: &[FenceRecord]) -> Result<String, StoreError> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"  ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    records.serialize(&mut serializer)?;
    // serde_json only ever produces UTF-8.
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
