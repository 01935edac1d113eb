//! File-backed storage backend.
//!
//! The whole store is one JSON document:
//!
//! ```json
//! {
//!   "@RocketShoes:cart": { "value": "[...]", "updated_at": "2026-01-01T00:00:00Z" }
//! }
//! ```
//!
//! Saves rewrite the document into a uniquely named sibling temp file and
//! rename it over the original, so readers see either the old or the new
//! document, never a mix.
//!
//! The store assumes a single writer per file. Two processes saving at the
//! same moment each write a complete document, but the last rename wins and
//! the other's change is lost.
//!
//! A document that cannot be parsed is moved aside to `<file>.corrupt` on the
//! next save and replaced, so one bad file never blocks later writes.

use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::{PersistentStore, StorageError};

/// One stored value.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEntry {
    value: String,
    updated_at: DateTime<Utc>,
}

type Document = BTreeMap<String, StoredEntry>;

/// Durable key-value store kept in a single JSON file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Create a store backed by `path`. The file is created on first save.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// When `key` was last written, if ever.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing file cannot be read or parsed.
    pub fn updated_at(&self, key: &str) -> Result<Option<DateTime<Utc>>, StorageError> {
        Ok(self.read_document()?.get(key).map(|entry| entry.updated_at))
    }

    fn read_document(&self) -> Result<Document, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(Document::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Document::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Read the document for a save, setting an unparseable one aside.
    fn read_document_for_save(&self) -> Result<Document, StorageError> {
        match self.read_document() {
            Err(StorageError::Corrupt(e)) => {
                let aside = self.corrupt_path();
                warn!(
                    path = %self.path.display(),
                    moved_to = %aside.display(),
                    error = %e,
                    "Storage file is corrupt, replacing it"
                );
                fs::rename(&self.path, &aside)?;
                Ok(Document::new())
            }
            other => other,
        }
    }

    fn corrupt_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".corrupt");
        self.path.with_file_name(name)
    }

    fn write_document(&self, document: &Document) -> Result<(), StorageError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent)?;
                parent
            }
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&serde_json::to_vec_pretty(document)?)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        Ok(())
    }
}

impl PersistentStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_document()?.remove(key).map(|entry| entry.value))
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut document = self.read_document_for_save()?;
        document.insert(
            key.to_string(),
            StoredEntry {
                value: value.to_string(),
                updated_at: Utc::now(),
            },
        );
        self.write_document(&document)?;

        debug!(path = %self.path.display(), key, "Saved storage entry");
        Ok(())
    }
}
