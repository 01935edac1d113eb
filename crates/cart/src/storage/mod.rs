//! Persistent key-value storage for cart snapshots.
//!
//! The cart only ever reads and writes one string under one key, mirroring a
//! browser's local storage. Two backends ship here:
//!
//! - [`FileStore`] - durable JSON document on disk
//! - [`MemoryStore`] - process-local map, for tests and throwaway sessions

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use mockall::automock;
use thiserror::Error;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing medium failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing document exists but cannot be understood.
    #[error("storage document is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// A string-valued key-value store.
///
/// Calls are synchronous; a successful `save` is durable before it returns.
#[automock]
pub trait PersistentStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key has never been written.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite the value stored under `key`.
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;
}
