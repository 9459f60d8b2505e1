//! Storage abstraction trait and common types.

use std::io::{Read, Seek, Write};

use crate::error::{BantamError, Result};

/// A pluggable storage backend for index files.
///
/// Two implementations exist: [`crate::storage::FileStorage`] for on-disk
/// indexes and [`crate::storage::MemoryStorage`] for tests and ephemeral
/// indexes.
pub trait Storage: Send + Sync + std::fmt::Debug {
    /// Open a file for reading.
    fn open_input(&self, name: &str) -> Result<Box<dyn StorageInput>>;

    /// Create a file for writing, truncating any existing file.
    fn create_output(&self, name: &str) -> Result<Box<dyn StorageOutput>>;

    /// Whether a file with this name exists.
    fn file_exists(&self, name: &str) -> bool;

    /// Remove a file. Missing files are an error.
    fn delete_file(&self, name: &str) -> Result<()>;

    /// Rename a file, replacing the target if it exists.
    ///
    /// This must be atomic with respect to readers: an `open_input` of the
    /// new name sees either the old content or the complete new content.
    fn rename_file(&self, old_name: &str, new_name: &str) -> Result<()>;

    /// Names of every file the backend currently holds, sorted.
    fn list_files(&self) -> Result<Vec<String>>;
}

/// A seekable read handle into a stored file.
pub trait StorageInput: Read + Seek + Send + std::fmt::Debug {
    /// Total length of the file in bytes.
    fn size(&self) -> Result<u64>;
}

/// A write handle for a file being created.
pub trait StorageOutput: Write + Send + std::fmt::Debug {
    /// Flush buffered data and sync it to the backing store.
    fn close(&mut self) -> Result<()>;
}

impl StorageInput for Box<dyn StorageInput> {
    fn size(&self) -> Result<u64> {
        self.as_ref().size()
    }
}

impl StorageOutput for Box<dyn StorageOutput> {
    fn close(&mut self) -> Result<()> {
        self.as_mut().close()
    }
}

/// Errors raised by storage backends.
#[derive(Debug, Clone)]
pub enum StorageError {
    /// The named file does not exist in this backend.
    FileNotFound(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::FileNotFound(name) => write!(f, "File not found: {name}"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<StorageError> for BantamError {
    fn from(err: StorageError) -> Self {
        BantamError::storage(err.to_string())
    }
}
