//! In-memory storage implementation for testing and ephemeral indexes.

use std::collections::HashMap;
use std::io::{Cursor, Read, Seek, SeekFrom, Write};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Result;
use crate::storage::traits::{Storage, StorageError, StorageInput, StorageOutput};

/// An in-memory storage backend.
///
/// Files are finalized into `Box<[u8]>` buffers on close; an output becomes
/// visible to readers only once it is closed, which mirrors the atomicity of
/// the file backend's rename step.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    files: Arc<Mutex<HashMap<String, Box<[u8]>>>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        MemoryStorage {
            files: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of files currently held.
    pub fn file_count(&self) -> usize {
        self.files.lock().len()
    }

    /// Get the total size of all files in bytes.
    pub fn total_size(&self) -> u64 {
        let files = self.files.lock();
        files.values().map(|data| data.len() as u64).sum()
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for MemoryStorage {
    fn open_input(&self, name: &str) -> Result<Box<dyn StorageInput>> {
        let files = self.files.lock();
        let data = files
            .get(name)
            .ok_or_else(|| StorageError::FileNotFound(name.to_string()))?;
        Ok(Box::new(MemoryInput::new(data.clone())))
    }

    fn create_output(&self, name: &str) -> Result<Box<dyn StorageOutput>> {
        Ok(Box::new(MemoryOutput::new(
            name.to_string(),
            Arc::clone(&self.files),
        )))
    }

    fn file_exists(&self, name: &str) -> bool {
        self.files.lock().contains_key(name)
    }

    fn delete_file(&self, name: &str) -> Result<()> {
        let mut files = self.files.lock();
        files
            .remove(name)
            .ok_or_else(|| StorageError::FileNotFound(name.to_string()))?;
        Ok(())
    }

    fn rename_file(&self, old_name: &str, new_name: &str) -> Result<()> {
        let mut files = self.files.lock();
        let data = files
            .remove(old_name)
            .ok_or_else(|| StorageError::FileNotFound(old_name.to_string()))?;
        files.insert(new_name.to_string(), data);
        Ok(())
    }

    fn list_files(&self) -> Result<Vec<String>> {
        let files = self.files.lock();
        let mut names: Vec<String> = files.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

/// A reader over an in-memory file.
#[derive(Debug)]
struct MemoryInput {
    cursor: Cursor<Box<[u8]>>,
}

impl MemoryInput {
    fn new(data: Box<[u8]>) -> Self {
        MemoryInput {
            cursor: Cursor::new(data),
        }
    }
}

impl Read for MemoryInput {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.cursor.read(buf)
    }
}

impl Seek for MemoryInput {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        self.cursor.seek(pos)
    }
}

impl StorageInput for MemoryInput {
    fn size(&self) -> Result<u64> {
        Ok(self.cursor.get_ref().len() as u64)
    }
}

/// A writer that publishes its buffer into the file map on close.
#[derive(Debug)]
struct MemoryOutput {
    name: String,
    buffer: Vec<u8>,
    files: Arc<Mutex<HashMap<String, Box<[u8]>>>>,
    closed: bool,
}

impl MemoryOutput {
    fn new(name: String, files: Arc<Mutex<HashMap<String, Box<[u8]>>>>) -> Self {
        MemoryOutput {
            name,
            buffer: Vec::new(),
            files,
            closed: false,
        }
    }
}

impl Write for MemoryOutput {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl StorageOutput for MemoryOutput {
    fn close(&mut self) -> Result<()> {
        if !self.closed {
            let mut files = self.files.lock();
            files.insert(
                self.name.clone(),
                std::mem::take(&mut self.buffer).into_boxed_slice(),
            );
            self.closed = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_write_read() {
        let storage = MemoryStorage::new();

        let mut output = storage.create_output("test.bin").unwrap();
        output.write_all(b"hello storage").unwrap();
        output.close().unwrap();

        let mut input = storage.open_input("test.bin").unwrap();
        let mut buf = Vec::new();
        input.read_to_end(&mut buf).unwrap();
        assert_eq!(buf, b"hello storage");
        assert_eq!(input.size().unwrap(), 13);
    }

    #[test]
    fn test_memory_storage_unclosed_output_invisible() {
        let storage = MemoryStorage::new();

        let mut output = storage.create_output("test.bin").unwrap();
        output.write_all(b"partial").unwrap();
        // Not closed: readers must not see it.
        assert!(!storage.file_exists("test.bin"));
    }

    #[test]
    fn test_memory_storage_rename() {
        let storage = MemoryStorage::new();

        let mut output = storage.create_output("segment.tmp").unwrap();
        output.write_all(b"data").unwrap();
        output.close().unwrap();

        storage.rename_file("segment.tmp", "segment.bnt").unwrap();
        assert!(!storage.file_exists("segment.tmp"));
        assert!(storage.file_exists("segment.bnt"));
    }

    #[test]
    fn test_memory_storage_delete_and_list() {
        let storage = MemoryStorage::new();

        for name in ["b.bin", "a.bin"] {
            let mut output = storage.create_output(name).unwrap();
            output.write_all(b"x").unwrap();
            output.close().unwrap();
        }

        assert_eq!(storage.list_files().unwrap(), vec!["a.bin", "b.bin"]);

        storage.delete_file("a.bin").unwrap();
        assert!(!storage.file_exists("a.bin"));
        assert!(storage.delete_file("a.bin").is_err());
    }
}
