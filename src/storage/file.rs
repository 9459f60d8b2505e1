//! File system storage implementation.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{BantamError, Result};
use crate::storage::traits::{Storage, StorageError, StorageInput, StorageOutput};

/// A storage backend rooted at a directory on the local file system.
#[derive(Debug)]
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Open a file storage rooted at the given directory, creating the
    /// directory if it does not exist.
    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self> {
        let base_path = base_path.as_ref().to_path_buf();
        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
        } else if !base_path.is_dir() {
            return Err(BantamError::storage(format!(
                "not a directory: {}",
                base_path.display()
            )));
        }
        Ok(FileStorage { base_path })
    }

    /// Get the base directory of this storage.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn full_path(&self, name: &str) -> PathBuf {
        self.base_path.join(name)
    }
}

impl Storage for FileStorage {
    fn open_input(&self, name: &str) -> Result<Box<dyn StorageInput>> {
        let path = self.full_path(name);
        if !path.exists() {
            return Err(StorageError::FileNotFound(name.to_string()).into());
        }
        let file = File::open(&path)?;
        let size = file.metadata()?.len();
        Ok(Box::new(FileInput {
            reader: BufReader::new(file),
            size,
        }))
    }

    fn create_output(&self, name: &str) -> Result<Box<dyn StorageOutput>> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.full_path(name))?;
        Ok(Box::new(FileOutput {
            writer: Some(BufWriter::new(file)),
        }))
    }

    fn file_exists(&self, name: &str) -> bool {
        self.full_path(name).exists()
    }

    fn delete_file(&self, name: &str) -> Result<()> {
        let path = self.full_path(name);
        if !path.exists() {
            return Err(StorageError::FileNotFound(name.to_string()).into());
        }
        fs::remove_file(path)?;
        Ok(())
    }

    fn rename_file(&self, old_name: &str, new_name: &str) -> Result<()> {
        let old_path = self.full_path(old_name);
        if !old_path.exists() {
            return Err(StorageError::FileNotFound(old_name.to_string()).into());
        }
        // fs::rename replaces the target atomically on POSIX systems.
        fs::rename(old_path, self.full_path(new_name))?;
        Ok(())
    }

    fn list_files(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.base_path)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

/// A buffered reader over a file.
#[derive(Debug)]
struct FileInput {
    reader: BufReader<File>,
    size: u64,
}

impl Read for FileInput {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.reader.read(buf)
    }
}

impl Seek for FileInput {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        self.reader.seek(pos)
    }
}

impl StorageInput for FileInput {
    fn size(&self) -> Result<u64> {
        Ok(self.size)
    }
}

/// A buffered writer over a file; close flushes and fsyncs.
#[derive(Debug)]
struct FileOutput {
    writer: Option<BufWriter<File>>,
}

impl Write for FileOutput {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.writer {
            Some(writer) => writer.write(buf),
            None => Err(std::io::Error::other("output is closed")),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.writer {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }
}

impl StorageOutput for FileOutput {
    fn close(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_storage_write_read() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        let mut output = storage.create_output("test.bin").unwrap();
        output.write_all(b"on disk").unwrap();
        output.close().unwrap();

        let mut input = storage.open_input("test.bin").unwrap();
        let mut buf = Vec::new();
        input.read_to_end(&mut buf).unwrap();
        assert_eq!(buf, b"on disk");
        assert_eq!(input.size().unwrap(), 7);
    }

    #[test]
    fn test_file_storage_rename_replaces() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        for (name, data) in [("segment.bnt", b"old".as_slice()), ("segment.tmp", b"new")] {
            let mut output = storage.create_output(name).unwrap();
            output.write_all(data).unwrap();
            output.close().unwrap();
        }

        storage.rename_file("segment.tmp", "segment.bnt").unwrap();

        let mut input = storage.open_input("segment.bnt").unwrap();
        let mut buf = Vec::new();
        input.read_to_end(&mut buf).unwrap();
        assert_eq!(buf, b"new");
        assert!(!storage.file_exists("segment.tmp"));
    }

    #[test]
    fn test_file_storage_missing_file() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        assert!(storage.open_input("missing.bin").is_err());
        assert!(storage.delete_file("missing.bin").is_err());
        assert!(!storage.file_exists("missing.bin"));
    }

    #[test]
    fn test_file_storage_creates_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let storage = FileStorage::new(&nested).unwrap();
        assert!(nested.is_dir());
        assert!(storage.list_files().unwrap().is_empty());
    }
}
