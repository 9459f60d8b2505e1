//! The inverted index store.
//!
//! The store publishes immutable [`IndexSnapshot`]s behind an `Arc`. Readers
//! grab the current `Arc` under a brief read lock and then run entirely
//! lock-free against that snapshot. Writers serialize on a separate mutex,
//! build the next snapshot off to the side, persist it, and only then swap
//! it in, so a failed commit leaves the published snapshot untouched.

use std::path::Path;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rayon::prelude::*;

use crate::analysis::analyzer::StandardAnalyzer;
use crate::document::Document;
use crate::error::{BantamError, Result};
use crate::index::batch::{Batch, BatchConfig, BatchOp};
use crate::index::reader::SnapshotReader;
use crate::index::segment;
use crate::index::snapshot::{AnalyzedDoc, IndexSnapshot, StoredDoc};
use crate::storage::file::FileStorage;
use crate::storage::memory::MemoryStorage;
use crate::storage::traits::Storage;

/// A persistent, concurrently readable inverted index.
pub struct InvertedIndexStore {
    snapshot: RwLock<Arc<IndexSnapshot>>,
    write_lock: Mutex<()>,
    storage: Arc<dyn Storage>,
    analyzer: StandardAnalyzer,
    batch_config: BatchConfig,
}

impl InvertedIndexStore {
    /// Create an empty store over the given storage backend.
    pub fn create(storage: Arc<dyn Storage>) -> Result<Self> {
        let store = InvertedIndexStore {
            snapshot: RwLock::new(Arc::new(IndexSnapshot::new())),
            write_lock: Mutex::new(()),
            storage,
            analyzer: StandardAnalyzer::new()?,
            batch_config: BatchConfig::default(),
        };
        // Persist the empty segment up front so open() succeeds on a
        // freshly created directory.
        segment::write_segment(store.storage.as_ref(), &store.snapshot.read())?;
        Ok(store)
    }

    /// Open an existing store, restoring the last committed snapshot.
    pub fn open(storage: Arc<dyn Storage>) -> Result<Self> {
        let restored = segment::read_segment(storage.as_ref())?;
        Ok(InvertedIndexStore {
            snapshot: RwLock::new(Arc::new(restored)),
            write_lock: Mutex::new(()),
            storage,
            analyzer: StandardAnalyzer::new()?,
            batch_config: BatchConfig::default(),
        })
    }

    /// Create a store persisted under the given directory.
    pub fn create_in_dir(path: impl AsRef<Path>) -> Result<Self> {
        Self::create(Arc::new(FileStorage::new(path)?))
    }

    /// Open a store persisted under the given directory.
    pub fn open_dir(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(Arc::new(FileStorage::new(path)?))
    }

    /// Create a store backed by in-process memory.
    pub fn in_memory() -> Result<Self> {
        Self::create(Arc::new(MemoryStorage::new()))
    }

    /// Override the batch configuration.
    pub fn with_batch_config(mut self, config: BatchConfig) -> Self {
        self.batch_config = config;
        self
    }

    /// The configured batch limits.
    pub fn batch_config(&self) -> BatchConfig {
        self.batch_config
    }

    /// The analyzer used for indexing.
    pub fn analyzer(&self) -> &StandardAnalyzer {
        &self.analyzer
    }

    /// A reader pinned to the currently committed snapshot.
    pub fn reader(&self) -> SnapshotReader {
        SnapshotReader::new(Arc::clone(&self.snapshot.read()))
    }

    /// Index a single document, replacing any existing document with the
    /// same id.
    pub fn put(&self, doc: Document) -> Result<()> {
        let mut batch = Batch::new();
        batch.index(doc);
        self.commit_batch(batch)
    }

    /// Delete the document with the given id. Deleting an absent id is
    /// a no-op.
    pub fn delete(&self, id: &str) -> Result<()> {
        let mut batch = Batch::new();
        batch.delete(id);
        self.commit_batch(batch)
    }

    /// Apply a batch atomically.
    ///
    /// The whole batch becomes visible at once, or not at all. Analysis
    /// runs in parallel across documents before the write lock does any
    /// snapshot surgery.
    pub fn commit_batch(&self, batch: Batch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        if batch.len() > self.batch_config.max_ops {
            return Err(BantamError::resource_exhausted(format!(
                "batch holds {} operations, limit is {}",
                batch.len(),
                self.batch_config.max_ops
            )));
        }

        let analyzed: Vec<AppliedOp> = batch
            .into_ops()
            .into_par_iter()
            .map(|op| match op {
                BatchOp::Index(doc) => {
                    AnalyzedDoc::from_document(&self.analyzer, &doc).map(AppliedOp::Put)
                }
                BatchOp::Delete(id) => Ok(AppliedOp::Tombstone(id)),
            })
            .collect::<Result<_>>()?;

        let _write = self.write_lock.lock();

        let mut next = IndexSnapshot::clone(&self.snapshot.read());
        for op in analyzed {
            match op {
                AppliedOp::Put(doc) => next.put(doc)?,
                AppliedOp::Tombstone(id) => {
                    next.delete(&id);
                }
            }
        }
        next.seal();

        segment::write_segment(self.storage.as_ref(), &next)?;

        *self.snapshot.write() = Arc::new(next);
        Ok(())
    }

    /// Stored fields for an external id.
    pub fn fetch_stored(&self, id: &str) -> Result<Arc<StoredDoc>> {
        self.snapshot
            .read()
            .stored_by_external_id(id)
            .cloned()
            .ok_or_else(|| BantamError::not_found(format!("document not found: {id}")))
    }

    /// Number of live documents.
    pub fn doc_count(&self) -> u64 {
        self.snapshot.read().doc_count()
    }

    /// Flush state to storage. Commits already persist synchronously, so
    /// this only re-persists the current snapshot.
    pub fn close(&self) -> Result<()> {
        let _write = self.write_lock.lock();
        segment::write_segment(self.storage.as_ref(), &self.snapshot.read())
    }
}

impl std::fmt::Debug for InvertedIndexStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvertedIndexStore")
            .field("doc_count", &self.doc_count())
            .field("max_ops", &self.batch_config.max_ops)
            .finish()
    }
}

enum AppliedOp {
    Put(AnalyzedDoc),
    Tombstone(String),
}
