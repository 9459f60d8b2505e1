//! Write batches.
//!
//! A batch accumulates index and delete operations against external document
//! ids and is applied to the store atomically. Operations on the same id
//! collapse to the last one recorded, so a batch that indexes and then
//! deletes a document results only in the delete.

use ahash::AHashMap;

use crate::document::Document;

/// Default maximum number of operations accepted in one batch.
pub const DEFAULT_MAX_BATCH_OPS: usize = 10_000;

/// A single batched write operation.
#[derive(Clone, Debug)]
pub enum BatchOp {
    /// Index a document, replacing any existing document with the same id.
    Index(Document),
    /// Delete the document with the given external id, if present.
    Delete(String),
}

impl BatchOp {
    /// The external id this operation targets.
    pub fn external_id(&self) -> &str {
        match self {
            BatchOp::Index(doc) => doc.id(),
            BatchOp::Delete(id) => id,
        }
    }
}

/// An ordered collection of write operations, collapsed per external id.
///
/// Ordering between distinct ids follows first insertion, which keeps
/// internal ordinal assignment deterministic for a given batch.
#[derive(Clone, Debug, Default)]
pub struct Batch {
    ops: Vec<BatchOp>,
    slots: AHashMap<String, usize>,
}

impl Batch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Batch::default()
    }

    /// Record an index operation for the document's id.
    pub fn index(&mut self, doc: Document) {
        self.record(BatchOp::Index(doc));
    }

    /// Record a delete operation for the given id.
    pub fn delete(&mut self, id: impl Into<String>) {
        self.record(BatchOp::Delete(id.into()));
    }

    fn record(&mut self, op: BatchOp) {
        match self.slots.get(op.external_id()) {
            Some(&slot) => self.ops[slot] = op,
            None => {
                self.slots.insert(op.external_id().to_string(), self.ops.len());
                self.ops.push(op);
            }
        }
    }

    /// Number of collapsed operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether the batch holds no operations.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// The collapsed operations in first-insertion order.
    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    /// Consume the batch, yielding the collapsed operations.
    pub fn into_ops(self) -> Vec<BatchOp> {
        self.ops
    }
}

/// Tunables for batch application.
#[derive(Clone, Copy, Debug)]
pub struct BatchConfig {
    /// Maximum collapsed operations accepted per commit.
    pub max_ops: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig {
            max_ops: DEFAULT_MAX_BATCH_OPS,
        }
    }
}
