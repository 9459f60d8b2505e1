//! Inverted index core: postings, snapshots, batches, persistence, and
//! the store that ties them together.

pub mod batch;
pub mod dictionary;
pub mod posting;
pub mod reader;
pub mod segment;
pub mod snapshot;
pub mod store;

pub use batch::{Batch, BatchConfig, BatchOp, DEFAULT_MAX_BATCH_OPS};
pub use dictionary::TermDictionary;
pub use posting::{Posting, PostingList};
pub use reader::{IndexReader, SnapshotReader};
pub use snapshot::{AnalyzedDoc, IndexSnapshot, StoredDoc};
pub use store::InvertedIndexStore;
