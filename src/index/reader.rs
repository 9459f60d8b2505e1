//! Read access to a committed index snapshot.

use std::sync::Arc;

use bit_vec::BitVec;
use regex::Regex;

use crate::index::posting::PostingList;
use crate::index::snapshot::{IndexSnapshot, StoredDoc};

/// A point-in-time view of the index used by query evaluation.
///
/// Readers see exactly one committed snapshot; writes that commit after a
/// reader is obtained are invisible to it.
pub trait IndexReader: Send + Sync {
    /// Postings for a term in a field, or `None` when the term (or field)
    /// is absent.
    fn postings(&self, field: &str, term: &str) -> Option<Arc<PostingList>>;

    /// Number of live documents containing the term in the field.
    fn doc_frequency(&self, field: &str, term: &str) -> u64;

    /// Number of live documents in the snapshot.
    fn doc_count(&self) -> u64;

    /// One past the highest internal ordinal ever assigned.
    fn max_doc(&self) -> u64;

    /// Whether the document at the given ordinal is live.
    fn is_live(&self, doc_id: u64) -> bool;

    /// A copy of the liveness bitmap, indexed by internal ordinal.
    fn live_docs(&self) -> BitVec;

    /// All field names in the snapshot, sorted.
    fn field_names(&self) -> Vec<String>;

    /// Stored fields for a live document ordinal.
    fn stored(&self, doc_id: u64) -> Option<Arc<StoredDoc>>;

    /// Terms in a field that start with `prefix` and match `pattern`,
    /// in dictionary order. Drives wildcard expansion.
    fn expand_terms(&self, field: &str, prefix: &str, pattern: &Regex) -> Vec<String>;
}

/// An [`IndexReader`] over one pinned snapshot.
#[derive(Clone, Debug)]
pub struct SnapshotReader {
    snapshot: Arc<IndexSnapshot>,
}

impl SnapshotReader {
    /// Pin the given snapshot.
    pub fn new(snapshot: Arc<IndexSnapshot>) -> Self {
        SnapshotReader { snapshot }
    }

    /// The pinned snapshot.
    pub fn snapshot(&self) -> &Arc<IndexSnapshot> {
        &self.snapshot
    }
}

impl IndexReader for SnapshotReader {
    fn postings(&self, field: &str, term: &str) -> Option<Arc<PostingList>> {
        self.snapshot.postings(field, term).cloned()
    }

    fn doc_frequency(&self, field: &str, term: &str) -> u64 {
        self.snapshot.doc_frequency(field, term)
    }

    fn doc_count(&self) -> u64 {
        self.snapshot.doc_count()
    }

    fn max_doc(&self) -> u64 {
        self.snapshot.max_doc()
    }

    fn is_live(&self, doc_id: u64) -> bool {
        self.snapshot.is_live(doc_id)
    }

    fn live_docs(&self) -> BitVec {
        self.snapshot.live_docs().clone()
    }

    fn field_names(&self) -> Vec<String> {
        self.snapshot
            .field_names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    fn stored(&self, doc_id: u64) -> Option<Arc<StoredDoc>> {
        self.snapshot.stored(doc_id).cloned()
    }

    fn expand_terms(&self, field: &str, prefix: &str, pattern: &Regex) -> Vec<String> {
        match self.snapshot.field_dictionary(field) {
            Some(dict) => dict
                .terms_matching(prefix, pattern)
                .map(str::to_string)
                .collect(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyzer::StandardAnalyzer;
    use crate::document::Document;
    use crate::index::snapshot::AnalyzedDoc;

    fn reader_over(docs: &[(&str, &str, &str)]) -> SnapshotReader {
        let analyzer = StandardAnalyzer::new().unwrap();
        let mut snapshot = IndexSnapshot::new();
        for (id, name, category) in docs {
            let doc = Document::builder(*id)
                .add_text("name", *name)
                .add_text("category", *category)
                .build();
            snapshot
                .put(AnalyzedDoc::from_document(&analyzer, &doc).unwrap())
                .unwrap();
        }
        snapshot.seal();
        SnapshotReader::new(Arc::new(snapshot))
    }

    #[test]
    fn test_reader_sees_pinned_snapshot_only() {
        let reader = reader_over(&[("1", "Product 1", "Electronics")]);
        assert_eq!(reader.doc_count(), 1);
        assert!(reader.postings("name", "product").is_some());
        assert!(reader.postings("name", "missing").is_none());
        assert!(reader.postings("absent_field", "product").is_none());
    }

    #[test]
    fn test_expand_terms_uses_prefix_and_pattern() {
        let reader = reader_over(&[
            ("1", "widget wedge", "Electronics"),
            ("2", "wagon", "Toys"),
        ]);
        let pattern = Regex::new("^w.*e.*$").unwrap();
        let terms = reader.expand_terms("name", "w", &pattern);
        assert_eq!(terms, vec!["wedge".to_string(), "widget".to_string()]);
        assert!(reader.expand_terms("category", "w", &pattern).is_empty());
    }
}
