//! Immutable index snapshot.
//!
//! All index state lives in an [`IndexSnapshot`]: per-field term
//! dictionaries, the stored-fields table, the external-id map, and the
//! liveness bitmap. Readers hold an `Arc` to a published snapshot; writers
//! mutate a private clone and publish it with a single swap, so a reader
//! never observes a half-applied commit.
//!
//! Deleting or replacing a document only clears its live bit; its postings
//! stay in place until a compaction pass (deferred in this version) and are
//! filtered out of every read path by the bitmap.

use std::collections::HashMap;
use std::sync::Arc;

use ahash::AHashMap;
use bit_vec::BitVec;

use crate::analysis::analyzer::{Analyzer, StandardAnalyzer};
use crate::document::Document;
use crate::error::Result;
use crate::index::dictionary::TermDictionary;
use crate::index::posting::{Posting, PostingList};

/// Stored field values for one live document.
#[derive(Clone, Debug, PartialEq)]
pub struct StoredDoc {
    /// The caller-assigned identifier.
    pub external_id: String,
    /// The original field values, for hit materialization.
    pub fields: HashMap<String, String>,
}

/// A document after analysis, ready to be merged into a snapshot.
#[derive(Debug)]
pub struct AnalyzedDoc {
    /// The caller-assigned identifier.
    pub external_id: String,
    /// Stored field values.
    pub fields: HashMap<String, String>,
    /// Per field: term, term frequency, and 1-based positions in
    /// document order.
    pub terms: Vec<(String, Vec<(String, u32, Vec<u32>)>)>,
}

impl AnalyzedDoc {
    /// Analyze every field of a document with the given analyzer.
    pub fn from_document(analyzer: &StandardAnalyzer, doc: &Document) -> Result<Self> {
        let mut terms = Vec::with_capacity(doc.len());
        for (field, value) in doc.fields() {
            let mut by_term: AHashMap<String, Vec<u32>> = AHashMap::new();
            for token in analyzer.analyze(value)? {
                // Positions are 1-based in document order.
                by_term
                    .entry(token.text)
                    .or_default()
                    .push(token.position as u32 + 1);
            }
            let mut field_terms: Vec<(String, u32, Vec<u32>)> = by_term
                .into_iter()
                .map(|(term, positions)| (term, positions.len() as u32, positions))
                .collect();
            field_terms.sort_unstable_by(|a, b| a.0.cmp(&b.0));
            terms.push((field.clone(), field_terms));
        }
        terms.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        Ok(AnalyzedDoc {
            external_id: doc.id().to_string(),
            fields: doc.fields().clone(),
            terms,
        })
    }
}

/// The complete state of an index at one commit point.
#[derive(Clone, Debug, Default)]
pub struct IndexSnapshot {
    /// Per-field term dictionaries.
    fields: AHashMap<String, TermDictionary>,
    /// Internal ordinal to stored fields, live documents only.
    stored: AHashMap<u64, Arc<StoredDoc>>,
    /// External identifier to internal ordinal, live documents only.
    external_ids: AHashMap<String, u64>,
    /// Live bit per internal ordinal; a cleared bit is a tombstone.
    live: BitVec,
    /// Next internal ordinal to assign.
    next_doc_id: u64,
    /// Number of live documents.
    live_count: u64,
}

impl IndexSnapshot {
    /// Create a new empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a document.
    ///
    /// Replacement tombstones the prior version's ordinal and assigns a
    /// fresh one, so postings of different document versions never mix.
    pub fn put(&mut self, doc: AnalyzedDoc) -> Result<()> {
        self.delete(&doc.external_id);

        let doc_id = self.next_doc_id;
        self.next_doc_id += 1;
        self.live.push(true);
        self.live_count += 1;

        self.external_ids.insert(doc.external_id.clone(), doc_id);
        self.stored.insert(
            doc_id,
            Arc::new(StoredDoc {
                external_id: doc.external_id,
                fields: doc.fields,
            }),
        );

        for (field, field_terms) in doc.terms {
            let dict = self.fields.entry(field).or_default();
            for (term, term_freq, positions) in field_terms {
                dict.add_posting(&term, Posting::new(doc_id, term_freq, positions))?;
            }
        }
        Ok(())
    }

    /// Tombstone a document. Returns whether it was live.
    pub fn delete(&mut self, external_id: &str) -> bool {
        match self.external_ids.remove(external_id) {
            Some(doc_id) => {
                self.live.set(doc_id as usize, false);
                self.live_count -= 1;
                self.stored.remove(&doc_id);
                true
            }
            None => false,
        }
    }

    /// Rebuild sorted term vectors after a round of mutations.
    pub fn seal(&mut self) {
        for dict in self.fields.values_mut() {
            dict.seal();
        }
    }

    /// Look up the postings list for a term. `None` when either the field
    /// or the term is absent; never an error.
    pub fn postings(&self, field: &str, term: &str) -> Option<&Arc<PostingList>> {
        self.fields.get(field).and_then(|dict| dict.get(term))
    }

    /// Document frequency of a term, counting live documents only.
    pub fn doc_frequency(&self, field: &str, term: &str) -> u64 {
        match self.postings(field, term) {
            Some(list) => list
                .iter()
                .filter(|p| self.is_live(p.doc_id))
                .count() as u64,
            None => 0,
        }
    }

    /// Get the term dictionary for a field.
    pub fn field_dictionary(&self, field: &str) -> Option<&TermDictionary> {
        self.fields.get(field)
    }

    /// Names of all indexed fields, in ascending order.
    pub fn field_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.fields.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Check whether an internal ordinal is live.
    pub fn is_live(&self, doc_id: u64) -> bool {
        self.live.get(doc_id as usize).unwrap_or(false)
    }

    /// The liveness bitmap.
    pub fn live_docs(&self) -> &BitVec {
        &self.live
    }

    /// Stored fields for a live internal ordinal.
    pub fn stored(&self, doc_id: u64) -> Option<&Arc<StoredDoc>> {
        self.stored.get(&doc_id)
    }

    /// Stored fields for a live external identifier.
    pub fn stored_by_external_id(&self, external_id: &str) -> Option<&Arc<StoredDoc>> {
        self.external_ids
            .get(external_id)
            .and_then(|doc_id| self.stored.get(doc_id))
    }

    /// Internal ordinal of a live external identifier.
    pub fn ordinal(&self, external_id: &str) -> Option<u64> {
        self.external_ids.get(external_id).copied()
    }

    /// Number of live documents.
    pub fn doc_count(&self) -> u64 {
        self.live_count
    }

    /// One past the highest assigned internal ordinal.
    pub fn max_doc(&self) -> u64 {
        self.next_doc_id
    }

    pub(crate) fn restore_parts(
        fields: AHashMap<String, TermDictionary>,
        stored: AHashMap<u64, Arc<StoredDoc>>,
        live: BitVec,
        next_doc_id: u64,
    ) -> Self {
        let external_ids: AHashMap<String, u64> = stored
            .iter()
            .map(|(doc_id, doc)| (doc.external_id.clone(), *doc_id))
            .collect();
        let live_count = stored.len() as u64;
        let mut snapshot = IndexSnapshot {
            fields,
            stored,
            external_ids,
            live,
            next_doc_id,
            live_count,
        };
        snapshot.seal();
        snapshot
    }
}
