//! Posting and postings-list types for the inverted index.

use crate::error::{BantamError, Result};

/// A single posting: one term's occurrence record within one document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Posting {
    /// Internal document ordinal.
    pub doc_id: u64,
    /// Number of occurrences of the term in the field.
    pub term_freq: u32,
    /// 1-based term positions in document order, for phrase matching.
    pub positions: Vec<u32>,
}

impl Posting {
    /// Create a new posting.
    pub fn new(doc_id: u64, term_freq: u32, positions: Vec<u32>) -> Self {
        Posting {
            doc_id,
            term_freq,
            positions,
        }
    }
}

/// An ordered list of postings for one term within one field.
///
/// Postings are kept sorted by ascending internal document ordinal with at
/// most one entry per document, which keeps intersection and union merges
/// linear.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PostingList {
    postings: Vec<Posting>,
}

impl PostingList {
    /// Create a new empty postings list.
    pub fn new() -> Self {
        PostingList {
            postings: Vec::new(),
        }
    }

    /// Append a posting. The ordinal must be greater than the last one.
    pub fn push(&mut self, posting: Posting) -> Result<()> {
        if let Some(last) = self.postings.last() {
            if posting.doc_id <= last.doc_id {
                return Err(BantamError::index(format!(
                    "posting for doc {} appended after doc {}",
                    posting.doc_id, last.doc_id
                )));
            }
        }
        self.postings.push(posting);
        Ok(())
    }

    /// Get the posting for a document, if present.
    pub fn find(&self, doc_id: u64) -> Option<&Posting> {
        self.postings
            .binary_search_by_key(&doc_id, |p| p.doc_id)
            .ok()
            .map(|i| &self.postings[i])
    }

    /// Get the posting at an index.
    pub fn get(&self, index: usize) -> Option<&Posting> {
        self.postings.get(index)
    }

    /// Number of postings, including tombstoned documents.
    pub fn len(&self) -> usize {
        self.postings.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Iterate over all postings in ascending ordinal order.
    pub fn iter(&self) -> impl Iterator<Item = &Posting> {
        self.postings.iter()
    }
}
