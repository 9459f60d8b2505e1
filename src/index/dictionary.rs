//! Per-field term dictionary.
//!
//! Each indexed field owns one dictionary mapping normalized terms to their
//! postings lists. A hash map serves exact lookups; a sorted term vector,
//! rebuilt at commit time, serves prefix and wildcard enumeration.

use std::sync::Arc;

use ahash::AHashMap;
use regex::Regex;

use crate::error::Result;
use crate::index::posting::{Posting, PostingList};

/// A term dictionary for a single field.
///
/// Cloning is cheap relative to a rebuild: postings lists are shared via
/// `Arc` and only the lists touched by a commit are copied on write.
#[derive(Clone, Debug, Default)]
pub struct TermDictionary {
    /// Hash map from term to its postings list.
    terms: AHashMap<String, Arc<PostingList>>,
    /// Terms in ascending order, for prefix scans. Rebuilt by `seal`.
    sorted_terms: Vec<String>,
}

impl TermDictionary {
    /// Create a new empty term dictionary.
    pub fn new() -> Self {
        TermDictionary {
            terms: AHashMap::new(),
            sorted_terms: Vec::new(),
        }
    }

    /// Look up a term's postings list.
    pub fn get(&self, term: &str) -> Option<&Arc<PostingList>> {
        self.terms.get(term)
    }

    /// Append a posting for a term, creating the term on first use.
    ///
    /// Shared postings lists are copied on first write so snapshots already
    /// published to readers are never mutated.
    pub fn add_posting(&mut self, term: &str, posting: Posting) -> Result<()> {
        match self.terms.get_mut(term) {
            Some(list) => Arc::make_mut(list).push(posting)?,
            None => {
                let mut list = PostingList::new();
                list.push(posting)?;
                self.terms.insert(term.to_string(), Arc::new(list));
            }
        }
        Ok(())
    }

    /// Rebuild the sorted term vector after a round of mutations.
    pub fn seal(&mut self) {
        let mut sorted: Vec<String> = self.terms.keys().cloned().collect();
        sorted.sort_unstable();
        self.sorted_terms = sorted;
    }

    /// Terms starting with `prefix`, in ascending order.
    pub fn terms_with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> {
        let start = self.sorted_terms.partition_point(|t| t.as_str() < prefix);
        self.sorted_terms[start..]
            .iter()
            .take_while(move |t| t.starts_with(prefix))
            .map(|t| t.as_str())
    }

    /// Terms matching a compiled wildcard pattern, in ascending order.
    ///
    /// The literal prefix (the pattern text before the first wildcard
    /// character) prunes the scan to the matching dictionary range.
    pub fn terms_matching<'a>(
        &'a self,
        literal_prefix: &'a str,
        pattern: &'a Regex,
    ) -> impl Iterator<Item = &'a str> {
        self.terms_with_prefix(literal_prefix)
            .filter(move |t| pattern.is_match(t))
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Check if the dictionary is empty.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Iterate over terms in ascending order with their postings.
    pub fn iter_sorted(&self) -> impl Iterator<Item = (&str, &Arc<PostingList>)> {
        self.sorted_terms
            .iter()
            .filter_map(|t| self.terms.get(t).map(|list| (t.as_str(), list)))
    }
}
