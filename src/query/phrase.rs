//! Phrase query implementation for exact phrase matching.

use std::sync::Arc;

use bit_vec::BitVec;

use crate::error::Result;
use crate::index::posting::PostingList;
use crate::index::reader::IndexReader;
use crate::query::matcher::{DisjunctionMatcher, EmptyMatcher, Matcher};
use crate::query::query::Query;
use crate::query::scorer;
use crate::query::term::ALL_FIELDS;

/// A query that matches documents containing terms at consecutive positions.
///
/// Terms must already be analyzed; the query parser produces them by running
/// the quoted text through the indexing analyzer, so "Product 1" becomes the
/// term sequence `["product", "1"]`.
#[derive(Debug, Clone)]
pub struct PhraseQuery {
    field: String,
    terms: Vec<String>,
}

impl PhraseQuery {
    /// Create a new phrase query over analyzed terms.
    pub fn new<F>(field: F, terms: Vec<String>) -> Self
    where
        F: Into<String>,
    {
        PhraseQuery {
            field: field.into(),
            terms,
        }
    }

    /// Get the field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Get the phrase terms.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    fn field_matcher(&self, reader: &dyn IndexReader, field: &str) -> Result<Box<dyn Matcher>> {
        let mut lists = Vec::with_capacity(self.terms.len());
        let mut weight = 0.0;
        for term in &self.terms {
            match reader.postings(field, term) {
                Some(postings) => {
                    weight += scorer::idf(reader.doc_count(), reader.doc_frequency(field, term));
                    lists.push(postings);
                }
                // One absent term sinks the whole phrase.
                None => return Ok(Box::new(EmptyMatcher::new())),
            }
        }
        Ok(Box::new(PhraseMatcher::new(
            lists,
            reader.live_docs(),
            weight,
        )))
    }
}

impl Query for PhraseQuery {
    fn matcher(&self, reader: &dyn IndexReader) -> Result<Box<dyn Matcher>> {
        if self.terms.is_empty() {
            return Ok(Box::new(EmptyMatcher::new()));
        }
        if self.field != ALL_FIELDS {
            return self.field_matcher(reader, &self.field);
        }
        let mut matchers: Vec<Box<dyn Matcher>> = Vec::new();
        for field in reader.field_names() {
            let matcher = self.field_matcher(reader, &field)?;
            if !matcher.is_exhausted() {
                matchers.push(matcher);
            }
        }
        if matchers.is_empty() {
            return Ok(Box::new(EmptyMatcher::new()));
        }
        Ok(Box::new(DisjunctionMatcher::new(matchers)))
    }

    fn description(&self) -> String {
        format!("{}:\"{}\"", self.field, self.terms.join(" "))
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }
}

/// Cursor over documents where all phrase terms occur at consecutive
/// positions.
#[derive(Debug)]
struct PhraseMatcher {
    lists: Vec<Arc<PostingList>>,
    cursors: Vec<usize>,
    live: BitVec,
    weight: f32,
    current_doc: u64,
    current_freq: u32,
    exhausted: bool,
}

impl PhraseMatcher {
    fn new(lists: Vec<Arc<PostingList>>, live: BitVec, weight: f32) -> Self {
        let cursors = vec![0; lists.len()];
        let mut matcher = PhraseMatcher {
            lists,
            cursors,
            live,
            weight,
            current_doc: 0,
            current_freq: 0,
            exhausted: false,
        };
        matcher.settle(0);
        matcher
    }

    /// Position on the first phrase match at or after `target`.
    fn settle(&mut self, mut target: u64) {
        'outer: loop {
            // Leapfrog every list onto a common document.
            let mut index = 0;
            while index < self.lists.len() {
                let list = &self.lists[index];
                let cursor = &mut self.cursors[index];
                while let Some(posting) = list.get(*cursor) {
                    if posting.doc_id >= target {
                        break;
                    }
                    *cursor += 1;
                }
                match list.get(*cursor) {
                    Some(posting) => {
                        if posting.doc_id > target {
                            target = posting.doc_id;
                            index = 0;
                            continue;
                        }
                        index += 1;
                    }
                    None => {
                        self.exhausted = true;
                        return;
                    }
                }
            }

            if !self.live.get(target as usize).unwrap_or(false) {
                target += 1;
                continue;
            }

            let freq = self.consecutive_runs(target);
            if freq > 0 {
                self.current_doc = target;
                self.current_freq = freq;
                return;
            }
            target += 1;
            continue 'outer;
        }
    }

    /// Number of positions where the full phrase starts in the given doc.
    fn consecutive_runs(&self, doc_id: u64) -> u32 {
        let first = match self.lists[0].get(self.cursors[0]) {
            Some(posting) if posting.doc_id == doc_id => posting,
            _ => return 0,
        };
        let mut runs = 0;
        'start: for &start in &first.positions {
            for (offset, (list, &cursor)) in
                self.lists.iter().zip(&self.cursors).enumerate().skip(1)
            {
                let posting = match list.get(cursor) {
                    Some(posting) if posting.doc_id == doc_id => posting,
                    _ => continue 'start,
                };
                let wanted = start + offset as u32;
                if posting.positions.binary_search(&wanted).is_err() {
                    continue 'start;
                }
            }
            runs += 1;
        }
        runs
    }
}

impl Matcher for PhraseMatcher {
    fn doc_id(&self) -> u64 {
        if self.exhausted {
            u64::MAX
        } else {
            self.current_doc
        }
    }

    fn next(&mut self) -> Result<bool> {
        if self.exhausted {
            return Ok(false);
        }
        let target = self.current_doc + 1;
        self.settle(target);
        Ok(!self.exhausted)
    }

    fn skip_to(&mut self, target: u64) -> Result<bool> {
        if self.exhausted {
            return Ok(false);
        }
        if target > self.current_doc {
            self.settle(target);
        }
        Ok(!self.exhausted)
    }

    fn score(&self) -> f32 {
        if self.exhausted {
            0.0
        } else {
            self.current_freq as f32 * self.weight
        }
    }

    fn cost(&self) -> u64 {
        self.lists.iter().map(|list| list.len() as u64).min().unwrap_or(0)
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}
