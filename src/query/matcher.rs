//! Matcher implementations for query execution.
//!
//! A matcher is a cursor over internal document ordinals in ascending order.
//! Leaf matchers skip tombstoned documents, so composed matchers only ever
//! see live ordinals. Each matcher also scores the document it is currently
//! positioned on.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt::Debug;
use std::sync::Arc;

use bit_vec::BitVec;

use crate::error::Result;
use crate::index::posting::PostingList;

/// Trait for document matchers.
pub trait Matcher: Send + Debug {
    /// Current document ordinal, or `u64::MAX` when exhausted.
    fn doc_id(&self) -> u64;

    /// Move to the next matching document.
    fn next(&mut self) -> Result<bool>;

    /// Skip to the first matching document >= target.
    fn skip_to(&mut self, target: u64) -> Result<bool>;

    /// Score of the current document.
    fn score(&self) -> f32;

    /// Estimated number of documents this matcher will visit.
    fn cost(&self) -> u64;

    /// Whether this matcher has run out of documents.
    fn is_exhausted(&self) -> bool;
}

/// A matcher that matches no documents.
#[derive(Debug, Default)]
pub struct EmptyMatcher;

impl EmptyMatcher {
    /// Create a new empty matcher.
    pub fn new() -> Self {
        EmptyMatcher
    }
}

impl Matcher for EmptyMatcher {
    fn doc_id(&self) -> u64 {
        u64::MAX
    }

    fn next(&mut self) -> Result<bool> {
        Ok(false)
    }

    fn skip_to(&mut self, _target: u64) -> Result<bool> {
        Ok(false)
    }

    fn score(&self) -> f32 {
        0.0
    }

    fn cost(&self) -> u64 {
        0
    }

    fn is_exhausted(&self) -> bool {
        true
    }
}

/// A matcher over every live document.
#[derive(Debug)]
pub struct AllMatcher {
    live: BitVec,
    current_doc: u64,
    exhausted: bool,
}

impl AllMatcher {
    /// Create a matcher positioned on the first live ordinal.
    pub fn new(live: BitVec) -> Self {
        let mut matcher = AllMatcher {
            live,
            current_doc: 0,
            exhausted: false,
        };
        matcher.settle();
        matcher
    }

    /// Advance past tombstoned ordinals.
    fn settle(&mut self) {
        while (self.current_doc as usize) < self.live.len() {
            if self.live.get(self.current_doc as usize).unwrap_or(false) {
                return;
            }
            self.current_doc += 1;
        }
        self.exhausted = true;
    }
}

impl Matcher for AllMatcher {
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
        self.current_doc += 1;
        self.settle();
        Ok(!self.exhausted)
    }

    fn skip_to(&mut self, target: u64) -> Result<bool> {
        if self.exhausted {
            return Ok(false);
        }
        if target > self.current_doc {
            self.current_doc = target;
            self.settle();
        }
        Ok(!self.exhausted)
    }

    fn score(&self) -> f32 {
        0.0
    }

    fn cost(&self) -> u64 {
        self.live.len() as u64
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

/// A matcher over one term's postings list, weighted by inverse document
/// frequency.
#[derive(Debug)]
pub struct PostingMatcher {
    postings: Arc<PostingList>,
    live: BitVec,
    idf: f32,
    index: usize,
    exhausted: bool,
}

impl PostingMatcher {
    /// Create a matcher positioned on the first live posting.
    pub fn new(postings: Arc<PostingList>, live: BitVec, idf: f32) -> Self {
        let mut matcher = PostingMatcher {
            postings,
            live,
            idf,
            index: 0,
            exhausted: false,
        };
        matcher.settle();
        matcher
    }

    fn settle(&mut self) {
        while let Some(posting) = self.postings.get(self.index) {
            if self.live.get(posting.doc_id as usize).unwrap_or(false) {
                return;
            }
            self.index += 1;
        }
        self.exhausted = true;
    }
}

impl Matcher for PostingMatcher {
    fn doc_id(&self) -> u64 {
        if self.exhausted {
            u64::MAX
        } else {
            // settle() guarantees the index is in bounds when not exhausted.
            self.postings.get(self.index).map_or(u64::MAX, |p| p.doc_id)
        }
    }

    fn next(&mut self) -> Result<bool> {
        if self.exhausted {
            return Ok(false);
        }
        self.index += 1;
        self.settle();
        Ok(!self.exhausted)
    }

    fn skip_to(&mut self, target: u64) -> Result<bool> {
        if self.exhausted {
            return Ok(false);
        }
        while let Some(posting) = self.postings.get(self.index) {
            if posting.doc_id >= target {
                self.settle();
                return Ok(!self.exhausted);
            }
            self.index += 1;
        }
        self.exhausted = true;
        Ok(false)
    }

    fn score(&self) -> f32 {
        match self.postings.get(self.index) {
            Some(posting) if !self.exhausted => posting.term_freq as f32 * self.idf,
            _ => 0.0,
        }
    }

    fn cost(&self) -> u64 {
        self.postings.len() as u64
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

/// A matcher that implements conjunction (AND) of multiple matchers.
#[derive(Debug)]
pub struct ConjunctionMatcher {
    matchers: Vec<Box<dyn Matcher>>,
    current_doc: u64,
    exhausted: bool,
}

impl ConjunctionMatcher {
    /// Create a conjunction positioned on the first common document.
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Result<Self> {
        let mut matcher = ConjunctionMatcher {
            current_doc: 0,
            exhausted: matchers.is_empty() || matchers.iter().any(|m| m.is_exhausted()),
            matchers,
        };
        if !matcher.exhausted {
            matcher.align()?;
        }
        Ok(matcher)
    }

    /// Leapfrog all children onto the same ordinal.
    fn align(&mut self) -> Result<()> {
        let mut target = self
            .matchers
            .iter()
            .map(|m| m.doc_id())
            .max()
            .unwrap_or(u64::MAX);
        'outer: loop {
            if target == u64::MAX {
                self.exhausted = true;
                return Ok(());
            }
            for matcher in &mut self.matchers {
                if matcher.doc_id() < target {
                    if !matcher.skip_to(target)? {
                        self.exhausted = true;
                        return Ok(());
                    }
                    if matcher.doc_id() > target {
                        target = matcher.doc_id();
                        continue 'outer;
                    }
                }
            }
            self.current_doc = target;
            return Ok(());
        }
    }
}

impl Matcher for ConjunctionMatcher {
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
        if !self.matchers[0].next()? {
            self.exhausted = true;
            return Ok(false);
        }
        self.align()?;
        Ok(!self.exhausted)
    }

    fn skip_to(&mut self, target: u64) -> Result<bool> {
        if self.exhausted {
            return Ok(false);
        }
        if target <= self.current_doc {
            return Ok(true);
        }
        if !self.matchers[0].skip_to(target)? {
            self.exhausted = true;
            return Ok(false);
        }
        self.align()?;
        Ok(!self.exhausted)
    }

    fn score(&self) -> f32 {
        if self.exhausted {
            return 0.0;
        }
        self.matchers.iter().map(|m| m.score()).sum()
    }

    fn cost(&self) -> u64 {
        self.matchers.iter().map(|m| m.cost()).min().unwrap_or(0)
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

/// A helper struct for tracking matchers in the disjunction heap.
#[derive(Debug)]
struct MatcherEntry {
    matcher: Box<dyn Matcher>,
}

impl PartialEq for MatcherEntry {
    fn eq(&self, other: &Self) -> bool {
        self.matcher.doc_id() == other.matcher.doc_id()
    }
}

impl Eq for MatcherEntry {}

impl PartialOrd for MatcherEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MatcherEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap: lower doc IDs come first.
        other.matcher.doc_id().cmp(&self.matcher.doc_id())
    }
}

/// A matcher that implements disjunction (OR) of multiple matchers.
///
/// Children positioned on the current document stay in the heap until the
/// next advance, so the current score is the sum over exactly the children
/// that match here.
#[derive(Debug)]
pub struct DisjunctionMatcher {
    heap: BinaryHeap<MatcherEntry>,
    current_doc: u64,
    exhausted: bool,
    cost: u64,
}

impl DisjunctionMatcher {
    /// Create a new disjunction matcher from multiple matchers.
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        let mut heap = BinaryHeap::new();
        let mut cost = 0;
        for matcher in matchers {
            if !matcher.is_exhausted() {
                cost += matcher.cost();
                heap.push(MatcherEntry { matcher });
            }
        }
        let current_doc = heap
            .peek()
            .map(|entry| entry.matcher.doc_id())
            .unwrap_or(u64::MAX);
        let exhausted = heap.is_empty();
        DisjunctionMatcher {
            heap,
            current_doc,
            exhausted,
            cost,
        }
    }

    fn advance_past_current(&mut self) -> Result<()> {
        let current_doc = self.current_doc;
        let mut advanced = Vec::new();
        while let Some(entry) = self.heap.peek() {
            if entry.matcher.doc_id() != current_doc {
                break;
            }
            let mut entry = match self.heap.pop() {
                Some(entry) => entry,
                None => break,
            };
            if entry.matcher.next()? {
                advanced.push(entry);
            }
        }
        for entry in advanced {
            self.heap.push(entry);
        }
        match self.heap.peek() {
            Some(entry) => self.current_doc = entry.matcher.doc_id(),
            None => {
                self.current_doc = u64::MAX;
                self.exhausted = true;
            }
        }
        Ok(())
    }
}

impl Matcher for DisjunctionMatcher {
    fn doc_id(&self) -> u64 {
        self.current_doc
    }

    fn next(&mut self) -> Result<bool> {
        if self.exhausted {
            return Ok(false);
        }
        self.advance_past_current()?;
        Ok(!self.exhausted)
    }

    fn skip_to(&mut self, target: u64) -> Result<bool> {
        if self.exhausted {
            return Ok(false);
        }
        if target <= self.current_doc {
            return Ok(true);
        }
        let mut kept = Vec::new();
        while let Some(mut entry) = self.heap.pop() {
            if entry.matcher.doc_id() >= target || entry.matcher.skip_to(target)? {
                kept.push(entry);
            }
        }
        for entry in kept {
            self.heap.push(entry);
        }
        match self.heap.peek() {
            Some(entry) => {
                self.current_doc = entry.matcher.doc_id();
                Ok(true)
            }
            None => {
                self.current_doc = u64::MAX;
                self.exhausted = true;
                Ok(false)
            }
        }
    }

    fn score(&self) -> f32 {
        if self.exhausted {
            return 0.0;
        }
        self.heap
            .iter()
            .filter(|entry| entry.matcher.doc_id() == self.current_doc)
            .map(|entry| entry.matcher.score())
            .sum()
    }

    fn cost(&self) -> u64 {
        self.cost
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

/// A matcher over the live documents NOT matched by a child matcher.
///
/// Complement matches carry no term evidence, so they score zero.
#[derive(Debug)]
pub struct NotMatcher {
    universe: AllMatcher,
    excluded: Box<dyn Matcher>,
    exhausted: bool,
}

impl NotMatcher {
    /// Create a matcher over `live` ordinals absent from `excluded`.
    pub fn new(live: BitVec, excluded: Box<dyn Matcher>) -> Result<Self> {
        let mut matcher = NotMatcher {
            universe: AllMatcher::new(live),
            excluded,
            exhausted: false,
        };
        matcher.settle()?;
        Ok(matcher)
    }

    /// Advance the universe past documents the child matches.
    fn settle(&mut self) -> Result<()> {
        loop {
            if self.universe.is_exhausted() {
                self.exhausted = true;
                return Ok(());
            }
            let doc = self.universe.doc_id();
            if self.excluded.doc_id() < doc {
                self.excluded.skip_to(doc)?;
            }
            if self.excluded.doc_id() != doc {
                return Ok(());
            }
            if !self.universe.next()? {
                self.exhausted = true;
                return Ok(());
            }
        }
    }
}

impl Matcher for NotMatcher {
    fn doc_id(&self) -> u64 {
        if self.exhausted {
            u64::MAX
        } else {
            self.universe.doc_id()
        }
    }

    fn next(&mut self) -> Result<bool> {
        if self.exhausted {
            return Ok(false);
        }
        if !self.universe.next()? {
            self.exhausted = true;
            return Ok(false);
        }
        self.settle()?;
        Ok(!self.exhausted)
    }

    fn skip_to(&mut self, target: u64) -> Result<bool> {
        if self.exhausted {
            return Ok(false);
        }
        if target > self.universe.doc_id() && !self.universe.skip_to(target)? {
            self.exhausted = true;
            return Ok(false);
        }
        self.settle()?;
        Ok(!self.exhausted)
    }

    fn score(&self) -> f32 {
        0.0
    }

    fn cost(&self) -> u64 {
        self.universe.cost()
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::posting::Posting;

    fn live(bits: &[bool]) -> BitVec {
        let mut live = BitVec::new();
        for &bit in bits {
            live.push(bit);
        }
        live
    }

    fn postings(doc_ids: &[u64]) -> Arc<PostingList> {
        let mut list = PostingList::new();
        for &doc_id in doc_ids {
            list.push(Posting::new(doc_id, 1, vec![1])).unwrap();
        }
        Arc::new(list)
    }

    fn drain(mut matcher: Box<dyn Matcher>) -> Vec<u64> {
        let mut docs = Vec::new();
        while !matcher.is_exhausted() {
            docs.push(matcher.doc_id());
            if !matcher.next().unwrap() {
                break;
            }
        }
        docs
    }

    #[test]
    fn test_empty_matcher() {
        let mut matcher = EmptyMatcher::new();
        assert_eq!(matcher.doc_id(), u64::MAX);
        assert!(matcher.is_exhausted());
        assert!(!matcher.next().unwrap());
        assert!(!matcher.skip_to(5).unwrap());
    }

    #[test]
    fn test_all_matcher_skips_tombstones() {
        let matcher = AllMatcher::new(live(&[true, false, true, true, false]));
        assert_eq!(drain(Box::new(matcher)), vec![0, 2, 3]);
    }

    #[test]
    fn test_posting_matcher_filters_dead_docs() {
        let matcher = PostingMatcher::new(
            postings(&[0, 1, 3]),
            live(&[true, false, true, true]),
            1.0,
        );
        assert_eq!(drain(Box::new(matcher)), vec![0, 3]);
    }

    #[test]
    fn test_posting_matcher_scores_tf_times_idf() {
        let mut list = PostingList::new();
        list.push(Posting::new(0, 3, vec![1, 5, 9])).unwrap();
        let matcher = PostingMatcher::new(Arc::new(list), live(&[true]), 2.0);
        assert_eq!(matcher.score(), 6.0);
    }

    #[test]
    fn test_conjunction_intersects() {
        let all_live = live(&[true; 8]);
        let a = PostingMatcher::new(postings(&[0, 2, 4, 6]), all_live.clone(), 1.0);
        let b = PostingMatcher::new(postings(&[2, 3, 6, 7]), all_live, 1.0);
        let conj = ConjunctionMatcher::new(vec![Box::new(a), Box::new(b)]).unwrap();
        assert_eq!(drain(Box::new(conj)), vec![2, 6]);
    }

    #[test]
    fn test_conjunction_sums_child_scores() {
        let all_live = live(&[true; 4]);
        let a = PostingMatcher::new(postings(&[1]), all_live.clone(), 2.0);
        let b = PostingMatcher::new(postings(&[1]), all_live, 3.0);
        let conj = ConjunctionMatcher::new(vec![Box::new(a), Box::new(b)]).unwrap();
        assert_eq!(conj.doc_id(), 1);
        assert_eq!(conj.score(), 5.0);
    }

    #[test]
    fn test_disjunction_unions_without_duplicates() {
        let all_live = live(&[true; 8]);
        let a = PostingMatcher::new(postings(&[0, 2, 4]), all_live.clone(), 1.0);
        let b = PostingMatcher::new(postings(&[2, 5]), all_live, 1.0);
        let disj = DisjunctionMatcher::new(vec![Box::new(a), Box::new(b)]);
        assert_eq!(drain(Box::new(disj)), vec![0, 2, 4, 5]);
    }

    #[test]
    fn test_disjunction_scores_only_matching_children() {
        let all_live = live(&[true; 4]);
        let a = PostingMatcher::new(postings(&[0, 2]), all_live.clone(), 2.0);
        let b = PostingMatcher::new(postings(&[2]), all_live, 3.0);
        let mut disj = DisjunctionMatcher::new(vec![Box::new(a), Box::new(b)]);

        assert_eq!(disj.doc_id(), 0);
        assert_eq!(disj.score(), 2.0);

        assert!(disj.next().unwrap());
        assert_eq!(disj.doc_id(), 2);
        assert_eq!(disj.score(), 5.0);
    }

    #[test]
    fn test_disjunction_skip_to() {
        let all_live = live(&[true; 10]);
        let a = PostingMatcher::new(postings(&[0, 4, 9]), all_live.clone(), 1.0);
        let b = PostingMatcher::new(postings(&[1, 6]), all_live, 1.0);
        let mut disj = DisjunctionMatcher::new(vec![Box::new(a), Box::new(b)]);

        assert!(disj.skip_to(5).unwrap());
        assert_eq!(disj.doc_id(), 6);
        assert!(disj.skip_to(7).unwrap());
        assert_eq!(disj.doc_id(), 9);
        assert!(!disj.skip_to(10).unwrap());
        assert!(disj.is_exhausted());
    }

    #[test]
    fn test_not_matcher_complements_within_live_set() {
        let bits = live(&[true, true, false, true, true]);
        let excluded = PostingMatcher::new(postings(&[1, 3]), bits.clone(), 1.0);
        let not = NotMatcher::new(bits, Box::new(excluded)).unwrap();
        let not_docs = drain(Box::new(not));
        assert_eq!(not_docs, vec![0, 4]);
    }

    #[test]
    fn test_not_matcher_scores_zero() {
        let bits = live(&[true, true]);
        let not = NotMatcher::new(bits, Box::new(EmptyMatcher::new())).unwrap();
        assert_eq!(not.doc_id(), 0);
        assert_eq!(not.score(), 0.0);
    }
}
