//! Boolean query implementation for combining sub-queries.

use crate::error::Result;
use crate::index::reader::IndexReader;
use crate::query::matcher::{
    ConjunctionMatcher, DisjunctionMatcher, EmptyMatcher, Matcher, NotMatcher,
};
use crate::query::query::Query;

/// How a clause participates in a boolean query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Occur {
    /// The clause must match.
    Must,
    /// The clause should match; required only when no must clauses exist.
    Should,
    /// The clause must not match.
    MustNot,
}

/// One sub-query with its occurrence requirement.
#[derive(Clone, Debug)]
pub struct BooleanClause {
    /// The sub-query.
    pub query: Box<dyn Query>,
    /// How the sub-query participates.
    pub occur: Occur,
}

/// A query combining sub-queries with must, should, and must-not clauses.
///
/// Must clauses intersect, should clauses union. With must clauses present,
/// should clauses stop being required and only contribute to the score.
/// A query of only must-not clauses matches every live document outside
/// the excluded set.
#[derive(Clone, Debug, Default)]
pub struct BooleanQuery {
    clauses: Vec<BooleanClause>,
}

impl BooleanQuery {
    /// Create an empty boolean query.
    pub fn new() -> Self {
        BooleanQuery::default()
    }

    /// Start building a boolean query.
    pub fn builder() -> BooleanQueryBuilder {
        BooleanQueryBuilder::new()
    }

    /// Add a clause.
    pub fn add(&mut self, query: Box<dyn Query>, occur: Occur) {
        self.clauses.push(BooleanClause { query, occur });
    }

    /// The clauses in insertion order.
    pub fn clauses(&self) -> &[BooleanClause] {
        &self.clauses
    }

    fn partition(&self, reader: &dyn IndexReader) -> Result<PartitionedMatchers> {
        let mut musts = Vec::new();
        let mut shoulds = Vec::new();
        let mut must_nots = Vec::new();
        for clause in &self.clauses {
            let matcher = clause.query.matcher(reader)?;
            match clause.occur {
                Occur::Must => musts.push(matcher),
                Occur::Should => shoulds.push(matcher),
                Occur::MustNot => must_nots.push(matcher),
            }
        }
        Ok(PartitionedMatchers {
            musts,
            shoulds,
            must_nots,
        })
    }
}

struct PartitionedMatchers {
    musts: Vec<Box<dyn Matcher>>,
    shoulds: Vec<Box<dyn Matcher>>,
    must_nots: Vec<Box<dyn Matcher>>,
}

impl Query for BooleanQuery {
    fn matcher(&self, reader: &dyn IndexReader) -> Result<Box<dyn Matcher>> {
        let PartitionedMatchers {
            musts,
            shoulds,
            must_nots,
        } = self.partition(reader)?;

        let base: Box<dyn Matcher> = if !musts.is_empty() {
            let required: Box<dyn Matcher> = if musts.len() == 1 {
                musts.into_iter().next().unwrap_or_else(|| Box::new(EmptyMatcher::new()))
            } else {
                Box::new(ConjunctionMatcher::new(musts)?)
            };
            if shoulds.is_empty() {
                required
            } else {
                Box::new(RequiredOptionalMatcher::new(
                    required,
                    Box::new(DisjunctionMatcher::new(shoulds)),
                )?)
            }
        } else if !shoulds.is_empty() {
            Box::new(DisjunctionMatcher::new(shoulds))
        } else if !must_nots.is_empty() {
            // Pure negation: everything live minus the excluded set.
            let excluded = Box::new(DisjunctionMatcher::new(must_nots));
            return Ok(Box::new(NotMatcher::new(reader.live_docs(), excluded)?));
        } else {
            return Ok(Box::new(EmptyMatcher::new()));
        };

        if must_nots.is_empty() {
            return Ok(base);
        }
        let excluded = Box::new(DisjunctionMatcher::new(must_nots));
        Ok(Box::new(ExclusionMatcher::new(base, excluded)?))
    }

    fn description(&self) -> String {
        let rendered: Vec<String> = self
            .clauses
            .iter()
            .map(|clause| {
                let prefix = match clause.occur {
                    Occur::Must => "+",
                    Occur::Should => "",
                    Occur::MustNot => "-",
                };
                format!("{prefix}{}", clause.query.description())
            })
            .collect();
        format!("({})", rendered.join(" "))
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }
}

/// Builder for boolean queries.
#[derive(Debug, Default)]
pub struct BooleanQueryBuilder {
    query: BooleanQuery,
}

impl BooleanQueryBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        BooleanQueryBuilder::default()
    }

    /// Add a must clause.
    pub fn must(mut self, query: Box<dyn Query>) -> Self {
        self.query.add(query, Occur::Must);
        self
    }

    /// Add a should clause.
    pub fn should(mut self, query: Box<dyn Query>) -> Self {
        self.query.add(query, Occur::Should);
        self
    }

    /// Add a must-not clause.
    pub fn must_not(mut self, query: Box<dyn Query>) -> Self {
        self.query.add(query, Occur::MustNot);
        self
    }

    /// Finish building.
    pub fn build(self) -> BooleanQuery {
        self.query
    }
}

/// Walks the required matcher and folds in optional scores where the
/// optional matcher lands on the same document.
#[derive(Debug)]
struct RequiredOptionalMatcher {
    required: Box<dyn Matcher>,
    optional: Box<dyn Matcher>,
}

impl RequiredOptionalMatcher {
    fn new(required: Box<dyn Matcher>, mut optional: Box<dyn Matcher>) -> Result<Self> {
        if !required.is_exhausted() && !optional.is_exhausted() {
            optional.skip_to(required.doc_id())?;
        }
        Ok(RequiredOptionalMatcher { required, optional })
    }

    fn align_optional(&mut self) -> Result<()> {
        if self.required.is_exhausted() || self.optional.is_exhausted() {
            return Ok(());
        }
        if self.optional.doc_id() < self.required.doc_id() {
            self.optional.skip_to(self.required.doc_id())?;
        }
        Ok(())
    }
}

impl Matcher for RequiredOptionalMatcher {
    fn doc_id(&self) -> u64 {
        self.required.doc_id()
    }

    fn next(&mut self) -> Result<bool> {
        let advanced = self.required.next()?;
        self.align_optional()?;
        Ok(advanced)
    }

    fn skip_to(&mut self, target: u64) -> Result<bool> {
        let advanced = self.required.skip_to(target)?;
        self.align_optional()?;
        Ok(advanced)
    }

    fn score(&self) -> f32 {
        let mut score = self.required.score();
        if !self.optional.is_exhausted() && self.optional.doc_id() == self.required.doc_id() {
            score += self.optional.score();
        }
        score
    }

    fn cost(&self) -> u64 {
        self.required.cost()
    }

    fn is_exhausted(&self) -> bool {
        self.required.is_exhausted()
    }
}

/// Walks a base matcher, dropping documents the excluded matcher hits.
#[derive(Debug)]
struct ExclusionMatcher {
    base: Box<dyn Matcher>,
    excluded: Box<dyn Matcher>,
}

impl ExclusionMatcher {
    fn new(base: Box<dyn Matcher>, excluded: Box<dyn Matcher>) -> Result<Self> {
        let mut matcher = ExclusionMatcher { base, excluded };
        matcher.settle()?;
        Ok(matcher)
    }

    fn settle(&mut self) -> Result<()> {
        while !self.base.is_exhausted() {
            let doc = self.base.doc_id();
            if self.excluded.doc_id() < doc {
                self.excluded.skip_to(doc)?;
            }
            if self.excluded.doc_id() != doc {
                return Ok(());
            }
            if !self.base.next()? {
                return Ok(());
            }
        }
        Ok(())
    }
}

impl Matcher for ExclusionMatcher {
    fn doc_id(&self) -> u64 {
        self.base.doc_id()
    }

    fn next(&mut self) -> Result<bool> {
        if !self.base.next()? {
            return Ok(false);
        }
        self.settle()?;
        Ok(!self.base.is_exhausted())
    }

    fn skip_to(&mut self, target: u64) -> Result<bool> {
        if !self.base.skip_to(target)? {
            return Ok(false);
        }
        self.settle()?;
        Ok(!self.base.is_exhausted())
    }

    fn score(&self) -> f32 {
        self.base.score()
    }

    fn cost(&self) -> u64 {
        self.base.cost()
    }

    fn is_exhausted(&self) -> bool {
        self.base.is_exhausted()
    }
}
