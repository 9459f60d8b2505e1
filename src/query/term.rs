//! Term query implementation for exact term matching.

use crate::error::Result;
use crate::index::reader::IndexReader;
use crate::query::matcher::{DisjunctionMatcher, EmptyMatcher, Matcher, PostingMatcher};
use crate::query::query::Query;
use crate::query::scorer;

/// The pseudo-field that searches every field in the index.
pub const ALL_FIELDS: &str = "*";

/// A query that matches documents containing a specific term.
///
/// The term is matched exactly against the dictionary and is not analyzed
/// here; callers normalize it first, which the query parser does by running
/// it through the indexing analyzer.
#[derive(Debug, Clone)]
pub struct TermQuery {
    field: String,
    term: String,
}

impl TermQuery {
    /// Create a new term query. A field of `"*"` searches all fields.
    pub fn new<F, T>(field: F, term: T) -> Self
    where
        F: Into<String>,
        T: Into<String>,
    {
        TermQuery {
            field: field.into(),
            term: term.into(),
        }
    }

    /// Get the field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Get the term.
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Matcher for the term in one concrete field.
    pub(crate) fn field_matcher(
        reader: &dyn IndexReader,
        field: &str,
        term: &str,
    ) -> Result<Box<dyn Matcher>> {
        match reader.postings(field, term) {
            Some(postings) => {
                let weight = scorer::idf(reader.doc_count(), reader.doc_frequency(field, term));
                Ok(Box::new(PostingMatcher::new(
                    postings,
                    reader.live_docs(),
                    weight,
                )))
            }
            None => Ok(Box::new(EmptyMatcher::new())),
        }
    }
}

impl Query for TermQuery {
    fn matcher(&self, reader: &dyn IndexReader) -> Result<Box<dyn Matcher>> {
        if self.field != ALL_FIELDS {
            return Self::field_matcher(reader, &self.field, &self.term);
        }
        // The all-fields pseudo-field is a union over every concrete field.
        let mut matchers: Vec<Box<dyn Matcher>> = Vec::new();
        for field in reader.field_names() {
            if reader.postings(&field, &self.term).is_some() {
                matchers.push(Self::field_matcher(reader, &field, &self.term)?);
            }
        }
        if matchers.is_empty() {
            return Ok(Box::new(EmptyMatcher::new()));
        }
        Ok(Box::new(DisjunctionMatcher::new(matchers)))
    }

    fn description(&self) -> String {
        format!("{}:{}", self.field, self.term)
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }
}
