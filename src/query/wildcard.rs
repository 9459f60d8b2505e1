//! Wildcard query implementation for pattern matching over dictionary terms.

use std::sync::Arc;

use regex::Regex;

use crate::error::{BantamError, Result};
use crate::index::reader::IndexReader;
use crate::query::matcher::{DisjunctionMatcher, EmptyMatcher, Matcher};
use crate::query::query::Query;
use crate::query::term::{ALL_FIELDS, TermQuery};

/// A query that matches documents containing terms that match a wildcard
/// pattern.
///
/// `*` matches zero or more characters and `?` matches exactly one. The
/// pattern is lowercased but not analyzed, so `Prod*1` still means one term.
/// Expansion walks the sorted dictionary from the literal prefix before the
/// first wildcard, then unions the postings of every matching term.
#[derive(Debug, Clone)]
pub struct WildcardQuery {
    field: String,
    pattern: String,
    regex: Arc<Regex>,
    prefix: String,
}

impl WildcardQuery {
    /// Create a new wildcard query. A field of `"*"` searches all fields.
    pub fn new<F, P>(field: F, pattern: P) -> Result<Self>
    where
        F: Into<String>,
        P: Into<String>,
    {
        let field = field.into();
        let pattern = pattern.into().to_lowercase();
        let regex = Arc::new(Self::compile_pattern(&pattern)?);
        let prefix = Self::literal_prefix(&pattern);
        Ok(WildcardQuery {
            field,
            pattern,
            regex,
            prefix,
        })
    }

    /// Get the field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Get the wildcard pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Check if a term matches the pattern.
    pub fn matches(&self, term: &str) -> bool {
        self.regex.is_match(term)
    }

    /// The literal run before the first wildcard, used to bound the
    /// dictionary scan.
    fn literal_prefix(pattern: &str) -> String {
        pattern
            .chars()
            .take_while(|c| *c != '*' && *c != '?')
            .collect()
    }

    /// Compile a wildcard pattern into an anchored regex.
    fn compile_pattern(pattern: &str) -> Result<Regex> {
        let mut regex_pattern = String::with_capacity(pattern.len() + 2);
        regex_pattern.push('^');
        for c in pattern.chars() {
            match c {
                '*' => regex_pattern.push_str(".*"),
                '?' => regex_pattern.push('.'),
                c => regex_pattern.push_str(&regex::escape(&c.to_string())),
            }
        }
        regex_pattern.push('$');
        Regex::new(&regex_pattern)
            .map_err(|e| BantamError::analysis(format!("invalid wildcard pattern: {e}")))
    }

    fn field_matcher(&self, reader: &dyn IndexReader, field: &str) -> Result<Box<dyn Matcher>> {
        let terms = reader.expand_terms(field, &self.prefix, &self.regex);
        if terms.is_empty() {
            return Ok(Box::new(EmptyMatcher::new()));
        }
        let mut matchers = Vec::with_capacity(terms.len());
        for term in terms {
            matchers.push(TermQuery::field_matcher(reader, field, &term)?);
        }
        Ok(Box::new(DisjunctionMatcher::new(matchers)))
    }
}

impl Query for WildcardQuery {
    fn matcher(&self, reader: &dyn IndexReader) -> Result<Box<dyn Matcher>> {
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
        format!("{}:{}", self.field, self.pattern)
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }
}
