//! Base query trait.

use std::fmt::Debug;

use crate::error::Result;
use crate::index::reader::IndexReader;
use crate::query::matcher::Matcher;

/// Trait for search queries.
///
/// A query is an immutable description of what to match; calling
/// [`Query::matcher`] binds it to one index snapshot and yields the cursor
/// that actually walks documents.
pub trait Query: Send + Sync + Debug {
    /// Create a matcher for this query against the given reader.
    fn matcher(&self, reader: &dyn IndexReader) -> Result<Box<dyn Matcher>>;

    /// A human-readable rendering of this query.
    fn description(&self) -> String;

    /// Clone this query.
    fn clone_box(&self) -> Box<dyn Query>;
}

impl Clone for Box<dyn Query> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
