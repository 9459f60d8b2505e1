//! Query execution over a pinned snapshot.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{BantamError, Result};
use crate::index::reader::{IndexReader, SnapshotReader};
use crate::query::query::Query;

/// Results are capped to this many hits when the caller passes a size of
/// zero.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// How often the deadline is checked while draining a matcher, in candidate
/// documents.
const DEADLINE_CHECK_INTERVAL: u64 = 1024;

/// One matching document.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Hit {
    /// The caller-assigned document id.
    pub id: String,
    /// Relevance score.
    pub score: f32,
    /// Stored field values.
    pub fields: HashMap<String, String>,
}

/// The outcome of executing one query.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SearchResults {
    /// The requested page of hits, ordered by descending score.
    pub hits: Vec<Hit>,
    /// Total number of matching documents, across all pages.
    pub total_hits: u64,
    /// Highest score over all matches, zero when nothing matched.
    pub max_score: f32,
}

/// Pagination window.
#[derive(Clone, Copy, Debug)]
pub struct Page {
    /// Number of leading hits to skip.
    pub from: usize,
    /// Maximum hits to return; zero means [`DEFAULT_PAGE_SIZE`].
    pub size: usize,
}

impl Default for Page {
    fn default() -> Self {
        Page {
            from: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Executes queries against one snapshot.
#[derive(Clone, Debug)]
pub struct Searcher {
    reader: SnapshotReader,
}

impl Searcher {
    /// Create a searcher over the given reader.
    pub fn new(reader: SnapshotReader) -> Self {
        Searcher { reader }
    }

    /// The underlying reader.
    pub fn reader(&self) -> &SnapshotReader {
        &self.reader
    }

    /// Execute a query and return the requested page of hits.
    pub fn search(&self, query: &dyn Query, page: Page) -> Result<SearchResults> {
        self.search_with_deadline(query, page, None)
    }

    /// Execute a query, giving up with a cancellation error once the
    /// deadline passes.
    ///
    /// The deadline is checked periodically rather than per document, so
    /// overruns stay within one check interval.
    pub fn search_with_deadline(
        &self,
        query: &dyn Query,
        page: Page,
        deadline: Option<Instant>,
    ) -> Result<SearchResults> {
        let mut matcher = query.matcher(&self.reader)?;

        let mut matches: Vec<(u64, f32)> = Vec::new();
        let mut visited = 0u64;
        while !matcher.is_exhausted() {
            visited += 1;
            if visited % DEADLINE_CHECK_INTERVAL == 0 {
                if let Some(deadline) = deadline {
                    if Instant::now() >= deadline {
                        return Err(BantamError::cancelled("search deadline exceeded"));
                    }
                }
            }
            matches.push((matcher.doc_id(), matcher.score()));
            if !matcher.next()? {
                break;
            }
        }

        // Descending score, ascending ordinal. Ordinals are unique, so the
        // order is total and pagination windows never overlap.
        matches.sort_unstable_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });

        let total_hits = matches.len() as u64;
        let max_score = matches.first().map(|(_, score)| *score).unwrap_or(0.0);

        let size = if page.size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            page.size
        };
        let mut hits = Vec::new();
        for (doc_id, score) in matches.into_iter().skip(page.from).take(size) {
            // Matchers only yield live ordinals, so the stored lookup
            // cannot miss unless the snapshot is corrupt.
            let stored = self.reader.stored(doc_id).ok_or_else(|| {
                BantamError::internal(format!("no stored fields for live doc {doc_id}"))
            })?;
            hits.push(Hit {
                id: stored.external_id.clone(),
                score,
                fields: stored.fields.clone(),
            });
        }

        Ok(SearchResults {
            hits,
            total_hits,
            max_score,
        })
    }
}
