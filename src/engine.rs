//! The top-level search engine facade.
//!
//! Ties the store, query parser, and searcher together behind the handful
//! of calls an application needs: index, delete, and search with a query
//! string.

use std::path::Path;
use std::time::Instant;

use crate::document::Document;
use crate::error::{BantamError, Result};
use crate::index::batch::Batch;
use crate::index::store::InvertedIndexStore;
use crate::query::parser::QueryParser;
use crate::search::searcher::{Page, SearchResults, Searcher};

/// A full-text search engine over schema-less documents.
#[derive(Debug)]
pub struct SearchEngine {
    store: InvertedIndexStore,
    parser: QueryParser,
}

impl SearchEngine {
    /// Create an engine persisted under the given directory.
    pub fn create_in_dir(path: impl AsRef<Path>) -> Result<Self> {
        Ok(SearchEngine {
            store: InvertedIndexStore::create_in_dir(path)?,
            parser: QueryParser::new()?,
        })
    }

    /// Open an engine previously persisted under the given directory.
    pub fn open_dir(path: impl AsRef<Path>) -> Result<Self> {
        Ok(SearchEngine {
            store: InvertedIndexStore::open_dir(path)?,
            parser: QueryParser::new()?,
        })
    }

    /// Open the index under the given directory, creating an empty one if
    /// no committed segment exists there yet.
    ///
    /// A segment that exists but fails to load is still an error; only a
    /// missing segment falls back to creation.
    pub fn open_or_create_dir(path: impl AsRef<Path>) -> Result<Self> {
        match Self::open_dir(path.as_ref()) {
            Err(BantamError::Storage(_)) => Self::create_in_dir(path),
            other => other,
        }
    }

    /// Create an engine backed by in-process memory.
    pub fn in_memory() -> Result<Self> {
        Ok(SearchEngine {
            store: InvertedIndexStore::in_memory()?,
            parser: QueryParser::new()?,
        })
    }

    /// The underlying store.
    pub fn store(&self) -> &InvertedIndexStore {
        &self.store
    }

    /// Index a document, replacing any previous document with the same id.
    pub fn index(&self, doc: Document) -> Result<()> {
        self.store.put(doc)
    }

    /// Index many documents, committing a batch whenever the configured
    /// batch limit fills up and once more for the remainder.
    pub fn batch_index<I>(&self, docs: I) -> Result<u64>
    where
        I: IntoIterator<Item = Document>,
    {
        let max_ops = self.store.batch_config().max_ops;
        let mut batch = Batch::new();
        let mut indexed = 0u64;
        for doc in docs {
            batch.index(doc);
            if batch.len() >= max_ops {
                indexed += batch.len() as u64;
                self.store.commit_batch(std::mem::take(&mut batch))?;
            }
        }
        if !batch.is_empty() {
            indexed += batch.len() as u64;
            self.store.commit_batch(batch)?;
        }
        Ok(indexed)
    }

    /// Delete a document by id. Unknown ids are ignored.
    pub fn delete(&self, id: &str) -> Result<()> {
        self.store.delete(id)
    }

    /// Parse and execute a query string.
    pub fn search(&self, query_str: &str, page: Page) -> Result<SearchResults> {
        self.search_with_deadline(query_str, page, None)
    }

    /// Parse and execute a query string under a deadline.
    pub fn search_with_deadline(
        &self,
        query_str: &str,
        page: Page,
        deadline: Option<Instant>,
    ) -> Result<SearchResults> {
        let query = self.parser.parse(query_str)?;
        let searcher = Searcher::new(self.store.reader());
        searcher.search_with_deadline(query.as_ref(), page, deadline)
    }

    /// Number of live documents.
    pub fn doc_count(&self) -> u64 {
        self.store.doc_count()
    }

    /// Flush state to storage.
    pub fn close(&self) -> Result<()> {
        self.store.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BantamError;

    fn doc(id: &str, name: &str, category: &str) -> Document {
        Document::builder(id)
            .add_text("name", name)
            .add_text("category", category)
            .build()
    }

    #[test]
    fn test_index_and_search() {
        let engine = SearchEngine::in_memory().unwrap();
        engine.index(doc("1", "Product 1", "Electronics")).unwrap();
        engine.index(doc("2", "Product 2", "Books")).unwrap();

        let results = engine.search("category:Electronics", Page::default()).unwrap();
        assert_eq!(results.total_hits, 1);
        assert_eq!(results.hits[0].id, "1");
    }

    #[test]
    fn test_batch_index_flushes_in_chunks() {
        let engine = SearchEngine::in_memory().unwrap();
        let docs: Vec<Document> = (0..25)
            .map(|i| doc(&format!("{i}"), &format!("Product {i}"), "Toys"))
            .collect();
        let indexed = engine.batch_index(docs).unwrap();
        assert_eq!(indexed, 25);
        assert_eq!(engine.doc_count(), 25);
    }

    #[test]
    fn test_deleted_docs_stop_matching() {
        let engine = SearchEngine::in_memory().unwrap();
        engine.index(doc("1", "Product 1", "Electronics")).unwrap();
        engine.delete("1").unwrap();

        let results = engine.search("category:Electronics", Page::default()).unwrap();
        assert_eq!(results.total_hits, 0);
    }

    #[test]
    fn test_open_or_create_keeps_existing_documents() {
        let dir = tempfile::tempdir().unwrap();

        let engine = SearchEngine::open_or_create_dir(dir.path()).unwrap();
        engine.index(doc("1", "Product 1", "Electronics")).unwrap();
        engine.close().unwrap();

        // A second run over the same directory must see the first run's
        // documents, not an empty index.
        let engine = SearchEngine::open_or_create_dir(dir.path()).unwrap();
        assert_eq!(engine.doc_count(), 1);
        let results = engine.search("category:Electronics", Page::default()).unwrap();
        assert_eq!(results.hits[0].id, "1");
    }

    #[test]
    fn test_parser_errors_surface() {
        let engine = SearchEngine::in_memory().unwrap();
        assert!(matches!(
            engine.search("", Page::default()),
            Err(BantamError::InvalidArgument(_))
        ));
        assert!(matches!(
            engine.search("(category:Books", Page::default()),
            Err(BantamError::Syntax(_))
        ));
    }
}
