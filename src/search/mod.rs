//! Search execution and result types.

pub mod searcher;

pub use searcher::{DEFAULT_PAGE_SIZE, Hit, Page, SearchResults, Searcher};
