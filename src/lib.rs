//! # Bantam
//!
//! A small full-text search engine library for Rust.
//!
//! ## Features
//!
//! - Schema-less documents with string fields
//! - Tombstone-based deletes over immutable snapshots
//! - Boolean, phrase, and wildcard queries with a Lucene-like syntax
//! - Tf-idf scoring with stable pagination
//! - Crash-safe single-segment persistence, memory or file backed

pub mod analysis;
pub mod document;
pub mod engine;
pub mod error;
pub mod index;
pub mod query;
pub mod search;
pub mod storage;

pub use document::{Document, DocumentBuilder};
pub use engine::SearchEngine;
pub use error::{BantamError, Result};
pub use search::{Hit, Page, SearchResults};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
