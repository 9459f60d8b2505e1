//! Analyzers turn raw field text into the normalized terms the index keys on.

use std::sync::Arc;

use crate::analysis::filter::{Filter, LowercaseFilter};
use crate::analysis::token::TokenStream;
use crate::analysis::tokenizer::{AlnumTokenizer, Tokenizer};
use crate::error::Result;

/// Trait for analyzers that convert field text into normalized terms.
pub trait Analyzer: Send + Sync {
    /// Run the text through the pipeline, yielding normalized tokens.
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this analyzer.
    fn name(&self) -> &'static str;
}

/// An analyzer that chains a tokenizer with a list of filters.
#[derive(Clone)]
pub struct PipelineAnalyzer {
    tokenizer: Arc<dyn Tokenizer>,
    filters: Vec<Arc<dyn Filter>>,
}

impl PipelineAnalyzer {
    /// A pipeline over the given tokenizer with no filters attached yet.
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        PipelineAnalyzer {
            tokenizer,
            filters: Vec::new(),
        }
    }

    /// Append a filter stage; filters run in insertion order.
    pub fn add_filter(mut self, filter: Arc<dyn Filter>) -> Self {
        self.filters.push(filter);
        self
    }

    /// The tokenizer at the head of the pipeline.
    pub fn tokenizer(&self) -> &Arc<dyn Tokenizer> {
        &self.tokenizer
    }
}

impl Analyzer for PipelineAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        let mut tokens = self.tokenizer.tokenize(text)?;
        for filter in &self.filters {
            tokens = filter.filter(tokens)?;
        }
        Ok(tokens)
    }

    fn name(&self) -> &'static str {
        "pipeline"
    }
}

impl std::fmt::Debug for PipelineAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineAnalyzer")
            .field("tokenizer", &self.tokenizer.name())
            .field(
                "filters",
                &self.filters.iter().map(|f| f.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// The default analyzer: alphanumeric tokenization plus lowercasing.
///
/// Applied uniformly to every field at index time and to query terms at
/// parse time, so indexed and queried terms always normalize identically.
#[derive(Clone)]
pub struct StandardAnalyzer {
    inner: PipelineAnalyzer,
}

impl StandardAnalyzer {
    /// Create a new standard analyzer.
    pub fn new() -> Result<Self> {
        let tokenizer = Arc::new(AlnumTokenizer::new()?);
        let inner = PipelineAnalyzer::new(tokenizer).add_filter(Arc::new(LowercaseFilter::new()));
        Ok(StandardAnalyzer { inner })
    }

    /// Analyze text into the plain term strings, dropping positions.
    ///
    /// Convenience for callers that only need the normalized terms, such as
    /// the query parser.
    pub fn terms(&self, text: &str) -> Result<Vec<String>> {
        Ok(self.analyze(text)?.map(|t| t.text).collect())
    }
}

impl Default for StandardAnalyzer {
    fn default() -> Self {
        Self::new().expect("standard analyzer should be creatable")
    }
}

impl Analyzer for StandardAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.inner.analyze(text)
    }

    fn name(&self) -> &'static str {
        "standard"
    }
}

impl std::fmt::Debug for StandardAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StandardAnalyzer")
            .field("inner", &self.inner)
            .finish()
    }
}
