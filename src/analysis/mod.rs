//! Text analysis module for Bantam.
//!
//! Provides the tokenization and normalization pipeline that turns raw field
//! text into index terms: tokenizer, filter chain, and analyzer.

pub mod analyzer;
pub mod filter;
pub mod token;
pub mod tokenizer;

// Re-export commonly used types
pub use analyzer::*;
pub use filter::*;
pub use token::*;
pub use tokenizer::*;
