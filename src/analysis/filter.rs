//! Token filter implementations.
//!
//! Filters rewrite the token stream produced by a tokenizer. The engine uses
//! a single [`LowercaseFilter`] for case-folding; anything fancier
//! (stemming, synonyms, stop words) is out of scope.

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for token filters.
pub trait Filter: Send + Sync {
    /// Apply this filter to a token stream, producing a new stream.
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream>;

    /// Get the name of this filter.
    fn name(&self) -> &'static str;
}

/// A filter that converts token text to lowercase.
///
/// Normalizes casing so that matching is case-insensitive. Positions and
/// offsets are preserved.
#[derive(Clone, Debug, Default)]
pub struct LowercaseFilter;

impl LowercaseFilter {
    /// Create a new lowercase filter.
    pub fn new() -> Self {
        LowercaseFilter
    }
}

impl Filter for LowercaseFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let filtered = tokens.map(|mut token| {
            if token.text.chars().any(|c| c.is_uppercase()) {
                token.text = token.text.to_lowercase();
            }
            token
        });
        Ok(Box::new(filtered))
    }

    fn name(&self) -> &'static str {
        "lowercase"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token::Token;

    #[test]
    fn test_lowercase_filter() {
        let filter = LowercaseFilter::new();
        let tokens = vec![Token::new("Hello", 0), Token::new("WORLD", 1)];

        let filtered: Vec<Token> = filter
            .filter(Box::new(tokens.into_iter()))
            .unwrap()
            .collect();

        assert_eq!(filtered[0].text, "hello");
        assert_eq!(filtered[1].text, "world");
    }

    #[test]
    fn test_lowercase_filter_preserves_positions() {
        let filter = LowercaseFilter::new();
        let tokens = vec![Token::with_offsets("Quick", 3, 10, 15)];

        let filtered: Vec<Token> = filter
            .filter(Box::new(tokens.into_iter()))
            .unwrap()
            .collect();

        assert_eq!(filtered[0].text, "quick");
        assert_eq!(filtered[0].position, 3);
        assert_eq!(filtered[0].start_offset, 10);
        assert_eq!(filtered[0].end_offset, 15);
    }

    #[test]
    fn test_lowercase_filter_non_ascii() {
        let filter = LowercaseFilter::new();
        let tokens = vec![Token::new("CAF\u{c9}", 0)];

        let filtered: Vec<Token> = filter
            .filter(Box::new(tokens.into_iter()))
            .unwrap()
            .collect();

        assert_eq!(filtered[0].text, "caf\u{e9}");
    }
}
