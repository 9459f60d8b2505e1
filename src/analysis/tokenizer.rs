//! Tokenizer implementations for text analysis.
//!
//! Tokenizers are the first step of the analysis pipeline: they split raw
//! field text into [`Token`]s. The default [`AlnumTokenizer`] extracts
//! maximal alphanumeric runs, so every non-alphanumeric codepoint acts as a
//! boundary.

use std::sync::Arc;

use regex::Regex;

use crate::analysis::token::{Token, TokenStream};
use crate::error::{BantamError, Result};

/// Trait for tokenizers that convert text into tokens.
///
/// Tokenizers must be deterministic: the same input always yields the same
/// token sequence. They require `Send + Sync` for use in concurrent contexts.
pub trait Tokenizer: Send + Sync {
    /// Tokenize the given text into a stream of tokens.
    fn tokenize(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this tokenizer (for debugging and configuration).
    fn name(&self) -> &'static str;
}

/// A tokenizer that extracts maximal runs of alphanumeric codepoints.
///
/// Any codepoint outside `\p{L}` and `\p{N}` is a token boundary. Empty
/// input yields an empty stream; there are no error conditions for
/// well-formed strings.
#[derive(Clone, Debug)]
pub struct AlnumTokenizer {
    pattern: Arc<Regex>,
}

impl AlnumTokenizer {
    /// Create a new alphanumeric tokenizer.
    pub fn new() -> Result<Self> {
        let regex = Regex::new(r"[\p{L}\p{N}]+")
            .map_err(|e| BantamError::analysis(format!("invalid tokenizer pattern: {e}")))?;
        Ok(AlnumTokenizer {
            pattern: Arc::new(regex),
        })
    }

    /// Get the regex pattern used by this tokenizer.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

impl Default for AlnumTokenizer {
    fn default() -> Self {
        Self::new().expect("default tokenizer pattern should be valid")
    }
}

impl Tokenizer for AlnumTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let tokens: Vec<Token> = self
            .pattern
            .find_iter(text)
            .enumerate()
            .map(|(position, mat)| {
                Token::with_offsets(mat.as_str(), position, mat.start(), mat.end())
            })
            .collect();

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "alnum"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(stream: TokenStream) -> Vec<String> {
        stream.map(|t| t.text).collect()
    }

    #[test]
    fn test_alnum_tokenizer_basic() {
        let tokenizer = AlnumTokenizer::new().unwrap();
        let tokens = texts(tokenizer.tokenize("Hello, world! 42").unwrap());
        assert_eq!(tokens, vec!["Hello", "world", "42"]);
    }

    #[test]
    fn test_alnum_tokenizer_boundaries() {
        let tokenizer = AlnumTokenizer::new().unwrap();
        // Underscores, dashes and punctuation all split.
        let tokens = texts(tokenizer.tokenize("foo_bar-baz.qux").unwrap());
        assert_eq!(tokens, vec!["foo", "bar", "baz", "qux"]);
    }

    #[test]
    fn test_alnum_tokenizer_empty_input() {
        let tokenizer = AlnumTokenizer::new().unwrap();
        assert!(tokenizer.tokenize("").unwrap().next().is_none());
        assert!(tokenizer.tokenize("  ...  ").unwrap().next().is_none());
    }

    #[test]
    fn test_alnum_tokenizer_non_ascii() {
        let tokenizer = AlnumTokenizer::new().unwrap();
        let tokens = texts(tokenizer.tokenize("caf\u{e9} cr\u{e8}me/br\u{fb}l\u{e9}e").unwrap());
        assert_eq!(tokens, vec!["caf\u{e9}", "cr\u{e8}me", "br\u{fb}l\u{e9}e"]);
    }

    #[test]
    fn test_alnum_tokenizer_positions_and_offsets() {
        let tokenizer = AlnumTokenizer::new().unwrap();
        let tokens: Vec<Token> = tokenizer.tokenize("a bb ccc").unwrap().collect();
        assert_eq!(tokens[0].position, 0);
        assert_eq!(tokens[1].position, 1);
        assert_eq!(tokens[2].position, 2);
        assert_eq!(tokens[1].start_offset, 2);
        assert_eq!(tokens[1].end_offset, 4);
    }

    #[test]
    fn test_alnum_tokenizer_deterministic() {
        let tokenizer = AlnumTokenizer::new().unwrap();
        let a = texts(tokenizer.tokenize("Product 42, Electronics").unwrap());
        let b = texts(tokenizer.tokenize("Product 42, Electronics").unwrap());
        assert_eq!(a, b);
    }
}
