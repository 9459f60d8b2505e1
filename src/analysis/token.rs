//! Token types for text analysis.
//!
//! A [`Token`] is the unit that flows through the analysis pipeline: the
//! tokenizer produces them, filters rewrite them, and the index writer
//! records their positions.
//!
//! # Examples
//!
//! ```
//! use bantam::analysis::token::Token;
//!
//! let token = Token::new("wireless", 2);
//! assert_eq!(token.text, "wireless");
//! assert_eq!(token.position, 2);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single unit of text after tokenization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The text content of the token.
    pub text: String,

    /// The position of the token in the token stream (0-based).
    pub position: usize,

    /// The byte offset where this token starts in the original text.
    pub start_offset: usize,

    /// The byte offset where this token ends in the original text.
    pub end_offset: usize,
}

impl Token {
    /// A token at the given stream position, with no offsets recorded.
    pub fn new<S: Into<String>>(text: S, position: usize) -> Self {
        Token {
            text: text.into(),
            position,
            start_offset: 0,
            end_offset: 0,
        }
    }

    /// Create a new token with text, position, and byte offsets.
    pub fn with_offsets<S: Into<String>>(
        text: S,
        position: usize,
        start_offset: usize,
        end_offset: usize,
    ) -> Self {
        Token {
            text: text.into(),
            position,
            start_offset,
            end_offset,
        }
    }

    /// Get the length of the token text in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether the token text is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Copy of this token carrying replacement text, offsets kept.
    pub fn with_text<S: Into<String>>(&self, text: S) -> Self {
        let mut token = self.clone();
        token.text = text.into();
        token
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// A token stream is a sequence of tokens from the analysis pipeline.
pub type TokenStream = Box<dyn Iterator<Item = Token>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_token_has_zero_offsets() {
        let token = Token::new("electronics", 3);
        assert_eq!(token.text, "electronics");
        assert_eq!(token.position, 3);
        assert_eq!(token.start_offset, 0);
        assert_eq!(token.end_offset, 0);
    }

    #[test]
    fn test_token_offsets_are_preserved() {
        let token = Token::with_offsets("product", 1, 8, 15);
        assert_eq!(token.text, "product");
        assert_eq!(token.position, 1);
        assert_eq!(token.start_offset, 8);
        assert_eq!(token.end_offset, 15);
    }

    #[test]
    fn test_token_with_text() {
        let token = Token::with_offsets("Hello", 2, 4, 9).with_text("hello");
        assert_eq!(token.text, "hello");
        assert_eq!(token.position, 2);
        assert_eq!(token.start_offset, 4);
    }

    #[test]
    fn test_token_display_is_text_only() {
        let token = Token::with_offsets("gadget", 2, 10, 16);
        assert_eq!(format!("{token}"), "gadget");
    }
}
