//! Query parser for converting query strings to structured query objects.
//!
//! Syntax:
//!
//! ```text
//! query  := or
//! or     := and (OR and)*
//! and    := not ((AND)? not)*        adjacency means AND
//! not    := NOT not | atom
//! atom   := (field ':')? value | '(' query ')'
//! value  := term | "phrase" | pattern with * or ?
//! ```
//!
//! Keywords are case-insensitive. Bare terms and phrase contents run
//! through the indexing analyzer so queries normalize the same way
//! documents do; wildcard patterns are only lowercased, since analysis
//! would split them apart. Without a field prefix, terms search all
//! fields.

use std::iter::Peekable;
use std::str::Chars;

use crate::analysis::analyzer::StandardAnalyzer;
use crate::error::{BantamError, Result};
use crate::query::boolean::{BooleanQuery, BooleanQueryBuilder};
use crate::query::phrase::PhraseQuery;
use crate::query::query::Query;
use crate::query::term::{ALL_FIELDS, TermQuery};
use crate::query::wildcard::WildcardQuery;

/// A parser from query strings to [`Query`] trees.
#[derive(Debug)]
pub struct QueryParser {
    analyzer: StandardAnalyzer,
    default_field: String,
}

impl QueryParser {
    /// Create a parser whose unprefixed terms search all fields.
    pub fn new() -> Result<Self> {
        Ok(QueryParser {
            analyzer: StandardAnalyzer::new()?,
            default_field: ALL_FIELDS.to_string(),
        })
    }

    /// Set the field unprefixed terms search in.
    pub fn with_default_field<S: Into<String>>(mut self, field: S) -> Self {
        self.default_field = field.into();
        self
    }

    /// Parse a query string into a query tree.
    ///
    /// An empty or all-whitespace string is an invalid argument, not a
    /// syntax error; everything else that fails to parse is a syntax error.
    pub fn parse(&self, query_str: &str) -> Result<Box<dyn Query>> {
        let trimmed = query_str.trim();
        if trimmed.is_empty() {
            return Err(BantamError::invalid_argument("query must not be empty"));
        }

        let mut parser = QueryStringParser::new(trimmed, &self.analyzer, &self.default_field);
        let query = parser.parse_or_expression()?;
        parser.skip_whitespace();
        if let Some(ch) = parser.chars.peek() {
            return Err(BantamError::syntax(format!("unexpected character '{ch}'")));
        }
        Ok(query)
    }
}

/// A sub-query with its polarity, before boolean assembly.
struct Clause {
    query: Box<dyn Query>,
    negated: bool,
}

struct QueryStringParser<'a> {
    chars: Peekable<Chars<'a>>,
    analyzer: &'a StandardAnalyzer,
    default_field: &'a str,
}

impl<'a> QueryStringParser<'a> {
    fn new(query_str: &'a str, analyzer: &'a StandardAnalyzer, default_field: &'a str) -> Self {
        QueryStringParser {
            chars: query_str.chars().peekable(),
            analyzer,
            default_field,
        }
    }

    fn parse_or_expression(&mut self) -> Result<Box<dyn Query>> {
        let mut branches = vec![self.parse_and_expression()?];
        while self.consume_keyword("OR") {
            branches.push(self.parse_and_expression()?);
        }
        if branches.len() == 1 {
            return Ok(branches.remove(0));
        }
        let mut builder = BooleanQueryBuilder::new();
        for branch in branches {
            builder = builder.should(branch);
        }
        Ok(Box::new(builder.build()))
    }

    fn parse_and_expression(&mut self) -> Result<Box<dyn Query>> {
        let mut clauses = vec![self.parse_not_expression()?];
        loop {
            if self.consume_keyword("AND") {
                clauses.push(self.parse_not_expression()?);
                continue;
            }
            // Adjacent atoms conjoin implicitly.
            self.skip_whitespace();
            match self.chars.peek().copied() {
                None | Some(')') => break,
                _ if self.peek_keyword("OR") => break,
                _ => clauses.push(self.parse_not_expression()?),
            }
        }
        Ok(Self::assemble(clauses))
    }

    /// Fold clauses into a single query, keeping a lone positive clause
    /// unwrapped.
    fn assemble(mut clauses: Vec<Clause>) -> Box<dyn Query> {
        if clauses.len() == 1 && !clauses[0].negated {
            return clauses.remove(0).query;
        }
        let mut builder = BooleanQueryBuilder::new();
        for clause in clauses {
            builder = if clause.negated {
                builder.must_not(clause.query)
            } else {
                builder.must(clause.query)
            };
        }
        Box::new(builder.build())
    }

    fn parse_not_expression(&mut self) -> Result<Clause> {
        if self.consume_keyword("NOT") {
            let clause = self.parse_not_expression()?;
            return Ok(Clause {
                query: clause.query,
                negated: !clause.negated,
            });
        }
        Ok(Clause {
            query: self.parse_atom()?,
            negated: false,
        })
    }

    fn parse_atom(&mut self) -> Result<Box<dyn Query>> {
        self.skip_whitespace();
        match self.chars.peek() {
            Some('(') => {
                self.chars.next();
                let inner = self.parse_or_expression()?;
                self.skip_whitespace();
                if self.chars.next() != Some(')') {
                    return Err(BantamError::syntax("unbalanced parentheses"));
                }
                Ok(inner)
            }
            Some('"') => self.parse_value(self.default_field.to_string()),
            Some(_) => {
                let word = self.consume_word();
                if word.is_empty() {
                    return Err(BantamError::syntax("expected a term"));
                }
                if self.chars.peek() == Some(&':') {
                    self.chars.next();
                    return self.parse_value(word);
                }
                self.make_term_query(self.default_field.to_string(), word)
            }
            None => Err(BantamError::syntax("unexpected end of query")),
        }
    }

    /// The value after a field prefix, or a bare value.
    fn parse_value(&mut self, field: String) -> Result<Box<dyn Query>> {
        if self.chars.peek() == Some(&'"') {
            let text = self.consume_phrase()?;
            let terms = self.analyzer.terms(&text)?;
            return Ok(Box::new(PhraseQuery::new(field, terms)));
        }
        let word = self.consume_word();
        if word.is_empty() {
            return Err(BantamError::syntax(format!(
                "expected a value after \"{field}:\""
            )));
        }
        self.make_term_query(field, word)
    }

    fn make_term_query(&self, field: String, word: String) -> Result<Box<dyn Query>> {
        if word.contains('*') || word.contains('?') {
            return Ok(Box::new(WildcardQuery::new(field, word)?));
        }
        let mut terms = self.analyzer.terms(&word)?;
        match terms.len() {
            // Punctuation-only input analyzes to nothing and matches nothing.
            0 => Ok(Box::new(BooleanQuery::new())),
            1 => Ok(Box::new(TermQuery::new(field, terms.remove(0)))),
            _ => {
                // Analysis split the word; require every piece.
                let mut builder = BooleanQueryBuilder::new();
                for term in terms {
                    builder = builder.must(Box::new(TermQuery::new(field.clone(), term)));
                }
                Ok(Box::new(builder.build()))
            }
        }
    }

    fn consume_phrase(&mut self) -> Result<String> {
        self.chars.next();
        let mut text = String::new();
        for ch in self.chars.by_ref() {
            if ch == '"' {
                return Ok(text);
            }
            text.push(ch);
        }
        Err(BantamError::syntax("unterminated phrase"))
    }

    fn consume_word(&mut self) -> String {
        let mut word = String::new();
        while let Some(&ch) = self.chars.peek() {
            if ch.is_whitespace() || matches!(ch, ':' | '(' | ')' | '"') {
                break;
            }
            word.push(ch);
            self.chars.next();
        }
        word
    }

    /// Whether the input continues with the keyword at a word boundary.
    fn peek_keyword(&mut self, keyword: &str) -> bool {
        self.skip_whitespace();
        let mut lookahead = self.chars.clone();
        for expected in keyword.chars() {
            match lookahead.next() {
                Some(ch) if ch.eq_ignore_ascii_case(&expected) => {}
                _ => return false,
            }
        }
        match lookahead.next() {
            None => true,
            Some(ch) => ch.is_whitespace() || matches!(ch, '(' | ')' | '"'),
        }
    }

    fn consume_keyword(&mut self, keyword: &str) -> bool {
        if !self.peek_keyword(keyword) {
            return false;
        }
        for _ in 0..keyword.len() {
            self.chars.next();
        }
        true
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.chars.peek() {
            if !ch.is_whitespace() {
                break;
            }
            self.chars.next();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(query_str: &str) -> Result<Box<dyn Query>> {
        QueryParser::new().unwrap().parse(query_str)
    }

    fn description(query_str: &str) -> String {
        parse(query_str).unwrap().description()
    }

    #[test]
    fn test_bare_term_uses_all_fields() {
        assert_eq!(description("Widget"), "*:widget");
    }

    #[test]
    fn test_field_term() {
        assert_eq!(description("category:Electronics"), "category:electronics");
    }

    #[test]
    fn test_implicit_and() {
        assert_eq!(
            description("name:red category:toys"),
            "(+name:red +category:toys)"
        );
    }

    #[test]
    fn test_explicit_operators_are_case_insensitive() {
        assert_eq!(description("a AND b"), "(+*:a +*:b)");
        assert_eq!(description("a and b"), "(+*:a +*:b)");
        assert_eq!(description("a OR b"), "(*:a *:b)");
        assert_eq!(description("a or b"), "(*:a *:b)");
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        assert_eq!(description("a b OR c"), "((+*:a +*:b) *:c)");
    }

    #[test]
    fn test_not_negates() {
        assert_eq!(description("a NOT b"), "(+*:a -*:b)");
        assert_eq!(description("NOT a"), "(-*:a)");
        assert_eq!(description("NOT NOT a"), "*:a");
    }

    #[test]
    fn test_parentheses_group() {
        assert_eq!(description("a AND (b OR c)"), "(+*:a +(*:b *:c))");
    }

    #[test]
    fn test_phrase_is_analyzed() {
        assert_eq!(description("name:\"Product 1\""), "name:\"product 1\"");
        assert_eq!(description("\"Red Widget\""), "*:\"red widget\"");
    }

    #[test]
    fn test_wildcard_is_lowercased_not_analyzed() {
        assert_eq!(description("name:Prod*1"), "name:prod*1");
        assert_eq!(description("w?dget"), "*:w?dget");
    }

    #[test]
    fn test_keyword_prefix_is_an_ordinary_term() {
        assert_eq!(description("ANDROID"), "*:android");
        assert_eq!(description("Oracle"), "*:oracle");
        assert_eq!(description("notebook"), "*:notebook");
    }

    #[test]
    fn test_empty_query_is_invalid_argument() {
        assert!(matches!(parse(""), Err(BantamError::InvalidArgument(_))));
        assert!(matches!(parse("   "), Err(BantamError::InvalidArgument(_))));
    }

    #[test]
    fn test_syntax_errors() {
        assert!(matches!(
            parse("(category:Books"),
            Err(BantamError::Syntax(_))
        ));
        assert!(matches!(parse("a)"), Err(BantamError::Syntax(_))));
        assert!(matches!(parse("\"unterminated"), Err(BantamError::Syntax(_))));
        assert!(matches!(parse("name:"), Err(BantamError::Syntax(_))));
        assert!(matches!(parse("a AND"), Err(BantamError::Syntax(_))));
    }
}
