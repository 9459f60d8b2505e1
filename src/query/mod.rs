//! Query types, parsing, and execution machinery.

pub mod boolean;
pub mod matcher;
pub mod parser;
pub mod phrase;
pub mod query;
pub mod scorer;
pub mod term;
pub mod wildcard;

pub use boolean::{BooleanClause, BooleanQuery, BooleanQueryBuilder, Occur};
pub use matcher::{
    AllMatcher, ConjunctionMatcher, DisjunctionMatcher, EmptyMatcher, Matcher, NotMatcher,
    PostingMatcher,
};
pub use parser::QueryParser;
pub use phrase::PhraseQuery;
pub use query::Query;
pub use term::{ALL_FIELDS, TermQuery};
pub use wildcard::WildcardQuery;
