//! Structured queries and their evaluation against a batch index.
//!
//! A [`Query`] produces a [`Matcher`] for an [`IndexReader`]; the matcher
//! walks matching documents and reports scores and span evidence. Query
//! text is compiled into queries by a [`QueryParser`].

pub mod boolean;
pub mod disjunction_max;
pub mod match_all;
pub mod matcher;
pub mod multi_term;
pub mod parser;
pub mod prefix;
pub mod regexp;
pub mod scorer;
pub mod span;
pub mod term;
pub mod wildcard;

use std::any::Any;
use std::fmt::{self, Debug};

use crate::error::Result;
use crate::index::reader::IndexReader;

pub use boolean::{BooleanClause, BooleanQuery, BooleanQueryBuilder, Occur};
pub use disjunction_max::DisjunctionMaxQuery;
pub use match_all::MatchAllQuery;
pub use matcher::{Matcher, Span};
pub use multi_term::MultiTermQuery;
pub use parser::{Metadata, QueryParser, StandardQueryParser};
pub use prefix::PrefixQuery;
pub use regexp::RegexpQuery;
pub use scorer::{BM25Scorer, Scorer};
pub use span::SpanNearQuery;
pub use term::TermQuery;
pub use wildcard::WildcardQuery;

/// Trait for structured queries.
pub trait Query: Send + Sync + Debug {
    /// Create a matcher for this query.
    fn matcher(&self, reader: &dyn IndexReader) -> Result<Box<dyn Matcher>>;

    /// Rewrite this query into primitive queries against the terms of
    /// `reader`. Multi-term queries expand here; the default is a clone.
    fn rewrite(&self, reader: &dyn IndexReader) -> Result<Box<dyn Query>> {
        let _ = reader;
        Ok(self.clone_box())
    }

    /// Get the boost factor for this query.
    fn boost(&self) -> f32;

    /// Set the boost factor for this query.
    fn set_boost(&mut self, boost: f32);

    /// Get a human-readable description of this query.
    fn description(&self) -> String;

    /// Clone this query.
    fn clone_box(&self) -> Box<dyn Query>;

    /// Check if this query matches no documents.
    fn is_empty(&self, reader: &dyn IndexReader) -> Result<bool> {
        Ok(self.matcher(reader)?.is_exhausted())
    }

    /// Get the estimated cost of executing this query.
    fn cost(&self, reader: &dyn IndexReader) -> Result<u64> {
        Ok(self.matcher(reader)?.cost())
    }

    /// Get this query as Any for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Get the field name this query searches in, if applicable.
    fn field(&self) -> Option<&str> {
        None
    }
}

impl Clone for Box<dyn Query> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

impl fmt::Display for dyn Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

/// Append `^boost` to a description when the boost is not 1.
pub(crate) fn with_boost_suffix(description: String, boost: f32) -> String {
    if boost == 1.0 {
        description
    } else {
        format!("{description}^{boost}")
    }
}
