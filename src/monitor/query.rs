//! Registered queries and their compiled form.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::presearcher::terms::QueryTerms;
use crate::query::{Metadata, Query};

/// A standing query as supplied by the caller.
///
/// The id is the sole identity: registering another query with the same id
/// replaces this one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorQuery {
    id: String,
    query: String,
    #[serde(default)]
    metadata: Metadata,
}

impl MonitorQuery {
    pub fn new<I: Into<String>, Q: Into<String>>(id: I, query: Q) -> Self {
        MonitorQuery {
            id: id.into(),
            query: query.into(),
            metadata: Metadata::new(),
        }
    }

    /// Attach a metadata entry, which is handed to the query parser.
    pub fn with_metadata<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The raw query text.
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

/// Identifies one compiled piece of a registered query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    pub id: String,
    pub piece: usize,
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.id, self.piece)
    }
}

/// A registered query compiled for matching.
///
/// A decomposed query has several pieces sharing one id. Each piece holds
/// its own match query and presearcher terms; the highlight query is the
/// whole query and is shared by all pieces. Never modified once built.
#[derive(Debug)]
pub struct CompiledQuery {
    key: QueryKey,
    source: Arc<MonitorQuery>,
    match_query: Box<dyn Query>,
    highlight_query: Arc<dyn Query>,
    terms: QueryTerms,
}

impl CompiledQuery {
    pub fn new(
        source: Arc<MonitorQuery>,
        piece: usize,
        match_query: Box<dyn Query>,
        highlight_query: Arc<dyn Query>,
        terms: QueryTerms,
    ) -> Self {
        CompiledQuery {
            key: QueryKey {
                id: source.id().to_string(),
                piece,
            },
            source,
            match_query,
            highlight_query,
            terms,
        }
    }

    pub fn id(&self) -> &str {
        &self.key.id
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// The registration this query was compiled from.
    pub fn source(&self) -> &MonitorQuery {
        &self.source
    }

    pub fn match_query(&self) -> &dyn Query {
        self.match_query.as_ref()
    }

    pub fn highlight_query(&self) -> &dyn Query {
        self.highlight_query.as_ref()
    }

    /// Terms stored for candidate selection.
    pub fn terms(&self) -> &QueryTerms {
        &self.terms
    }
}
