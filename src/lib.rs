//! # Sarissa Monitor
//!
//! A reverse-search engine for Rust: register a set of standing queries,
//! then find out which of them match each incoming document.
//!
//! ## Features
//!
//! - Lucene-like query syntax with prefix, wildcard, regexp and phrase queries
//! - Term-based presearching so only plausible queries are evaluated
//! - Presence, BM25 scoring and highlighting match strategies
//! - Per-query error isolation and a slow-query log
//! - Lock-free snapshot reads of the query registry, optional parallel matching

pub mod analysis;
pub mod batch;
pub mod document;
pub mod error;
pub mod index;
pub mod matcher;
pub mod matches;
pub mod monitor;
pub mod presearcher;
pub mod query;

pub mod prelude {
    pub use crate::document::InputDocument;
    pub use crate::error::{Result, SarissaError};
    pub use crate::matcher::{HighlightingStrategy, PresenceStrategy, ScoringStrategy};
    pub use crate::matches::{HighlightsMatch, Hit, MatchError, Matches, QueryMatch};
    pub use crate::monitor::{Monitor, MonitorConfig, MonitorQuery};
    pub use crate::presearcher::{MatchAllPresearcher, TermFilteredPresearcher};
    pub use crate::query::{Metadata, QueryParser, StandardQueryParser};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
