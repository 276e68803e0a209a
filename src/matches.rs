//! Match results.
//!
//! A match run produces one [`Matches`] value: per document, at most one
//! match per registered query, plus the errors raised by individual queries
//! and some timing information. The payload of a match depends on the
//! strategy used to run it:
//!
//! - [`PresenceMatch`] - the query matched
//! - [`ScoringMatch`] - the query matched with a score
//! - [`HighlightsMatch`] - the query matched at these positions

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Debug};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A match of one query against one document.
pub trait QueryMatch: Clone + Debug + Send + Sync + Serialize + 'static {
    /// Id of the query that matched.
    fn query_id(&self) -> &str;

    /// Id of the document that was matched.
    fn doc_id(&self) -> &str;
}

/// Records that a query matched a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresenceMatch {
    query_id: String,
    doc_id: String,
}

impl PresenceMatch {
    pub fn new<Q: Into<String>, D: Into<String>>(query_id: Q, doc_id: D) -> Self {
        PresenceMatch {
            query_id: query_id.into(),
            doc_id: doc_id.into(),
        }
    }
}

impl QueryMatch for PresenceMatch {
    fn query_id(&self) -> &str {
        &self.query_id
    }

    fn doc_id(&self) -> &str {
        &self.doc_id
    }
}

impl fmt::Display for PresenceMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Match(doc={},query={})", self.doc_id, self.query_id)
    }
}

/// A match carrying the query's score for the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringMatch {
    query_id: String,
    doc_id: String,
    score: f32,
}

impl ScoringMatch {
    pub fn new<Q: Into<String>, D: Into<String>>(query_id: Q, doc_id: D, score: f32) -> Self {
        ScoringMatch {
            query_id: query_id.into(),
            doc_id: doc_id.into(),
            score,
        }
    }

    /// The score of the match.
    pub fn score(&self) -> f32 {
        self.score
    }
}

impl QueryMatch for ScoringMatch {
    fn query_id(&self) -> &str {
        &self.query_id
    }

    fn doc_id(&self) -> &str {
        &self.doc_id
    }
}

impl fmt::Display for ScoringMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Match(doc={},query={},score={})",
            self.doc_id, self.query_id, self.score
        )
    }
}

/// One matched span within a field.
///
/// Hits sort by start position, then end position. Positions are inclusive
/// token positions; offsets are byte offsets with an exclusive end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Hit {
    /// Position of the first token.
    pub start_position: u32,
    /// Position of the last token.
    pub end_position: u32,
    /// Offset of the first byte.
    pub start_offset: u32,
    /// Offset one past the last byte.
    pub end_offset: u32,
}

impl Hit {
    pub fn new(start_position: u32, start_offset: u32, end_position: u32, end_offset: u32) -> Self {
        Hit {
            start_position,
            end_position,
            start_offset,
            end_offset,
        }
    }
}

impl fmt::Display for Hit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({})->{}({})",
            self.start_position, self.start_offset, self.end_position, self.end_offset
        )
    }
}

/// A match carrying, per field, the hits that made the query match.
///
/// A query can match without reporting any hit (for example a query made
/// only of exclusions), in which case the match has no fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightsMatch {
    query_id: String,
    doc_id: String,
    hits: BTreeMap<String, BTreeSet<Hit>>,
}

impl HighlightsMatch {
    pub fn new<Q: Into<String>, D: Into<String>>(query_id: Q, doc_id: D) -> Self {
        HighlightsMatch {
            query_id: query_id.into(),
            doc_id: doc_id.into(),
            hits: BTreeMap::new(),
        }
    }

    /// Record a hit in `field`. Returns false if the hit was already present.
    pub fn add_hit<F: Into<String>>(&mut self, field: F, hit: Hit) -> bool {
        self.hits.entry(field.into()).or_default().insert(hit)
    }

    /// Union the hits of `other` into this match.
    pub fn merge(&mut self, other: &HighlightsMatch) {
        for (field, hits) in &other.hits {
            self.hits
                .entry(field.clone())
                .or_default()
                .extend(hits.iter().copied());
        }
    }

    /// Fields with at least one hit, in name order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.hits.keys().map(String::as_str)
    }

    /// Hits in `field`, ordered by position.
    pub fn hits(&self, field: &str) -> Vec<Hit> {
        self.hits
            .get(field)
            .map(|hits| hits.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Total number of hits across all fields.
    pub fn hit_count(&self) -> usize {
        self.hits.values().map(BTreeSet::len).sum()
    }
}

impl QueryMatch for HighlightsMatch {
    fn query_id(&self) -> &str {
        &self.query_id
    }

    fn doc_id(&self) -> &str {
        &self.doc_id
    }
}

impl fmt::Display for HighlightsMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Match(doc={},query={}){{hits={{", self.doc_id, self.query_id)?;
        for (i, (field, hits)) in self.hits.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            let hits: Vec<String> = hits.iter().map(Hit::to_string).collect();
            write!(f, "{}=[{}]", field, hits.join(", "))?;
        }
        f.write_str("}}")
    }
}

/// Where a query failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchErrorKind {
    /// The query text could not be compiled.
    Parse,
    /// The compiled query failed while running against a batch.
    Evaluation,
}

/// A failure of one query. Never aborts the rest of a match run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchError {
    /// Id of the failing query.
    pub query_id: String,
    /// Query text as registered.
    pub query: String,
    /// Description of the failure.
    pub message: String,
    pub kind: MatchErrorKind,
}

impl MatchError {
    /// A query whose text could not be compiled.
    pub fn parse<I, Q, M>(query_id: I, query: Q, message: M) -> Self
    where
        I: Into<String>,
        Q: Into<String>,
        M: Into<String>,
    {
        MatchError {
            query_id: query_id.into(),
            query: query.into(),
            message: message.into(),
            kind: MatchErrorKind::Parse,
        }
    }

    /// A query that failed while being evaluated.
    pub fn evaluation<I, Q, M>(query_id: I, query: Q, message: M) -> Self
    where
        I: Into<String>,
        Q: Into<String>,
        M: Into<String>,
    {
        MatchError {
            query_id: query_id.into(),
            query: query.into(),
            message: message.into(),
            kind: MatchErrorKind::Evaluation,
        }
    }
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = match self.kind {
            MatchErrorKind::Parse => "parsing",
            MatchErrorKind::Evaluation => "running",
        };
        write!(
            f,
            "Error {} query {} [{}] : {}",
            action, self.query_id, self.query, self.message
        )
    }
}

impl std::error::Error for MatchError {}

/// The matches of one document, keyed by query id.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentMatches<T: QueryMatch> {
    doc_id: String,
    matches: BTreeMap<String, T>,
}

impl<T: QueryMatch> DocumentMatches<T> {
    pub(crate) fn new<D: Into<String>>(doc_id: D) -> Self {
        DocumentMatches {
            doc_id: doc_id.into(),
            matches: BTreeMap::new(),
        }
    }

    /// Id of the document.
    pub fn doc_id(&self) -> &str {
        &self.doc_id
    }

    /// The match of `query_id`, if it matched this document.
    pub fn get(&self, query_id: &str) -> Option<&T> {
        self.matches.get(query_id)
    }

    /// Ids of the matching queries, in order.
    pub fn query_ids(&self) -> impl Iterator<Item = &str> {
        self.matches.keys().map(String::as_str)
    }

    /// Matches in query id order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.matches.values()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub(crate) fn insert(&mut self, m: T) {
        self.matches.insert(m.query_id().to_string(), m);
    }

    pub(crate) fn remove(&mut self, query_id: &str) -> Option<T> {
        self.matches.remove(query_id)
    }

    pub(crate) fn into_matches(self) -> impl Iterator<Item = T> {
        self.matches.into_values()
    }
}

/// The immutable outcome of one match run.
#[derive(Debug, Clone, Serialize)]
pub struct Matches<T: QueryMatch> {
    matches: BTreeMap<String, DocumentMatches<T>>,
    errors: Vec<MatchError>,
    queries_run: usize,
    batch_size: usize,
    query_build_time: Duration,
    search_time: Duration,
    slow_log: String,
}

impl<T: QueryMatch> Matches<T> {
    pub(crate) fn new(
        matches: BTreeMap<String, DocumentMatches<T>>,
        errors: Vec<MatchError>,
        queries_run: usize,
        batch_size: usize,
        search_time: Duration,
        slow_log: String,
    ) -> Self {
        Matches {
            matches,
            errors,
            queries_run,
            batch_size,
            query_build_time: Duration::ZERO,
            search_time,
            slow_log,
        }
    }

    pub(crate) fn with_query_build_time(mut self, query_build_time: Duration) -> Self {
        self.query_build_time = query_build_time;
        self
    }

    pub(crate) fn with_errors<I: IntoIterator<Item = MatchError>>(mut self, errors: I) -> Self {
        let run_errors = std::mem::take(&mut self.errors);
        self.errors = errors.into_iter().collect();
        self.errors.extend(run_errors);
        self
    }

    /// The match of `query_id` against `doc_id`, if any.
    pub fn matches(&self, doc_id: &str, query_id: &str) -> Option<&T> {
        self.matches.get(doc_id).and_then(|doc| doc.get(query_id))
    }

    /// All matches for one document.
    pub fn get_matches(&self, doc_id: &str) -> Option<&DocumentMatches<T>> {
        self.matches.get(doc_id)
    }

    /// Number of (document, query) matches.
    pub fn match_count(&self) -> usize {
        self.matches.values().map(DocumentMatches::len).sum()
    }

    /// Number of queries matching `doc_id`.
    pub fn match_count_for(&self, doc_id: &str) -> usize {
        self.matches.get(doc_id).map_or(0, DocumentMatches::len)
    }

    /// Errors raised by individual queries.
    pub fn errors(&self) -> &[MatchError] {
        &self.errors
    }

    /// Number of distinct queries evaluated against the batch.
    pub fn queries_run(&self) -> usize {
        self.queries_run
    }

    /// Number of documents in the batch.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Time spent selecting candidate queries.
    pub fn query_build_time(&self) -> Duration {
        self.query_build_time
    }

    /// Time spent evaluating candidate queries.
    pub fn search_time(&self) -> Duration {
        self.search_time
    }

    /// Space separated `id:millis` entries for queries slower than the limit.
    pub fn slow_log(&self) -> &str {
        &self.slow_log
    }

    /// Per-document matches, in document id order. Documents without any
    /// match are left out.
    pub fn iter(&self) -> impl Iterator<Item = &DocumentMatches<T>> {
        self.matches.values()
    }
}

impl<'a, T: QueryMatch> IntoIterator for &'a Matches<T> {
    type Item = &'a DocumentMatches<T>;
    type IntoIter = std::collections::btree_map::Values<'a, String, DocumentMatches<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.values()
    }
}
