//! Evaluating candidate queries against a document batch.
//!
//! A [`CandidateMatcher`] runs each candidate query over a
//! [`DocumentBatch`](crate::batch::DocumentBatch) and collects one match per
//! (document, query) pair. What a match carries is decided by the
//! [`MatchStrategy`]:
//!
//! - [`PresenceStrategy`] - whether the query matched
//! - [`ScoringStrategy`] - how well the query matched
//! - [`HighlightingStrategy`] - where in the document the query matched

pub mod candidate;
pub mod highlighting;
pub mod presence;
pub mod scoring;

use crate::error::Result;
use crate::index::reader::IndexReader;
use crate::matches::QueryMatch;
use crate::query::{Matcher, Query};

pub use candidate::CandidateMatcher;
pub use highlighting::HighlightingStrategy;
pub use presence::PresenceStrategy;
pub use scoring::ScoringStrategy;

/// What the strategy knows about the document being matched.
#[derive(Debug, Clone, Copy)]
pub struct MatchContext<'a> {
    /// Id of the query being evaluated.
    pub query_id: &'a str,
    /// External id of the matched document.
    pub doc_id: &'a str,
    /// Batch-local id of the matched document.
    pub internal_doc: u64,
    /// Query used to extract hit positions.
    pub highlight_query: &'a dyn Query,
    /// The batch index.
    pub reader: &'a dyn IndexReader,
}

/// Turns matched documents into typed matches.
///
/// `resolve` combines two matches of the same query on the same document.
/// It must be commutative and associative, since matches are produced by
/// several pieces of a decomposed query and by parallel workers in no
/// particular order.
pub trait MatchStrategy: Send + Sync {
    /// The match payload produced by this strategy.
    type Match: QueryMatch;

    /// Scratch state kept while one query runs over the batch.
    type QueryState: Default;

    /// Produce a match for the current document of `matcher`, or `None` if
    /// the document carries nothing worth reporting.
    fn do_match(
        &self,
        ctx: &MatchContext<'_>,
        matcher: &dyn Matcher,
        state: &mut Self::QueryState,
    ) -> Result<Option<Self::Match>>;

    /// Combine two matches for the same (document, query) pair.
    fn resolve(&self, existing: Self::Match, new: Self::Match) -> Self::Match;

    /// Get the name of this strategy (for debugging and logging).
    fn name(&self) -> &'static str;
}
