//! Candidate selection.
//!
//! Before a batch is matched, a [`Presearcher`] selects the registered
//! queries that could possibly match it. Selection must never drop a query
//! that would match; returning too many candidates only costs time.
//!
//! - [`MatchAllPresearcher`] - every registered query is a candidate
//! - [`TermFilteredPresearcher`] - queries are selected by the terms they need

pub mod match_all;
pub mod term_filtered;
pub mod terms;

use std::fmt::Debug;
use std::sync::Arc;

use crate::batch::DocumentBatch;
use crate::monitor::query::CompiledQuery;
use crate::monitor::registry::QueryIndex;
use crate::query::Query;

pub use match_all::MatchAllPresearcher;
pub use term_filtered::TermFilteredPresearcher;
pub use terms::{QueryTerm, QueryTerms, TermIndex, TermKind};

/// Maps document content to the registered queries worth evaluating.
pub trait Presearcher: Send + Sync + Debug {
    /// Conservative description of the terms `query` needs.
    ///
    /// Stored alongside the compiled query when it is registered.
    fn extract_terms(&self, query: &dyn Query) -> QueryTerms;

    /// Registered queries that may match some document of `batch`, in
    /// registry order.
    fn select_candidates(
        &self,
        batch: &DocumentBatch,
        queries: &QueryIndex,
    ) -> Vec<Arc<CompiledQuery>>;

    /// Get the name of this presearcher (for debugging and logging).
    fn name(&self) -> &'static str;
}
