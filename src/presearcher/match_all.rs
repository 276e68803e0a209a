//! Presearcher that selects every registered query.

use std::sync::Arc;

use crate::batch::DocumentBatch;
use crate::monitor::query::CompiledQuery;
use crate::monitor::registry::QueryIndex;
use crate::presearcher::Presearcher;
use crate::presearcher::terms::QueryTerms;
use crate::query::Query;

/// Runs every registered query against every batch.
///
/// Slow on large registries, but it is the reference the filtering
/// presearchers are checked against.
#[derive(Debug, Clone, Default)]
pub struct MatchAllPresearcher;

impl MatchAllPresearcher {
    pub fn new() -> Self {
        MatchAllPresearcher
    }
}

impl Presearcher for MatchAllPresearcher {
    fn extract_terms(&self, _query: &dyn Query) -> QueryTerms {
        QueryTerms::Any
    }

    fn select_candidates(
        &self,
        _batch: &DocumentBatch,
        queries: &QueryIndex,
    ) -> Vec<Arc<CompiledQuery>> {
        queries.compiled().cloned().collect()
    }

    fn name(&self) -> &'static str {
        "match_all"
    }
}
