//! Presearcher that selects queries by the terms they require.

use std::sync::Arc;

use crate::batch::DocumentBatch;
use crate::monitor::query::CompiledQuery;
use crate::monitor::registry::QueryIndex;
use crate::presearcher::Presearcher;
use crate::presearcher::terms::{QueryTerm, QueryTerms};
use crate::query::{
    BooleanQuery, DisjunctionMaxQuery, Occur, PrefixQuery, Query, SpanNearQuery, TermQuery,
    WildcardQuery,
};

/// Indexes each query under the terms a matching document must contain.
///
/// From a conjunction only the most selective required clause is kept;
/// disjunctions keep every alternative. Queries whose needs cannot be
/// described by terms (regular expressions, match-all, pure exclusions,
/// unknown query types) are candidates for every batch.
#[derive(Debug, Clone, Default)]
pub struct TermFilteredPresearcher;

impl TermFilteredPresearcher {
    pub fn new() -> Self {
        TermFilteredPresearcher
    }

    fn extract(&self, query: &dyn Query) -> QueryTerms {
        let any = query.as_any();

        if let Some(term) = any.downcast_ref::<TermQuery>() {
            return match term.field() {
                Some(field) => QueryTerms::single(QueryTerm::exact(field, term.term())),
                None => QueryTerms::Any,
            };
        }

        if let Some(prefix) = any.downcast_ref::<PrefixQuery>() {
            return match prefix.field() {
                Some(field) if !prefix.prefix().is_empty() => {
                    QueryTerms::single(QueryTerm::prefix(field, prefix.prefix()))
                }
                _ => QueryTerms::Any,
            };
        }

        if let Some(wildcard) = any.downcast_ref::<WildcardQuery>() {
            let Some(field) = wildcard.field() else {
                return QueryTerms::Any;
            };
            return match wildcard.literal_prefix() {
                (literal, false) => QueryTerms::single(QueryTerm::exact(field, literal)),
                (literal, true) if literal.is_empty() => QueryTerms::Any,
                (literal, true) => QueryTerms::single(QueryTerm::prefix(field, literal)),
            };
        }

        if let Some(boolean) = any.downcast_ref::<BooleanQuery>() {
            return self.extract_boolean(boolean);
        }

        if let Some(dismax) = any.downcast_ref::<DisjunctionMaxQuery>() {
            return self.union(dismax.disjuncts().iter().map(|q| q.as_ref()));
        }

        if let Some(span) = any.downcast_ref::<SpanNearQuery>() {
            return self.best(span.clauses().iter().map(|q| q.as_ref()));
        }

        QueryTerms::Any
    }

    fn extract_boolean(&self, boolean: &BooleanQuery) -> QueryTerms {
        let required = boolean.clauses_by_occur(Occur::Must);
        if !required.is_empty() {
            return self.best(required.iter().map(|c| c.query.as_ref()));
        }

        let optional = boolean.clauses_by_occur(Occur::Should);
        if !optional.is_empty() {
            return self.union(optional.iter().map(|c| c.query.as_ref()));
        }

        QueryTerms::Any
    }

    fn union<'q>(&self, queries: impl Iterator<Item = &'q dyn Query>) -> QueryTerms {
        let mut terms: Option<QueryTerms> = None;
        for query in queries {
            let extracted = self.extract(query);
            if extracted.is_any() {
                return QueryTerms::Any;
            }
            terms = Some(match terms {
                Some(terms) => terms.union(extracted),
                None => extracted,
            });
        }
        terms.unwrap_or(QueryTerms::Any)
    }

    fn best<'q>(&self, queries: impl Iterator<Item = &'q dyn Query>) -> QueryTerms {
        queries
            .map(|q| self.extract(q))
            .reduce(QueryTerms::best)
            .unwrap_or(QueryTerms::Any)
    }
}

impl Presearcher for TermFilteredPresearcher {
    fn extract_terms(&self, query: &dyn Query) -> QueryTerms {
        self.extract(query)
    }

    fn select_candidates(
        &self,
        batch: &DocumentBatch,
        queries: &QueryIndex,
    ) -> Vec<Arc<CompiledQuery>> {
        queries
            .term_index()
            .candidates(batch.searcher())
            .iter()
            .filter_map(|key| queries.compiled_piece(key).cloned())
            .collect()
    }

    fn name(&self) -> &'static str {
        "term_filtered"
    }
}
