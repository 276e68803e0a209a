//! The per-batch evaluation session.

use std::collections::{BTreeMap, BTreeSet};
use std::time::{Duration, Instant};

use crate::batch::DocumentBatch;
use crate::error::{Result, SarissaError};
use crate::matcher::{MatchContext, MatchStrategy};
use crate::matches::{DocumentMatches, MatchError, Matches, QueryMatch};
use crate::monitor::query::CompiledQuery;

/// Runs candidate queries over one batch and collects their matches.
///
/// A query that fails while running is recorded as a [`MatchError`] and
/// contributes no matches; the session carries on with the next query.
/// Sessions built over the same batch can be combined with
/// [`merge`](CandidateMatcher::merge), which is how parallel workers
/// report back.
pub struct CandidateMatcher<'a, S: MatchStrategy> {
    strategy: &'a S,
    batch: &'a DocumentBatch,
    matches: BTreeMap<String, DocumentMatches<S::Match>>,
    errors: Vec<MatchError>,
    failed: BTreeSet<String>,
    queries_run: BTreeSet<String>,
    slow_log: String,
    slow_log_limit: Duration,
    search_time: Duration,
}

impl<'a, S: MatchStrategy> CandidateMatcher<'a, S> {
    pub fn new(strategy: &'a S, batch: &'a DocumentBatch) -> Self {
        CandidateMatcher {
            strategy,
            batch,
            matches: BTreeMap::new(),
            errors: Vec::new(),
            failed: BTreeSet::new(),
            queries_run: BTreeSet::new(),
            slow_log: String::new(),
            slow_log_limit: Duration::from_millis(2000),
            search_time: Duration::ZERO,
        }
    }

    /// Queries running longer than `limit` are written to the slow log.
    pub fn with_slow_log_limit(mut self, limit: Duration) -> Self {
        self.slow_log_limit = limit;
        self
    }

    /// Evaluate one compiled query against every document of the batch.
    pub fn match_query(&mut self, query: &CompiledQuery) {
        let id = query.id();
        if self.failed.contains(id) {
            return;
        }
        self.queries_run.insert(id.to_string());

        let start = Instant::now();
        let result = self.run_query(query);
        let elapsed = start.elapsed();
        self.search_time += elapsed;

        if elapsed > self.slow_log_limit {
            log::info!("query {} took {}ms", id, elapsed.as_millis());
            self.slow_log
                .push_str(&format!("{}:{} ", id, elapsed.as_millis()));
        }

        match result {
            Ok(found) => {
                for m in found {
                    self.add_match(m);
                }
            }
            Err(e) => {
                log::warn!("query {id} failed: {e}");
                self.fail(MatchError::evaluation(id, query.source().query(), e.to_string()));
            }
        }
    }

    fn run_query(&self, query: &CompiledQuery) -> Result<Vec<S::Match>> {
        let reader = self.batch.searcher();
        let mut matcher = query.match_query().matcher(reader)?;
        let mut state = <S::QueryState as Default>::default();
        let mut found = Vec::new();

        while !matcher.is_exhausted() {
            let internal_doc = matcher.doc_id();
            let doc_id = self.batch.resolve_doc_id(internal_doc).ok_or_else(|| {
                SarissaError::internal(format!("matcher returned unknown document {internal_doc}"))
            })?;

            let ctx = MatchContext {
                query_id: query.id(),
                doc_id,
                internal_doc,
                highlight_query: query.highlight_query(),
                reader,
            };
            if let Some(m) = self.strategy.do_match(&ctx, matcher.as_ref(), &mut state)? {
                found.push(m);
            }

            matcher.next()?;
        }

        Ok(found)
    }

    /// Add a match, resolving it against any earlier match of the same
    /// query on the same document.
    pub fn add_match(&mut self, m: S::Match) {
        if self.failed.contains(m.query_id()) {
            return;
        }

        let doc = self
            .matches
            .entry(m.doc_id().to_string())
            .or_insert_with(|| DocumentMatches::new(m.doc_id()));

        let resolved = match doc.remove(m.query_id()) {
            Some(existing) => self.strategy.resolve(existing, m),
            None => m,
        };
        doc.insert(resolved);
    }

    /// Record a failed query and drop whatever it matched so far.
    fn fail(&mut self, error: MatchError) {
        if !self.failed.insert(error.query_id.clone()) {
            return;
        }
        for doc in self.matches.values_mut() {
            doc.remove(&error.query_id);
        }
        self.matches.retain(|_, doc| !doc.is_empty());
        self.errors.push(error);
    }

    /// Fold the results of another session over the same batch into this one.
    pub fn merge(&mut self, other: CandidateMatcher<'a, S>) {
        for error in other.errors {
            self.fail(error);
        }
        for doc in other.matches.into_values() {
            for m in doc.into_matches() {
                self.add_match(m);
            }
        }
        self.queries_run.extend(other.queries_run);
        self.slow_log.push_str(&other.slow_log);
        self.search_time += other.search_time;
    }

    /// Number of distinct queries evaluated so far.
    pub fn queries_run(&self) -> usize {
        self.queries_run.len()
    }

    /// Freeze the session into its result.
    pub fn finish(self) -> Matches<S::Match> {
        Matches::new(
            self.matches,
            self.errors,
            self.queries_run.len(),
            self.batch.len(),
            self.search_time,
            self.slow_log,
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::document::InputDocument;
    use crate::matcher::{HighlightingStrategy, PresenceStrategy, ScoringStrategy};
    use crate::monitor::query::MonitorQuery;
    use crate::presearcher::terms::QueryTerms;
    use crate::query::{Metadata, PrefixQuery, Query, QueryParser, StandardQueryParser};

    fn compile(id: &str, text: &str) -> CompiledQuery {
        let parser = StandardQueryParser::new("body");
        let query = parser.parse(text, &Metadata::new()).unwrap();
        let highlight: Arc<dyn Query> = Arc::from(query.clone());
        CompiledQuery::new(
            Arc::new(MonitorQuery::new(id, text)),
            0,
            query,
            highlight,
            QueryTerms::Any,
        )
    }

    fn batch() -> DocumentBatch {
        DocumentBatch::new(vec![
            InputDocument::builder("d1").add_text("body", "this is a test document").build(),
            InputDocument::builder("d2").add_text("body", "another test").build(),
            InputDocument::builder("d3").add_text("body", "nothing here").build(),
        ])
        .unwrap()
    }

    #[test]
    fn test_presence_session() {
        let batch = batch();
        let strategy = PresenceStrategy::new();
        let mut session = CandidateMatcher::new(&strategy, &batch);

        session.match_query(&compile("1", "test"));
        session.match_query(&compile("2", "here"));
        session.match_query(&compile("3", "absent"));

        let matches = session.finish();
        assert_eq!(matches.queries_run(), 3);
        assert_eq!(matches.batch_size(), 3);
        assert_eq!(matches.match_count(), 3);
        assert!(matches.matches("d1", "1").is_some());
        assert!(matches.matches("d2", "1").is_some());
        assert!(matches.matches("d3", "2").is_some());
        assert!(matches.errors().is_empty());
        assert!(matches.slow_log().is_empty());
    }

    #[test]
    fn test_scoring_session() {
        let batch = batch();
        let strategy = ScoringStrategy::new();
        let mut session = CandidateMatcher::new(&strategy, &batch);
        session.match_query(&compile("1", "test document"));

        let matches = session.finish();
        let d1 = matches.matches("d1", "1").unwrap().score();
        let d2 = matches.matches("d2", "1").unwrap().score();
        assert!(d1 > d2);
        assert!(d2 > 0.0);
    }

    #[test]
    fn test_failing_query_is_isolated() {
        let batch = batch();
        let strategy = PresenceStrategy::new();
        let mut session = CandidateMatcher::new(&strategy, &batch);

        let failing = CompiledQuery::new(
            Arc::new(MonitorQuery::new("bad", "body:t*")),
            0,
            Box::new(PrefixQuery::new("body", "t").with_max_expansions(1)),
            Arc::new(PrefixQuery::new("body", "t")),
            QueryTerms::Any,
        );

        session.match_query(&compile("good", "test"));
        session.match_query(&failing);

        let matches = session.finish();
        assert_eq!(matches.queries_run(), 2);
        assert_eq!(matches.match_count(), 2);
        assert_eq!(matches.errors().len(), 1);
        assert_eq!(matches.errors()[0].query_id, "bad");
        assert_eq!(matches.errors()[0].query, "body:t*");
    }

    #[test]
    fn test_merge_resolves_duplicates() {
        let batch = batch();
        let strategy = HighlightingStrategy::new();

        let mut first = CandidateMatcher::new(&strategy, &batch);
        first.match_query(&compile("1", "test"));
        let mut second = CandidateMatcher::new(&strategy, &batch);
        second.match_query(&compile("1", "test"));
        second.match_query(&compile("2", "nothing"));

        first.merge(second);
        assert_eq!(first.queries_run(), 2);

        let matches = first.finish();
        assert_eq!(matches.match_count(), 3);
        assert_eq!(matches.matches("d1", "1").unwrap().hit_count(), 1);
    }

    #[test]
    fn test_slow_log() {
        let batch = batch();
        let strategy = PresenceStrategy::new();
        let mut session =
            CandidateMatcher::new(&strategy, &batch).with_slow_log_limit(Duration::ZERO);
        session.match_query(&compile("1", "test"));

        let matches = session.finish();
        assert!(matches.slow_log().starts_with("1:"));
        assert!(matches.slow_log().ends_with(' '));
    }
}
