//! The monitor: a registry of standing queries matched against documents.
//!
//! Queries are registered once and kept compiled. Each call to
//! [`Monitor::match_documents`] indexes the incoming documents into a
//! throwaway [`DocumentBatch`], lets the presearcher pick the queries that
//! could match it, and evaluates only those.
//!
//! # Examples
//!
//! ```
//! use sarissa_monitor::document::InputDocument;
//! use sarissa_monitor::matcher::PresenceStrategy;
//! use sarissa_monitor::monitor::{Monitor, MonitorQuery};
//! use sarissa_monitor::presearcher::TermFilteredPresearcher;
//! use sarissa_monitor::query::StandardQueryParser;
//!
//! let monitor = Monitor::new(
//!     StandardQueryParser::new("body"),
//!     TermFilteredPresearcher::new(),
//! )
//! .unwrap();
//!
//! let errors = monitor
//!     .register(vec![
//!         MonitorQuery::new("rust", "+rust -java"),
//!         MonitorQuery::new("search", "search*"),
//!     ])
//!     .unwrap();
//! assert!(errors.is_empty());
//!
//! let doc = InputDocument::builder("doc1")
//!     .add_text("body", "rust makes searching fast")
//!     .build();
//! let matches = monitor.match_document(doc, &PresenceStrategy::new()).unwrap();
//!
//! assert_eq!(matches.match_count(), 2);
//! assert!(matches.matches("doc1", "rust").is_some());
//! ```

pub mod config;
pub mod decompose;
pub mod query;
pub mod registry;

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::batch::DocumentBatch;
use crate::document::InputDocument;
use crate::error::{Result, SarissaError};
use crate::matcher::{CandidateMatcher, MatchStrategy};
use crate::matches::{MatchError, Matches};
use crate::presearcher::Presearcher;
use crate::query::{Query, QueryParser};

pub use config::MonitorConfig;
pub use decompose::QueryDecomposer;
pub use query::{CompiledQuery, MonitorQuery, QueryKey};
pub use registry::{QueryIndex, QueryRegistry};

/// Matches documents against a set of registered queries.
///
/// All methods take `&self`; registration and matching can run concurrently
/// from several threads. A match sees the registry as it was when the match
/// started.
pub struct Monitor {
    parser: Arc<dyn QueryParser>,
    presearcher: Arc<dyn Presearcher>,
    decomposer: QueryDecomposer,
    registry: QueryRegistry,
    config: MonitorConfig,
    thread_pool: Option<Arc<ThreadPool>>,
    closed: AtomicBool,
}

impl fmt::Debug for Monitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Monitor")
            .field("presearcher", &self.presearcher.name())
            .field("queries", &self.registry.snapshot().len())
            .field("config", &self.config)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl Monitor {
    /// Create a monitor with the default configuration.
    pub fn new<P, R>(parser: P, presearcher: R) -> Result<Self>
    where
        P: QueryParser + 'static,
        R: Presearcher + 'static,
    {
        Self::with_config(parser, presearcher, MonitorConfig::default())
    }

    /// Create a monitor with the given configuration.
    pub fn with_config<P, R>(parser: P, presearcher: R, config: MonitorConfig) -> Result<Self>
    where
        P: QueryParser + 'static,
        R: Presearcher + 'static,
    {
        config.validate()?;

        let thread_pool = if config.parallel {
            let thread_pool_size = config.thread_pool_size.unwrap_or_else(num_cpus::get);
            let pool = ThreadPoolBuilder::new()
                .num_threads(thread_pool_size)
                .thread_name(|i| format!("monitor-match-{i}"))
                .build()
                .map_err(|e| SarissaError::internal(format!("Failed to create thread pool: {e}")))?;
            Some(Arc::new(pool))
        } else {
            None
        };

        Ok(Monitor {
            parser: Arc::new(parser),
            presearcher: Arc::new(presearcher),
            decomposer: QueryDecomposer::new(),
            registry: QueryRegistry::new(),
            config,
            thread_pool,
            closed: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Register queries, replacing any registered under the same ids.
    ///
    /// Queries that fail to compile are not registered (a query previously
    /// registered under that id is removed) and are returned as errors;
    /// the rest are registered regardless. Queries are applied in order, so
    /// when an id appears more than once the last occurrence wins. The
    /// errors are also reported by every later match until the id is
    /// registered again or deregistered.
    pub fn register<I>(&self, queries: I) -> Result<Vec<MatchError>>
    where
        I: IntoIterator<Item = MonitorQuery>,
    {
        self.ensure_open()?;

        let outcomes: Vec<(Arc<MonitorQuery>, Result<Vec<Arc<CompiledQuery>>>)> = queries
            .into_iter()
            .map(|query| {
                let source = Arc::new(query);
                let compiled = self.compile(&source);
                (source, compiled)
            })
            .collect();

        self.registry.update(|index| {
            let mut errors = Vec::new();
            for (source, compiled) in outcomes {
                match compiled {
                    Ok(pieces) => index.insert(source, pieces),
                    Err(e) => {
                        log::warn!("query {} failed to parse: {}", source.id(), e);
                        let error = MatchError::parse(source.id(), source.query(), e.to_string());
                        index.insert_parse_error(error.clone());
                        errors.push(error);
                    }
                }
            }
            log::debug!(
                "registry updated: {} queries, {} pieces",
                index.len(),
                index.piece_count()
            );
            Ok(errors)
        })
    }

    fn compile(&self, source: &Arc<MonitorQuery>) -> Result<Vec<Arc<CompiledQuery>>> {
        let match_query = self.parser.parse(source.query(), source.metadata())?;
        let highlight_query: Arc<dyn Query> =
            Arc::from(self.parser.parse_highlight(source.query(), source.metadata())?);

        let pieces = if self.config.decompose_queries {
            self.decomposer.decompose(match_query)
        } else {
            vec![match_query]
        };

        Ok(pieces
            .into_iter()
            .enumerate()
            .map(|(piece, query)| {
                let terms = self.presearcher.extract_terms(query.as_ref());
                Arc::new(CompiledQuery::new(
                    source.clone(),
                    piece,
                    query,
                    highlight_query.clone(),
                    terms,
                ))
            })
            .collect())
    }

    /// Remove queries by id. Unknown ids are ignored.
    pub fn deregister<I, S>(&self, ids: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ensure_open()?;

        let ids: Vec<S> = ids.into_iter().collect();
        self.registry.update(|index| {
            for id in &ids {
                index.deregister(id.as_ref());
            }
        });
        Ok(())
    }

    /// Remove every registered query.
    pub fn clear(&self) -> Result<()> {
        self.ensure_open()?;

        self.registry.update(QueryIndex::clear);
        Ok(())
    }

    /// The registration stored under `id`.
    pub fn get_query(&self, id: &str) -> Result<Option<MonitorQuery>> {
        self.ensure_open()?;
        Ok(self.registry.snapshot().get(id).cloned())
    }

    /// Number of registered queries.
    pub fn query_count(&self) -> usize {
        self.registry.snapshot().len()
    }

    /// Ids of the registered queries, sorted.
    pub fn query_ids(&self) -> Vec<String> {
        self.registry.snapshot().ids().map(str::to_string).collect()
    }

    /// Match a batch of documents against the registered queries.
    ///
    /// Fails only on call-level problems (an empty batch, duplicate document
    /// ids, a closed monitor). Queries that fail are reported in
    /// [`Matches::errors`].
    pub fn match_documents<S, I>(&self, docs: I, strategy: &S) -> Result<Matches<S::Match>>
    where
        S: MatchStrategy,
        I: IntoIterator<Item = InputDocument>,
    {
        self.ensure_open()?;

        let batch = DocumentBatch::new(docs)?;
        let snapshot = self.registry.snapshot();

        let start = Instant::now();
        let candidates = self.presearcher.select_candidates(&batch, &snapshot);
        let query_build_time = start.elapsed();

        let limit = Duration::from_millis(self.config.slow_log_limit_ms);
        let session = match &self.thread_pool {
            Some(pool) if candidates.len() > 1 => {
                Self::match_parallel(pool, &batch, &candidates, strategy, limit)
            }
            _ => {
                let mut session = CandidateMatcher::new(strategy, &batch).with_slow_log_limit(limit);
                for candidate in &candidates {
                    session.match_query(candidate);
                }
                session
            }
        };

        log::debug!(
            "{} strategy: {} documents, {} of {} pieces selected by {}, {} queries run",
            strategy.name(),
            batch.len(),
            candidates.len(),
            snapshot.piece_count(),
            self.presearcher.name(),
            session.queries_run()
        );

        let parse_errors: Vec<MatchError> = snapshot.parse_errors().cloned().collect();

        Ok(session
            .finish()
            .with_query_build_time(query_build_time)
            .with_errors(parse_errors))
    }

    fn match_parallel<'a, S: MatchStrategy>(
        pool: &ThreadPool,
        batch: &'a DocumentBatch,
        candidates: &[Arc<CompiledQuery>],
        strategy: &'a S,
        limit: Duration,
    ) -> CandidateMatcher<'a, S> {
        let chunk_size = candidates
            .len()
            .div_ceil(pool.current_num_threads().max(1))
            .max(1);

        pool.install(|| {
            candidates
                .par_chunks(chunk_size)
                .map(|chunk| {
                    let mut session =
                        CandidateMatcher::new(strategy, batch).with_slow_log_limit(limit);
                    for candidate in chunk {
                        session.match_query(candidate);
                    }
                    session
                })
                .reduce_with(|mut merged, session| {
                    merged.merge(session);
                    merged
                })
        })
        .unwrap_or_else(|| CandidateMatcher::new(strategy, batch).with_slow_log_limit(limit))
    }

    /// Match a single document.
    pub fn match_document<S: MatchStrategy>(
        &self,
        doc: InputDocument,
        strategy: &S,
    ) -> Result<Matches<S::Match>> {
        self.match_documents(std::iter::once(doc), strategy)
    }

    /// Drop all registered queries and refuse further use. Calling it again
    /// has no effect.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.registry.update(QueryIndex::clear);
        log::debug!("monitor closed");
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            Err(SarissaError::invalid_operation("monitor is closed"))
        } else {
            Ok(())
        }
    }
}
