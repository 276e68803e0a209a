//! Copy-on-write store of registered queries.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::matches::MatchError;
use crate::monitor::query::{CompiledQuery, MonitorQuery, QueryKey};
use crate::presearcher::terms::TermIndex;

#[derive(Debug, Clone)]
struct Entry {
    source: Arc<MonitorQuery>,
    pieces: Vec<Arc<CompiledQuery>>,
}

/// An immutable view of the registered queries.
///
/// Holds the compiled pieces of every query, in id order, the term index
/// presearchers select candidates from, and the latest parse failure of
/// each id that is not registered.
#[derive(Debug, Clone, Default)]
pub struct QueryIndex {
    entries: BTreeMap<String, Entry>,
    terms: TermIndex<QueryKey>,
    piece_count: usize,
    parse_errors: BTreeMap<String, MatchError>,
}

impl QueryIndex {
    /// Number of registered queries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of compiled pieces across all queries.
    pub fn piece_count(&self) -> usize {
        self.piece_count
    }

    pub fn get(&self, id: &str) -> Option<&MonitorQuery> {
        self.entries.get(id).map(|entry| entry.source.as_ref())
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Every compiled piece, ordered by id then piece.
    pub fn compiled(&self) -> impl Iterator<Item = &Arc<CompiledQuery>> {
        self.entries.values().flat_map(|entry| entry.pieces.iter())
    }

    pub fn compiled_piece(&self, key: &QueryKey) -> Option<&Arc<CompiledQuery>> {
        self.entries.get(&key.id)?.pieces.get(key.piece)
    }

    pub fn term_index(&self) -> &TermIndex<QueryKey> {
        &self.terms
    }

    /// Parse failures of ids that are not registered, in id order.
    pub fn parse_errors(&self) -> impl Iterator<Item = &MatchError> {
        self.parse_errors.values()
    }

    /// Add a query, replacing any query with the same id.
    pub(crate) fn insert(&mut self, source: Arc<MonitorQuery>, pieces: Vec<Arc<CompiledQuery>>) {
        self.remove(source.id());
        self.parse_errors.remove(source.id());

        for piece in &pieces {
            self.terms.insert(piece.key().clone(), piece.terms());
        }
        self.piece_count += pieces.len();
        self.entries
            .insert(source.id().to_string(), Entry { source, pieces });
    }

    /// Replace whatever is stored under the error's id with the error.
    pub(crate) fn insert_parse_error(&mut self, error: MatchError) {
        self.remove(&error.query_id);
        self.parse_errors.insert(error.query_id.clone(), error);
    }

    /// Forget an id entirely, registered or failed.
    pub(crate) fn deregister(&mut self, id: &str) {
        self.remove(id);
        self.parse_errors.remove(id);
    }

    /// Remove a query. Returns false if the id was not registered.
    pub(crate) fn remove(&mut self, id: &str) -> bool {
        let Some(entry) = self.entries.remove(id) else {
            return false;
        };

        for piece in &entry.pieces {
            self.terms.remove(piece.key(), piece.terms());
        }
        self.piece_count -= entry.pieces.len();
        true
    }

    pub(crate) fn clear(&mut self) {
        *self = QueryIndex::default();
    }
}

/// Shared registry with snapshot reads.
///
/// Readers take an `Arc` to the current [`QueryIndex`] and keep using it
/// for as long as they like; writers build the next version from a copy
/// and swap it in. Writers are serialized among themselves.
#[derive(Debug, Default)]
pub struct QueryRegistry {
    current: RwLock<Arc<QueryIndex>>,
    writer: Mutex<()>,
}

impl QueryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current version of the registry.
    pub fn snapshot(&self) -> Arc<QueryIndex> {
        self.current.read().clone()
    }

    /// Apply `update` to a copy of the registry and publish the result.
    pub fn update<F, R>(&self, update: F) -> R
    where
        F: FnOnce(&mut QueryIndex) -> R,
    {
        let _writer = self.writer.lock();

        let mut next = QueryIndex::clone(&self.snapshot());
        let result = update(&mut next);
        *self.current.write() = Arc::new(next);

        result
    }
}
