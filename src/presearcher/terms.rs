//! Indexable representation of queries, and the inverted index over it.

use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::fmt;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::index::reader::IndexReader;

/// How a [`QueryTerm`] is compared against document terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TermKind {
    /// Any document term starting with the text.
    Prefix,
    /// The document term equal to the text.
    Exact,
}

/// A term a document must contain for a query to possibly match it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QueryTerm {
    pub field: String,
    pub text: String,
    pub kind: TermKind,
}

impl QueryTerm {
    pub fn exact<F: Into<String>, T: Into<String>>(field: F, text: T) -> Self {
        QueryTerm {
            field: field.into(),
            text: text.into(),
            kind: TermKind::Exact,
        }
    }

    pub fn prefix<F: Into<String>, T: Into<String>>(field: F, text: T) -> Self {
        QueryTerm {
            field: field.into(),
            text: text.into(),
            kind: TermKind::Prefix,
        }
    }

    /// Whether a document term in `field` satisfies this term.
    pub fn accepts(&self, field: &str, term: &str) -> bool {
        self.field == field
            && match self.kind {
                TermKind::Exact => self.text == term,
                TermKind::Prefix => term.starts_with(&self.text),
            }
    }
}

impl fmt::Display for QueryTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TermKind::Exact => write!(f, "{}:{}", self.field, self.text),
            TermKind::Prefix => write!(f, "{}:{}*", self.field, self.text),
        }
    }
}

/// Terms of which at least one must occur in a matching document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryTerms {
    /// No useful constraint: the query is a candidate for every batch.
    Any,
    /// At least one of these terms must occur.
    Terms(BTreeSet<QueryTerm>),
}

impl QueryTerms {
    pub fn single(term: QueryTerm) -> Self {
        QueryTerms::Terms(BTreeSet::from([term]))
    }

    pub fn is_any(&self) -> bool {
        matches!(self, QueryTerms::Any)
    }

    /// Either side may match: the union of both sets.
    pub fn union(self, other: QueryTerms) -> QueryTerms {
        match (self, other) {
            (QueryTerms::Terms(mut a), QueryTerms::Terms(b)) => {
                a.extend(b);
                QueryTerms::Terms(a)
            }
            _ => QueryTerms::Any,
        }
    }

    /// Both sides must match: keep the more selective one.
    pub fn best(self, other: QueryTerms) -> QueryTerms {
        if other.selectivity() > self.selectivity() {
            other
        } else {
            self
        }
    }

    /// Rough selectivity: exact terms beat prefixes, longer terms beat
    /// shorter ones, and a set is only as selective as its weakest member.
    fn selectivity(&self) -> Option<(TermKind, usize, Reverse<usize>)> {
        match self {
            QueryTerms::Any => None,
            QueryTerms::Terms(terms) => terms
                .iter()
                .map(|t| (t.kind, t.text.chars().count()))
                .min()
                .map(|(kind, len)| (kind, len, Reverse(terms.len()))),
        }
    }
}

impl fmt::Display for QueryTerms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryTerms::Any => f.write_str("ANY"),
            QueryTerms::Terms(terms) => {
                let terms: Vec<String> = terms.iter().map(QueryTerm::to_string).collect();
                write!(f, "[{}]", terms.join(", "))
            }
        }
    }
}

type Postings<K> = AHashMap<String, AHashMap<String, BTreeSet<K>>>;

/// Inverted index from query terms to the queries that need them.
#[derive(Debug, Clone)]
pub struct TermIndex<K: Ord + Clone> {
    exact: Postings<K>,
    prefix: Postings<K>,
    any: BTreeSet<K>,
}

impl<K: Ord + Clone> Default for TermIndex<K> {
    fn default() -> Self {
        TermIndex {
            exact: AHashMap::new(),
            prefix: AHashMap::new(),
            any: BTreeSet::new(),
        }
    }
}

impl<K: Ord + Clone> TermIndex<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: K, terms: &QueryTerms) {
        match terms {
            QueryTerms::Any => {
                self.any.insert(key);
            }
            QueryTerms::Terms(terms) => {
                for term in terms {
                    let postings = match term.kind {
                        TermKind::Exact => &mut self.exact,
                        TermKind::Prefix => &mut self.prefix,
                    };
                    postings
                        .entry(term.field.clone())
                        .or_default()
                        .entry(term.text.clone())
                        .or_default()
                        .insert(key.clone());
                }
            }
        }
    }

    pub fn remove(&mut self, key: &K, terms: &QueryTerms) {
        match terms {
            QueryTerms::Any => {
                self.any.remove(key);
            }
            QueryTerms::Terms(terms) => {
                for term in terms {
                    let postings = match term.kind {
                        TermKind::Exact => &mut self.exact,
                        TermKind::Prefix => &mut self.prefix,
                    };
                    let Some(field) = postings.get_mut(&term.field) else {
                        continue;
                    };
                    if let Some(keys) = field.get_mut(&term.text) {
                        keys.remove(key);
                        if keys.is_empty() {
                            field.remove(&term.text);
                        }
                    }
                    if field.is_empty() {
                        postings.remove(&term.field);
                    }
                }
            }
        }
    }

    /// Keys whose terms are satisfied by some term of `reader`, plus every
    /// key registered as [`QueryTerms::Any`].
    pub fn candidates(&self, reader: &dyn IndexReader) -> BTreeSet<K> {
        let mut keys = self.any.clone();

        for field in reader.fields() {
            let exact = self.exact.get(field);
            let prefix = self.prefix.get(field);
            if exact.is_none() && prefix.is_none() {
                continue;
            }

            for term in reader.terms(field) {
                if let Some(found) = exact.and_then(|terms| terms.get(term)) {
                    keys.extend(found.iter().cloned());
                }

                if let Some(prefixes) = prefix {
                    let boundaries = term
                        .char_indices()
                        .map(|(i, _)| i)
                        .skip(1)
                        .chain(std::iter::once(term.len()));
                    for end in boundaries {
                        if let Some(found) = prefixes.get(&term[..end]) {
                            keys.extend(found.iter().cloned());
                        }
                    }
                }
            }
        }

        keys
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.prefix.is_empty() && self.any.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Analyzer, WhitespaceAnalyzer};
    use crate::index::memory::MemoryIndex;

    fn reader(text: &str) -> MemoryIndex {
        let mut builder = MemoryIndex::builder();
        let doc = builder.add_document();
        builder.add_field(doc, "f", WhitespaceAnalyzer::new().analyze(text).unwrap());
        builder.build()
    }

    #[test]
    fn test_best_prefers_exact_and_longer_terms() {
        let exact = QueryTerms::single(QueryTerm::exact("f", "ab"));
        let prefix = QueryTerms::single(QueryTerm::prefix("f", "abcdef"));
        let longer = QueryTerms::single(QueryTerm::exact("f", "abcd"));

        assert_eq!(prefix.clone().best(exact.clone()), exact);
        assert_eq!(exact.clone().best(longer.clone()), longer);
        assert_eq!(QueryTerms::Any.best(prefix.clone()), prefix);
        assert!(QueryTerms::Any.union(exact).is_any());
    }

    #[test]
    fn test_term_index_candidates() {
        let mut index = TermIndex::new();
        index.insert(1, &QueryTerms::single(QueryTerm::exact("f", "hello")));
        index.insert(2, &QueryTerms::single(QueryTerm::prefix("f", "wor")));
        index.insert(3, &QueryTerms::single(QueryTerm::exact("g", "hello")));
        index.insert(4, &QueryTerms::Any);
        index.insert(5, &QueryTerms::single(QueryTerm::prefix("f", "world")));

        let candidates = index.candidates(&reader("hello world"));
        assert_eq!(candidates, BTreeSet::from([1, 2, 4, 5]));

        index.remove(&2, &QueryTerms::single(QueryTerm::prefix("f", "wor")));
        let candidates = index.candidates(&reader("hello world"));
        assert_eq!(candidates, BTreeSet::from([1, 4, 5]));
    }
}
