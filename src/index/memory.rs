//! In-memory positional inverted index.
//!
//! ```
//! use sarissa_monitor::analysis::{Analyzer, WhitespaceAnalyzer};
//! use sarissa_monitor::index::{IndexReader, MemoryIndex};
//!
//! let analyzer = WhitespaceAnalyzer::new();
//! let mut builder = MemoryIndex::builder();
//! let doc = builder.add_document();
//! builder.add_field(doc, "body", analyzer.analyze("to be or not to be").unwrap());
//! let index = builder.build();
//!
//! assert_eq!(index.doc_count(), 1);
//! assert_eq!(index.term_info("body", "to").unwrap().unwrap().total_freq, 2);
//! assert_eq!(index.field_length("body", doc), 6);
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::analysis::token::Token;
use crate::error::Result;
use crate::index::reader::{FieldStats, IndexReader, PostingIterator, TermInfo, TermPosition};

/// Occurrences of a term within one document.
#[derive(Debug, Clone, PartialEq)]
pub struct Posting {
    /// Internal document id.
    pub doc_id: u64,
    /// Positions in increasing order.
    pub positions: Vec<TermPosition>,
}

/// The posting list of one term, sorted by document id.
#[derive(Debug, Clone, Default)]
pub struct TermPostings {
    postings: Vec<Posting>,
    total_freq: u64,
}

impl TermPostings {
    fn push(&mut self, doc_id: u64, position: TermPosition) {
        match self.postings.last_mut() {
            Some(last) if last.doc_id == doc_id => last.positions.push(position),
            _ => self.postings.push(Posting {
                doc_id,
                positions: vec![position],
            }),
        }
        self.total_freq += 1;
    }

    /// Documents containing the term.
    pub fn doc_freq(&self) -> u64 {
        self.postings.len() as u64
    }

    /// Total occurrences across all documents.
    pub fn total_freq(&self) -> u64 {
        self.total_freq
    }

    /// The postings in document order.
    pub fn postings(&self) -> &[Posting] {
        &self.postings
    }
}

#[derive(Debug, Default)]
struct FieldIndex {
    terms: BTreeMap<String, Arc<TermPostings>>,
    lengths: BTreeMap<u64, u64>,
}

impl FieldIndex {
    fn stats(&self, field: &str) -> FieldStats {
        let doc_count = self.lengths.len() as u64;
        let total_terms: u64 = self.lengths.values().sum();

        FieldStats {
            field: field.to_string(),
            unique_terms: self.terms.len() as u64,
            total_terms,
            doc_count,
            avg_length: if doc_count == 0 {
                0.0
            } else {
                total_terms as f64 / doc_count as f64
            },
            min_length: self.lengths.values().copied().min().unwrap_or(0),
            max_length: self.lengths.values().copied().max().unwrap_or(0),
        }
    }
}

/// Builder that accumulates analyzed fields of the documents in a batch.
#[derive(Debug, Default)]
pub struct MemoryIndexBuilder {
    fields: BTreeMap<String, BTreeMap<String, TermPostings>>,
    lengths: BTreeMap<String, BTreeMap<u64, u64>>,
    doc_count: u64,
}

impl MemoryIndexBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next internal document id.
    ///
    /// Documents must be added in order; postings rely on increasing ids.
    pub fn add_document(&mut self) -> u64 {
        let doc_id = self.doc_count;
        self.doc_count += 1;
        doc_id
    }

    /// Index the tokens of one field of a document.
    ///
    /// Positions are recomputed from each token's position increment, so
    /// filters that drop or stack tokens are honoured.
    pub fn add_field<I>(&mut self, doc_id: u64, field: &str, tokens: I)
    where
        I: IntoIterator<Item = Token>,
    {
        let terms = self.fields.entry(field.to_string()).or_default();
        let mut position: i64 = -1;
        let mut length = 0u64;

        for token in tokens {
            position += token.position_increment as i64;
            let position = position.max(0) as u32;
            length += 1;

            terms.entry(token.text).or_default().push(
                doc_id,
                TermPosition::new(position, token.start_offset as u32, token.end_offset as u32),
            );
        }

        *self
            .lengths
            .entry(field.to_string())
            .or_default()
            .entry(doc_id)
            .or_default() += length;
    }

    /// Freeze the accumulated postings into a searchable index.
    pub fn build(self) -> MemoryIndex {
        let mut lengths = self.lengths;
        let fields = self
            .fields
            .into_iter()
            .map(|(name, terms)| {
                let field = FieldIndex {
                    terms: terms
                        .into_iter()
                        .map(|(term, postings)| (term, Arc::new(postings)))
                        .collect(),
                    lengths: lengths.remove(&name).unwrap_or_default(),
                };
                (name, field)
            })
            .collect();

        MemoryIndex {
            fields,
            doc_count: self.doc_count,
        }
    }
}

/// An immutable in-memory index over a handful of documents.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    fields: BTreeMap<String, FieldIndex>,
    doc_count: u64,
}

impl MemoryIndex {
    /// Start building a new index.
    pub fn builder() -> MemoryIndexBuilder {
        MemoryIndexBuilder::new()
    }

    /// The posting list for a term, if present.
    pub fn term_postings(&self, field: &str, term: &str) -> Option<&Arc<TermPostings>> {
        self.fields.get(field)?.terms.get(term)
    }
}

impl IndexReader for MemoryIndex {
    fn doc_count(&self) -> u64 {
        self.doc_count
    }

    fn max_doc(&self) -> u64 {
        self.doc_count
    }

    fn fields(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    fn terms(&self, field: &str) -> Box<dyn Iterator<Item = &str> + '_> {
        match self.fields.get(field) {
            Some(index) => Box::new(index.terms.keys().map(String::as_str)),
            None => Box::new(std::iter::empty()),
        }
    }

    fn terms_with_prefix<'a>(
        &'a self,
        field: &str,
        prefix: &'a str,
    ) -> Box<dyn Iterator<Item = &'a str> + 'a> {
        match self.fields.get(field) {
            Some(index) => Box::new(
                index
                    .terms
                    .range::<str, _>((std::ops::Bound::Included(prefix), std::ops::Bound::Unbounded))
                    .map(|(term, _)| term.as_str())
                    .take_while(move |term| term.starts_with(prefix)),
            ),
            None => Box::new(std::iter::empty()),
        }
    }

    fn term_info(&self, field: &str, term: &str) -> Result<Option<TermInfo>> {
        Ok(self.term_postings(field, term).map(|postings| TermInfo {
            field: field.to_string(),
            term: term.to_string(),
            doc_freq: postings.doc_freq(),
            total_freq: postings.total_freq(),
        }))
    }

    fn postings(&self, field: &str, term: &str) -> Result<Option<Box<dyn PostingIterator>>> {
        Ok(self.term_postings(field, term).map(|postings| {
            Box::new(MemoryPostingIterator::new(Arc::clone(postings))) as Box<dyn PostingIterator>
        }))
    }

    fn field_stats(&self, field: &str) -> Result<Option<FieldStats>> {
        Ok(self.fields.get(field).map(|index| index.stats(field)))
    }

    fn field_length(&self, field: &str, doc_id: u64) -> u64 {
        self.fields
            .get(field)
            .and_then(|index| index.lengths.get(&doc_id).copied())
            .unwrap_or(0)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Posting iterator over a shared in-memory posting list.
#[derive(Debug, Clone)]
pub struct MemoryPostingIterator {
    postings: Arc<TermPostings>,
    index: usize,
}

impl MemoryPostingIterator {
    /// Create an iterator positioned on the first posting.
    pub fn new(postings: Arc<TermPostings>) -> Self {
        MemoryPostingIterator { postings, index: 0 }
    }

    fn current(&self) -> Option<&Posting> {
        self.postings.postings.get(self.index)
    }
}

impl PostingIterator for MemoryPostingIterator {
    fn doc_id(&self) -> u64 {
        self.current().map(|p| p.doc_id).unwrap_or(u64::MAX)
    }

    fn term_freq(&self) -> u64 {
        self.current().map(|p| p.positions.len() as u64).unwrap_or(0)
    }

    fn positions(&self) -> Result<Vec<TermPosition>> {
        Ok(self
            .current()
            .map(|p| p.positions.clone())
            .unwrap_or_default())
    }

    fn next(&mut self) -> Result<bool> {
        if self.index < self.postings.postings.len() {
            self.index += 1;
        }
        Ok(self.current().is_some())
    }

    fn skip_to(&mut self, target: u64) -> Result<bool> {
        let remaining = &self.postings.postings[self.index.min(self.postings.postings.len())..];
        self.index += remaining.partition_point(|p| p.doc_id < target);
        Ok(self.current().is_some())
    }

    fn cost(&self) -> u64 {
        self.postings.doc_freq()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Analyzer, WhitespaceAnalyzer};

    fn build_index(docs: &[&str]) -> MemoryIndex {
        let analyzer = WhitespaceAnalyzer::new();
        let mut builder = MemoryIndex::builder();
        for text in docs {
            let doc = builder.add_document();
            builder.add_field(doc, "body", analyzer.analyze(text).unwrap());
        }
        builder.build()
    }

    #[test]
    fn test_postings_and_positions() {
        let index = build_index(&["a b a", "b c", "a"]);

        let mut iter = index.postings("body", "a").unwrap().unwrap();
        assert_eq!(iter.doc_id(), 0);
        assert_eq!(iter.term_freq(), 2);
        let positions = iter.positions().unwrap();
        assert_eq!(positions[1], TermPosition::new(2, 4, 5));

        assert!(iter.next().unwrap());
        assert_eq!(iter.doc_id(), 2);
        assert!(!iter.next().unwrap());
        assert_eq!(iter.doc_id(), u64::MAX);

        assert!(index.postings("body", "zzz").unwrap().is_none());
        assert!(index.postings("title", "a").unwrap().is_none());
    }

    #[test]
    fn test_skip_to() {
        let index = build_index(&["x", "y", "x", "y", "x"]);
        let mut iter = index.postings("body", "x").unwrap().unwrap();

        assert!(iter.skip_to(3).unwrap());
        assert_eq!(iter.doc_id(), 4);
        assert!(iter.skip_to(4).unwrap());
        assert_eq!(iter.doc_id(), 4);
        assert!(!iter.skip_to(5).unwrap());
        assert_eq!(iter.cost(), 3);
    }

    #[test]
    fn test_terms_and_stats() {
        let index = build_index(&["apple apricot banana", "apple"]);

        let terms: Vec<&str> = index.terms("body").collect();
        assert_eq!(terms, vec!["apple", "apricot", "banana"]);

        let prefixed: Vec<&str> = index.terms_with_prefix("body", "ap").collect();
        assert_eq!(prefixed, vec!["apple", "apricot"]);

        let stats = index.field_stats("body").unwrap().unwrap();
        assert_eq!(stats.doc_count, 2);
        assert_eq!(stats.total_terms, 4);
        assert_eq!(stats.max_length, 3);
        assert!((stats.avg_length - 2.0).abs() < f64::EPSILON);
        assert_eq!(index.fields(), vec!["body"]);
    }

    #[test]
    fn test_position_increment_gaps() {
        let mut builder = MemoryIndex::builder();
        let doc = builder.add_document();
        builder.add_field(
            doc,
            "body",
            vec![
                Token::with_offsets("a", 0, 0, 1),
                Token::with_offsets("c", 2, 4, 5).with_position_increment(2),
            ],
        );
        let index = builder.build();

        let iter = index.postings("body", "c").unwrap().unwrap();
        assert_eq!(iter.positions().unwrap()[0].position, 2);
    }
}
