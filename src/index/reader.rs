//! Index reader traits for evaluating queries against a batch.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One occurrence of a term inside a field of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermPosition {
    /// Token position (0-based).
    pub position: u32,
    /// Byte offset where the token starts.
    pub start_offset: u32,
    /// Byte offset where the token ends.
    pub end_offset: u32,
}

impl TermPosition {
    /// Create a new term position.
    pub fn new(position: u32, start_offset: u32, end_offset: u32) -> Self {
        TermPosition {
            position,
            start_offset,
            end_offset,
        }
    }
}

/// Information about a term in the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermInfo {
    /// The field name.
    pub field: String,

    /// The term text.
    pub term: String,

    /// Number of documents containing this term.
    pub doc_freq: u64,

    /// Total number of occurrences of this term.
    pub total_freq: u64,
}

/// Statistics about a field in the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldStats {
    /// The field name.
    pub field: String,

    /// Number of unique terms in this field.
    pub unique_terms: u64,

    /// Total number of term occurrences.
    pub total_terms: u64,

    /// Number of documents with this field.
    pub doc_count: u64,

    /// Average field length.
    pub avg_length: f64,

    /// Minimum field length.
    pub min_length: u64,

    /// Maximum field length.
    pub max_length: u64,
}

/// Trait for index readers.
pub trait IndexReader: Send + Sync + Debug {
    /// Get the number of documents in the index.
    fn doc_count(&self) -> u64;

    /// Get the maximum document ID in the index (exclusive).
    fn max_doc(&self) -> u64;

    /// Names of all indexed fields, sorted.
    fn fields(&self) -> Vec<&str>;

    /// All terms of a field in sorted order.
    fn terms(&self, field: &str) -> Box<dyn Iterator<Item = &str> + '_>;

    /// Terms of a field starting with `prefix`, in sorted order.
    fn terms_with_prefix<'a>(
        &'a self,
        field: &str,
        prefix: &'a str,
    ) -> Box<dyn Iterator<Item = &'a str> + 'a> {
        Box::new(
            self.terms(field)
                .skip_while(move |term| !term.starts_with(prefix) && *term < prefix)
                .take_while(move |term| term.starts_with(prefix)),
        )
    }

    /// Get term information for a field and term.
    fn term_info(&self, field: &str, term: &str) -> Result<Option<TermInfo>>;

    /// Get posting list for a field and term.
    fn postings(&self, field: &str, term: &str) -> Result<Option<Box<dyn PostingIterator>>>;

    /// Get field statistics.
    fn field_stats(&self, field: &str) -> Result<Option<FieldStats>>;

    /// Number of tokens a document holds in a field (0 when absent).
    fn field_length(&self, field: &str, doc_id: u64) -> u64;

    /// Get document frequency for a specific term in a field.
    fn term_doc_freq(&self, field: &str, term: &str) -> Result<u64> {
        match self.term_info(field, term)? {
            Some(term_info) => Ok(term_info.doc_freq),
            None => Ok(0),
        }
    }

    /// Get this reader as Any for downcasting.
    fn as_any(&self) -> &dyn std::any::Any;
}

/// Iterator over posting lists.
///
/// A fresh iterator is positioned on its first document; `doc_id` returns
/// `u64::MAX` once the list is exhausted.
pub trait PostingIterator: Send + Debug {
    /// Get the current document ID.
    fn doc_id(&self) -> u64;

    /// Get the term frequency in the current document.
    fn term_freq(&self) -> u64;

    /// Get the positions of the term in the current document.
    fn positions(&self) -> Result<Vec<TermPosition>>;

    /// Move to the next document.
    fn next(&mut self) -> Result<bool>;

    /// Skip to the first document >= target.
    fn skip_to(&mut self, target: u64) -> Result<bool>;

    /// Get the cost of iterating through this posting list.
    fn cost(&self) -> u64;
}
