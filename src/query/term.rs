//! Term query implementation for exact term matching.

use crate::error::Result;
use crate::index::reader::IndexReader;
use crate::query::matcher::{EmptyMatcher, Matcher, PostingMatcher};
use crate::query::scorer::BM25Scorer;
use crate::query::{Query, with_boost_suffix};

/// A query that matches documents containing a specific term.
#[derive(Debug, Clone)]
pub struct TermQuery {
    /// The field to search in.
    field: String,
    /// The term to search for.
    term: String,
    /// The boost factor for this query.
    boost: f32,
}

impl TermQuery {
    /// Create a new term query.
    ///
    /// The term is not analyzed; it must already be in indexed form.
    pub fn new<F, T>(field: F, term: T) -> Self
    where
        F: Into<String>,
        T: Into<String>,
    {
        TermQuery {
            field: field.into(),
            term: term.into(),
            boost: 1.0,
        }
    }

    /// Get the term.
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Set the boost factor.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
}

impl Query for TermQuery {
    fn matcher(&self, reader: &dyn IndexReader) -> Result<Box<dyn Matcher>> {
        let Some(posting_iter) = reader.postings(&self.field, &self.term)? else {
            return Ok(Box::new(EmptyMatcher::new()));
        };

        let doc_freq = reader.term_doc_freq(&self.field, &self.term)?;
        let avg_length = reader
            .field_stats(&self.field)?
            .map(|stats| stats.avg_length)
            .unwrap_or(0.0);
        let scorer = BM25Scorer::new(doc_freq, avg_length, reader.doc_count(), self.boost);
        let field_lengths = (0..reader.max_doc())
            .map(|doc| reader.field_length(&self.field, doc))
            .collect();

        Ok(Box::new(PostingMatcher::new(
            self.field.clone(),
            posting_iter,
            scorer,
            field_lengths,
        )))
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn set_boost(&mut self, boost: f32) {
        self.boost = boost;
    }

    fn description(&self) -> String {
        with_boost_suffix(format!("{}:{}", self.field, self.term), self.boost)
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }

    fn is_empty(&self, reader: &dyn IndexReader) -> Result<bool> {
        Ok(reader.term_doc_freq(&self.field, &self.term)? == 0)
    }

    fn cost(&self, reader: &dyn IndexReader) -> Result<u64> {
        reader.term_doc_freq(&self.field, &self.term)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn field(&self) -> Option<&str> {
        Some(&self.field)
    }
}
