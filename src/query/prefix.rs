//! Prefix query implementation.

use crate::error::Result;
use crate::index::reader::IndexReader;
use crate::query::matcher::Matcher;
use crate::query::multi_term::{DEFAULT_MAX_EXPANSIONS, MultiTermQuery};
use crate::query::{Query, with_boost_suffix};

/// A query that matches documents containing a term starting with a prefix.
#[derive(Debug, Clone)]
pub struct PrefixQuery {
    field: String,
    prefix: String,
    boost: f32,
    max_expansions: usize,
}

impl PrefixQuery {
    /// Create a new prefix query.
    pub fn new<F: Into<String>, P: Into<String>>(field: F, prefix: P) -> Self {
        PrefixQuery {
            field: field.into(),
            prefix: prefix.into(),
            boost: 1.0,
            max_expansions: DEFAULT_MAX_EXPANSIONS,
        }
    }

    /// Get the prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Set the boost factor.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    /// Limit the number of expanded terms.
    pub fn with_max_expansions(mut self, max_expansions: usize) -> Self {
        self.max_expansions = max_expansions;
        self
    }
}

impl MultiTermQuery for PrefixQuery {
    fn term_field(&self) -> &str {
        &self.field
    }

    fn enumerate_terms(&self, reader: &dyn IndexReader) -> Result<Vec<String>> {
        Ok(reader
            .terms_with_prefix(&self.field, &self.prefix)
            .map(str::to_string)
            .collect())
    }

    fn max_expansions(&self) -> usize {
        self.max_expansions
    }
}

impl Query for PrefixQuery {
    fn matcher(&self, reader: &dyn IndexReader) -> Result<Box<dyn Matcher>> {
        self.rewrite_to_terms(reader)?.matcher(reader)
    }

    fn rewrite(&self, reader: &dyn IndexReader) -> Result<Box<dyn Query>> {
        Ok(Box::new(self.rewrite_to_terms(reader)?))
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn set_boost(&mut self, boost: f32) {
        self.boost = boost;
    }

    fn description(&self) -> String {
        with_boost_suffix(format!("{}:{}*", self.field, self.prefix), self.boost)
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn field(&self) -> Option<&str> {
        Some(&self.field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Analyzer, WhitespaceAnalyzer};
    use crate::index::MemoryIndex;

    #[test]
    fn test_prefix_query_spans_every_expansion() {
        let analyzer = WhitespaceAnalyzer::new();
        let mut builder = MemoryIndex::builder();
        let doc = builder.add_document();
        builder.add_field(doc, "f", analyzer.analyze("term1 term22 other").unwrap());
        let index = builder.build();

        let query = PrefixQuery::new("f", "term");
        let matcher = query.matcher(&index).unwrap();
        assert_eq!(matcher.doc_id(), 0);

        let mut spans = Vec::new();
        matcher.spans(&mut spans).unwrap();
        let mut positions: Vec<u32> = spans.iter().map(|s| s.start_position).collect();
        positions.sort();
        assert_eq!(positions, vec![0, 1]);
        assert_eq!(query.description(), "f:term*");
    }
}
