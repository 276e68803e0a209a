//! Regular-expression term query.

use regex::Regex;

use crate::error::{Result, SarissaError};
use crate::index::reader::IndexReader;
use crate::query::matcher::Matcher;
use crate::query::multi_term::{DEFAULT_MAX_EXPANSIONS, MultiTermQuery};
use crate::query::{Query, with_boost_suffix};

/// A query matching terms that fully match a regular expression.
#[derive(Debug, Clone)]
pub struct RegexpQuery {
    field: String,
    pattern: String,
    regex: Regex,
    boost: f32,
    max_expansions: usize,
}

impl RegexpQuery {
    /// Create a new regexp query. The pattern must match the whole term.
    pub fn new<F: Into<String>, P: Into<String>>(field: F, pattern: P) -> Result<Self> {
        let pattern = pattern.into();
        let regex = Regex::new(&format!("^(?:{pattern})$"))
            .map_err(|e| SarissaError::parse(format!("Invalid regular expression: {e}")))?;

        Ok(RegexpQuery {
            field: field.into(),
            pattern,
            regex,
            boost: 1.0,
            max_expansions: DEFAULT_MAX_EXPANSIONS,
        })
    }

    /// Get the pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
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

impl MultiTermQuery for RegexpQuery {
    fn term_field(&self) -> &str {
        &self.field
    }

    fn enumerate_terms(&self, reader: &dyn IndexReader) -> Result<Vec<String>> {
        Ok(reader
            .terms(&self.field)
            .filter(|term| self.regex.is_match(term))
            .map(str::to_string)
            .collect())
    }

    fn max_expansions(&self) -> usize {
        self.max_expansions
    }
}

impl Query for RegexpQuery {
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
        with_boost_suffix(format!("{}:/{}/", self.field, self.pattern), self.boost)
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
    fn test_regexp_matches_whole_terms() {
        let analyzer = WhitespaceAnalyzer::new();
        let mut builder = MemoryIndex::builder();
        let doc = builder.add_document();
        builder.add_field(doc, "f", analyzer.analyze("hello world shell").unwrap());
        let index = builder.build();

        let query = RegexpQuery::new("f", "he.*").unwrap();
        assert_eq!(query.enumerate_terms(&index).unwrap(), vec!["hello"]);
        assert_eq!(query.description(), "f:/he.*/");
    }

    #[test]
    fn test_invalid_regexp() {
        let err = RegexpQuery::new("f", "(unclosed").unwrap_err();
        assert!(err.is_parse_error());
    }
}
