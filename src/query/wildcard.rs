//! Wildcard query implementation for pattern matching.
//!
//! `*` matches any sequence of characters, `?` matches exactly one, and a
//! backslash escapes the next character.

use regex::Regex;

use crate::error::{Result, SarissaError};
use crate::index::reader::IndexReader;
use crate::query::matcher::Matcher;
use crate::query::multi_term::{DEFAULT_MAX_EXPANSIONS, MultiTermQuery};
use crate::query::{Query, with_boost_suffix};

/// A query that matches documents containing terms matching a wildcard pattern.
#[derive(Debug, Clone)]
pub struct WildcardQuery {
    field: String,
    pattern: String,
    regex: Regex,
    boost: f32,
    max_expansions: usize,
}

impl WildcardQuery {
    /// Create a new wildcard query.
    pub fn new<F: Into<String>, P: Into<String>>(field: F, pattern: P) -> Result<Self> {
        let pattern = pattern.into();
        let regex = Self::compile_pattern(&pattern)?;

        Ok(WildcardQuery {
            field: field.into(),
            pattern,
            regex,
            boost: 1.0,
            max_expansions: DEFAULT_MAX_EXPANSIONS,
        })
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

    /// Get the wildcard pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The literal text before the first wildcard, and whether a wildcard
    /// follows it at all.
    pub fn literal_prefix(&self) -> (String, bool) {
        let mut prefix = String::new();
        let mut chars = self.pattern.chars();

        while let Some(c) = chars.next() {
            match c {
                '*' | '?' => return (prefix, true),
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        prefix.push(escaped);
                    }
                }
                c => prefix.push(c),
            }
        }

        (prefix, false)
    }

    /// Check if a term matches the wildcard pattern.
    pub fn matches(&self, term: &str) -> bool {
        self.regex.is_match(term)
    }

    /// Compile a wildcard pattern into an anchored regex.
    fn compile_pattern(pattern: &str) -> Result<Regex> {
        let mut regex_pattern = String::from("^");
        let mut chars = pattern.chars();

        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some(escaped) => regex_pattern.push_str(&regex::escape(&escaped.to_string())),
                    None => regex_pattern.push_str("\\\\"),
                },
                '*' => regex_pattern.push_str(".*"),
                '?' => regex_pattern.push('.'),
                c => regex_pattern.push_str(&regex::escape(&c.to_string())),
            }
        }

        regex_pattern.push('$');

        Regex::new(&regex_pattern)
            .map_err(|e| SarissaError::parse(format!("Invalid wildcard pattern: {e}")))
    }
}

impl MultiTermQuery for WildcardQuery {
    fn term_field(&self) -> &str {
        &self.field
    }

    fn enumerate_terms(&self, reader: &dyn IndexReader) -> Result<Vec<String>> {
        let (prefix, _) = self.literal_prefix();
        Ok(reader
            .terms_with_prefix(&self.field, &prefix)
            .filter(|term| self.matches(term))
            .map(str::to_string)
            .collect())
    }

    fn max_expansions(&self) -> usize {
        self.max_expansions
    }
}

impl Query for WildcardQuery {
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
        with_boost_suffix(format!("{}:{}", self.field, self.pattern), self.boost)
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

    #[test]
    fn test_wildcard_pattern_compilation() {
        let query = WildcardQuery::new("f", "te?t*").unwrap();
        assert!(query.matches("test"));
        assert!(query.matches("textbook"));
        assert!(!query.matches("tst"));
        assert!(!query.matches("atest"));
    }

    #[test]
    fn test_special_regex_characters_are_literal() {
        let query = WildcardQuery::new("f", "a.b+*").unwrap();
        assert!(query.matches("a.b+c"));
        assert!(!query.matches("axb+c"));
    }

    #[test]
    fn test_escaped_wildcards() {
        let query = WildcardQuery::new("f", "what\\?").unwrap();
        assert!(query.matches("what?"));
        assert!(!query.matches("whats"));
        assert_eq!(query.literal_prefix(), ("what?".to_string(), false));
    }

    #[test]
    fn test_literal_prefix() {
        let query = WildcardQuery::new("f", "ab*c").unwrap();
        assert_eq!(query.literal_prefix(), ("ab".to_string(), true));

        let query = WildcardQuery::new("f", "*c").unwrap();
        assert_eq!(query.literal_prefix(), (String::new(), true));
    }
}
