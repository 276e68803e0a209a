//! Boolean query implementation for combining multiple queries.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::index::reader::IndexReader;
use crate::query::matcher::{
    BoostMatcher, ConjunctionMatcher, ConjunctionNotMatcher, DisjunctionMatcher, EmptyMatcher,
    Matcher, NotMatcher, ReqOptMatcher, ScoreMode,
};
use crate::query::{Query, with_boost_suffix};

/// Occurrence requirements for boolean clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Occur {
    /// The clause must match (equivalent to AND).
    Must,
    /// The clause should match (equivalent to OR).
    Should,
    /// The clause must not match (equivalent to NOT).
    MustNot,
}

impl fmt::Display for Occur {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Occur::Must => f.write_str("+"),
            Occur::Should => Ok(()),
            Occur::MustNot => f.write_str("-"),
        }
    }
}

/// A clause in a boolean query.
#[derive(Debug, Clone)]
pub struct BooleanClause {
    /// The query for this clause.
    pub query: Box<dyn Query>,
    /// The occurrence requirement.
    pub occur: Occur,
}

impl BooleanClause {
    /// Create a new boolean clause.
    pub fn new(query: Box<dyn Query>, occur: Occur) -> Self {
        BooleanClause { query, occur }
    }

    /// Create a MUST clause.
    pub fn must(query: Box<dyn Query>) -> Self {
        BooleanClause::new(query, Occur::Must)
    }

    /// Create a SHOULD clause.
    pub fn should(query: Box<dyn Query>) -> Self {
        BooleanClause::new(query, Occur::Should)
    }

    /// Create a MUST_NOT clause.
    pub fn must_not(query: Box<dyn Query>) -> Self {
        BooleanClause::new(query, Occur::MustNot)
    }
}

/// A boolean query that combines multiple queries with boolean logic.
///
/// Optional clauses next to required ones contribute score and spans but
/// are not needed for a match unless `minimum_should_match` is set. A query
/// made only of exclusions matches every document the exclusions miss.
#[derive(Debug, Clone)]
pub struct BooleanQuery {
    clauses: Vec<BooleanClause>,
    boost: f32,
    minimum_should_match: usize,
}

impl BooleanQuery {
    /// Create a new empty boolean query.
    pub fn new() -> Self {
        BooleanQuery {
            clauses: Vec::new(),
            boost: 1.0,
            minimum_should_match: 0,
        }
    }

    /// Start a builder.
    pub fn builder() -> BooleanQueryBuilder {
        BooleanQueryBuilder::new()
    }

    /// Add a clause to this boolean query.
    pub fn add_clause(&mut self, clause: BooleanClause) {
        self.clauses.push(clause);
    }

    /// Add a MUST clause.
    pub fn add_must(&mut self, query: Box<dyn Query>) {
        self.add_clause(BooleanClause::must(query));
    }

    /// Add a SHOULD clause.
    pub fn add_should(&mut self, query: Box<dyn Query>) {
        self.add_clause(BooleanClause::should(query));
    }

    /// Add a MUST_NOT clause.
    pub fn add_must_not(&mut self, query: Box<dyn Query>) {
        self.add_clause(BooleanClause::must_not(query));
    }

    /// Set the boost factor.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    /// Set the minimum number of should clauses that must match.
    pub fn with_minimum_should_match(mut self, minimum: usize) -> Self {
        self.minimum_should_match = minimum;
        self
    }

    /// Get the clauses.
    pub fn clauses(&self) -> &[BooleanClause] {
        &self.clauses
    }

    /// Get the minimum should match value.
    pub fn minimum_should_match(&self) -> usize {
        self.minimum_should_match
    }

    /// Check if this query has no clauses.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Get clauses by occurrence type.
    pub fn clauses_by_occur(&self, occur: Occur) -> Vec<&BooleanClause> {
        self.clauses.iter().filter(|c| c.occur == occur).collect()
    }

    /// Whether this query is a plain disjunction: optional clauses only and
    /// at most one of them required to match.
    pub fn is_pure_disjunction(&self) -> bool {
        !self.clauses.is_empty()
            && self.minimum_should_match <= 1
            && self.clauses.iter().all(|c| c.occur == Occur::Should)
    }

    fn clause_matchers(
        clauses: &[&BooleanClause],
        reader: &dyn IndexReader,
    ) -> Result<Vec<Box<dyn Matcher>>> {
        clauses.iter().map(|c| c.query.matcher(reader)).collect()
    }

    fn disjunction(
        mut matchers: Vec<Box<dyn Matcher>>,
        minimum_match: usize,
    ) -> Result<Box<dyn Matcher>> {
        matchers.retain(|m| !m.is_exhausted());
        if matchers.len() == 1 && minimum_match <= 1 {
            return Ok(matchers.remove(0));
        }
        Ok(Box::new(DisjunctionMatcher::with_options(
            matchers,
            ScoreMode::Sum,
            minimum_match,
        )?))
    }

    fn build_matcher(&self, reader: &dyn IndexReader) -> Result<Box<dyn Matcher>> {
        let must_clauses = self.clauses_by_occur(Occur::Must);
        let should_clauses = self.clauses_by_occur(Occur::Should);
        let must_not_clauses = self.clauses_by_occur(Occur::MustNot);

        let mut must_matchers = Self::clause_matchers(&must_clauses, reader)?;
        if must_matchers.iter().any(|m| m.is_exhausted()) {
            return Ok(Box::new(EmptyMatcher::new()));
        }
        let should_matchers = Self::clause_matchers(&should_clauses, reader)?;

        let positive: Option<Box<dyn Matcher>> = if must_matchers.is_empty() {
            if should_matchers.is_empty() {
                None
            } else {
                Some(Self::disjunction(
                    should_matchers,
                    self.minimum_should_match.max(1),
                )?)
            }
        } else {
            let required: Box<dyn Matcher> = if must_matchers.len() == 1 {
                must_matchers.remove(0)
            } else {
                Box::new(ConjunctionMatcher::new(must_matchers)?)
            };

            if should_matchers.is_empty() {
                Some(required)
            } else if self.minimum_should_match > 0 {
                let should = Self::disjunction(should_matchers, self.minimum_should_match)?;
                Some(Box::new(ConjunctionMatcher::new(vec![required, should])?))
            } else {
                let optional = Self::disjunction(should_matchers, 1)?;
                Some(Box::new(ReqOptMatcher::new(required, optional)?))
            }
        };

        let mut negatives = Self::clause_matchers(&must_not_clauses, reader)?;
        negatives.retain(|m| !m.is_exhausted());

        match positive {
            Some(positive) if negatives.is_empty() => Ok(positive),
            Some(positive) => Ok(Box::new(ConjunctionNotMatcher::new(positive, negatives)?)),
            None if must_not_clauses.is_empty() => Ok(Box::new(EmptyMatcher::new())),
            None => {
                let excluded = Self::disjunction(negatives, 1)?;
                Ok(Box::new(NotMatcher::new(excluded, reader.max_doc())?))
            }
        }
    }
}

impl Default for BooleanQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl Query for BooleanQuery {
    fn matcher(&self, reader: &dyn IndexReader) -> Result<Box<dyn Matcher>> {
        if self.clauses.is_empty() {
            return Ok(Box::new(EmptyMatcher::new()));
        }

        let matcher = self.build_matcher(reader)?;
        if self.boost == 1.0 || matcher.is_exhausted() {
            Ok(matcher)
        } else {
            Ok(Box::new(BoostMatcher::new(matcher, self.boost)))
        }
    }

    fn rewrite(&self, reader: &dyn IndexReader) -> Result<Box<dyn Query>> {
        let clauses = self
            .clauses
            .iter()
            .map(|c| Ok(BooleanClause::new(c.query.rewrite(reader)?, c.occur)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Box::new(BooleanQuery {
            clauses,
            boost: self.boost,
            minimum_should_match: self.minimum_should_match,
        }))
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn set_boost(&mut self, boost: f32) {
        self.boost = boost;
    }

    fn description(&self) -> String {
        let clauses: Vec<String> = self
            .clauses
            .iter()
            .map(|c| {
                let inner = c.query.description();
                if c.query.as_any().is::<BooleanQuery>() {
                    format!("{}({})", c.occur, inner)
                } else {
                    format!("{}{}", c.occur, inner)
                }
            })
            .collect();

        let mut description = clauses.join(" ");
        if self.minimum_should_match > 0 {
            description = format!("({description})~{}", self.minimum_should_match);
        }
        with_boost_suffix(description, self.boost)
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Builder for [`BooleanQuery`].
///
/// ```
/// use sarissa_monitor::query::{BooleanQuery, Query, TermQuery};
///
/// let query = BooleanQuery::builder()
///     .must(Box::new(TermQuery::new("body", "rust")))
///     .must_not(Box::new(TermQuery::new("body", "java")))
///     .build();
///
/// assert_eq!(query.description(), "+body:rust -body:java");
/// ```
#[derive(Debug, Default)]
pub struct BooleanQueryBuilder {
    query: BooleanQuery,
}

impl BooleanQueryBuilder {
    /// Create a new boolean query builder.
    pub fn new() -> Self {
        BooleanQueryBuilder {
            query: BooleanQuery::new(),
        }
    }

    /// Add a MUST clause.
    pub fn must(mut self, query: Box<dyn Query>) -> Self {
        self.query.add_must(query);
        self
    }

    /// Add a SHOULD clause.
    pub fn should(mut self, query: Box<dyn Query>) -> Self {
        self.query.add_should(query);
        self
    }

    /// Add a MUST_NOT clause.
    pub fn must_not(mut self, query: Box<dyn Query>) -> Self {
        self.query.add_must_not(query);
        self
    }

    /// Set the boost factor.
    pub fn boost(mut self, boost: f32) -> Self {
        self.query = self.query.with_boost(boost);
        self
    }

    /// Set the minimum should match.
    pub fn minimum_should_match(mut self, minimum: usize) -> Self {
        self.query = self.query.with_minimum_should_match(minimum);
        self
    }

    /// Build the boolean query.
    pub fn build(self) -> BooleanQuery {
        self.query
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Analyzer, WhitespaceAnalyzer};
    use crate::index::MemoryIndex;
    use crate::query::term::TermQuery;

    fn index(docs: &[&str]) -> MemoryIndex {
        let analyzer = WhitespaceAnalyzer::new();
        let mut builder = MemoryIndex::builder();
        for text in docs {
            let doc = builder.add_document();
            builder.add_field(doc, "f", analyzer.analyze(text).unwrap());
        }
        builder.build()
    }

    fn term(t: &str) -> Box<dyn Query> {
        Box::new(TermQuery::new("f", t))
    }

    fn matching_docs(query: &dyn Query, index: &MemoryIndex) -> Vec<u64> {
        let mut matcher = query.matcher(index).unwrap();
        let mut docs = Vec::new();
        while !matcher.is_exhausted() {
            docs.push(matcher.doc_id());
            matcher.next().unwrap();
        }
        docs
    }

    #[test]
    fn test_must_and_must_not() {
        let index = index(&["a b", "a c", "b c", "a b c"]);
        let query = BooleanQuery::builder()
            .must(term("a"))
            .must_not(term("c"))
            .build();

        assert_eq!(matching_docs(&query, &index), vec![0]);
    }

    #[test]
    fn test_should_only() {
        let index = index(&["a", "b", "c"]);
        let query = BooleanQuery::builder().should(term("a")).should(term("c")).build();

        assert_eq!(matching_docs(&query, &index), vec![0, 2]);
        assert!(query.is_pure_disjunction());
    }

    #[test]
    fn test_optional_clauses_add_spans() {
        let index = index(&["a b", "a"]);
        let query = BooleanQuery::builder().must(term("a")).should(term("b")).build();

        let matcher = query.matcher(&index).unwrap();
        let mut spans = Vec::new();
        matcher.spans(&mut spans).unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!(matching_docs(&query, &index), vec![0, 1]);
    }

    #[test]
    fn test_minimum_should_match() {
        let index = index(&["a b", "a", "b c", "a b c"]);
        let query = BooleanQuery::builder()
            .should(term("a"))
            .should(term("b"))
            .should(term("c"))
            .minimum_should_match(2)
            .build();

        assert_eq!(matching_docs(&query, &index), vec![0, 2, 3]);
        assert!(!query.is_pure_disjunction());
    }

    #[test]
    fn test_pure_negation_matches_the_rest() {
        let index = index(&["a", "b", "c"]);
        let query = BooleanQuery::builder().must_not(term("b")).build();

        assert_eq!(matching_docs(&query, &index), vec![0, 2]);
    }

    #[test]
    fn test_missing_required_term_matches_nothing() {
        let index = index(&["a b"]);
        let query = BooleanQuery::builder().must(term("a")).must(term("zzz")).build();

        assert!(matching_docs(&query, &index).is_empty());
        assert!(matching_docs(&BooleanQuery::new(), &index).is_empty());
    }

    #[test]
    fn test_description() {
        let inner = BooleanQuery::builder().must(term("x")).build();
        let query = BooleanQuery::builder()
            .should(term("a"))
            .must_not(Box::new(inner))
            .boost(2.0)
            .build();

        assert_eq!(query.description(), "f:a -(+f:x)^2");
    }
}
