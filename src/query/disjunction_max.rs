//! Disjunction-max query.

use crate::error::Result;
use crate::index::reader::IndexReader;
use crate::query::matcher::{DisjunctionMatcher, EmptyMatcher, Matcher, ScoreMode};
use crate::query::{Query, with_boost_suffix};

/// Matches documents matching any disjunct, scoring them by the best
/// disjunct plus `tie_breaker` times the others.
#[derive(Debug, Clone)]
pub struct DisjunctionMaxQuery {
    disjuncts: Vec<Box<dyn Query>>,
    tie_breaker: f32,
    boost: f32,
}

impl DisjunctionMaxQuery {
    /// Create a dis-max query over the given disjuncts.
    pub fn new(disjuncts: Vec<Box<dyn Query>>, tie_breaker: f32) -> Self {
        DisjunctionMaxQuery {
            disjuncts,
            tie_breaker,
            boost: 1.0,
        }
    }

    /// Add a disjunct.
    pub fn add(&mut self, query: Box<dyn Query>) {
        self.disjuncts.push(query);
    }

    /// The disjuncts.
    pub fn disjuncts(&self) -> &[Box<dyn Query>] {
        &self.disjuncts
    }

    /// The tie breaker multiplier.
    pub fn tie_breaker(&self) -> f32 {
        self.tie_breaker
    }
}

impl Query for DisjunctionMaxQuery {
    fn matcher(&self, reader: &dyn IndexReader) -> Result<Box<dyn Matcher>> {
        if self.disjuncts.is_empty() {
            return Ok(Box::new(EmptyMatcher::new()));
        }

        let matchers = self
            .disjuncts
            .iter()
            .map(|q| q.matcher(reader))
            .collect::<Result<Vec<_>>>()?;

        Ok(Box::new(DisjunctionMatcher::with_options(
            matchers,
            ScoreMode::Max {
                tie_breaker: self.tie_breaker,
            },
            1,
        )?))
    }

    fn rewrite(&self, reader: &dyn IndexReader) -> Result<Box<dyn Query>> {
        let disjuncts = self
            .disjuncts
            .iter()
            .map(|q| q.rewrite(reader))
            .collect::<Result<Vec<_>>>()?;
        let mut rewritten = DisjunctionMaxQuery::new(disjuncts, self.tie_breaker);
        rewritten.boost = self.boost;
        Ok(Box::new(rewritten))
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn set_boost(&mut self, boost: f32) {
        self.boost = boost;
    }

    fn description(&self) -> String {
        let inner: Vec<String> = self.disjuncts.iter().map(|q| q.description()).collect();
        let mut description = format!("({})", inner.join(" | "));
        if self.tie_breaker != 0.0 {
            description = format!("{description}~{}", self.tie_breaker);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Analyzer, WhitespaceAnalyzer};
    use crate::index::MemoryIndex;
    use crate::query::prefix::PrefixQuery;
    use crate::query::term::TermQuery;

    #[test]
    fn test_dismax_reports_spans_of_all_matching_disjuncts() {
        let analyzer = WhitespaceAnalyzer::new();
        let mut builder = MemoryIndex::builder();
        let doc = builder.add_document();
        builder.add_field(doc, "f", analyzer.analyze("term1 term2 term3").unwrap());
        let index = builder.build();

        let query = DisjunctionMaxQuery::new(
            vec![
                Box::new(TermQuery::new("f", "term1")),
                Box::new(PrefixQuery::new("f", "term2")),
            ],
            0.0,
        );

        let matcher = query.matcher(&index).unwrap();
        let mut spans = Vec::new();
        matcher.spans(&mut spans).unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!(query.description(), "(f:term1 | f:term2*)");
    }
}
