//! Multi-term query support.
//!
//! Prefix, wildcard and regexp queries do not match documents directly: they
//! enumerate the terms of the batch index that satisfy their pattern and
//! rewrite into a disjunction over those terms. The disjunction reports a
//! span for every expanded term occurrence, which is what highlighting needs.

use crate::error::{Result, SarissaError};
use crate::index::reader::IndexReader;
use crate::query::Query;
use crate::query::boolean::BooleanQuery;
use crate::query::term::TermQuery;

/// Maximum number of terms a multi-term query may expand to.
pub const DEFAULT_MAX_EXPANSIONS: usize = 1024;

/// A query that matches multiple terms based on some pattern.
pub trait MultiTermQuery: Query {
    /// The field whose term dictionary is enumerated.
    fn term_field(&self) -> &str;

    /// Enumerate the terms of `reader` that match this query, in sorted order.
    fn enumerate_terms(&self, reader: &dyn IndexReader) -> Result<Vec<String>>;

    /// Get the maximum number of terms this query will expand to.
    fn max_expansions(&self) -> usize {
        DEFAULT_MAX_EXPANSIONS
    }

    /// Expand into a boolean disjunction of term queries.
    ///
    /// Fails when the pattern matches more than [`max_expansions`] terms.
    ///
    /// [`max_expansions`]: MultiTermQuery::max_expansions
    fn rewrite_to_terms(&self, reader: &dyn IndexReader) -> Result<BooleanQuery> {
        let terms = self.enumerate_terms(reader)?;
        if terms.len() > self.max_expansions() {
            return Err(SarissaError::query(format!(
                "{} expands to {} terms, more than the limit of {}",
                self.description(),
                terms.len(),
                self.max_expansions()
            )));
        }

        let mut query = BooleanQuery::new().with_boost(self.boost());
        for term in terms {
            query.add_should(Box::new(TermQuery::new(self.term_field(), term)));
        }
        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Analyzer, WhitespaceAnalyzer};
    use crate::index::MemoryIndex;
    use crate::query::prefix::PrefixQuery;

    #[test]
    fn test_expansion_limit() {
        let analyzer = WhitespaceAnalyzer::new();
        let mut builder = MemoryIndex::builder();
        let doc = builder.add_document();
        builder.add_field(doc, "f", analyzer.analyze("ab ac ad ae").unwrap());
        let index = builder.build();

        let query = PrefixQuery::new("f", "a");
        assert_eq!(query.rewrite_to_terms(&index).unwrap().clauses().len(), 4);

        let limited = PrefixQuery::new("f", "a").with_max_expansions(3);
        let err = limited.matcher(&index).unwrap_err();
        assert!(err.to_string().contains("more than the limit of 3"));
    }
}
