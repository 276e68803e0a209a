//! Splitting disjunctive queries into independently selectable pieces.

use crate::query::{BooleanQuery, DisjunctionMaxQuery, Query};

/// Splits top-level disjunctions into their alternatives.
///
/// A document matches the whole query exactly when it matches one of the
/// pieces, so every piece can be presearched on its own terms instead of
/// the union of all of them. Boolean queries with only optional clauses
/// (and `minimum_should_match` at most one) and dis-max queries are split,
/// recursively; any other query is a single piece.
#[derive(Debug, Clone, Default)]
pub struct QueryDecomposer;

impl QueryDecomposer {
    pub fn new() -> Self {
        QueryDecomposer
    }

    pub fn decompose(&self, query: Box<dyn Query>) -> Vec<Box<dyn Query>> {
        let mut pieces = Vec::new();
        self.collect(query, 1.0, &mut pieces);
        pieces
    }

    fn collect(&self, query: Box<dyn Query>, boost: f32, pieces: &mut Vec<Box<dyn Query>>) {
        let any = query.as_any();

        let disjuncts: Option<Vec<Box<dyn Query>>> =
            if let Some(boolean) = any.downcast_ref::<BooleanQuery>() {
                boolean
                    .is_pure_disjunction()
                    .then(|| boolean.clauses().iter().map(|c| c.query.clone()).collect())
            } else if let Some(dismax) = any.downcast_ref::<DisjunctionMaxQuery>() {
                (!dismax.disjuncts().is_empty()).then(|| dismax.disjuncts().to_vec())
            } else {
                None
            };

        match disjuncts {
            Some(disjuncts) => {
                let boost = boost * query.boost();
                for disjunct in disjuncts {
                    self.collect(disjunct, boost, pieces);
                }
            }
            None => {
                let mut query = query;
                if boost != 1.0 {
                    let own = query.boost();
                    query.set_boost(own * boost);
                }
                pieces.push(query);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Metadata, QueryParser, StandardQueryParser, TermQuery};

    fn decompose(text: &str) -> Vec<String> {
        let query = StandardQueryParser::new("f")
            .parse(text, &Metadata::new())
            .unwrap();
        QueryDecomposer::new()
            .decompose(query)
            .iter()
            .map(|q| q.description())
            .collect()
    }

    #[test]
    fn test_split_nested_disjunctions() {
        assert_eq!(decompose("a (b c) +d"), vec!["f:a (f:b f:c) +f:d"]);
        assert_eq!(decompose("a (b c)"), vec!["f:a", "f:b", "f:c"]);
        assert_eq!(decompose("a OR (+b +c)"), vec!["f:a", "+f:b +f:c"]);
    }

    #[test]
    fn test_keep_conjunctions_whole() {
        assert_eq!(decompose("+a +b"), vec!["+f:a +f:b"]);
        assert_eq!(decompose("a -b"), vec!["f:a -f:b"]);
        assert_eq!(decompose("single"), vec!["f:single"]);
    }

    #[test]
    fn test_dismax_and_boost() {
        let dismax = DisjunctionMaxQuery::new(
            vec![
                Box::new(TermQuery::new("f", "a")),
                Box::new(TermQuery::new("f", "b").with_boost(2.0)),
            ],
            0.1,
        );
        let pieces = QueryDecomposer::new().decompose(Box::new(dismax));
        assert_eq!(pieces.len(), 2);

        assert_eq!(decompose("(a b^2)^3"), vec!["f:a^3", "f:b^6"]);
    }
}
