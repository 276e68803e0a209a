use crate::error::Result;
use crate::matcher::{MatchContext, MatchStrategy};
use crate::matches::{HighlightsMatch, Hit};
use crate::query::{Matcher, Span};

/// Reports, per field, the spans of a document that made a query match.
///
/// Hits come from the highlight query, which may be more precise than the
/// query used for matching. Hits from several visits to the same document
/// are unioned, so a span reported by two clauses appears once.
#[derive(Debug, Clone, Copy, Default)]
pub struct HighlightingStrategy;

impl HighlightingStrategy {
    pub fn new() -> Self {
        HighlightingStrategy
    }
}

impl MatchStrategy for HighlightingStrategy {
    type Match = HighlightsMatch;

    /// Highlight matcher over the batch, built on the first matching doc.
    type QueryState = Option<Box<dyn Matcher>>;

    fn do_match(
        &self,
        ctx: &MatchContext<'_>,
        _matcher: &dyn Matcher,
        state: &mut Self::QueryState,
    ) -> Result<Option<HighlightsMatch>> {
        let mut highlighter = match state.take() {
            Some(highlighter) => highlighter,
            None => ctx.highlight_query.matcher(ctx.reader)?,
        };

        let mut result = HighlightsMatch::new(ctx.query_id, ctx.doc_id);

        if !highlighter.is_exhausted() && highlighter.doc_id() < ctx.internal_doc {
            highlighter.skip_to(ctx.internal_doc)?;
        }

        if highlighter.doc_id() == ctx.internal_doc {
            let mut spans: Vec<Span> = Vec::new();
            highlighter.spans(&mut spans)?;
            for span in spans {
                let hit = Hit::new(
                    span.start_position,
                    span.start_offset,
                    span.end_position,
                    span.end_offset,
                );
                result.add_hit(span.field, hit);
            }
        }

        *state = Some(highlighter);
        Ok(Some(result))
    }

    fn resolve(&self, mut existing: HighlightsMatch, new: HighlightsMatch) -> HighlightsMatch {
        existing.merge(&new);
        existing
    }

    fn name(&self) -> &'static str {
        "highlighting"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_unions_hits() {
        let strategy = HighlightingStrategy::new();

        let mut a = HighlightsMatch::new("q", "d");
        a.add_hit("f", Hit::new(0, 0, 0, 5));
        let mut b = HighlightsMatch::new("q", "d");
        b.add_hit("f", Hit::new(0, 0, 0, 5));
        b.add_hit("f", Hit::new(2, 10, 2, 15));

        let merged = strategy.resolve(a.clone(), b.clone());
        assert_eq!(merged.hit_count(), 2);
        assert_eq!(merged, strategy.resolve(b.clone(), a));
        assert_eq!(strategy.resolve(b.clone(), b.clone()), b);
    }
}
