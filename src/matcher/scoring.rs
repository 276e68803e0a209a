use crate::error::Result;
use crate::matcher::{MatchContext, MatchStrategy};
use crate::matches::ScoringMatch;
use crate::query::Matcher;

/// Reports the score of each matching query.
///
/// Documents scoring zero or less are not reported. When a query matches a
/// document more than once, the highest score is kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringStrategy;

impl ScoringStrategy {
    pub fn new() -> Self {
        ScoringStrategy
    }
}

impl MatchStrategy for ScoringStrategy {
    type Match = ScoringMatch;
    type QueryState = ();

    fn do_match(
        &self,
        ctx: &MatchContext<'_>,
        matcher: &dyn Matcher,
        _state: &mut (),
    ) -> Result<Option<ScoringMatch>> {
        let score = matcher.score();
        if score > 0.0 {
            Ok(Some(ScoringMatch::new(ctx.query_id, ctx.doc_id, score)))
        } else {
            Ok(None)
        }
    }

    fn resolve(&self, existing: ScoringMatch, new: ScoringMatch) -> ScoringMatch {
        if existing.score() < new.score() {
            new
        } else {
            existing
        }
    }

    fn name(&self) -> &'static str {
        "scoring"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_keeps_highest_score() {
        let strategy = ScoringStrategy::new();
        let low = ScoringMatch::new("q", "d", 0.5);
        let high = ScoringMatch::new("q", "d", 2.0);

        assert_eq!(strategy.resolve(low.clone(), high.clone()), high);
        assert_eq!(strategy.resolve(high.clone(), low.clone()), high);
        assert_eq!(strategy.resolve(low.clone(), low.clone()), low);
    }
}
