use crate::error::Result;
use crate::matcher::{MatchContext, MatchStrategy};
use crate::matches::PresenceMatch;
use crate::query::Matcher;

/// Reports that a query matched, nothing more. The cheapest strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct PresenceStrategy;

impl PresenceStrategy {
    pub fn new() -> Self {
        PresenceStrategy
    }
}

impl MatchStrategy for PresenceStrategy {
    type Match = PresenceMatch;
    type QueryState = ();

    fn do_match(
        &self,
        ctx: &MatchContext<'_>,
        _matcher: &dyn Matcher,
        _state: &mut (),
    ) -> Result<Option<PresenceMatch>> {
        Ok(Some(PresenceMatch::new(ctx.query_id, ctx.doc_id)))
    }

    fn resolve(&self, existing: PresenceMatch, _new: PresenceMatch) -> PresenceMatch {
        existing
    }

    fn name(&self) -> &'static str {
        "presence"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matches::QueryMatch;

    #[test]
    fn test_resolve_is_idempotent_and_keeps_the_pair() {
        let strategy = PresenceStrategy::new();
        let m = PresenceMatch::new("q", "d");

        assert_eq!(strategy.resolve(m.clone(), m.clone()), m);
        let resolved = strategy.resolve(m.clone(), PresenceMatch::new("q", "d"));
        assert_eq!(resolved.query_id(), "q");
        assert_eq!(resolved.doc_id(), "d");
    }
}
