//! Proximity (span-near) queries.
//!
//! A span-near query matches when one span from each clause occurs within
//! `slop` positions of each other, optionally in clause order. Phrases are
//! ordered span-near queries with a slop of zero. Every clause span taking
//! part in a satisfying combination is reported as match evidence.

use crate::error::Result;
use crate::index::reader::IndexReader;
use crate::query::matcher::{ConjunctionMatcher, EmptyMatcher, Matcher, Span};
use crate::query::{Query, with_boost_suffix};

/// A query that matches clauses appearing near each other.
#[derive(Debug, Clone)]
pub struct SpanNearQuery {
    /// Clauses that must appear near each other
    clauses: Vec<Box<dyn Query>>,
    /// Maximum number of positions allowed between the clauses
    slop: u32,
    /// Whether clauses must appear in order
    in_order: bool,
    boost: f32,
}

impl SpanNearQuery {
    /// Create a new span near query.
    pub fn new(clauses: Vec<Box<dyn Query>>, slop: u32, in_order: bool) -> Self {
        SpanNearQuery {
            clauses,
            slop,
            in_order,
            boost: 1.0,
        }
    }

    /// An exact phrase: clauses in order with no gaps.
    pub fn phrase(clauses: Vec<Box<dyn Query>>) -> Self {
        Self::new(clauses, 0, true)
    }

    /// Set the boost factor.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    /// Get the slop (maximum distance).
    pub fn slop(&self) -> u32 {
        self.slop
    }

    /// Check if clauses must be in order.
    pub fn is_in_order(&self) -> bool {
        self.in_order
    }

    /// Get the clauses.
    pub fn clauses(&self) -> &[Box<dyn Query>] {
        &self.clauses
    }
}

impl Query for SpanNearQuery {
    fn matcher(&self, reader: &dyn IndexReader) -> Result<Box<dyn Matcher>> {
        if self.clauses.is_empty() {
            return Ok(Box::new(EmptyMatcher::new()));
        }

        let matchers = self
            .clauses
            .iter()
            .map(|clause| clause.matcher(reader))
            .collect::<Result<Vec<_>>>()?;
        let inner = ConjunctionMatcher::new(matchers)?;

        Ok(Box::new(SpanNearMatcher::new(
            inner,
            self.slop,
            self.in_order,
            self.boost,
        )?))
    }

    fn rewrite(&self, reader: &dyn IndexReader) -> Result<Box<dyn Query>> {
        let clauses = self
            .clauses
            .iter()
            .map(|clause| clause.rewrite(reader))
            .collect::<Result<Vec<_>>>()?;
        Ok(Box::new(SpanNearQuery {
            clauses,
            slop: self.slop,
            in_order: self.in_order,
            boost: self.boost,
        }))
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn set_boost(&mut self, boost: f32) {
        self.boost = boost;
    }

    fn description(&self) -> String {
        let clauses: Vec<String> = self.clauses.iter().map(|c| c.description()).collect();
        let description = format!(
            "spanNear([{}], {}, {})",
            clauses.join(", "),
            self.slop,
            self.in_order
        );
        with_boost_suffix(description, self.boost)
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn field(&self) -> Option<&str> {
        self.clauses.first().and_then(|c| c.field())
    }
}

/// Matcher for [`SpanNearQuery`]: a conjunction filtered by position.
#[derive(Debug)]
pub struct SpanNearMatcher {
    inner: ConjunctionMatcher,
    slop: u32,
    in_order: bool,
    boost: f32,
    current_spans: Vec<Span>,
    sloppy_freq: f32,
}

impl SpanNearMatcher {
    /// Wrap an aligned conjunction of the clause matchers.
    pub fn new(inner: ConjunctionMatcher, slop: u32, in_order: bool, boost: f32) -> Result<Self> {
        let mut matcher = SpanNearMatcher {
            inner,
            slop,
            in_order,
            boost,
            current_spans: Vec::new(),
            sloppy_freq: 0.0,
        };
        matcher.find_match()?;
        Ok(matcher)
    }

    /// Advance the conjunction until a document satisfies the proximity
    /// constraint.
    fn find_match(&mut self) -> Result<bool> {
        loop {
            self.current_spans.clear();
            self.sloppy_freq = 0.0;
            if self.inner.is_exhausted() {
                return Ok(false);
            }

            let mut all_clause_spans = Vec::with_capacity(self.inner.sub_matchers().len());
            for clause in self.inner.sub_matchers() {
                let mut spans = Vec::new();
                clause.spans(&mut spans)?;
                spans.sort_by_key(|s| (s.start_position, s.end_position));
                spans.dedup();
                all_clause_spans.push(spans);
            }

            // widest span each clause can still contribute, summed from the back
            let mut max_remaining = vec![0u32; all_clause_spans.len() + 1];
            for (i, spans) in all_clause_spans.iter().enumerate().rev() {
                let widest = spans.iter().map(Span::width).max().unwrap_or(0);
                max_remaining[i] = max_remaining[i + 1] + widest;
            }

            let mut chosen = Vec::with_capacity(all_clause_spans.len());
            let mut matched = Vec::new();
            self.find_near_spans(&all_clause_spans, &max_remaining, &mut chosen, 0, &mut matched);

            if !matched.is_empty() {
                matched.sort_by_key(|s: &Span| (s.start_position, s.end_position, s.start_offset));
                matched.dedup();
                self.current_spans = matched;
                return Ok(true);
            }

            self.inner.next()?;
        }
    }

    /// Find combinations of spans, one per clause, that satisfy the
    /// proximity requirements.
    ///
    /// Clause spans are sorted by start position, so each level only walks
    /// the spans that still fit in the slop left over by the spans chosen so
    /// far. `gaps` is the slop consumed by an ordered prefix.
    fn find_near_spans<'a>(
        &mut self,
        all_clause_spans: &'a [Vec<Span>],
        max_remaining: &[u32],
        chosen: &mut Vec<&'a Span>,
        gaps: u32,
        matched: &mut Vec<Span>,
    ) {
        let clause_index = chosen.len();
        if clause_index == all_clause_spans.len() {
            if let Some(slop_used) = self.slop_used(chosen) {
                self.sloppy_freq = self.sloppy_freq.max(1.0 / (1.0 + slop_used as f32));
                matched.extend(chosen.iter().map(|s| (*s).clone()));
            }
            return;
        }

        let spans = &all_clause_spans[clause_index];
        let Some(&previous) = chosen.last() else {
            for span in spans {
                chosen.push(span);
                self.find_near_spans(all_clause_spans, max_remaining, chosen, 0, matched);
                chosen.pop();
            }
            return;
        };

        if self.in_order {
            let budget = self.slop.saturating_sub(gaps);
            let from = spans.partition_point(|s| s.start_position <= previous.end_position);
            for span in &spans[from..] {
                let gap = span.start_position - previous.end_position - 1;
                if gap > budget {
                    break;
                }
                if span.field != previous.field {
                    continue;
                }
                chosen.push(span);
                self.find_near_spans(all_clause_spans, max_remaining, chosen, gaps + gap, matched);
                chosen.pop();
            }
            return;
        }

        // The final window can be no wider than everything the clauses may
        // cover plus the slop.
        let min_start = chosen.iter().map(|s| s.start_position).min().unwrap_or(0);
        let max_end = chosen.iter().map(|s| s.end_position).max().unwrap_or(0);
        let covered: u32 = chosen.iter().map(|s| s.width()).sum();
        let window = covered + max_remaining[clause_index] + self.slop;

        let lowest_start = (max_end + 1).saturating_sub(window);
        let from = spans.partition_point(|s| s.start_position < lowest_start);
        for span in &spans[from..] {
            if span.start_position >= min_start + window {
                break;
            }
            let width = max_end.max(span.end_position) - min_start.min(span.start_position) + 1;
            if width > window || span.field != previous.field {
                continue;
            }
            chosen.push(span);
            self.find_near_spans(all_clause_spans, max_remaining, chosen, 0, matched);
            chosen.pop();
        }
    }

    /// The number of positions between the spans, or `None` if they overlap
    /// or are too far apart.
    fn slop_used(&self, spans: &[&Span]) -> Option<u32> {
        let mut sorted: Vec<&Span> = spans.to_vec();
        sorted.sort_by_key(|s| s.start_position);

        for pair in sorted.windows(2) {
            if pair[1].start_position <= pair[0].end_position {
                return None;
            }
        }

        let first = sorted.first()?;
        let last_end = sorted.iter().map(|s| s.end_position).max()?;
        let total = last_end - first.start_position + 1;
        let covered: u32 = sorted.iter().map(|s| s.width()).sum();
        let gaps = total.saturating_sub(covered);

        (gaps <= self.slop).then_some(gaps)
    }
}

impl Matcher for SpanNearMatcher {
    fn doc_id(&self) -> u64 {
        self.inner.doc_id()
    }

    fn next(&mut self) -> Result<bool> {
        if self.inner.is_exhausted() {
            return Ok(false);
        }
        self.inner.next()?;
        self.find_match()
    }

    fn skip_to(&mut self, target: u64) -> Result<bool> {
        if self.inner.is_exhausted() {
            return Ok(false);
        }
        if target <= self.inner.doc_id() {
            return Ok(true);
        }
        self.inner.skip_to(target)?;
        self.find_match()
    }

    fn cost(&self) -> u64 {
        self.inner.cost()
    }

    fn is_exhausted(&self) -> bool {
        self.inner.is_exhausted()
    }

    fn term_freq(&self) -> u64 {
        self.current_spans.len() as u64
    }

    fn score(&self) -> f32 {
        if self.inner.is_exhausted() {
            return 0.0;
        }
        self.inner.score() * self.sloppy_freq * self.boost
    }

    fn spans(&self, spans: &mut Vec<Span>) -> Result<()> {
        spans.extend(self.current_spans.iter().cloned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Analyzer, WhitespaceAnalyzer};
    use crate::index::MemoryIndex;
    use crate::query::prefix::PrefixQuery;
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

    fn docs(query: &dyn Query, index: &MemoryIndex) -> Vec<u64> {
        let mut matcher = query.matcher(index).unwrap();
        let mut docs = Vec::new();
        while !matcher.is_exhausted() {
            docs.push(matcher.doc_id());
            matcher.next().unwrap();
        }
        docs
    }

    #[test]
    fn test_phrase() {
        let index = index(&["quick brown fox", "brown quick fox", "quick red brown"]);
        let query = SpanNearQuery::phrase(vec![term("quick"), term("brown")]);

        assert_eq!(docs(&query, &index), vec![0]);
    }

    #[test]
    fn test_slop_and_order() {
        let index = index(&["quick brown fox", "brown quick fox", "quick red brown"]);

        let sloppy = SpanNearQuery::new(vec![term("quick"), term("brown")], 1, true);
        assert_eq!(docs(&sloppy, &index), vec![0, 2]);

        let unordered = SpanNearQuery::new(vec![term("quick"), term("brown")], 0, false);
        assert_eq!(docs(&unordered, &index), vec![0, 1]);
    }

    #[test]
    fn test_long_repetitive_document_stays_fast() {
        let text = vec!["a b c d e"; 400].join(" ");
        let index = index(&[text.as_str()]);
        let phrase = SpanNearQuery::phrase(vec![term("a"), term("b"), term("c"), term("d"), term("e")]);
        let unordered =
            SpanNearQuery::new(vec![term("e"), term("c"), term("a"), term("d"), term("b")], 2, false);

        let start = std::time::Instant::now();
        for query in [&phrase, &unordered] {
            let matcher = query.matcher(&index).unwrap();
            assert_eq!(matcher.doc_id(), 0);
            let mut spans = Vec::new();
            matcher.spans(&mut spans).unwrap();
            assert_eq!(spans.len(), 2000);
        }
        assert!(start.elapsed() < std::time::Duration::from_secs(2));
    }

    #[test]
    fn test_unordered_slop_counts_gaps() {
        let index = index(&["x a y y b", "b z a", "a y y y b"]);
        let query = SpanNearQuery::new(vec![term("b"), term("a")], 2, false);

        assert_eq!(docs(&query, &index), vec![0, 1]);
    }

    #[test]
    fn test_multi_term_clause_reports_each_span() {
        let index = index(&["term1 foo"]);
        let query = SpanNearQuery::new(
            vec![Box::new(PrefixQuery::new("f", "term")), term("foo")],
            0,
            true,
        );

        let matcher = query.matcher(&index).unwrap();
        assert_eq!(matcher.doc_id(), 0);
        assert!(matcher.score() > 0.0);

        let mut spans = Vec::new();
        matcher.spans(&mut spans).unwrap();
        let positions: Vec<(u32, u32)> = spans
            .iter()
            .map(|s| (s.start_position, s.start_offset))
            .collect();
        assert_eq!(positions, vec![(0, 0), (1, 6)]);
        assert_eq!(query.description(), "spanNear([f:term*, f:foo], 0, true)");
    }
}
