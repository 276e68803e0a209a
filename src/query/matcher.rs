//! Matcher implementations for query execution.
//!
//! A matcher walks the documents a query selects in increasing doc id order.
//! Every matcher is positioned on its first document when constructed and
//! reports `u64::MAX` once exhausted. Besides doc iteration a matcher exposes
//! the score of the current document and the spans that justified it.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt::Debug;

use crate::error::Result;
use crate::index::reader::{PostingIterator, TermPosition};
use crate::query::scorer::{BM25Scorer, Scorer};

/// A matched region inside one field of the current document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    /// The field the span lies in.
    pub field: String,
    /// First token position of the span.
    pub start_position: u32,
    /// Last token position of the span (inclusive).
    pub end_position: u32,
    /// Byte offset of the span start.
    pub start_offset: u32,
    /// Byte offset of the span end.
    pub end_offset: u32,
}

impl Span {
    /// A span covering a single term occurrence.
    pub fn from_term(field: &str, position: TermPosition) -> Self {
        Span {
            field: field.to_string(),
            start_position: position.position,
            end_position: position.position,
            start_offset: position.start_offset,
            end_offset: position.end_offset,
        }
    }

    /// Number of positions covered by this span.
    pub fn width(&self) -> u32 {
        self.end_position - self.start_position + 1
    }
}

/// Trait for document matchers.
pub trait Matcher: Send + Debug {
    /// Get the current document ID.
    fn doc_id(&self) -> u64;

    /// Move to the next matching document.
    fn next(&mut self) -> Result<bool>;

    /// Skip to the first document >= target.
    fn skip_to(&mut self, target: u64) -> Result<bool>;

    /// Get the cost of iterating through this matcher.
    fn cost(&self) -> u64;

    /// Check if this matcher is exhausted.
    fn is_exhausted(&self) -> bool;

    /// Get the term frequency for the current document.
    fn term_freq(&self) -> u64 {
        if self.is_exhausted() { 0 } else { 1 }
    }

    /// Score of the current document.
    fn score(&self) -> f32;

    /// Append the spans that matched in the current document.
    fn spans(&self, spans: &mut Vec<Span>) -> Result<()>;
}

/// A matcher that matches no documents.
#[derive(Debug, Default)]
pub struct EmptyMatcher;

impl EmptyMatcher {
    /// Create a new empty matcher.
    pub fn new() -> Self {
        EmptyMatcher
    }
}

impl Matcher for EmptyMatcher {
    fn doc_id(&self) -> u64 {
        u64::MAX
    }

    fn next(&mut self) -> Result<bool> {
        Ok(false)
    }

    fn skip_to(&mut self, _target: u64) -> Result<bool> {
        Ok(false)
    }

    fn cost(&self) -> u64 {
        0
    }

    fn is_exhausted(&self) -> bool {
        true
    }

    fn score(&self) -> f32 {
        0.0
    }

    fn spans(&self, _spans: &mut Vec<Span>) -> Result<()> {
        Ok(())
    }
}

/// A matcher that matches all documents with a constant score.
#[derive(Debug)]
pub struct AllMatcher {
    current_doc: u64,
    max_doc: u64,
    score: f32,
}

impl AllMatcher {
    /// Create a new all matcher.
    pub fn new(max_doc: u64) -> Self {
        AllMatcher {
            current_doc: 0,
            max_doc,
            score: 1.0,
        }
    }

    /// Use a constant score other than 1.0.
    pub fn with_score(mut self, score: f32) -> Self {
        self.score = score;
        self
    }
}

impl Matcher for AllMatcher {
    fn doc_id(&self) -> u64 {
        if self.current_doc >= self.max_doc {
            u64::MAX
        } else {
            self.current_doc
        }
    }

    fn next(&mut self) -> Result<bool> {
        if self.current_doc >= self.max_doc {
            Ok(false)
        } else {
            self.current_doc += 1;
            Ok(self.current_doc < self.max_doc)
        }
    }

    fn skip_to(&mut self, target: u64) -> Result<bool> {
        if target >= self.max_doc {
            self.current_doc = self.max_doc;
            Ok(false)
        } else {
            self.current_doc = self.current_doc.max(target);
            Ok(true)
        }
    }

    fn cost(&self) -> u64 {
        self.max_doc
    }

    fn is_exhausted(&self) -> bool {
        self.current_doc >= self.max_doc
    }

    fn score(&self) -> f32 {
        if self.is_exhausted() { 0.0 } else { self.score }
    }

    fn spans(&self, _spans: &mut Vec<Span>) -> Result<()> {
        Ok(())
    }
}

/// A matcher over the posting list of a single term.
#[derive(Debug)]
pub struct PostingMatcher {
    field: String,
    posting_iter: Box<dyn PostingIterator>,
    scorer: BM25Scorer,
    field_lengths: Vec<u64>,
    exhausted: bool,
    cost: u64,
}

impl PostingMatcher {
    /// Create a new posting matcher.
    ///
    /// `field_lengths` holds the field length of every document in the index,
    /// indexed by doc id, for length normalization.
    pub fn new<S: Into<String>>(
        field: S,
        posting_iter: Box<dyn PostingIterator>,
        scorer: BM25Scorer,
        field_lengths: Vec<u64>,
    ) -> Self {
        let cost = posting_iter.cost();
        let exhausted = posting_iter.doc_id() == u64::MAX;
        PostingMatcher {
            field: field.into(),
            posting_iter,
            scorer,
            field_lengths,
            exhausted,
            cost,
        }
    }
}

impl Matcher for PostingMatcher {
    fn doc_id(&self) -> u64 {
        if self.exhausted {
            u64::MAX
        } else {
            self.posting_iter.doc_id()
        }
    }

    fn next(&mut self) -> Result<bool> {
        if self.exhausted {
            return Ok(false);
        }
        let has_next = self.posting_iter.next()?;
        if !has_next {
            self.exhausted = true;
        }
        Ok(has_next)
    }

    fn skip_to(&mut self, target: u64) -> Result<bool> {
        if self.exhausted {
            return Ok(false);
        }
        let found = self.posting_iter.skip_to(target)?;
        if !found {
            self.exhausted = true;
        }
        Ok(found)
    }

    fn cost(&self) -> u64 {
        self.cost
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    fn term_freq(&self) -> u64 {
        if self.exhausted {
            0
        } else {
            self.posting_iter.term_freq()
        }
    }

    fn score(&self) -> f32 {
        if self.exhausted {
            return 0.0;
        }
        let doc = self.posting_iter.doc_id() as usize;
        let field_length = self.field_lengths.get(doc).copied().unwrap_or(0);
        self.scorer
            .score(self.posting_iter.term_freq() as f32, field_length as f32)
    }

    fn spans(&self, spans: &mut Vec<Span>) -> Result<()> {
        if self.exhausted {
            return Ok(());
        }
        for position in self.posting_iter.positions()? {
            spans.push(Span::from_term(&self.field, position));
        }
        Ok(())
    }
}

/// A helper struct for tracking matchers in the disjunction heap.
#[derive(Debug)]
struct MatcherEntry {
    matcher: Box<dyn Matcher>,
}

impl PartialEq for MatcherEntry {
    fn eq(&self, other: &Self) -> bool {
        self.matcher.doc_id() == other.matcher.doc_id()
    }
}

impl Eq for MatcherEntry {}

impl PartialOrd for MatcherEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MatcherEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap: lower doc IDs come first
        other.matcher.doc_id().cmp(&self.matcher.doc_id())
    }
}

/// How a disjunction combines the scores of its matching sub-matchers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreMode {
    /// Sum of all matching clauses.
    Sum,
    /// Best clause plus `tie_breaker` times the others.
    Max {
        /// Weight applied to the non-maximal clause scores.
        tie_breaker: f32,
    },
}

/// A matcher that implements disjunction (OR) of multiple matchers.
#[derive(Debug)]
pub struct DisjunctionMatcher {
    /// Min-heap of active matchers, ordered by current doc_id.
    heap: BinaryHeap<MatcherEntry>,
    current_doc: u64,
    exhausted: bool,
    cost: u64,
    score_mode: ScoreMode,
    minimum_match: usize,
}

impl DisjunctionMatcher {
    /// Create a summing disjunction that needs one clause to match.
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Result<Self> {
        Self::with_options(matchers, ScoreMode::Sum, 1)
    }

    /// Create a disjunction with a score mode and a minimum number of
    /// clauses that must match a document.
    pub fn with_options(
        matchers: Vec<Box<dyn Matcher>>,
        score_mode: ScoreMode,
        minimum_match: usize,
    ) -> Result<Self> {
        let mut heap = BinaryHeap::new();
        let mut cost = 0;

        for matcher in matchers {
            if !matcher.is_exhausted() {
                cost += matcher.cost();
                heap.push(MatcherEntry { matcher });
            }
        }

        let mut disjunction = DisjunctionMatcher {
            heap,
            current_doc: 0,
            exhausted: false,
            cost,
            score_mode,
            minimum_match: minimum_match.max(1),
        };
        disjunction.settle()?;
        Ok(disjunction)
    }

    fn update_current(&mut self) {
        match self.heap.peek() {
            Some(entry) => {
                self.current_doc = entry.matcher.doc_id();
                self.exhausted = false;
            }
            None => {
                self.current_doc = u64::MAX;
                self.exhausted = true;
            }
        }
    }

    fn at_current(&self) -> impl Iterator<Item = &dyn Matcher> {
        let current = self.current_doc;
        self.heap
            .iter()
            .map(|entry| entry.matcher.as_ref())
            .filter(move |m| m.doc_id() == current)
    }

    /// Advance every sub-matcher sitting on the current document.
    fn advance_current(&mut self) -> Result<()> {
        let current_doc = self.current_doc;
        let mut matchers_to_reinsert = Vec::new();

        while self
            .heap
            .peek()
            .is_some_and(|entry| entry.matcher.doc_id() == current_doc)
        {
            if let Some(mut entry) = self.heap.pop() {
                if entry.matcher.next()? && !entry.matcher.is_exhausted() {
                    matchers_to_reinsert.push(entry);
                }
            }
        }

        self.heap.extend(matchers_to_reinsert);
        self.update_current();
        Ok(())
    }

    /// Move forward until the current document satisfies the minimum match.
    fn settle(&mut self) -> Result<bool> {
        loop {
            self.update_current();
            if self.exhausted {
                return Ok(false);
            }
            if self.at_current().count() >= self.minimum_match {
                return Ok(true);
            }
            self.advance_current()?;
        }
    }
}

impl Matcher for DisjunctionMatcher {
    fn doc_id(&self) -> u64 {
        self.current_doc
    }

    fn next(&mut self) -> Result<bool> {
        if self.exhausted {
            return Ok(false);
        }

        self.advance_current()?;
        self.settle()
    }

    fn skip_to(&mut self, target: u64) -> Result<bool> {
        if self.exhausted {
            return Ok(false);
        }
        if target <= self.current_doc {
            return Ok(true);
        }

        let mut matchers_to_reinsert = Vec::new();
        while self
            .heap
            .peek()
            .is_some_and(|entry| entry.matcher.doc_id() < target)
        {
            if let Some(mut entry) = self.heap.pop() {
                if entry.matcher.skip_to(target)? && !entry.matcher.is_exhausted() {
                    matchers_to_reinsert.push(entry);
                }
            }
        }

        self.heap.extend(matchers_to_reinsert);
        self.settle()
    }

    fn cost(&self) -> u64 {
        self.cost
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    fn term_freq(&self) -> u64 {
        if self.exhausted {
            0
        } else {
            self.at_current().map(|m| m.term_freq()).sum()
        }
    }

    fn score(&self) -> f32 {
        if self.exhausted {
            return 0.0;
        }
        let scores = self.at_current().map(|m| m.score());
        match self.score_mode {
            ScoreMode::Sum => scores.sum(),
            ScoreMode::Max { tie_breaker } => {
                let (max, sum) = scores.fold((0.0f32, 0.0f32), |(max, sum), s| (max.max(s), sum + s));
                max + tie_breaker * (sum - max)
            }
        }
    }

    fn spans(&self, spans: &mut Vec<Span>) -> Result<()> {
        if self.exhausted {
            return Ok(());
        }
        for matcher in self.at_current() {
            matcher.spans(spans)?;
        }
        Ok(())
    }
}

/// A matcher that implements conjunction (AND) of multiple matchers.
#[derive(Debug)]
pub struct ConjunctionMatcher {
    /// The matchers that must all match.
    matchers: Vec<Box<dyn Matcher>>,
    current_doc: u64,
    exhausted: bool,
    cost: u64,
}

impl ConjunctionMatcher {
    /// Create a new conjunction matcher from multiple matchers.
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Result<Self> {
        if matchers.is_empty() {
            return Ok(ConjunctionMatcher {
                matchers,
                current_doc: u64::MAX,
                exhausted: true,
                cost: 0,
            });
        }

        let cost = matchers.iter().map(|m| m.cost()).min().unwrap_or(0);
        let mut matcher = ConjunctionMatcher {
            matchers,
            current_doc: 0,
            exhausted: false,
            cost,
        };
        matcher.advance_to_alignment()?;
        Ok(matcher)
    }

    /// The sub-matchers, all positioned on the current document.
    pub fn sub_matchers(&self) -> &[Box<dyn Matcher>] {
        &self.matchers
    }

    fn exhaust(&mut self) -> bool {
        self.exhausted = true;
        self.current_doc = u64::MAX;
        false
    }

    /// Advance all matchers to be aligned on the same document.
    fn advance_to_alignment(&mut self) -> Result<bool> {
        if self.exhausted {
            return Ok(false);
        }

        loop {
            let mut max_doc = 0;
            for matcher in &self.matchers {
                let doc_id = matcher.doc_id();
                if doc_id == u64::MAX {
                    return Ok(self.exhaust());
                }
                max_doc = max_doc.max(doc_id);
            }

            let mut all_aligned = true;
            for matcher in &mut self.matchers {
                if matcher.doc_id() < max_doc {
                    if !matcher.skip_to(max_doc)? {
                        return Ok(self.exhaust());
                    }
                    if matcher.doc_id() != max_doc {
                        all_aligned = false;
                    }
                }
            }

            if all_aligned {
                self.current_doc = max_doc;
                return Ok(true);
            }
        }
    }
}

impl Matcher for ConjunctionMatcher {
    fn doc_id(&self) -> u64 {
        if self.exhausted {
            u64::MAX
        } else {
            self.current_doc
        }
    }

    fn next(&mut self) -> Result<bool> {
        if self.exhausted {
            return Ok(false);
        }

        if !self.matchers[0].next()? {
            return Ok(self.exhaust());
        }

        self.advance_to_alignment()
    }

    fn skip_to(&mut self, target: u64) -> Result<bool> {
        if self.exhausted || target <= self.current_doc {
            return Ok(!self.exhausted);
        }

        if !self.matchers[0].skip_to(target)? {
            return Ok(self.exhaust());
        }

        self.advance_to_alignment()
    }

    fn cost(&self) -> u64 {
        self.cost
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    fn term_freq(&self) -> u64 {
        if self.exhausted {
            0
        } else {
            self.matchers.iter().map(|m| m.term_freq()).sum()
        }
    }

    fn score(&self) -> f32 {
        if self.exhausted {
            return 0.0;
        }
        self.matchers.iter().map(|m| m.score()).sum()
    }

    fn spans(&self, spans: &mut Vec<Span>) -> Result<()> {
        if self.exhausted {
            return Ok(());
        }
        for matcher in &self.matchers {
            matcher.spans(spans)?;
        }
        Ok(())
    }
}

/// A matcher that excludes documents matched by negative matchers.
#[derive(Debug)]
pub struct ConjunctionNotMatcher {
    /// The positive matcher (documents must match this).
    positive: Box<dyn Matcher>,
    /// The negative matchers (documents must NOT match any of these).
    negatives: Vec<Box<dyn Matcher>>,
    current_doc: u64,
    exhausted: bool,
    cost: u64,
}

impl ConjunctionNotMatcher {
    /// Create a new conjunction-not matcher.
    pub fn new(positive: Box<dyn Matcher>, negatives: Vec<Box<dyn Matcher>>) -> Result<Self> {
        let cost = positive.cost();
        let mut matcher = ConjunctionNotMatcher {
            positive,
            negatives,
            current_doc: 0,
            exhausted: false,
            cost,
        };
        matcher.advance_to_next_valid()?;
        Ok(matcher)
    }

    fn is_excluded(&mut self, doc_id: u64) -> Result<bool> {
        for negative in &mut self.negatives {
            if negative.doc_id() < doc_id {
                negative.skip_to(doc_id)?;
            }
            if negative.doc_id() == doc_id {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn advance_to_next_valid(&mut self) -> Result<bool> {
        loop {
            let doc_id = self.positive.doc_id();
            if self.positive.is_exhausted() || doc_id == u64::MAX {
                self.exhausted = true;
                self.current_doc = u64::MAX;
                return Ok(false);
            }

            if !self.is_excluded(doc_id)? {
                self.current_doc = doc_id;
                return Ok(true);
            }

            self.positive.next()?;
        }
    }
}

impl Matcher for ConjunctionNotMatcher {
    fn doc_id(&self) -> u64 {
        if self.exhausted {
            u64::MAX
        } else {
            self.current_doc
        }
    }

    fn next(&mut self) -> Result<bool> {
        if self.exhausted {
            return Ok(false);
        }
        self.positive.next()?;
        self.advance_to_next_valid()
    }

    fn skip_to(&mut self, target: u64) -> Result<bool> {
        if self.exhausted || target <= self.current_doc {
            return Ok(!self.exhausted);
        }
        self.positive.skip_to(target)?;
        self.advance_to_next_valid()
    }

    fn cost(&self) -> u64 {
        self.cost
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    fn term_freq(&self) -> u64 {
        self.positive.term_freq()
    }

    fn score(&self) -> f32 {
        if self.exhausted { 0.0 } else { self.positive.score() }
    }

    fn spans(&self, spans: &mut Vec<Span>) -> Result<()> {
        if self.exhausted {
            return Ok(());
        }
        self.positive.spans(spans)
    }
}

/// A matcher that matches all documents except those matched by the negative matcher.
#[derive(Debug)]
pub struct NotMatcher {
    negative: Box<dyn Matcher>,
    max_doc: u64,
    current_doc: u64,
    exhausted: bool,
}

impl NotMatcher {
    /// Create a new NOT matcher.
    pub fn new(negative: Box<dyn Matcher>, max_doc: u64) -> Result<Self> {
        let mut matcher = NotMatcher {
            negative,
            max_doc,
            current_doc: 0,
            exhausted: false,
        };
        matcher.advance_to_next_valid()?;
        Ok(matcher)
    }

    fn advance_to_next_valid(&mut self) -> Result<bool> {
        while self.current_doc < self.max_doc {
            let neg_doc = self.negative.doc_id();

            if neg_doc > self.current_doc {
                return Ok(true);
            } else if neg_doc == self.current_doc {
                self.current_doc += 1;
            } else {
                self.negative.skip_to(self.current_doc)?;
            }
        }

        self.current_doc = u64::MAX;
        self.exhausted = true;
        Ok(false)
    }
}

impl Matcher for NotMatcher {
    fn doc_id(&self) -> u64 {
        if self.exhausted {
            u64::MAX
        } else {
            self.current_doc
        }
    }

    fn next(&mut self) -> Result<bool> {
        if self.exhausted {
            return Ok(false);
        }
        self.current_doc += 1;
        self.advance_to_next_valid()
    }

    fn skip_to(&mut self, target: u64) -> Result<bool> {
        if self.exhausted || target <= self.current_doc {
            return Ok(!self.exhausted);
        }
        self.current_doc = target;
        self.advance_to_next_valid()
    }

    fn cost(&self) -> u64 {
        self.max_doc
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    fn score(&self) -> f32 {
        if self.exhausted { 0.0 } else { 1.0 }
    }

    fn spans(&self, _spans: &mut Vec<Span>) -> Result<()> {
        Ok(())
    }
}

/// A required matcher whose documents gain score and spans from an
/// optional matcher when it matches the same document.
#[derive(Debug)]
pub struct ReqOptMatcher {
    required: Box<dyn Matcher>,
    optional: Box<dyn Matcher>,
}

impl ReqOptMatcher {
    /// Create a new required/optional matcher.
    pub fn new(required: Box<dyn Matcher>, optional: Box<dyn Matcher>) -> Result<Self> {
        let mut matcher = ReqOptMatcher { required, optional };
        matcher.sync_optional()?;
        Ok(matcher)
    }

    fn sync_optional(&mut self) -> Result<()> {
        let doc = self.required.doc_id();
        if doc != u64::MAX && self.optional.doc_id() < doc {
            self.optional.skip_to(doc)?;
        }
        Ok(())
    }

    fn optional_matches(&self) -> bool {
        !self.required.is_exhausted() && self.optional.doc_id() == self.required.doc_id()
    }
}

impl Matcher for ReqOptMatcher {
    fn doc_id(&self) -> u64 {
        self.required.doc_id()
    }

    fn next(&mut self) -> Result<bool> {
        let found = self.required.next()?;
        self.sync_optional()?;
        Ok(found)
    }

    fn skip_to(&mut self, target: u64) -> Result<bool> {
        let found = self.required.skip_to(target)?;
        self.sync_optional()?;
        Ok(found)
    }

    fn cost(&self) -> u64 {
        self.required.cost()
    }

    fn is_exhausted(&self) -> bool {
        self.required.is_exhausted()
    }

    fn term_freq(&self) -> u64 {
        let optional = if self.optional_matches() { self.optional.term_freq() } else { 0 };
        self.required.term_freq() + optional
    }

    fn score(&self) -> f32 {
        let optional = if self.optional_matches() { self.optional.score() } else { 0.0 };
        self.required.score() + optional
    }

    fn spans(&self, spans: &mut Vec<Span>) -> Result<()> {
        if self.required.is_exhausted() {
            return Ok(());
        }
        self.required.spans(spans)?;
        if self.optional_matches() {
            self.optional.spans(spans)?;
        }
        Ok(())
    }
}

/// Multiplies the score of the wrapped matcher.
#[derive(Debug)]
pub struct BoostMatcher {
    inner: Box<dyn Matcher>,
    boost: f32,
}

impl BoostMatcher {
    /// Wrap a matcher with a boost.
    pub fn new(inner: Box<dyn Matcher>, boost: f32) -> Self {
        BoostMatcher { inner, boost }
    }
}

impl Matcher for BoostMatcher {
    fn doc_id(&self) -> u64 {
        self.inner.doc_id()
    }

    fn next(&mut self) -> Result<bool> {
        self.inner.next()
    }

    fn skip_to(&mut self, target: u64) -> Result<bool> {
        self.inner.skip_to(target)
    }

    fn cost(&self) -> u64 {
        self.inner.cost()
    }

    fn is_exhausted(&self) -> bool {
        self.inner.is_exhausted()
    }

    fn term_freq(&self) -> u64 {
        self.inner.term_freq()
    }

    fn score(&self) -> f32 {
        self.inner.score() * self.boost
    }

    fn spans(&self, spans: &mut Vec<Span>) -> Result<()> {
        self.inner.spans(spans)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A matcher over a fixed doc list, used to exercise the combinators.
    #[derive(Debug)]
    pub(crate) struct VecMatcher {
        docs: Vec<u64>,
        index: usize,
        score: f32,
        field: &'static str,
    }

    impl VecMatcher {
        pub(crate) fn boxed(docs: &[u64]) -> Box<dyn Matcher> {
            Box::new(VecMatcher {
                docs: docs.to_vec(),
                index: 0,
                score: 1.0,
                field: "f",
            })
        }

        pub(crate) fn scored(docs: &[u64], score: f32) -> Box<dyn Matcher> {
            Box::new(VecMatcher {
                docs: docs.to_vec(),
                index: 0,
                score,
                field: "f",
            })
        }
    }

    impl Matcher for VecMatcher {
        fn doc_id(&self) -> u64 {
            self.docs.get(self.index).copied().unwrap_or(u64::MAX)
        }

        fn next(&mut self) -> Result<bool> {
            if self.index < self.docs.len() {
                self.index += 1;
            }
            Ok(self.index < self.docs.len())
        }

        fn skip_to(&mut self, target: u64) -> Result<bool> {
            while self.index < self.docs.len() && self.docs[self.index] < target {
                self.index += 1;
            }
            Ok(self.index < self.docs.len())
        }

        fn cost(&self) -> u64 {
            self.docs.len() as u64
        }

        fn is_exhausted(&self) -> bool {
            self.index >= self.docs.len()
        }

        fn score(&self) -> f32 {
            self.score
        }

        fn spans(&self, spans: &mut Vec<Span>) -> Result<()> {
            let doc = self.doc_id() as u32;
            spans.push(Span::from_term(self.field, TermPosition::new(doc, doc, doc + 1)));
            Ok(())
        }
    }

    fn collect(matcher: &mut dyn Matcher) -> Vec<u64> {
        let mut docs = Vec::new();
        while !matcher.is_exhausted() {
            docs.push(matcher.doc_id());
            matcher.next().unwrap();
        }
        docs
    }

    #[test]
    fn test_empty_matcher() {
        let mut matcher = EmptyMatcher::new();

        assert_eq!(matcher.doc_id(), u64::MAX);
        assert!(matcher.is_exhausted());
        assert_eq!(matcher.cost(), 0);
        assert!(!matcher.next().unwrap());
        assert!(!matcher.skip_to(5).unwrap());
    }

    #[test]
    fn test_all_matcher() {
        let mut matcher = AllMatcher::new(5);

        assert_eq!(matcher.doc_id(), 0);
        assert!(!matcher.is_exhausted());
        assert_eq!(matcher.cost(), 5);

        assert!(matcher.next().unwrap());
        assert_eq!(matcher.doc_id(), 1);

        assert!(matcher.skip_to(4).unwrap());
        assert_eq!(matcher.doc_id(), 4);

        assert!(!matcher.skip_to(10).unwrap());
        assert_eq!(matcher.doc_id(), u64::MAX);
        assert!(matcher.is_exhausted());
    }

    #[test]
    fn test_disjunction_matcher() {
        let mut matcher = DisjunctionMatcher::new(vec![
            VecMatcher::boxed(&[1, 3, 5]),
            VecMatcher::boxed(&[2, 3, 6]),
        ])
        .unwrap();

        assert_eq!(matcher.doc_id(), 1);
        matcher.next().unwrap();
        matcher.next().unwrap();
        assert_eq!(matcher.doc_id(), 3);
        assert_eq!(matcher.score(), 2.0);

        let mut spans = Vec::new();
        matcher.spans(&mut spans).unwrap();
        assert_eq!(spans.len(), 2);

        assert!(matcher.skip_to(6).unwrap());
        assert_eq!(matcher.doc_id(), 6);
        assert!(!matcher.next().unwrap());
    }

    #[test]
    fn test_disjunction_minimum_match_and_max_score() {
        let mut matcher = DisjunctionMatcher::with_options(
            vec![
                VecMatcher::scored(&[1, 2, 3], 1.0),
                VecMatcher::scored(&[2, 3], 3.0),
                VecMatcher::scored(&[3], 2.0),
            ],
            ScoreMode::Max { tie_breaker: 0.5 },
            2,
        )
        .unwrap();

        assert_eq!(matcher.doc_id(), 2);
        assert_eq!(matcher.score(), 3.5);
        matcher.next().unwrap();
        assert_eq!(matcher.doc_id(), 3);
        assert_eq!(matcher.score(), 4.5);
        assert!(!matcher.next().unwrap());
    }

    #[test]
    fn test_conjunction_matcher() {
        let mut matcher = ConjunctionMatcher::new(vec![
            VecMatcher::boxed(&[1, 2, 4, 7]),
            VecMatcher::boxed(&[2, 3, 7, 9]),
        ])
        .unwrap();

        assert_eq!(collect(&mut matcher), vec![2, 7]);
    }

    #[test]
    fn test_conjunction_not_matcher() {
        let mut matcher = ConjunctionNotMatcher::new(
            VecMatcher::boxed(&[0, 1, 2, 3, 4]),
            vec![VecMatcher::boxed(&[1, 3])],
        )
        .unwrap();

        assert_eq!(collect(&mut matcher), vec![0, 2, 4]);
    }

    #[test]
    fn test_not_matcher() {
        let mut matcher = NotMatcher::new(VecMatcher::boxed(&[0, 2]), 4).unwrap();
        assert_eq!(collect(&mut matcher), vec![1, 3]);
    }

    #[test]
    fn test_req_opt_matcher() {
        let mut matcher = ReqOptMatcher::new(
            VecMatcher::scored(&[1, 2], 1.0),
            VecMatcher::scored(&[2, 5], 2.0),
        )
        .unwrap();

        assert_eq!(matcher.doc_id(), 1);
        assert_eq!(matcher.score(), 1.0);
        matcher.next().unwrap();
        assert_eq!(matcher.score(), 3.0);

        let mut spans = Vec::new();
        matcher.spans(&mut spans).unwrap();
        assert_eq!(spans.len(), 2);
        assert!(!matcher.next().unwrap());
    }

    #[test]
    fn test_boost_matcher() {
        let matcher = BoostMatcher::new(VecMatcher::scored(&[0], 2.0), 1.5);
        assert_eq!(matcher.score(), 3.0);
    }
}
