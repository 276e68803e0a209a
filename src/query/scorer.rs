//! Scoring implementations for ranking matches.

use std::fmt::Debug;

/// Trait for term scorers.
pub trait Scorer: Send + Debug {
    /// Calculate the score of a term occurring `term_freq` times in a field
    /// holding `field_length` tokens.
    fn score(&self, term_freq: f32, field_length: f32) -> f32;

    /// Get the boost factor for this scorer.
    fn boost(&self) -> f32;

    /// Set the boost factor for this scorer.
    fn set_boost(&mut self, boost: f32);

    /// Get the maximum possible score.
    fn max_score(&self) -> f32;

    /// Get the name of this scorer.
    fn name(&self) -> &'static str;
}

/// BM25 scorer implementation.
#[derive(Debug, Clone)]
pub struct BM25Scorer {
    /// Document frequency of the term.
    doc_freq: u64,
    /// Average field length.
    avg_field_length: f64,
    /// Total number of documents in the index.
    total_docs: u64,
    /// Boost factor.
    boost: f32,
    /// BM25 k1 parameter.
    k1: f32,
    /// BM25 b parameter.
    b: f32,
}

impl BM25Scorer {
    /// Create a new BM25 scorer.
    pub fn new(doc_freq: u64, avg_field_length: f64, total_docs: u64, boost: f32) -> Self {
        Self::with_params(doc_freq, avg_field_length, total_docs, boost, 1.2, 0.75)
    }

    /// Create a new BM25 scorer with custom parameters.
    pub fn with_params(
        doc_freq: u64,
        avg_field_length: f64,
        total_docs: u64,
        boost: f32,
        k1: f32,
        b: f32,
    ) -> Self {
        BM25Scorer {
            doc_freq,
            avg_field_length,
            total_docs,
            boost,
            k1,
            b,
        }
    }

    /// Calculate the IDF (Inverse Document Frequency) component.
    ///
    /// The `1 +` inside the logarithm keeps the weight positive even when a
    /// term occurs in every document, which is the common case for a batch
    /// of one.
    fn idf(&self) -> f32 {
        if self.doc_freq == 0 || self.total_docs == 0 {
            return 0.0;
        }

        let n = self.total_docs as f32;
        let df = self.doc_freq as f32;

        (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
    }

    /// Calculate the TF (Term Frequency) component.
    fn tf(&self, term_freq: f32, field_length: f32) -> f32 {
        if term_freq == 0.0 {
            return 0.0;
        }

        let avg_len = self.avg_field_length as f32;
        let norm_factor = if avg_len > 0.0 {
            1.0 - self.b + self.b * (field_length / avg_len)
        } else {
            1.0
        };

        (term_freq * (self.k1 + 1.0)) / (term_freq + self.k1 * norm_factor)
    }

    /// Get the k1 parameter.
    pub fn k1(&self) -> f32 {
        self.k1
    }

    /// Get the b parameter.
    pub fn b(&self) -> f32 {
        self.b
    }
}

impl Scorer for BM25Scorer {
    fn score(&self, term_freq: f32, field_length: f32) -> f32 {
        if self.doc_freq == 0 || self.total_docs == 0 {
            return 0.0;
        }

        self.boost * self.idf() * self.tf(term_freq, field_length)
    }

    fn boost(&self) -> f32 {
        self.boost
    }

    fn set_boost(&mut self, boost: f32) {
        self.boost = boost;
    }

    fn max_score(&self) -> f32 {
        if self.doc_freq == 0 || self.total_docs == 0 {
            return 0.0;
        }

        self.boost * self.idf() * (self.k1 + 1.0)
    }

    fn name(&self) -> &'static str {
        "BM25"
    }
}
