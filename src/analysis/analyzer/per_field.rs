//! Field-dependent analysis.
//!
//! Monitored documents often mix free text with identifier-like fields.
//! Binding a [`PerFieldAnalyzer`] to a document builder lets each field of
//! an [`InputDocument`](crate::document::InputDocument) be analyzed by name,
//! so a query for `id:AB-1` meets the same token the document produced.

use std::sync::Arc;

use ahash::AHashMap;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Routes each field to its own analyzer, with a fallback for the rest.
///
/// ```
/// use std::sync::Arc;
///
/// use sarissa_monitor::analysis::{KeywordAnalyzer, PerFieldAnalyzer, StandardAnalyzer};
///
/// let analyzer = PerFieldAnalyzer::new(Arc::new(StandardAnalyzer::new().unwrap()))
///     .with_field("id", Arc::new(KeywordAnalyzer::new()));
///
/// let tokens: Vec<_> = analyzer.analyze_field("id", "AB-1").unwrap().collect();
/// assert_eq!(tokens[0].text, "AB-1");
/// ```
#[derive(Clone)]
pub struct PerFieldAnalyzer {
    fallback: Arc<dyn Analyzer>,
    by_field: AHashMap<String, Arc<dyn Analyzer>>,
}

impl std::fmt::Debug for PerFieldAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut fields: Vec<(&str, &str)> = self
            .by_field
            .iter()
            .map(|(field, analyzer)| (field.as_str(), analyzer.name()))
            .collect();
        fields.sort_unstable();
        f.debug_struct("PerFieldAnalyzer")
            .field("fallback", &self.fallback.name())
            .field("fields", &fields)
            .finish()
    }
}

impl PerFieldAnalyzer {
    /// Analyze every field with `fallback` until told otherwise.
    pub fn new(fallback: Arc<dyn Analyzer>) -> Self {
        PerFieldAnalyzer {
            fallback,
            by_field: AHashMap::new(),
        }
    }

    /// Route `field` to `analyzer`, replacing any earlier choice.
    pub fn with_field(mut self, field: impl Into<String>, analyzer: Arc<dyn Analyzer>) -> Self {
        self.by_field.insert(field.into(), analyzer);
        self
    }

    /// The analyzer `field` is routed to.
    pub fn for_field(&self, field: &str) -> &dyn Analyzer {
        self.by_field.get(field).unwrap_or(&self.fallback).as_ref()
    }

    pub fn analyze_field(&self, field: &str, text: &str) -> Result<TokenStream> {
        self.for_field(field).analyze(text)
    }
}

impl Analyzer for PerFieldAnalyzer {
    /// Text analyzed without a field name goes to the fallback.
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.fallback.analyze(text)
    }

    fn name(&self) -> &'static str {
        "per_field"
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
