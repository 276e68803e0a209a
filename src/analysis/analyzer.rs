//! Analyzers combine a tokenizer with filters into a complete pipeline.
//!
//! ```text
//! Raw Text → Analyzer → Token Stream → Index
//!             ↓
//!         Tokenizer
//!             ↓
//!         Filter 1 .. N
//! ```
//!
//! Available implementations:
//!
//! - [`StandardAnalyzer`] - regex word tokenizer with lowercasing
//! - [`WhitespaceAnalyzer`] - whitespace tokenizer, text kept as-is
//! - [`KeywordAnalyzer`] - entire input as one token
//! - [`PipelineAnalyzer`] - custom tokenizer + filter chains
//! - [`PerFieldAnalyzer`] - different analyzers per field
//!
//! # Examples
//!
//! ```
//! use sarissa_monitor::analysis::{Analyzer, StandardAnalyzer};
//!
//! let analyzer = StandardAnalyzer::new().unwrap();
//! let tokens: Vec<_> = analyzer.analyze("Hello World").unwrap().collect();
//!
//! assert_eq!(tokens[0].text, "hello");
//! assert_eq!(tokens[1].text, "world");
//! ```

pub mod keyword;
pub mod per_field;
pub mod pipeline;
pub mod standard;
pub mod whitespace;

pub use keyword::KeywordAnalyzer;
pub use per_field::PerFieldAnalyzer;
pub use pipeline::PipelineAnalyzer;
pub use standard::StandardAnalyzer;
pub use whitespace::WhitespaceAnalyzer;

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for analyzers that convert text into processed tokens.
///
/// The trait requires `Send + Sync` so analyzers can be shared between the
/// documents of a batch and across matching threads.
pub trait Analyzer: Send + Sync {
    /// Analyze the given text and return a stream of tokens.
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this analyzer (for debugging and logging).
    fn name(&self) -> &'static str;

    /// Provide access to the concrete type for downcasting.
    fn as_any(&self) -> &dyn std::any::Any;
}
