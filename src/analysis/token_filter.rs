//! Token filters transform the stream produced by a tokenizer.
//!
//! ```text
//! Tokenizer → Lowercase → Index
//! ```

pub mod lowercase;

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for filters that transform token streams.
///
/// Filters must leave positions and offsets of surviving tokens untouched.
pub trait Filter: Send + Sync {
    /// Apply this filter to a token stream.
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream>;

    /// Get the name of this filter.
    fn name(&self) -> &'static str;
}
