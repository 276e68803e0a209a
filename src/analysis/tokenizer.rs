//! Tokenizers split raw field text into positioned tokens.
//!
//! - [`whitespace::WhitespaceTokenizer`] - splits on Unicode whitespace
//! - [`regex::RegexTokenizer`] - extracts tokens matching a pattern (`\w+` by default)
//!
//! ```
//! use sarissa_monitor::analysis::tokenizer::Tokenizer;
//! use sarissa_monitor::analysis::tokenizer::whitespace::WhitespaceTokenizer;
//!
//! let tokenizer = WhitespaceTokenizer::new();
//! let tokens: Vec<_> = tokenizer.tokenize("Hello world").unwrap().collect();
//! assert_eq!(tokens.len(), 2);
//! assert_eq!(tokens[1].start_offset, 6);
//! ```

pub mod regex;
pub mod whitespace;

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for tokenizers that convert text into tokens.
///
/// Implementations must report byte offsets into the input exactly, since
/// highlight hits are expressed in those offsets.
pub trait Tokenizer: Send + Sync {
    /// Tokenize the given text into a stream of tokens.
    fn tokenize(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this tokenizer.
    fn name(&self) -> &'static str;
}
