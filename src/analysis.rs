//! Text analysis for input documents.
//!
//! Analysis turns the raw text of a document field into an ordered stream of
//! tokens carrying position and byte-offset information. Positions drive
//! proximity matching and offsets drive highlighting, so every analyzer in
//! this module preserves both.

pub mod analyzer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;

pub use analyzer::{
    Analyzer, KeywordAnalyzer, PerFieldAnalyzer, PipelineAnalyzer, StandardAnalyzer,
    WhitespaceAnalyzer,
};
pub use token::{Token, TokenStream};
pub use token_filter::Filter;
pub use tokenizer::Tokenizer;
