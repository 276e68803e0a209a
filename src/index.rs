//! Ephemeral positional index over a document batch.
//!
//! Queries are evaluated through the [`IndexReader`] trait; the only
//! implementation is [`MemoryIndex`], which is built once per batch and
//! dropped when the match call returns.

pub mod memory;
pub mod reader;

pub use memory::{MemoryIndex, MemoryIndexBuilder, MemoryPostingIterator};
pub use reader::{FieldStats, IndexReader, PostingIterator, TermInfo, TermPosition};
