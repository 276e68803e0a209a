//! Error types for the Sarissa monitor.
//!
//! All fallible operations return [`Result`], whose error type is the
//! [`SarissaError`] enum. Failures that belong to a single registered query
//! (a query that does not parse, or that fails while being evaluated against
//! a batch) are not reported through this type: they are collected as
//! [`MatchError`](crate::matches::MatchError) values inside the match result.
//!
//! # Examples
//!
//! ```
//! use sarissa_monitor::error::{Result, SarissaError};
//!
//! fn example_operation() -> Result<()> {
//!     Err(SarissaError::invalid_argument("Invalid input"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

/// The main error type for Sarissa monitor operations.
#[derive(Error, Debug)]
pub enum SarissaError {
    /// Analysis-related errors (tokenization, filtering, etc.)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Query evaluation errors
    #[error("Query error: {0}")]
    Query(String),

    /// Query text that cannot be compiled into a structured query
    #[error("Parse error: {0}")]
    Parse(String),

    /// Bad arguments to a call (empty batch, duplicate document ids, bad config)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation not permitted in the current state
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with SarissaError.
pub type Result<T> = std::result::Result<T, SarissaError>;

impl SarissaError {
    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        SarissaError::Analysis(msg.into())
    }

    /// Create a new query error.
    pub fn query<S: Into<String>>(msg: S) -> Self {
        SarissaError::Query(msg.into())
    }

    /// Create a new parse error.
    pub fn parse<S: Into<String>>(msg: S) -> Self {
        SarissaError::Parse(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        SarissaError::InvalidArgument(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        SarissaError::InvalidArgument(format!("Invalid configuration: {}", msg.into()))
    }

    /// Create a new invalid operation error.
    pub fn invalid_operation<S: Into<String>>(msg: S) -> Self {
        SarissaError::InvalidOperation(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        SarissaError::Other(msg.into())
    }

    /// Create a new internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        SarissaError::Other(format!("Internal error: {}", msg.into()))
    }

    /// Whether this error was raised while compiling query text.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, SarissaError::Parse(_))
    }
}
