//! Input documents submitted for matching.
//!
//! An [`InputDocument`] is an id plus named text fields, each bound to the
//! analyzer that will tokenize it when the document joins a batch. Analysis
//! itself is deferred to [`DocumentBatch`](crate::batch::DocumentBatch)
//! construction.

use std::fmt;
use std::sync::Arc;

use crate::analysis::analyzer::{Analyzer, PerFieldAnalyzer, WhitespaceAnalyzer};
use crate::analysis::token::TokenStream;
use crate::error::Result;

/// One named text field of an input document.
#[derive(Clone)]
pub struct InputField {
    name: String,
    text: String,
    analyzer: Arc<dyn Analyzer>,
}

impl InputField {
    /// Create a field bound to the given analyzer.
    pub fn new<S: Into<String>, T: Into<String>>(
        name: S,
        text: T,
        analyzer: Arc<dyn Analyzer>,
    ) -> Self {
        InputField {
            name: name.into(),
            text: text.into(),
            analyzer,
        }
    }

    /// The field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The raw field text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The analyzer bound to this field.
    pub fn analyzer(&self) -> &Arc<dyn Analyzer> {
        &self.analyzer
    }

    /// Run the bound analyzer over the field text.
    ///
    /// A [`PerFieldAnalyzer`] is consulted with the field name.
    pub fn analyze(&self) -> Result<TokenStream> {
        match self.analyzer.as_any().downcast_ref::<PerFieldAnalyzer>() {
            Some(per_field) => per_field.analyze_field(&self.name, &self.text),
            None => self.analyzer.analyze(&self.text),
        }
    }
}

impl fmt::Debug for InputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputField")
            .field("name", &self.name)
            .field("text", &self.text)
            .field("analyzer", &self.analyzer.name())
            .finish()
    }
}

/// A document to be tested against the registered queries.
#[derive(Clone, Debug)]
pub struct InputDocument {
    id: String,
    fields: Vec<InputField>,
}

impl InputDocument {
    /// Create a document with no fields.
    pub fn new<S: Into<String>>(id: S) -> Self {
        InputDocument {
            id: id.into(),
            fields: Vec::new(),
        }
    }

    /// Create a builder for a document with the given id.
    pub fn builder<S: Into<String>>(id: S) -> InputDocumentBuilder {
        InputDocumentBuilder::new(id)
    }

    /// Add a field, replacing any existing field with the same name.
    pub fn add_field(&mut self, field: InputField) {
        match self.fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
    }

    /// The document id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get a field by name.
    pub fn get_field(&self, name: &str) -> Option<&InputField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// All fields in insertion order.
    pub fn fields(&self) -> &[InputField] {
        &self.fields
    }

    /// Get the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the document has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A builder for constructing input documents in a fluent manner.
///
/// ```
/// use std::sync::Arc;
///
/// use sarissa_monitor::analysis::StandardAnalyzer;
/// use sarissa_monitor::document::InputDocument;
///
/// let doc = InputDocument::builder("doc1")
///     .add_text("title", "Rust in Action")
///     .with_analyzer(Arc::new(StandardAnalyzer::new().unwrap()))
///     .add_text("body", "Ownership, Borrowing")
///     .build();
///
/// assert_eq!(doc.id(), "doc1");
/// assert_eq!(doc.len(), 2);
/// assert_eq!(doc.get_field("body").unwrap().analyzer().name(), "standard");
/// ```
pub struct InputDocumentBuilder {
    document: InputDocument,
    analyzer: Arc<dyn Analyzer>,
}

impl InputDocumentBuilder {
    /// Create a new builder. Text fields default to whitespace analysis.
    pub fn new<S: Into<String>>(id: S) -> Self {
        InputDocumentBuilder {
            document: InputDocument::new(id),
            analyzer: Arc::new(WhitespaceAnalyzer::new()),
        }
    }

    /// Set the analyzer used by subsequent [`add_text`](Self::add_text) calls.
    pub fn with_analyzer(mut self, analyzer: Arc<dyn Analyzer>) -> Self {
        self.analyzer = analyzer;
        self
    }

    /// Add a text field analyzed with the current analyzer.
    pub fn add_text<S: Into<String>, T: Into<String>>(mut self, name: S, text: T) -> Self {
        let field = InputField::new(name, text, Arc::clone(&self.analyzer));
        self.document.add_field(field);
        self
    }

    /// Add a text field with an explicit analyzer.
    pub fn add_field<S: Into<String>, T: Into<String>>(
        mut self,
        name: S,
        text: T,
        analyzer: Arc<dyn Analyzer>,
    ) -> Self {
        self.document.add_field(InputField::new(name, text, analyzer));
        self
    }

    /// Build the final document.
    pub fn build(self) -> InputDocument {
        self.document
    }
}
