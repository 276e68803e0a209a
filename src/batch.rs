//! Short-lived index over the documents of one match run.

use std::collections::HashSet;

use crate::document::InputDocument;
use crate::error::{Result, SarissaError};
use crate::index::memory::MemoryIndex;
use crate::index::reader::IndexReader;

/// One or more documents analyzed into a single searchable index.
///
/// Internal document ids are batch-local positions starting at zero; only the
/// external ids returned by [`DocumentBatch::resolve_doc_id`] survive the
/// batch.
#[derive(Debug)]
pub struct DocumentBatch {
    index: MemoryIndex,
    doc_ids: Vec<String>,
}

impl DocumentBatch {
    /// Analyze and index `docs`.
    ///
    /// Fails with `InvalidArgument` when `docs` is empty or two documents
    /// share an id.
    pub fn new<I>(docs: I) -> Result<Self>
    where
        I: IntoIterator<Item = InputDocument>,
    {
        let mut builder = MemoryIndex::builder();
        let mut doc_ids = Vec::new();
        let mut seen = HashSet::new();

        for doc in docs {
            if !seen.insert(doc.id().to_string()) {
                return Err(SarissaError::invalid_argument(format!(
                    "duplicate document id '{}' in batch",
                    doc.id()
                )));
            }

            let internal = builder.add_document();
            for field in doc.fields() {
                builder.add_field(internal, field.name(), field.analyze()?);
            }
            doc_ids.push(doc.id().to_string());
        }

        if doc_ids.is_empty() {
            return Err(SarissaError::invalid_argument(
                "cannot match an empty document batch",
            ));
        }

        Ok(DocumentBatch {
            index: builder.build(),
            doc_ids,
        })
    }

    /// Read-only search access to the batch.
    pub fn searcher(&self) -> &dyn IndexReader {
        &self.index
    }

    /// External id of the document at `internal` position.
    pub fn resolve_doc_id(&self, internal: u64) -> Option<&str> {
        self.doc_ids.get(internal as usize).map(String::as_str)
    }

    /// Number of documents in the batch.
    pub fn len(&self) -> usize {
        self.doc_ids.len()
    }

    /// Always false; construction rejects empty batches.
    pub fn is_empty(&self) -> bool {
        self.doc_ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_resolves_ids() {
        let batch = DocumentBatch::new(vec![
            InputDocument::builder("a").add_text("body", "hello world").build(),
            InputDocument::builder("b").add_text("body", "hello there").build(),
        ])
        .unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.resolve_doc_id(0), Some("a"));
        assert_eq!(batch.resolve_doc_id(1), Some("b"));
        assert_eq!(batch.resolve_doc_id(2), None);

        let reader = batch.searcher();
        assert_eq!(reader.doc_count(), 2);
        assert_eq!(reader.term_doc_freq("body", "hello").unwrap(), 2);
        assert_eq!(reader.term_doc_freq("body", "there").unwrap(), 1);
    }

    #[test]
    fn test_batch_rejects_bad_input() {
        let err = DocumentBatch::new(Vec::new()).unwrap_err();
        assert!(matches!(err, SarissaError::InvalidArgument(_)));

        let err = DocumentBatch::new(vec![
            InputDocument::builder("a").add_text("body", "x").build(),
            InputDocument::builder("a").add_text("body", "y").build(),
        ])
        .unwrap_err();
        assert!(matches!(err, SarissaError::InvalidArgument(_)));
    }

    #[test]
    fn test_document_without_fields_still_counts() {
        let batch = DocumentBatch::new(vec![InputDocument::new("empty")]).unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.searcher().max_doc(), 1);
    }
}
