//! Document content extraction.
//!
//! Profile pages often link a CV as PDF or Word. Reading those documents is
//! not implemented: [`extract_document_text`] is the hook where a parser
//! would plug in, and today it always reports [`DocumentError::Unsupported`].

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("content extraction is not supported for {reference}")]
    Unsupported { reference: String },
}

/// Extract the plain text of the document at `reference`.
pub fn extract_document_text(reference: &str) -> Result<String, DocumentError> {
    Err(DocumentError::Unsupported {
        reference: reference.to_string(),
    })
}
