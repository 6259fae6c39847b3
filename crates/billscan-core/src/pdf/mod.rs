//! Decryption and text extraction for statement PDFs.

mod extractor;

pub use extractor::PdfTextExtractor;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Turns an (optionally encrypted) document into plain text.
///
/// Implementations never report errors: a wrong password, a corrupted stream
/// and an empty document all yield `None`. Retrying other passwords is up to
/// the caller.
pub trait TextExtractor {
    /// Extract the document's text using `password`.
    fn extract_text(&self, document: &[u8], password: &str) -> Option<String>;
}

impl<T: TextExtractor + ?Sized> TextExtractor for &T {
    fn extract_text(&self, document: &[u8], password: &str) -> Option<String> {
        (**self).extract_text(document, password)
    }
}
