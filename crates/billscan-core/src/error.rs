//! Error types for the billscan-core library.
//!
//! None of these ever reach a caller of [`crate::StatementProcessor`]: per-document
//! failures collapse into [`crate::Outcome::Rejected`]. They exist for the adapter
//! internals, catalog construction and configuration handling.

use thiserror::Error;

/// Main error type for the billscan library.
#[derive(Error, Debug)]
pub enum BillscanError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Pattern catalog construction error.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to PDF decoding and decryption.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF structure.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// The supplied password did not decrypt the document.
    #[error("failed to decrypt PDF: {0}")]
    Decrypt(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The text decoder panicked on this document.
    #[error("text decoder aborted: {0}")]
    DecoderPanic(String),

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Errors raised while building a pattern catalog.
///
/// These are programmer errors in profile definitions and surface once, when the
/// catalog is constructed, never while processing a document.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// A strategy pattern failed to compile.
    #[error("invalid pattern for {institution}/{field} #{index}: {source}")]
    InvalidPattern {
        institution: String,
        field: String,
        index: usize,
        #[source]
        source: regex::Error,
    },

    /// A strategy pattern has no capture group to take the value from.
    #[error("pattern for {institution}/{field} #{index} has no capture group")]
    MissingGroup {
        institution: String,
        field: String,
        index: usize,
    },

    /// Two profiles were registered for the same institution.
    #[error("duplicate profile for {0}")]
    DuplicateProfile(String),
}

/// Errors related to configuration files.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Could not read or write the file.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file content is not a valid configuration.
    #[error("invalid configuration in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// An institution key in the configuration is not in the catalog's closed set.
    #[error("unknown institution key: {0}")]
    UnknownInstitution(String),
}

/// Result type for the billscan library.
pub type Result<T> = std::result::Result<T, BillscanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_conversions() {
        let err: BillscanError = PdfError::Decrypt("wrong password".to_string()).into();
        assert!(matches!(err, BillscanError::Pdf(PdfError::Decrypt(_))));
        assert_eq!(err.to_string(), "PDF error: failed to decrypt PDF: wrong password");

        let err: BillscanError = ConfigError::UnknownInstitution("citi".to_string()).into();
        assert_eq!(
            err.to_string(),
            "configuration error: unknown institution key: citi"
        );
    }

    #[test]
    fn test_catalog_error_keeps_source() {
        let source = regex::Regex::new("(").unwrap_err();
        let err = CatalogError::InvalidPattern {
            institution: "hdfc".to_string(),
            field: "due_date".to_string(),
            index: 2,
            source,
        };
        assert!(err.to_string().starts_with("invalid pattern for hdfc/due_date #2"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
