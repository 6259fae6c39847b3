//! Core library for credit card statement extraction.
//!
//! This crate provides:
//! - PDF decryption and text extraction with ordered password candidates
//! - A per-institution pattern catalog with ordered fallback strategies
//! - Date and amount normalization
//! - Plausibility validation of the extracted billing facts
//!
//! [`StatementProcessor`] runs all of these for one document and yields either
//! an accepted [`ExtractedRecord`] or nothing.

pub mod error;
pub mod models;
pub mod pdf;
pub mod statement;

pub use error::{BillscanError, Result};
pub use models::{BillscanConfig, ExtractedRecord, Institution, StatementFields};
pub use pdf::{PdfTextExtractor, TextExtractor};
pub use statement::{
    Catalog, Document, Field, FieldExtractor, Outcome, StatementProcessor, ValidationWindow,
    Validator, Verdict,
};
