//! Statement field extraction: catalog, extractor, normalizer, validator and
//! the processor tying them together.

pub mod catalog;
pub mod extractor;
mod patterns;
pub mod processor;
pub mod rules;
pub mod validator;

pub use catalog::{Catalog, Field, InstitutionProfile, ProfileSpec, Strategy};
pub use extractor::{FieldExtractor, FieldTrace, RawFields};
pub use processor::{Document, Outcome, Stage, StatementProcessor};
pub use validator::{ValidationWindow, Validator, Verdict};
