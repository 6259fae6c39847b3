//! Data models: institutions, extracted records and configuration.

pub mod config;
pub mod institution;
pub mod record;

pub use config::BillscanConfig;
pub use institution::Institution;
pub use record::{ExtractedRecord, StatementFields};
