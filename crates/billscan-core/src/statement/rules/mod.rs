//! Normalization of raw matched substrings into typed values.

pub mod amounts;
pub mod dates;

pub use amounts::normalize_amount;
pub use dates::{DATE_FORMATS, normalize_date};

use tracing::debug;

use super::catalog::Field;
use super::extractor::RawFields;
use crate::models::record::StatementFields;

/// Normalize every raw value. A value that fails to parse becomes absent.
pub fn normalize(raw: &RawFields) -> StatementFields {
    let date = |field: Field| {
        let value = raw.get(field)?;
        let parsed = normalize_date(value);
        if parsed.is_none() {
            debug!("{} {:?} is not a known date format", field, value);
        }
        parsed
    };
    let amount = |field: Field| {
        let value = raw.get(field)?;
        let parsed = normalize_amount(value);
        if parsed.is_none() {
            debug!("{} {:?} is not a valid amount", field, value);
        }
        parsed
    };

    StatementFields {
        card_last4: raw
            .get(Field::CardNumber)
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string),
        statement_date: date(Field::StatementDate),
        due_date: date(Field::DueDate),
        total_due: amount(Field::TotalDue),
        min_due: amount(Field::MinDue),
        credit_limit: amount(Field::CreditLimit),
        available_limit: amount(Field::AvailableLimit),
    }
}
