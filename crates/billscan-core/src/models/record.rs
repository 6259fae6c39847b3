//! Statement data models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::institution::Institution;

/// Billing facts accepted from one statement document.
///
/// Built once by the statement processor after validation; it is never mutated
/// by the core afterwards. Dates serialize as `YYYY-MM-DD`, amounts as plain
/// decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    /// Issuer the statement was parsed with.
    pub institution: Institution,

    /// Identifying suffix of the card number (usually four digits, may carry
    /// issuer-specific masking characters).
    pub card_last4: String,

    /// Billing-cycle close date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement_date: Option<NaiveDate>,

    /// Payment deadline.
    pub due_date: NaiveDate,

    /// Total amount due.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_due: Option<Decimal>,

    /// Minimum amount due.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_due: Option<Decimal>,

    /// Total credit limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_limit: Option<Decimal>,

    /// Available credit limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_limit: Option<Decimal>,
}

impl ExtractedRecord {
    /// The date identifying this billing cycle: the statement date, or the due
    /// date when the issuer's layout does not expose one.
    pub fn cycle_date(&self) -> NaiveDate {
        self.statement_date.unwrap_or(self.due_date)
    }
}

/// Normalized but not yet validated field values for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementFields {
    pub card_last4: Option<String>,
    pub statement_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub total_due: Option<Decimal>,
    pub min_due: Option<Decimal>,
    pub credit_limit: Option<Decimal>,
    pub available_limit: Option<Decimal>,
}

impl StatementFields {
    /// Turn validated fields into a record. Returns `None` if a mandatory
    /// field is missing.
    pub fn into_record(self, institution: Institution) -> Option<ExtractedRecord> {
        let card_last4 = self.card_last4.filter(|c| !c.trim().is_empty())?;
        let due_date = self.due_date?;

        Some(ExtractedRecord {
            institution,
            card_last4,
            statement_date: self.statement_date,
            due_date,
            total_due: self.total_due,
            min_due: self.min_due,
            credit_limit: self.credit_limit,
            available_limit: self.available_limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_into_record_requires_mandatory_fields() {
        let fields = StatementFields {
            card_last4: Some("5678".to_string()),
            ..Default::default()
        };
        assert!(fields.into_record(Institution::Icici).is_none());

        let fields = StatementFields {
            card_last4: Some("  ".to_string()),
            due_date: Some(date(2024, 2, 5)),
            ..Default::default()
        };
        assert!(fields.into_record(Institution::Icici).is_none());
    }

    #[test]
    fn test_cycle_date_falls_back_to_due_date() {
        let fields = StatementFields {
            card_last4: Some("5678".to_string()),
            due_date: Some(date(2024, 2, 5)),
            ..Default::default()
        };
        let record = fields.into_record(Institution::Sbi).unwrap();
        assert_eq!(record.cycle_date(), date(2024, 2, 5));
    }

    #[test]
    fn test_record_serializes_canonical_forms() {
        let record = ExtractedRecord {
            institution: Institution::Kotak,
            card_last4: "1234".to_string(),
            statement_date: Some(date(2024, 1, 15)),
            due_date: date(2024, 2, 5),
            total_due: Some(Decimal::new(1234500, 2)),
            min_due: None,
            credit_limit: None,
            available_limit: None,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["institution"], "kotak");
        assert_eq!(json["statement_date"], "2024-01-15");
        assert_eq!(json["due_date"], "2024-02-05");
        assert_eq!(json["total_due"], "12345.00");
        assert!(json.get("min_due").is_none());
    }
}
