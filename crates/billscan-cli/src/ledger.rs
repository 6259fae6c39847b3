//! JSON ledger of accepted statement records.

use std::fs;
use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use billscan_core::ExtractedRecord;

/// One recorded statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Whose statement this is.
    pub subject: String,
    pub record: ExtractedRecord,
}

impl LedgerEntry {
    fn key(&self) -> (&str, &str, NaiveDate) {
        (
            &self.subject,
            &self.record.card_last4,
            self.record.cycle_date(),
        )
    }
}

/// Records keyed by subject, card and billing cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    entries: Vec<LedgerEntry>,
}

impl Ledger {
    /// Load a ledger. A missing file is an empty ledger.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            debug!("No ledger at {}, starting empty", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read ledger {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid ledger file {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("Failed to write ledger {}", path.display()))
    }

    /// Insert unless a record for the same subject, card and cycle exists.
    /// Returns whether the record was added.
    pub fn insert(&mut self, subject: &str, record: ExtractedRecord) -> bool {
        let entry = LedgerEntry {
            subject: subject.to_string(),
            record,
        };
        if self.entries.iter().any(|e| e.key() == entry.key()) {
            debug!(
                "Ledger already holds {} card {} for {}",
                subject,
                entry.record.card_last4,
                entry.record.cycle_date()
            );
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Records for `subject`, ordered by due date.
    pub fn for_subject(&self, subject: &str) -> Vec<&ExtractedRecord> {
        let mut records: Vec<_> = self
            .entries
            .iter()
            .filter(|e| e.subject == subject)
            .map(|e| &e.record)
            .collect();
        records.sort_by_key(|r| r.due_date);
        records
    }

    pub fn subjects(&self) -> Vec<&str> {
        let mut subjects: Vec<_> = self.entries.iter().map(|e| e.subject.as_str()).collect();
        subjects.sort_unstable();
        subjects.dedup();
        subjects
    }

    pub fn record_count(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use billscan_core::Institution;
    use pretty_assertions::assert_eq;

    fn record(card: &str, statement: Option<NaiveDate>, due: NaiveDate) -> ExtractedRecord {
        ExtractedRecord {
            institution: Institution::Sbi,
            card_last4: card.to_string(),
            statement_date: statement,
            due_date: due,
            total_due: None,
            min_due: None,
            credit_limit: None,
            available_limit: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_insert_if_absent() {
        let mut ledger = Ledger::default();
        let jan = record("1234", Some(date(2024, 1, 15)), date(2024, 2, 5));

        assert!(ledger.insert("alice", jan.clone()));
        assert!(!ledger.insert("alice", jan.clone()));
        assert!(ledger.insert("bob", jan.clone()));
        assert!(ledger.insert("alice", record("9999", Some(date(2024, 1, 15)), date(2024, 2, 5))));
        assert_eq!(ledger.record_count(), 3);
    }

    #[test]
    fn test_missing_statement_date_keys_on_due_date() {
        let mut ledger = Ledger::default();

        assert!(ledger.insert("alice", record("1234", None, date(2024, 2, 5))));
        assert!(!ledger.insert("alice", record("1234", None, date(2024, 2, 5))));
        assert!(!ledger.insert("alice", record("1234", Some(date(2024, 2, 5)), date(2024, 2, 20))));
        assert!(ledger.insert("alice", record("1234", None, date(2024, 3, 5))));
    }

    #[test]
    fn test_for_subject_sorted_by_due_date() {
        let mut ledger = Ledger::default();
        ledger.insert("alice", record("1111", None, date(2024, 3, 5)));
        ledger.insert("bob", record("2222", None, date(2024, 1, 5)));
        ledger.insert("alice", record("3333", None, date(2024, 2, 5)));

        let cards: Vec<_> = ledger
            .for_subject("alice")
            .iter()
            .map(|r| r.card_last4.as_str())
            .collect();
        assert_eq!(cards, vec!["3333", "1111"]);
        assert_eq!(ledger.subjects(), vec!["alice", "bob"]);
    }

    #[test]
    fn test_save_and_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ledger.json");

        assert_eq!(Ledger::open(&path).unwrap().record_count(), 0);

        let mut ledger = Ledger::default();
        ledger.insert("alice", record("1234", Some(date(2024, 1, 15)), date(2024, 2, 5)));
        ledger.save(&path).unwrap();

        let loaded = Ledger::open(&path).unwrap();
        assert_eq!(loaded.for_subject("alice"), ledger.for_subject("alice"));
    }
}
