//! Configuration structures for statement processing and its collaborators.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::institution::Institution;
use crate::statement::ValidationWindow;

/// Main configuration for billscan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BillscanConfig {
    /// PDF text extraction configuration.
    pub pdf: PdfConfig,

    /// Plausibility window applied to due dates.
    pub validation: ValidationWindow,

    /// Sender rules mapping statement origins to institutions, tried in order.
    pub senders: Vec<SenderRule>,

    /// Password candidates per subject, keyed by institution key.
    pub subjects: BTreeMap<String, BTreeMap<String, PasswordSpec>>,

    /// Record ledger configuration.
    pub ledger: LedgerConfig,
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Minimum number of non-whitespace characters for a text strategy to count
    /// as successful.
    pub min_text_chars: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self { min_text_chars: 1 }
    }
}

/// Maps a sender address fragment (usually a domain) to an institution key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderRule {
    /// Fragment searched for in the lowercased sender string.
    pub domain: String,
    /// Institution key, e.g. `"sbi"`.
    pub institution: String,
}

/// One password or an ordered list of candidates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PasswordSpec {
    One(String),
    Many(Vec<String>),
}

impl PasswordSpec {
    /// Candidates in the order they should be tried.
    pub fn candidates(&self) -> Vec<String> {
        match self {
            PasswordSpec::One(p) => vec![p.clone()],
            PasswordSpec::Many(ps) => ps.clone(),
        }
    }
}

/// Record ledger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Path of the JSON ledger file.
    pub path: PathBuf,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("statements.json"),
        }
    }
}

impl BillscanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        config.check()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    /// Reject institution keys outside the supported set.
    pub fn check(&self) -> Result<(), ConfigError> {
        let sender_keys = self.senders.iter().map(|r| r.institution.as_str());
        let password_keys = self.subjects.values().flat_map(|m| m.keys().map(String::as_str));

        for key in sender_keys.chain(password_keys) {
            if Institution::from_key(key).is_none() {
                return Err(ConfigError::UnknownInstitution(key.to_string()));
            }
        }
        Ok(())
    }

    /// Resolve the institution for a sender string.
    ///
    /// Explicit rules win; otherwise the sender is matched against institution keys.
    pub fn institution_for_sender(&self, sender: &str) -> Option<Institution> {
        let sender = sender.to_lowercase();
        self.senders
            .iter()
            .find(|rule| sender.contains(&rule.domain.to_lowercase()))
            .and_then(|rule| Institution::from_key(&rule.institution))
            .or_else(|| Institution::from_hint(&sender))
    }

    /// Password candidates configured for a subject and institution.
    pub fn passwords_for(&self, subject: &str, institution: Institution) -> Vec<String> {
        self.subjects
            .get(subject)
            .and_then(|by_key| {
                by_key
                    .iter()
                    .find(|(key, _)| Institution::from_key(key) == Some(institution))
            })
            .map(|(_, spec)| spec.candidates())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> BillscanConfig {
        serde_json::from_str(
            r#"{
                "senders": [
                    { "domain": "sbicard.com", "institution": "sbi" },
                    { "domain": "bobfinancial.com", "institution": "bob" }
                ],
                "subjects": {
                    "alice": {
                        "sbi": ["ALIC0101", "alic0101"],
                        "hdfc": "ALICE1234"
                    }
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config = sample();
        assert_eq!(config.pdf.min_text_chars, 1);
        assert_eq!(config.validation, ValidationWindow::default());
        assert_eq!(config.ledger.path, PathBuf::from("statements.json"));
    }

    #[test]
    fn test_passwords_for() {
        let config = sample();
        assert_eq!(
            config.passwords_for("alice", Institution::Sbi),
            vec!["ALIC0101".to_string(), "alic0101".to_string()]
        );
        assert_eq!(
            config.passwords_for("alice", Institution::Hdfc),
            vec!["ALICE1234".to_string()]
        );
        assert!(config.passwords_for("alice", Institution::Axis).is_empty());
        assert!(config.passwords_for("bob", Institution::Sbi).is_empty());
    }

    #[test]
    fn test_institution_for_sender() {
        let config = sample();
        assert_eq!(
            config.institution_for_sender("Statements <Statements@SBICard.com>"),
            Some(Institution::Sbi)
        );
        assert_eq!(
            config.institution_for_sender("noreply@bobfinancial.com"),
            Some(Institution::Bob)
        );
        assert_eq!(
            config.institution_for_sender("cc.statements@axisbank.com"),
            Some(Institution::Axis)
        );
        assert_eq!(config.institution_for_sender("news@example.com"), None);
    }

    #[test]
    fn test_check_rejects_unknown_keys() {
        let mut config = sample();
        assert!(config.check().is_ok());

        config.senders.push(SenderRule {
            domain: "citi.com".to_string(),
            institution: "citi".to_string(),
        });
        assert!(matches!(
            config.check(),
            Err(ConfigError::UnknownInstitution(key)) if key == "citi"
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = sample();
        config.save(&path).unwrap();
        let loaded = BillscanConfig::from_file(&path).unwrap();

        assert_eq!(loaded.senders, config.senders);
        assert_eq!(loaded.subjects, config.subjects);
    }
}
