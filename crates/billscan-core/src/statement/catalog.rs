//! Per-institution registry of field extraction strategies.
//!
//! The catalog is data: each [`InstitutionProfile`] maps a [`Field`] to an
//! ordered list of [`Strategy`] values, most specific first. Adding an issuer
//! means adding a [`ProfileSpec`]; the extractor, normalizer and validator do
//! not change.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use lazy_static::lazy_static;
use regex::{Captures, Regex, RegexBuilder};
use tracing::debug;

use super::patterns::BUILTIN_PROFILES;
use crate::error::CatalogError;
use crate::models::institution::Institution;

lazy_static! {
    static ref BUILTIN: Catalog =
        Catalog::from_profiles(BUILTIN_PROFILES.iter().cloned()).expect("built-in catalog is valid");
}

/// A semantic statement field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    /// Card number suffix (`card_last4`).
    CardNumber,
    StatementDate,
    DueDate,
    TotalDue,
    MinDue,
    CreditLimit,
    AvailableLimit,
}

impl Field {
    /// All fields in extraction order.
    pub const ALL: [Field; 7] = [
        Field::CardNumber,
        Field::StatementDate,
        Field::DueDate,
        Field::TotalDue,
        Field::MinDue,
        Field::CreditLimit,
        Field::AvailableLimit,
    ];

    /// Record field name.
    pub fn name(&self) -> &'static str {
        match self {
            Field::CardNumber => "card_last4",
            Field::StatementDate => "statement_date",
            Field::DueDate => "due_date",
            Field::TotalDue => "total_due",
            Field::MinDue => "min_due",
            Field::CreditLimit => "credit_limit",
            Field::AvailableLimit => "available_limit",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One compiled matching expression plus its capture-group selection rule.
///
/// Patterns are case-insensitive, `.` crosses line breaks, and every literal
/// space outside a character class matches any run of whitespace. With one
/// capture group that group is the value; with several, the last one is.
#[derive(Debug, Clone)]
pub struct Strategy {
    regex: Regex,
    groups: usize,
}

impl Strategy {
    /// Compile a strategy from its source pattern.
    pub fn compile(pattern: &str) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(&relax_whitespace(pattern))
            .case_insensitive(true)
            .multi_line(true)
            .dot_matches_new_line(true)
            .build()?;
        let groups = regex.captures_len() - 1;
        Ok(Self { regex, groups })
    }

    /// The compiled pattern.
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Number of explicit capture groups.
    pub fn groups(&self) -> usize {
        self.groups
    }

    /// Search `text`. The outer `Option` is the structural match; the inner one
    /// is the selected group, which may not have participated in the match.
    pub fn apply<'t>(&self, text: &'t str) -> Option<Option<&'t str>> {
        self.regex.captures(text).map(|caps| self.select(&caps))
    }

    fn select<'t>(&self, caps: &Captures<'t>) -> Option<&'t str> {
        caps.get(self.groups.max(1)).map(|m| m.as_str())
    }
}

/// Static definition of one institution's strategies.
#[derive(Debug, Clone)]
pub struct ProfileSpec {
    pub institution: Institution,
    pub fields: &'static [(Field, &'static [&'static str])],
    /// Phrases marking documents that are not statements (case-insensitive).
    pub reject_markers: &'static [&'static str],
}

/// Compiled strategies for one institution.
#[derive(Debug, Clone)]
pub struct InstitutionProfile {
    institution: Institution,
    fields: BTreeMap<Field, Vec<Strategy>>,
    reject_markers: Vec<String>,
}

impl InstitutionProfile {
    /// Compile a profile, failing on the first invalid pattern.
    pub fn compile(spec: &ProfileSpec) -> Result<Self, CatalogError> {
        let mut fields = BTreeMap::new();

        for (field, patterns) in spec.fields {
            let mut strategies = Vec::with_capacity(patterns.len());
            for (index, pattern) in patterns.iter().enumerate() {
                let invalid = |source| CatalogError::InvalidPattern {
                    institution: spec.institution.to_string(),
                    field: field.to_string(),
                    index,
                    source,
                };
                let strategy = Strategy::compile(pattern).map_err(invalid)?;
                if strategy.groups() == 0 {
                    return Err(CatalogError::MissingGroup {
                        institution: spec.institution.to_string(),
                        field: field.to_string(),
                        index,
                    });
                }
                strategies.push(strategy);
            }
            fields.entry(*field).or_insert_with(Vec::new).extend(strategies);
        }

        Ok(Self {
            institution: spec.institution,
            fields,
            reject_markers: spec.reject_markers.iter().map(|m| m.to_lowercase()).collect(),
        })
    }

    pub fn institution(&self) -> Institution {
        self.institution
    }

    /// Strategies for `field`, most specific first. Empty if the institution
    /// does not expose the field.
    pub fn strategies(&self, field: Field) -> &[Strategy] {
        self.fields.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Fields this profile can extract.
    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.fields.keys().copied()
    }

    /// The first reject marker found in `text`, if any.
    pub fn reject_marker(&self, text: &str) -> Option<&str> {
        if self.reject_markers.is_empty() {
            return None;
        }
        let lowered = text.to_lowercase();
        self.reject_markers
            .iter()
            .find(|marker| lowered.contains(marker.as_str()))
            .map(String::as_str)
    }
}

/// Immutable registry of institution profiles.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    profiles: HashMap<Institution, InstitutionProfile>,
}

impl Catalog {
    /// Build a catalog from profile definitions.
    pub fn from_profiles<I>(specs: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = ProfileSpec>,
    {
        let mut profiles = HashMap::new();
        for spec in specs {
            let profile = InstitutionProfile::compile(&spec)?;
            if profiles.insert(spec.institution, profile).is_some() {
                return Err(CatalogError::DuplicateProfile(spec.institution.to_string()));
            }
        }
        debug!("compiled catalog with {} profiles", profiles.len());
        Ok(Self { profiles })
    }

    /// The process-wide built-in catalog, compiled on first use.
    pub fn builtin() -> &'static Catalog {
        &BUILTIN
    }

    /// Profile for an institution, if registered.
    pub fn profile(&self, institution: Institution) -> Option<&InstitutionProfile> {
        self.profiles.get(&institution)
    }

    /// Strategies for one field of one institution; empty if either is unknown.
    pub fn lookup(&self, institution: Institution, field: Field) -> &[Strategy] {
        self.profile(institution)
            .map(|p| p.strategies(field))
            .unwrap_or(&[])
    }

    /// Registered institutions in catalog order.
    pub fn institutions(&self) -> Vec<Institution> {
        let mut institutions: Vec<_> = self.profiles.keys().copied().collect();
        institutions.sort();
        institutions
    }
}

/// Replace each run of literal spaces outside character classes with `\s+`.
fn relax_whitespace(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut chars = pattern.chars().peekable();
    let mut in_class = false;
    let mut class_start = false;

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                out.push(c);
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
                class_start = false;
                continue;
            }
            '[' if !in_class => {
                in_class = true;
                class_start = true;
                out.push(c);
                if chars.peek() == Some(&'^') {
                    out.push('^');
                    chars.next();
                }
                continue;
            }
            ']' if in_class && !class_start => in_class = false,
            ' ' if !in_class => {
                while chars.peek() == Some(&' ') {
                    chars.next();
                }
                out.push_str(r"\s+");
                continue;
            }
            _ => {}
        }
        class_start = false;
        out.push(c);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_relax_whitespace() {
        assert_eq!(relax_whitespace("Total Amount Due"), r"Total\s+Amount\s+Due");
        assert_eq!(relax_whitespace("a   b"), r"a\s+b");
        assert_eq!(relax_whitespace(r"[ A-Z]x y"), r"[ A-Z]x\s+y");
        assert_eq!(relax_whitespace(r"[] ]a b"), r"[] ]a\s+b");
        assert_eq!(relax_whitespace(r"[^ ]\ b c"), r"[^ ]\ b\s+c");
        assert_eq!(relax_whitespace(r"(\d{2}) Dr"), r"(\d{2})\s+Dr");
    }

    #[test]
    fn test_strategy_single_group() {
        let strategy = Strategy::compile(r"Due Date\s*:?\s*(\d{2}/\d{2}/\d{4})").unwrap();
        assert_eq!(
            strategy.apply("PAYMENT DUE\n  DATE : 05/02/2024"),
            Some(Some("05/02/2024"))
        );
        assert_eq!(strategy.apply("nothing here"), None);
    }

    #[test]
    fn test_strategy_last_group_wins() {
        let strategy = Strategy::compile(r"(\d{4})\*+(\d{4})").unwrap();
        assert_eq!(strategy.groups(), 2);
        assert_eq!(strategy.apply("Card 1234********5678"), Some(Some("5678")));
    }

    #[test]
    fn test_strategy_optional_last_group() {
        let strategy = Strategy::compile(r"Card (\d{4})(X{4})?").unwrap();
        assert_eq!(strategy.apply("card 9876"), Some(None));
    }

    #[test]
    fn test_builtin_catalog_covers_every_institution() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.institutions(), Institution::ALL.to_vec());

        for institution in Institution::ALL {
            assert!(!catalog.lookup(institution, Field::CardNumber).is_empty());
            assert!(!catalog.lookup(institution, Field::DueDate).is_empty());
        }
    }

    #[test]
    fn test_profile_fields_and_patterns() {
        let profile = Catalog::builtin().profile(Institution::Icici).unwrap();
        assert_eq!(profile.fields().collect::<Vec<_>>(), Field::ALL.to_vec());

        let strategies = profile.strategies(Field::CardNumber);
        assert_eq!(strategies[1].pattern(), r"(\d{4})\*+(\d{4})");
        assert_eq!(strategies[2].pattern(), r"Card.*?(\d{4})XXXXXXXX(\d{4})");

        let strategy = Strategy::compile(r"Payment Due Date (\S+)").unwrap();
        assert_eq!(strategy.pattern(), r"Payment\s+Due\s+Date\s+(\S+)");
    }

    #[test]
    fn test_lookup_unknown_is_empty() {
        let catalog = Catalog::default();
        assert!(catalog.lookup(Institution::Sbi, Field::DueDate).is_empty());
    }

    #[test]
    fn test_invalid_pattern_fails_at_load() {
        static FIELDS: &[(Field, &[&str])] = &[(Field::DueDate, &[r"(\d{2}/\d{2}"])];
        let result = Catalog::from_profiles([ProfileSpec {
            institution: Institution::Hdfc,
            fields: FIELDS,
            reject_markers: &[],
        }]);
        assert!(matches!(
            result,
            Err(CatalogError::InvalidPattern { index: 0, .. })
        ));
    }

    #[test]
    fn test_pattern_without_group_fails_at_load() {
        static FIELDS: &[(Field, &[&str])] = &[(Field::DueDate, &[r"\d{2}/\d{2}/\d{4}"])];
        let result = Catalog::from_profiles([ProfileSpec {
            institution: Institution::Hdfc,
            fields: FIELDS,
            reject_markers: &[],
        }]);
        assert!(matches!(result, Err(CatalogError::MissingGroup { .. })));
    }

    #[test]
    fn test_duplicate_profile_fails_at_load() {
        static FIELDS: &[(Field, &[&str])] = &[(Field::DueDate, &[r"(\d+)"])];
        let spec = ProfileSpec {
            institution: Institution::Rbl,
            fields: FIELDS,
            reject_markers: &[],
        };
        let result = Catalog::from_profiles([spec.clone(), spec]);
        assert!(matches!(result, Err(CatalogError::DuplicateProfile(_))));
    }

    #[test]
    fn test_reject_marker() {
        let catalog = Catalog::builtin();
        let icici = catalog.profile(Institution::Icici).unwrap();
        assert_eq!(
            icici.reject_marker("Loan AMORTIZATION Schedule for card"),
            Some("amortization schedule")
        );
        assert_eq!(icici.reject_marker("Statement Date"), None);

        let sbi = catalog.profile(Institution::Sbi).unwrap();
        assert_eq!(sbi.reject_marker("amortization schedule"), None);
    }
}
