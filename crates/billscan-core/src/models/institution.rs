//! The closed set of supported card issuers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A card-issuing institution with a profile in the built-in catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Institution {
    /// State Bank of India (SBI Card).
    Sbi,
    /// IndusInd Bank.
    #[serde(rename = "indusind")]
    IndusInd,
    /// Axis Bank.
    Axis,
    /// ICICI Bank.
    Icici,
    /// Kotak Mahindra Bank.
    Kotak,
    /// RBL Bank.
    Rbl,
    /// HDFC Bank.
    Hdfc,
    /// Bank of Baroda (BOBCARD).
    Bob,
}

impl Institution {
    /// Every supported institution, in catalog order.
    pub const ALL: [Institution; 8] = [
        Institution::Sbi,
        Institution::IndusInd,
        Institution::Axis,
        Institution::Icici,
        Institution::Kotak,
        Institution::Rbl,
        Institution::Hdfc,
        Institution::Bob,
    ];

    /// Stable lowercase key used in configuration files and hints.
    pub fn key(&self) -> &'static str {
        match self {
            Institution::Sbi => "sbi",
            Institution::IndusInd => "indusind",
            Institution::Axis => "axis",
            Institution::Icici => "icici",
            Institution::Kotak => "kotak",
            Institution::Rbl => "rbl",
            Institution::Hdfc => "hdfc",
            Institution::Bob => "bob",
        }
    }

    /// Short display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Institution::Sbi => "SBI",
            Institution::IndusInd => "IndusInd",
            Institution::Axis => "Axis",
            Institution::Icici => "ICICI",
            Institution::Kotak => "Kotak",
            Institution::Rbl => "RBL",
            Institution::Hdfc => "HDFC",
            Institution::Bob => "BOB",
        }
    }

    /// Parse an institution key (case-insensitive). Unknown keys yield `None`.
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_lowercase();
        Self::ALL.into_iter().find(|i| i.key() == key)
    }

    /// Find the institution whose key occurs in a file name or sender address.
    ///
    /// The longest matching key wins, so `indusind` is never shadowed by a
    /// shorter key that happens to be a substring of the hint.
    pub fn from_hint(hint: &str) -> Option<Self> {
        let hint = hint.to_lowercase();
        Self::ALL
            .into_iter()
            .filter(|i| hint.contains(i.key()))
            .max_by_key(|i| i.key().len())
    }
}

impl fmt::Display for Institution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
