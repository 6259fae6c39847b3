//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod inspect;
pub mod process;
pub mod report;

use std::path::{Path, PathBuf};

use tracing::debug;

use billscan_core::{BillscanConfig, Institution};

/// Subject used when none is given on the command line.
pub const DEFAULT_SUBJECT: &str = "default";

/// Default configuration location, `<config dir>/billscan/config.json`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("billscan")
        .join("config.json")
}

/// Configuration file in effect: the explicit path, or the default location.
pub fn config_file(config_path: Option<&str>) -> PathBuf {
    config_path.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Load configuration. An explicit path must exist; a missing default file means defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<BillscanConfig> {
    if let Some(path) = config_path {
        return Ok(BillscanConfig::from_file(Path::new(path))?);
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Loading configuration from {}", path.display());
        Ok(BillscanConfig::from_file(&path)?)
    } else {
        Ok(BillscanConfig::default())
    }
}

/// How the institution for a document was determined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstitutionChoice {
    /// Key given explicitly; may be outside the supported set.
    Key(String),
    /// Derived from the sender or file name.
    Inferred(Institution),
    /// Nothing to go on.
    Unknown,
}

impl InstitutionChoice {
    /// Explicit key first, then the sender rules, then the file name.
    pub fn resolve(
        explicit: Option<&str>,
        sender: Option<&str>,
        path: &Path,
        config: &BillscanConfig,
    ) -> Self {
        if let Some(key) = explicit {
            return InstitutionChoice::Key(key.to_string());
        }
        sender
            .and_then(|s| config.institution_for_sender(s))
            .or_else(|| file_name(path).and_then(Institution::from_hint))
            .map_or(InstitutionChoice::Unknown, InstitutionChoice::Inferred)
    }

    /// The institution, if the choice names a supported one.
    pub fn institution(&self) -> Option<Institution> {
        match self {
            InstitutionChoice::Key(key) => Institution::from_key(key),
            InstitutionChoice::Inferred(institution) => Some(*institution),
            InstitutionChoice::Unknown => None,
        }
    }
}

/// Final path component as a string.
pub fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|s| s.to_str())
}
