//! Config command - manage configuration.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use billscan_core::BillscanConfig;
use billscan_core::Institution;
use billscan_core::models::config::{PasswordSpec, SenderRule};

use super::config_file;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Initialize a new configuration file
    Init(InitArgs),

    /// Get a specific configuration value
    Get {
        /// Configuration key (e.g., "validation.max_past_days")
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// New value (JSON, or a plain string)
        value: String,
    },

    /// Map a sender domain to an institution
    Sender {
        /// Fragment of the sender address, e.g. "sbicard.com"
        domain: String,
        /// Institution key
        institution: String,
    },

    /// Store password candidates for a subject and institution
    Password {
        /// Subject the statements belong to
        subject: String,
        /// Institution key
        institution: String,
        /// Candidates, tried in the order given
        #[arg(required = true)]
        passwords: Vec<String>,
    },

    /// Show configuration file path
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Output path for configuration file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,
}

pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let path = config_file(config_path);
    match args.command {
        ConfigCommand::Show => {
            if !path.exists() {
                eprintln!("{} No config file found, showing defaults.", style("ℹ").blue());
            }
            println!("{}", serde_json::to_string_pretty(&read_or_default(&path)?)?);
            Ok(())
        }
        ConfigCommand::Init(init) => init_config(init, path),
        ConfigCommand::Get { key } => {
            let json = serde_json::to_value(read_or_default(&path)?)?;
            println!("{}", serde_json::to_string_pretty(lookup(&json, &key)?)?);
            Ok(())
        }
        ConfigCommand::Set { key, value } => {
            let parsed = parse_value(&value);
            let updated = assign(&read_or_default(&path)?, &key, parsed.clone())?;
            write(&path, &updated)?;
            println!(
                "{} Set {} = {}",
                style("✓").green(),
                key,
                serde_json::to_string(&parsed)?
            );
            Ok(())
        }
        ConfigCommand::Sender { domain, institution } => {
            let institution = institution_key(&institution)?;
            let mut config = read_or_default(&path)?;
            add_sender(&mut config, &domain, institution);
            write(&path, &config)?;
            println!(
                "{} Statements from {} are read as {}",
                style("✓").green(),
                domain,
                institution.display_name()
            );
            Ok(())
        }
        ConfigCommand::Password {
            subject,
            institution,
            passwords,
        } => {
            let institution = institution_key(&institution)?;
            let mut config = read_or_default(&path)?;
            let count = passwords.len();
            set_passwords(&mut config, &subject, institution, passwords);
            write(&path, &config)?;
            println!(
                "{} Stored {} password candidate(s) for {} / {}",
                style("✓").green(),
                count,
                subject,
                institution.display_name()
            );
            Ok(())
        }
        ConfigCommand::Path => {
            println!("Configuration file: {}", path.display());
            if path.exists() {
                println!("Status: {}", style("exists").green());
            } else {
                println!("Status: {}", style("not created").yellow());
                println!();
                println!("Run 'billscan config init' to create a configuration file.");
            }
            Ok(())
        }
    }
}

fn init_config(args: InitArgs, config_path: PathBuf) -> anyhow::Result<()> {
    let output_path = args.output.unwrap_or(config_path);

    if output_path.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            output_path.display()
        );
    }

    write(&output_path, &BillscanConfig::default())?;
    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        output_path.display()
    );

    Ok(())
}

fn read_or_default(path: &Path) -> anyhow::Result<BillscanConfig> {
    if path.exists() {
        Ok(BillscanConfig::from_file(path)?)
    } else {
        Ok(BillscanConfig::default())
    }
}

fn write(path: &Path, config: &BillscanConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    config.save(path)?;
    Ok(())
}

fn institution_key(key: &str) -> anyhow::Result<Institution> {
    Institution::from_key(key).ok_or_else(|| {
        let known: Vec<_> = Institution::ALL.iter().map(|i| i.key()).collect();
        anyhow::anyhow!("Unknown institution '{}'. Known: {}", key, known.join(", "))
    })
}

/// JSON if it parses, otherwise the raw string.
fn parse_value(value: &str) -> Value {
    serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()))
}

/// Follow a dotted key path.
fn lookup<'a>(json: &'a Value, key: &str) -> anyhow::Result<&'a Value> {
    key.split('.').try_fold(json, |current, part| {
        current
            .get(part)
            .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))
    })
}

/// Set a dotted key path and re-validate the result.
fn assign(config: &BillscanConfig, key: &str, value: Value) -> anyhow::Result<BillscanConfig> {
    let mut json = serde_json::to_value(config)?;
    let (parents, last) = match key.rsplit_once('.') {
        Some((parents, last)) => (Some(parents), last),
        None => (None, key),
    };

    let mut current = &mut json;
    for part in parents.into_iter().flat_map(|p| p.split('.')) {
        current = current
            .get_mut(part)
            .ok_or_else(|| anyhow::anyhow!("Configuration path not found: {}", key))?;
    }
    let Some(object) = current.as_object_mut() else {
        anyhow::bail!("Cannot set value at non-object path");
    };
    object.insert(last.to_string(), value);

    let updated: BillscanConfig = serde_json::from_value(json)?;
    updated.check()?;
    Ok(updated)
}

fn add_sender(config: &mut BillscanConfig, domain: &str, institution: Institution) {
    let domain = domain.trim().to_lowercase();
    config.senders.retain(|rule| rule.domain.to_lowercase() != domain);
    config.senders.push(SenderRule {
        domain,
        institution: institution.key().to_string(),
    });
}

fn set_passwords(
    config: &mut BillscanConfig,
    subject: &str,
    institution: Institution,
    mut passwords: Vec<String>,
) {
    let spec = if passwords.len() == 1 {
        PasswordSpec::One(passwords.remove(0))
    } else {
        PasswordSpec::Many(passwords)
    };
    config
        .subjects
        .entry(subject.to_string())
        .or_default()
        .insert(institution.key().to_string(), spec);
}
