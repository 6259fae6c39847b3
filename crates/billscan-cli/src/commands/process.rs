//! Process command - extract a record from a single statement file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use tracing::{debug, info};

use billscan_core::{
    BillscanConfig, Document, ExtractedRecord, Outcome, StatementProcessor,
};

use super::{DEFAULT_SUBJECT, InstitutionChoice, file_name, load_config};
use crate::ledger::Ledger;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input statement (PDF, or plain text with --text)
    #[arg(required = true)]
    input: PathBuf,

    /// Institution key (sbi, indusind, axis, icici, kotak, rbl, hdfc, bob)
    #[arg(short, long)]
    institution: Option<String>,

    /// Sender address used to pick the institution
    #[arg(long)]
    sender: Option<String>,

    /// Password candidate, tried in the order given (repeatable)
    #[arg(short, long = "password")]
    passwords: Vec<String>,

    /// Subject whose configured passwords are tried and whose ledger is updated
    #[arg(short, long)]
    subject: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Treat the input as already extracted text
    #[arg(long)]
    text: bool,

    /// Add an accepted record to the ledger
    #[arg(long)]
    record: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let choice = InstitutionChoice::resolve(
        args.institution.as_deref(),
        args.sender.as_deref(),
        &args.input,
        &config,
    );
    if choice == InstitutionChoice::Unknown {
        anyhow::bail!(
            "Could not determine the institution for {}. Use --institution.",
            args.input.display()
        );
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    pb.set_message("Extracting statement...");

    let processor = StatementProcessor::from_config(&config);
    let outcome = if args.text {
        let text = fs::read_to_string(&args.input)?;
        match choice.institution() {
            Some(institution) => processor.process_text(&text, institution),
            None => Outcome::Rejected,
        }
    } else {
        let data = fs::read(&args.input)?;
        let passwords = candidates(&args.passwords, args.subject.as_deref(), &choice, &config);
        debug!("{} password candidates", passwords.len());
        let document = Document::new(&data)
            .with_passwords(passwords)
            .with_name(file_name(&args.input).unwrap_or_default());
        match &choice {
            InstitutionChoice::Key(key) => processor.process_key(&document, key),
            InstitutionChoice::Inferred(institution) => processor.process(&document, *institution),
            InstitutionChoice::Unknown => Outcome::Rejected,
        }
    };

    pb.finish_and_clear();

    let Some(record) = outcome.into_record() else {
        anyhow::bail!(
            "No statement record could be extracted from {}",
            args.input.display()
        );
    };

    if args.record {
        let subject = args.subject.as_deref().unwrap_or(DEFAULT_SUBJECT);
        let mut ledger = Ledger::open(&config.ledger.path)?;
        if ledger.insert(subject, record.clone()) {
            ledger.save(&config.ledger.path)?;
            eprintln!(
                "{} Recorded in {} ({} records)",
                style("✓").green(),
                config.ledger.path.display(),
                ledger.record_count()
            );
        } else {
            eprintln!("{} Already recorded", style("ℹ").blue());
        }
    }

    let output = format_record(&record, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output.trim_end());
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Explicit passwords first, then the subject's configured ones.
pub(crate) fn candidates(
    explicit: &[String],
    subject: Option<&str>,
    choice: &InstitutionChoice,
    config: &BillscanConfig,
) -> Vec<String> {
    let mut passwords = explicit.to_vec();
    if let (Some(subject), Some(institution)) = (subject, choice.institution()) {
        for password in config.passwords_for(subject, institution) {
            if !passwords.contains(&password) {
                passwords.push(password);
            }
        }
    }
    passwords
}

pub(crate) fn format_record(record: &ExtractedRecord, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Csv => format_csv(std::slice::from_ref(record)),
        OutputFormat::Text => Ok(format_text(record)),
    }
}

pub(crate) const CSV_HEADER: [&str; 8] = [
    "institution",
    "card_last4",
    "statement_date",
    "due_date",
    "total_due",
    "min_due",
    "credit_limit",
    "available_limit",
];

pub(crate) fn csv_row(record: &ExtractedRecord) -> [String; 8] {
    let amount = |a: Option<Decimal>| a.map(|d| d.to_string()).unwrap_or_default();
    [
        record.institution.key().to_string(),
        record.card_last4.clone(),
        record.statement_date.map(|d| d.to_string()).unwrap_or_default(),
        record.due_date.to_string(),
        amount(record.total_due),
        amount(record.min_due),
        amount(record.credit_limit),
        amount(record.available_limit),
    ]
}

pub(crate) fn format_csv(records: &[ExtractedRecord]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(CSV_HEADER)?;
    for record in records {
        wtr.write_record(csv_row(record))?;
    }
    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(record: &ExtractedRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{} card {}\n",
        record.institution.display_name(),
        record.card_last4
    ));
    if let Some(statement_date) = record.statement_date {
        output.push_str(&format!("Statement date:  {}\n", statement_date));
    }
    output.push_str(&format!("Payment due:     {}\n", record.due_date));
    output.push('\n');
    output.push_str(&format!("Total due:       {}\n", format_amount(record.total_due)));
    output.push_str(&format!("Minimum due:     {}\n", format_amount(record.min_due)));
    output.push_str(&format!("Credit limit:    {}\n", format_amount(record.credit_limit)));
    output.push_str(&format!("Available limit: {}\n", format_amount(record.available_limit)));

    output
}

/// `₹12,345.00`, or `N/A` when absent.
pub(crate) fn format_amount(amount: Option<Decimal>) -> String {
    let Some(amount) = amount else {
        return "N/A".to_string();
    };

    let plain = format!("{:.2}", amount.abs().round_dp(2));
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((&plain, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if amount.is_sign_negative() && !amount.is_zero() { "-" } else { "" };
    format!("{}₹{}.{}", sign, grouped, frac_part)
}

/// Whether `path` looks like a PDF.
pub(crate) fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use billscan_core::Institution;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn sample() -> ExtractedRecord {
        ExtractedRecord {
            institution: Institution::Kotak,
            card_last4: "9876".to_string(),
            statement_date: NaiveDate::from_ymd_opt(2024, 2, 10),
            due_date: NaiveDate::from_ymd_opt(2024, 2, 28).unwrap(),
            total_due: Some(Decimal::new(1234500, 2)),
            min_due: None,
            credit_limit: Some(Decimal::new(150000, 0)),
            available_limit: None,
        }
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(Some(Decimal::new(1234500, 2))), "₹12,345.00");
        assert_eq!(format_amount(Some(Decimal::new(12345678, 2))), "₹123,456.78");
        assert_eq!(format_amount(Some(Decimal::new(999, 0))), "₹999.00");
        assert_eq!(format_amount(Some(Decimal::new(-150050, 2))), "-₹1,500.50");
        assert_eq!(format_amount(None), "N/A");
    }

    #[test]
    fn test_format_csv() {
        let csv = format_csv(&[sample()]).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("institution,card_last4,statement_date,due_date,total_due,min_due,credit_limit,available_limit")
        );
        assert_eq!(lines.next(), Some("kotak,9876,2024-02-10,2024-02-28,12345.00,,150000,"));
    }

    #[test]
    fn test_format_text() {
        let text = format_text(&sample());
        assert!(text.starts_with("Kotak card 9876\n"));
        assert!(text.contains("Total due:       ₹12,345.00"));
        assert!(text.contains("Minimum due:     N/A"));
    }

    #[test]
    fn test_candidates_order() {
        let config: BillscanConfig = serde_json::from_str(
            r#"{ "subjects": { "alice": { "sbi": ["A1", "A2"] } } }"#,
        )
        .unwrap();
        let choice = InstitutionChoice::Inferred(Institution::Sbi);

        assert_eq!(
            candidates(&["A2".to_string(), "X".to_string()], Some("alice"), &choice, &config),
            vec!["A2".to_string(), "X".to_string(), "A1".to_string()]
        );
        assert!(candidates(&[], None, &choice, &config).is_empty());
    }

    #[test]
    fn test_is_pdf() {
        assert!(is_pdf(Path::new("a/b/Statement.PDF")));
        assert!(!is_pdf(Path::new("statement.txt")));
        assert!(!is_pdf(Path::new("pdf")));
    }
}
