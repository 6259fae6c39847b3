//! Report command - show recorded statements.

use std::path::PathBuf;

use clap::Args;
use console::style;

use billscan_core::ExtractedRecord;

use super::process::{format_amount, format_csv};
use super::{DEFAULT_SUBJECT, load_config};
use crate::ledger::Ledger;

/// Arguments for the report command.
#[derive(Args)]
pub struct ReportArgs {
    /// Subject to report on
    #[arg(short, long, default_value = DEFAULT_SUBJECT)]
    subject: String,

    /// Ledger file (default: from configuration)
    #[arg(short, long)]
    ledger: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: ReportFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ReportFormat {
    /// Aligned table
    Table,
    /// JSON array
    Json,
    /// CSV output
    Csv,
}

pub async fn run(args: ReportArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let ledger_path = args.ledger.unwrap_or(config.ledger.path);
    let ledger = Ledger::open(&ledger_path)?;

    let records = ledger.for_subject(&args.subject);
    if records.is_empty() {
        println!(
            "{} No statements recorded for '{}'.",
            style("ℹ").yellow(),
            args.subject
        );
        let subjects = ledger.subjects();
        if !subjects.is_empty() {
            println!("   Recorded subjects: {}", subjects.join(", "));
        }
        return Ok(());
    }

    match args.format {
        ReportFormat::Table => print!("{}", format_table(&args.subject, &records)),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
        ReportFormat::Csv => {
            let owned: Vec<ExtractedRecord> = records.into_iter().cloned().collect();
            print!("{}", format_csv(&owned)?);
        }
    }

    Ok(())
}

const COLUMNS: [&str; 8] = [
    "Bank",
    "Card",
    "Min Due",
    "Total Due",
    "Due Date",
    "Available Limit",
    "Statement Date",
    "Credit Limit",
];

fn format_table(subject: &str, records: &[&ExtractedRecord]) -> String {
    let rows: Vec<[String; 8]> = records
        .iter()
        .map(|r| {
            [
                r.institution.display_name().to_string(),
                r.card_last4.clone(),
                format_amount(r.min_due),
                format_amount(r.total_due),
                r.due_date.to_string(),
                format_amount(r.available_limit),
                r.statement_date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "N/A".to_string()),
                format_amount(r.credit_limit),
            ]
        })
        .collect();

    let mut widths = COLUMNS.map(|c| c.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| console::pad_str(cell, width, console::Alignment::Left, None).into_owned())
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };
    let rule = "─".repeat(widths.iter().sum::<usize>() + 2 * (widths.len() - 1));

    let mut output = String::new();
    output.push_str(&format!("Credit Card Bills - {}\n", capitalize(subject)));
    output.push_str(&rule);
    output.push('\n');
    output.push_str(&line(COLUMNS.map(String::from).as_slice()));
    output.push('\n');
    output.push_str(&rule);
    output.push('\n');
    for row in &rows {
        output.push_str(&line(row.as_slice()));
        output.push('\n');
    }
    output.push_str(&rule);
    output.push('\n');
    output
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
