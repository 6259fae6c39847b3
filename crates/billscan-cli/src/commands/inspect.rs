//! Inspect command - show how each field of a statement is matched.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;

use billscan_core::statement::rules::normalize;
use billscan_core::{
    Document, Field, FieldExtractor, Outcome, PdfTextExtractor, StatementFields,
    StatementProcessor, TextExtractor,
};

use super::process::candidates;
use super::{InstitutionChoice, load_config};

/// Arguments for the inspect command.
#[derive(Args)]
pub struct InspectArgs {
    /// Input statement (PDF, or plain text with --text)
    #[arg(required = true)]
    input: PathBuf,

    /// Institution key (default: inferred from the file name)
    #[arg(short, long)]
    institution: Option<String>,

    /// Password candidate (repeatable)
    #[arg(short, long = "password")]
    passwords: Vec<String>,

    /// Subject whose configured passwords are tried
    #[arg(short, long)]
    subject: Option<String>,

    /// Treat the input as already extracted text
    #[arg(long)]
    text: bool,

    /// Print the recovered text
    #[arg(long)]
    show_text: bool,

    /// List every strategy pattern and mark the one that matched
    #[arg(long)]
    patterns: bool,
}

pub async fn run(args: InspectArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let choice = InstitutionChoice::resolve(args.institution.as_deref(), None, &args.input, &config);
    let Some(institution) = choice.institution() else {
        anyhow::bail!(
            "Unknown institution for {}. Use --institution with one of: sbi, indusind, axis, icici, kotak, rbl, hdfc, bob",
            args.input.display()
        );
    };

    let text = if args.text {
        fs::read_to_string(&args.input)?
    } else {
        let data = fs::read(&args.input)?;
        let passwords = candidates(&args.passwords, args.subject.as_deref(), &choice, &config);
        let document = Document::new(&data).with_passwords(passwords);
        let extractor = PdfTextExtractor::from_config(&config.pdf);

        let recovered = document
            .candidates()
            .enumerate()
            .find_map(|(i, password)| extractor.extract_text(document.bytes(), password).map(|t| (i, t)));
        match recovered {
            Some((index, text)) => {
                println!(
                    "{} Text recovered with password candidate #{} ({} characters)",
                    style("✓").green(),
                    index + 1,
                    text.len()
                );
                text
            }
            None => anyhow::bail!("No password candidate produced text"),
        }
    };

    if args.show_text {
        println!("{}", style("--- text ---").dim());
        println!("{}", text.trim_end());
        println!("{}", style("------------").dim());
    }

    let processor = StatementProcessor::from_config(&config);
    let catalog = processor.catalog();

    if let Some(marker) = catalog
        .profile(institution)
        .and_then(|p| p.reject_marker(&text))
    {
        println!(
            "{} Text contains {:?}; it is not treated as a statement",
            style("!").yellow(),
            marker
        );
    }

    let extractor = FieldExtractor::new(catalog);
    let raw = extractor.extract(&text, institution);
    let fields = normalize(&raw);

    println!();
    println!(
        "{:<16} {:>10}  {:<24} {}",
        style("Field").bold(),
        style("Strategy").bold(),
        style("Raw").bold(),
        style("Value").bold()
    );
    let traces = extractor.trace(&text, institution);
    for trace in &traces {
        let strategy = match trace.matched {
            Some(index) => format!("{}/{}", index + 1, trace.strategies),
            None => format!("-/{}", trace.strategies),
        };
        let value = normalized_value(&fields, trace.field);
        println!(
            "{:<16} {:>10}  {:<24} {}",
            trace.field.name(),
            strategy,
            trace.raw.as_deref().unwrap_or("-"),
            value.unwrap_or_else(|| "-".to_string())
        );
    }

    if args.patterns {
        if let Some(profile) = catalog.profile(institution) {
            println!();
            println!("{}", style("Patterns").bold());
            for field in profile.fields() {
                let matched = traces
                    .iter()
                    .find(|t| t.field == field)
                    .and_then(|t| t.matched);
                for (index, strategy) in profile.strategies(field).iter().enumerate() {
                    let marker = if matched == Some(index) { "*" } else { " " };
                    println!(
                        "{} {:<16} {:>2}  {}",
                        marker,
                        field.name(),
                        index + 1,
                        strategy.pattern()
                    );
                }
            }
        }
    }

    println!();
    match processor.process_text(&text, institution) {
        Outcome::Accepted(_) => {
            println!("{} Accepted as {}", style("✓").green(), institution.display_name())
        }
        Outcome::Rejected => {
            println!("{} Rejected (run with -vv for the reason)", style("✗").red())
        }
    }

    Ok(())
}

fn normalized_value(fields: &StatementFields, field: Field) -> Option<String> {
    match field {
        Field::CardNumber => fields.card_last4.clone(),
        Field::StatementDate => fields.statement_date.map(|d| d.to_string()),
        Field::DueDate => fields.due_date.map(|d| d.to_string()),
        Field::TotalDue => fields.total_due.map(|a| a.to_string()),
        Field::MinDue => fields.min_due.map(|a| a.to_string()),
        Field::CreditLimit => fields.credit_limit.map(|a| a.to_string()),
        Field::AvailableLimit => fields.available_limit.map(|a| a.to_string()),
    }
}
