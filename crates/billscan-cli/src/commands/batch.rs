//! Batch processing command for multiple statement files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tracing::{debug, error, warn};

use billscan_core::{BillscanConfig, Document, ExtractedRecord, Outcome, StatementProcessor};

use super::process::{OutputFormat, candidates, csv_row, format_record, is_pdf};
use super::{DEFAULT_SUBJECT, InstitutionChoice, file_name, load_config};
use crate::ledger::Ledger;

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Institution key for every file (default: inferred from each file name)
    #[arg(short, long)]
    institution: Option<String>,

    /// Subject whose configured passwords are tried and whose ledger is updated
    #[arg(short, long)]
    subject: Option<String>,

    /// Password candidate tried before configured ones (repeatable)
    #[arg(short, long = "password")]
    passwords: Vec<String>,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Do not add accepted records to the ledger
    #[arg(long)]
    no_record: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// What happened to one file.
#[derive(Debug)]
enum FileStatus {
    Accepted(ExtractedRecord),
    Rejected,
    Failed(String),
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    status: FileStatus,
    processing_time_ms: u64,
}

/// Settings shared by every worker.
struct BatchJob {
    institution: Option<String>,
    subject: Option<String>,
    passwords: Vec<String>,
    config: BillscanConfig,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    // Expand glob pattern
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| is_pdf(p))
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    // Create output directory if specified
    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    let processor = Arc::new(StatementProcessor::from_config(&config));
    let job = Arc::new(BatchJob {
        institution: args.institution.clone(),
        subject: args.subject.clone(),
        passwords: args.passwords.clone(),
        config: config.clone(),
    });
    let semaphore = Arc::new(Semaphore::new(args.jobs.max(1)));

    let mut handles = Vec::with_capacity(files.len());
    for path in files {
        let processor = Arc::clone(&processor);
        let job = Arc::clone(&job);
        let semaphore = Arc::clone(&semaphore);
        let pb = overall_pb.clone();

        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await?;
            let result = tokio::task::spawn_blocking(move || {
                let file_start = Instant::now();
                let status = match process_single_file(&path, &processor, &job) {
                    Ok(Outcome::Accepted(record)) => FileStatus::Accepted(record),
                    Ok(Outcome::Rejected) => FileStatus::Rejected,
                    Err(e) => FileStatus::Failed(e.to_string()),
                };
                ProcessResult {
                    path,
                    status,
                    processing_time_ms: file_start.elapsed().as_millis() as u64,
                }
            })
            .await?;
            pb.inc(1);
            anyhow::Ok(result)
        }));
    }

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        let result = handle.await??;
        if let FileStatus::Failed(ref message) = result.status {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", result.path.display(), message);
            } else {
                overall_pb.abandon();
                error!("Failed to process {}: {}", result.path.display(), message);
                anyhow::bail!("Processing failed: {}", message);
            }
        }
        results.push(result);
    }

    overall_pb.finish_with_message("Complete");

    let accepted: Vec<_> = results
        .iter()
        .filter_map(|r| match &r.status {
            FileStatus::Accepted(record) => Some((r, record)),
            _ => None,
        })
        .collect();
    let rejected: Vec<_> = results
        .iter()
        .filter(|r| matches!(r.status, FileStatus::Rejected))
        .collect();
    let failed: Vec<_> = results
        .iter()
        .filter(|r| matches!(r.status, FileStatus::Failed(_)))
        .collect();

    // Write per-file outputs
    if let Some(output_dir) = &args.output_dir {
        for (result, record) in &accepted {
            let output_name = result
                .path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("statement");
            let output_path = output_dir.join(format!("{}.{}", output_name, args.format.extension()));
            fs::write(&output_path, format_record(record, args.format)?)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    // Record accepted statements
    if !args.no_record && !accepted.is_empty() {
        let subject = args.subject.as_deref().unwrap_or(DEFAULT_SUBJECT);
        let mut ledger = Ledger::open(&config.ledger.path)?;
        let mut added = 0;
        for (_, record) in &accepted {
            if ledger.insert(subject, (*record).clone()) {
                added += 1;
            }
        }
        ledger.save(&config.ledger.path)?;
        println!(
            "{} {} new records in {}",
            style("✓").green(),
            added,
            config.ledger.path.display()
        );
    }

    // Generate summary if requested
    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} accepted, {} rejected, {} failed",
        style(accepted.len()).green(),
        style(rejected.len()).yellow(),
        style(failed.len()).red()
    );

    for (_, record) in &accepted {
        println!(
            "    {} {} {}",
            style("✓").green(),
            record.institution.display_name(),
            style(&record.card_last4).yellow()
        );
    }

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            if let FileStatus::Failed(message) = &result.status {
                println!("  - {}: {}", result.path.display(), message);
            }
        }
    }

    Ok(())
}

fn process_single_file(
    path: &Path,
    processor: &StatementProcessor,
    job: &BatchJob,
) -> anyhow::Result<Outcome> {
    let choice = InstitutionChoice::resolve(job.institution.as_deref(), None, path, &job.config);
    if choice == InstitutionChoice::Unknown {
        anyhow::bail!("Could not determine the institution from the file name");
    }

    let data = fs::read(path)?;
    let passwords = candidates(&job.passwords, job.subject.as_deref(), &choice, &job.config);
    let document = Document::new(&data)
        .with_passwords(passwords)
        .with_name(file_name(path).unwrap_or_default());

    Ok(match &choice {
        InstitutionChoice::Key(key) => processor.process_key(&document, key),
        InstitutionChoice::Inferred(institution) => processor.process(&document, *institution),
        InstitutionChoice::Unknown => Outcome::Rejected,
    })
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = vec!["filename", "status"];
    header.extend(super::process::CSV_HEADER);
    header.extend(["processing_time_ms", "error"]);
    wtr.write_record(&header)?;

    for result in results {
        let filename = file_name(&result.path).unwrap_or("");
        let (status, fields, error) = match &result.status {
            FileStatus::Accepted(record) => ("accepted", csv_row(record), ""),
            FileStatus::Rejected => ("rejected", Default::default(), ""),
            FileStatus::Failed(message) => ("error", Default::default(), message.as_str()),
        };

        let mut row = vec![filename.to_string(), status.to_string()];
        row.extend(fields);
        row.push(result.processing_time_ms.to_string());
        row.push(error.to_string());
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}
