//! Extract command - consolidate a folder of documents into one report.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::{glob, Pattern};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, info};

use apura_core::{
    ApuraConfig, BatchReport, FileDescriptor, FinancialRecord, RecordAggregator, RecordTable,
    SkipKind,
};

use super::load_config;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input folder or glob pattern (default: source.folder from config)
    input: Option<String>,

    /// Report file (default: output.path from config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: OutputFormat,

    /// Number of parallel workers
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Descend into sub-folders of the input folder
    #[arg(long)]
    recursive: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, clap::ValueEnum)]
pub enum OutputFormat {
    /// CSV table
    Csv,
    /// JSON object with columns and rows
    Json,
    /// XML document, one element per record
    Xml,
}

impl OutputFormat {
    fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Xml => "xml",
        }
    }
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let input = args
        .input
        .clone()
        .unwrap_or_else(|| config.source.folder.display().to_string());
    let recursive = args.recursive || config.source.recursive;

    let files = list_files(&input, recursive)?;
    if files.is_empty() {
        println!("{} No files found in {}", style("ℹ").blue(), input);
    } else {
        println!(
            "{} Found {} files to process",
            style("ℹ").blue(),
            files.len()
        );
    }

    let descriptors: Vec<FileDescriptor> = files
        .iter()
        .map(|path| FileDescriptor::from_path(path).with_metadata("source", "local"))
        .collect();

    let pb = ProgressBar::new(descriptors.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let workers = args.jobs.unwrap_or(config.batch.workers);
    let aggregator = RecordAggregator::new(&config).with_workers(workers);
    let progress = pb.clone();
    let report = tokio::task::spawn_blocking(move || {
        aggregator.process_with(&descriptors, |_| progress.inc(1))
    })
    .await?;
    pb.finish_and_clear();

    let output_path = resolve_output_path(args.output, &config, args.format);
    let written = write_report(&report.table, &output_path, args.format, &config)?;

    print_summary(&report, files.len(), start);
    if written {
        println!(
            "{} Report written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!(
            "{} No records extracted, report not written",
            style("ℹ").blue()
        );
    }

    Ok(())
}

/// List the files under a folder, or matching a glob pattern, sorted by path.
fn list_files(input: &str, recursive: bool) -> anyhow::Result<Vec<PathBuf>> {
    let path = Path::new(input);
    let pattern = if path.is_dir() {
        let base = Pattern::escape(&path.to_string_lossy());
        if recursive {
            format!("{}/**/*", base)
        } else {
            format!("{}/*", base)
        }
    } else if input.contains(['*', '?', '[']) {
        input.to_string()
    } else {
        anyhow::bail!("Input folder not found: {}", input);
    };
    debug!("Listing files matching {}", pattern);

    let mut files: Vec<PathBuf> = glob(&pattern)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    files.dedup();
    Ok(files)
}

fn resolve_output_path(
    explicit: Option<PathBuf>,
    config: &ApuraConfig,
    format: OutputFormat,
) -> PathBuf {
    explicit.unwrap_or_else(|| {
        if format == OutputFormat::Csv {
            config.output.path.clone()
        } else {
            config.output.path.with_extension(format.extension())
        }
    })
}

/// Write the table; returns false when an empty table was skipped.
fn write_report(
    table: &RecordTable,
    path: &Path,
    format: OutputFormat,
    config: &ApuraConfig,
) -> anyhow::Result<bool> {
    if table.is_empty() && config.output.skip_empty {
        info!("Table is empty, not writing {}", path.display());
        return Ok(false);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    match format {
        OutputFormat::Csv => write_csv(table, path, config.output.delimiter)?,
        OutputFormat::Json => fs::write(path, serde_json::to_string_pretty(table)?)?,
        OutputFormat::Xml => fs::write(path, format_xml(table)?)?,
    }
    debug!("Wrote {} rows to {}", table.len(), path.display());

    Ok(true)
}

fn write_csv(table: &RecordTable, path: &Path, delimiter: char) -> anyhow::Result<()> {
    let delimiter = u8::try_from(delimiter)
        .map_err(|_| anyhow::anyhow!("Delimiter must be ASCII: {:?}", delimiter))?;
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)?;

    wtr.write_record(table.header())?;
    for record in table {
        wtr.write_record(record.cells())?;
    }
    wtr.flush()?;

    Ok(())
}

#[derive(Serialize)]
#[serde(rename = "Report")]
struct XmlReport<'a> {
    #[serde(rename = "Record")]
    records: &'a [FinancialRecord],
}

fn format_xml(table: &RecordTable) -> anyhow::Result<String> {
    let body = quick_xml::se::to_string(&XmlReport {
        records: table.rows(),
    })?;
    Ok(format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}\n", body))
}

fn print_summary(report: &BatchReport, total: usize, start: Instant) {
    let unsupported = report
        .skipped
        .iter()
        .filter(|s| s.kind == SkipKind::Unsupported)
        .count();
    let failed: Vec<_> = report.failures().collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        total,
        start.elapsed()
    );
    println!(
        "   {} extracted, {} skipped, {} unsupported",
        style(report.table.len()).green(),
        style(failed.len()).red(),
        style(unsupported).dim()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Skipped files:").red());
        for skipped in failed {
            println!("  - {}: {}", skipped.name, skipped.reason);
        }
    }

    if !report.table.is_empty() {
        let totals = report.table.totals();
        println!();
        println!(
            "   Revenue {:.2}, tax {:.2}, net {:.2}",
            totals.revenue, totals.total_tax, totals.net_value
        );
    }
}
