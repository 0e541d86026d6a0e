//! Top-level CLI definition and dispatch.

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use colored::{ColoredString, Colorize, control};
use serde_json::json;
use thiserror::Error;

use flake_categorizer::classify::category::{FlakyCategory, label_of};
use flake_categorizer::classify::{Classification, Classifier};
use flake_categorizer::core::config::{Config, OutputFormat};
use flake_categorizer::core::errors::FlakeError;
use flake_categorizer::logger::jsonl::{EventType, JsonlWriter, LogEntry, Severity};

/// Command-line arguments for `flakecat`.
#[derive(Debug, Parser)]
#[command(
    name = "flakecat",
    author,
    version,
    about = "Flaky test categorizer (ID, ID&NOD, OD-Vic, OD-Brit, NOD)",
    long_about = None,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Detector-run file: test,prefix_md5,tool,status,failure_md5,log.
    #[arg(value_name = "CSV")]
    input: PathBuf,
    /// Override config file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Output format (defaults to the configured format).
    #[arg(long, value_enum, value_name = "FORMAT")]
    format: Option<FormatArg>,
    /// Print only the category of this test.
    #[arg(long, value_name = "TEST", conflicts_with = "explain")]
    test: Option<String>,
    /// Print the evidence gathered for every test instead of categories.
    #[arg(long)]
    explain: bool,
    /// Append JSONL activity events to this file.
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,
    /// Disable colored output.
    #[arg(long)]
    no_color: bool,
    /// Print a run summary on stderr.
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,
    /// Quiet mode (errors only).
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Legacy,
    Json,
    Human,
}

impl From<FormatArg> for OutputFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Legacy => Self::Legacy,
            FormatArg::Json => Self::Json,
            FormatArg::Human => Self::Human,
        }
    }
}

/// What to print once classification succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Selection<'a> {
    All,
    Explain,
    Single(&'a str),
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Bad input data or configuration.
    #[error("{0}")]
    User(String),
    /// Environment/runtime failure.
    #[error("{0}")]
    Runtime(String),
    /// Internal bug or invariant violation.
    #[error("{0}")]
    Internal(String),
    /// JSON serialization failed.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::User(_) => 1,
            Self::Runtime(_) | Self::Io(_) => 2,
            Self::Internal(_) | Self::Json(_) => 3,
        }
    }
}

impl From<FlakeError> for CliError {
    fn from(value: FlakeError) -> Self {
        match &value {
            FlakeError::Io { .. } => Self::Runtime(value.to_string()),
            FlakeError::Serialization { .. } => Self::Internal(value.to_string()),
            _ => Self::User(value.to_string()),
        }
    }
}

/// Classify the input file and print the result.
///
/// Nothing is written to stdout unless every row was valid.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.no_color {
        control::set_override(false);
    }

    let config = Config::load(cli.config.as_deref())?;
    let format = cli.format.map_or(config.output.format, OutputFormat::from);
    let input_label = cli.input.display().to_string();
    let mut activity = cli
        .log
        .as_ref()
        .or(config.log.jsonl_path.as_ref())
        .map(JsonlWriter::open);

    let mut start = LogEntry::new(EventType::RunStart, Severity::Info);
    start.input = Some(input_label.clone());
    log_event(activity.as_mut(), &start);

    let started = Instant::now();
    let outcome = match Classifier::new(&config.input).classify_path(&cli.input) {
        Ok(outcome) => outcome,
        Err(e) => {
            let mut rejected = LogEntry::new(EventType::RecordRejected, Severity::Critical);
            rejected.input = Some(input_label);
            rejected.error_code = Some(e.code().to_string());
            rejected.error_message = Some(e.to_string());
            log_event(activity.as_mut(), &rejected);
            return Err(e.into());
        }
    };

    if let Some(writer) = activity.as_mut() {
        for (test, category) in outcome.report.iter() {
            let mut entry = LogEntry::new(EventType::TestClassified, Severity::Info);
            entry.test = Some(test.to_string());
            entry.category = Some(label_of(category).to_string());
            writer.write_entry(&entry);
        }
    }
    let mut complete = LogEntry::new(EventType::RunComplete, Severity::Info);
    complete.input = Some(input_label.clone());
    complete.rows = Some(outcome.stats.rows_read);
    complete.tests = Some(outcome.stats.tests);
    complete.flaky = Some(outcome.stats.flaky);
    complete.duration_ms = u64::try_from(started.elapsed().as_millis()).ok();
    log_event(activity.as_mut(), &complete);

    if cli.verbose {
        eprintln!(
            "flakecat: {input_label}: {} rows, {} header rows skipped, {} tests, {} flaky",
            outcome.stats.rows_read,
            outcome.stats.headers_skipped,
            outcome.stats.tests,
            outcome.stats.flaky,
        );
        if let Some(writer) = activity.as_mut() {
            writer.flush();
            eprintln!(
                "flakecat: activity log {}: {} lines ({})",
                writer.path().display(),
                writer.lines_written(),
                writer.state(),
            );
        }
    }

    let selection = if cli.explain {
        Selection::Explain
    } else if let Some(test) = cli.test.as_deref() {
        if !outcome.report.contains(test) && !cli.quiet {
            eprintln!("flakecat: warning: {test} does not appear in {input_label}");
        }
        Selection::Single(test)
    } else {
        Selection::All
    };

    let rendered = render(&outcome, format, selection)?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{rendered}")?;
    stdout.flush()?;
    Ok(())
}

fn log_event(writer: Option<&mut JsonlWriter>, entry: &LogEntry) {
    if let Some(writer) = writer {
        writer.write_entry(entry);
    }
}

fn render(
    outcome: &Classification,
    format: OutputFormat,
    selection: Selection<'_>,
) -> Result<String, CliError> {
    let report = &outcome.report;
    match selection {
        Selection::Explain => Ok(serde_json::to_string_pretty(&outcome.ledger)?),
        Selection::Single(test) => {
            let category = report.category_of(test);
            Ok(match format {
                OutputFormat::Legacy => label_of(category).to_string(),
                OutputFormat::Json => json!({ "test": test, "category": label_of(category) }).to_string(),
                OutputFormat::Human => match category {
                    Some(category) => format!("[!] {test} is flaky: {}", paint(Some(category))),
                    None => format!("{test} is not flaky"),
                },
            })
        }
        Selection::All => match format {
            OutputFormat::Legacy => Ok(report.render_legacy()),
            OutputFormat::Json => Ok(report.to_json()?),
            OutputFormat::Human => Ok(render_human(outcome)),
        },
    }
}

fn render_human(outcome: &Classification) -> String {
    let mut lines: Vec<String> = outcome
        .report
        .iter()
        .map(|(test, category)| format!("  {}  {test}", paint(category)))
        .collect();
    let summary = format!(
        "{} tests, {} flaky",
        outcome.stats.tests, outcome.stats.flaky
    );
    lines.push(if outcome.stats.flaky > 0 {
        summary.bold().to_string()
    } else {
        summary.green().to_string()
    });
    lines.join("\n")
}

fn paint(category: Option<FlakyCategory>) -> ColoredString {
    let cell = format!("{:<7}", category.map_or("-", FlakyCategory::label));
    match category {
        None => cell.dimmed(),
        Some(
            FlakyCategory::IntermittentlyDeterministic
            | FlakyCategory::IntermittentlyDeterministicAndNod,
        ) => cell.red(),
        Some(FlakyCategory::OrderDependentVictim | FlakyCategory::OrderDependentBrittle) => {
            cell.yellow()
        }
        Some(FlakyCategory::NonOrderDependent) => cell.magenta(),
    }
}
