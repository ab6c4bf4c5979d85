//! CLI entry point for the dataset cleaner.

use anyhow::Result;
use clap::Parser;
use data_cleaner::{
    CancellationToken, CleanerConfig, CleanerError, CleaningPipeline, CleaningReport, CleaningSession, CleaningStep,
    CleaningSummary, DatasetFormat, DatasetLoader, DuplicateResolver, ExportPaths,
    ReportRequester, SessionOutcome, ShapeMetric, Upload, describe_columns, write_outputs,
};
use dotenv::dotenv;
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

#[cfg(feature = "ai")]
use data_cleaner::ai::{ApiKey, GeminiConfig, GeminiProvider};
#[cfg(feature = "ai")]
use std::sync::Arc;

/// Environment variable holding the Gemini API key.
#[cfg(feature = "ai")]
const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "AI Data Cleaner",
    long_about = "Removes duplicate rows, fills missing values and asks an LLM to explain what changed.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  GEMINI_API_KEY    API key for Google Gemini (used when --api-key is absent)\n\n\
                  EXAMPLES:\n  \
                  # Clean a CSV and write a report\n  \
                  data-cleaner -i data.csv\n\n  \
                  # Clean a workbook without calling the LLM\n  \
                  data-cleaner -i sales.xlsx --no-report -o results/\n\n  \
                  # Preview what would change\n  \
                  data-cleaner -i data.csv --dry-run"
)]
struct Args {
    /// Path to the CSV or Excel file to clean
    #[arg(short, long)]
    input: String,

    /// Output directory for the cleaned dataset and report
    #[arg(short, long, default_value = "./outputs")]
    output: String,

    /// Gemini API key
    ///
    /// Falls back to the GEMINI_API_KEY environment variable or a .env file.
    #[arg(long)]
    api_key: Option<String>,

    /// Gemini model used for the report
    #[arg(long)]
    model: Option<String>,

    /// Maximum seconds to wait for the report
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Skip the report; no API key is needed
    #[arg(long)]
    no_report: bool,

    /// Show duplicates and planned fills without writing files or calling the LLM
    #[arg(long)]
    dry_run: bool,

    /// Number of rows shown in the before/after previews
    #[arg(long, default_value = "10")]
    preview_rows: usize,

    /// Print a JSON session summary to stdout instead of human-readable output
    ///
    /// Disables all progress logs.
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings, errors and results)
    #[arg(short, long)]
    quiet: bool,
}

/// Machine-readable summary printed by `--json`.
#[derive(Serialize)]
struct SessionSummary<'a> {
    input: &'a str,
    before: ShapeMetric,
    after: ShapeMetric,
    steps: &'a [CleaningStep],
    summary: &'a CleaningSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<&'a CleaningReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    report_error: Option<&'a CleanerError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    outputs: Option<&'a ExportPaths>,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    // Load environment variables from .env file
    dotenv().ok();

    // Every failure is shown to the user; the exit status stays 0
    if let Err(e) = run(&args) {
        render_error(&e, args.json);
    }

    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let config = CleanerConfig::builder()
        .output_dir(&args.output)
        .preview_rows(args.preview_rows)
        .save_to_disk(!args.dry_run)
        .build()?;

    let token = CancellationToken::new();
    if let Err(e) = token.cancel_on_interrupt() {
        warn!("Ctrl-C will not cancel this run: {}", e);
    }

    // The credential is checked before any file is read
    let requester = if args.no_report || args.dry_run {
        None
    } else {
        build_requester(args)?.map(|requester| requester.with_cancellation_token(token.clone()))
    };

    info!("Reading {}", args.input);
    let bytes = std::fs::read(&args.input).map_err(|e| {
        CleanerError::Load(format!("could not read '{}': {}", args.input, e))
    })?;
    let file_name = Path::new(&args.input)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(args.input.as_str())
        .to_string();
    let upload = Upload::new(file_name, bytes);

    let mut pipeline = CleaningPipeline::builder()
        .config(config)
        .cancellation_token(token);
    if !args.quiet && !args.json {
        pipeline = pipeline.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }
    let pipeline = pipeline.build()?;

    if args.dry_run {
        return run_dry_run(args, &pipeline, &upload);
    }

    let session = CleaningSession::new(pipeline, requester);
    let outcome = session.run(&upload)?;
    let config = session.pipeline().config();

    let outputs = if config.save_to_disk {
        Some(write_outputs(config, &outcome.cleaning.cleaned, outcome.report_ok())?)
    } else {
        None
    };

    if args.json {
        print_json_summary(args, &outcome, outputs.as_ref())?;
    } else {
        print_human_readable(&outcome, config.preview_rows, outputs.as_ref());
    }

    Ok(())
}

/// Build the report requester from the flags and environment.
#[cfg(feature = "ai")]
fn build_requester(args: &Args) -> Result<Option<ReportRequester>> {
    let raw_key = args
        .api_key
        .clone()
        .or_else(|| std::env::var(API_KEY_ENV).ok())
        .unwrap_or_default();
    let api_key = ApiKey::new(raw_key)?;

    let mut gemini_config = GeminiConfig::builder();
    if let Some(ref model) = args.model {
        gemini_config = gemini_config.model(model);
    }
    if let Some(timeout) = args.timeout_secs {
        gemini_config = gemini_config.timeout_secs(timeout);
    }

    let provider = GeminiProvider::with_config(api_key, gemini_config.build())
        .map_err(|e| CleanerError::ReportGeneration(format!("{:#}", e)))?;
    info!("Reports will be written by Gemini ({})", provider.config().model);

    Ok(Some(ReportRequester::new(Arc::new(provider))))
}

/// Reports need the "ai" feature; without it the cleaning still runs.
#[cfg(not(feature = "ai"))]
fn build_requester(_args: &Args) -> Result<Option<ReportRequester>> {
    warn!("AI support not compiled in. Skipping the report.");
    warn!("Compile with --features ai to enable reports.");
    Ok(None)
}

/// Run dry-run mode - show what would happen without writing or calling the LLM.
///
/// Note: This function uses `println!` intentionally for user-facing CLI output.
fn run_dry_run(args: &Args, pipeline: &CleaningPipeline, upload: &Upload) -> Result<()> {
    let format = DatasetFormat::from_file_name(&upload.file_name)?;
    let data = DatasetLoader::load(&upload.bytes, format)?;
    let duplicates = DuplicateResolver.count_duplicates(&data)?;
    let descriptors = describe_columns(&data)?;
    let result = pipeline.process(&data)?;

    if args.json {
        let summary = SessionSummary {
            input: &args.input,
            before: result.before,
            after: result.after,
            steps: &result.steps,
            summary: &result.summary,
            report: None,
            report_error: None,
            outputs: None,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("\n{}", "=".repeat(80));
    println!("DRY RUN - Preview of cleaning actions");
    println!("{}\n", "=".repeat(80));

    println!("DATASET OVERVIEW");
    println!("{}", "-".repeat(40));
    println!("  File: {} ({})", args.input, format);
    println!("  Shape: {}", ShapeMetric::of(&data));
    println!();

    println!("COLUMNS");
    println!("{}", "-".repeat(40));
    println!("{:<24} {:<10} {:<10}", "Column", "Kind", "Missing");
    println!("{}", "-".repeat(46));
    for descriptor in &descriptors {
        println!(
            "{:<24} {:<10} {:<10}",
            truncate_str(&descriptor.name, 23),
            descriptor.kind,
            descriptor.missing_count
        );
    }
    println!();

    println!("PLANNED ACTIONS");
    println!("{}", "-".repeat(40));
    if duplicates > 0 {
        println!("  Will remove {} duplicate rows", duplicates);
    } else {
        println!("  No duplicate rows found");
    }
    let fills: Vec<_> = result
        .steps
        .iter()
        .filter(|step| step.column().is_some())
        .collect();
    if fills.is_empty() {
        println!("  No missing values to fill");
    }
    for step in fills {
        println!("  - {}", step);
    }
    println!();

    println!("OUTPUT FILES (will be created)");
    println!("{}", "-".repeat(40));
    println!("  - {}", pipeline.config().cleaned_path().display());
    if !args.no_report {
        println!("  - {}", pipeline.config().report_path().display());
    }
    println!();

    println!("{}", "=".repeat(80));
    println!("To clean the dataset, run without --dry-run");
    println!("{}", "=".repeat(80));

    Ok(())
}

/// Print previews, the report and the export locations.
fn print_human_readable(outcome: &SessionOutcome, preview_rows: usize, outputs: Option<&ExportPaths>) {
    let cleaning = &outcome.cleaning;

    println!();
    println!("{}", "=".repeat(80));
    println!("ORIGINAL DATASET ({})", cleaning.before);
    println!("{}", "=".repeat(80));
    println!("{}", outcome.original.head(Some(preview_rows)));
    println!();

    println!("CLEANING STEPS");
    println!("{}", "-".repeat(40));
    if cleaning.steps.is_empty() {
        println!("  No cleaning was required.");
    }
    for step in &cleaning.steps {
        println!("  - {}", step);
    }
    println!();

    match &outcome.report {
        Some(Ok(report)) => {
            println!("AI CLEANING REPORT ({})", report.provider);
            println!("{}", "-".repeat(40));
            println!("{}", report.text);
            println!();
        }
        Some(Err(e)) => {
            println!("REPORT UNAVAILABLE");
            println!("{}", "-".repeat(40));
            println!("  Error: {}", e);
            println!("  {}", e.guidance());
            println!();
        }
        None => {}
    }

    println!("{}", "=".repeat(80));
    println!("CLEANED DATASET ({})", cleaning.after);
    println!("{}", "=".repeat(80));
    println!("{}", cleaning.cleaned.head(Some(preview_rows)));
    println!();

    if let Some(outputs) = outputs {
        println!("Saved cleaned dataset: {}", outputs.cleaned_csv.display());
        if let Some(ref report) = outputs.report {
            println!("Saved report:          {}", report.display());
        }
    }
    println!("Use --json for machine-readable output");
}

fn print_json_summary(
    args: &Args,
    outcome: &SessionOutcome,
    outputs: Option<&ExportPaths>,
) -> Result<()> {
    let cleaning = &outcome.cleaning;
    let summary = SessionSummary {
        input: &args.input,
        before: cleaning.before,
        after: cleaning.after,
        steps: &cleaning.steps,
        summary: &cleaning.summary,
        report: outcome.report_ok(),
        report_error: outcome.report.as_ref().and_then(|r| r.as_ref().err()),
        outputs,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Show an error with a hint on how to recover.
fn render_error(error: &anyhow::Error, json: bool) {
    let cleaner_error = error.downcast_ref::<CleanerError>();

    if json {
        let body = match cleaner_error {
            Some(e) => serde_json::json!({ "error": e }),
            None => serde_json::json!({ "error": { "message": format!("{:#}", error) } }),
        };
        println!("{}", body);
        return;
    }

    match cleaner_error {
        Some(e) => {
            eprintln!("Error: {}", e);
            eprintln!("{}", e.guidance());
        }
        None => eprintln!("Error: {:#}", error),
    }
}

/// Truncate a string to max length with ellipsis
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
