//! Integration tests for the dataset cleaner.
//!
//! These tests run whole sessions (load, clean, report, export) over the
//! fixtures in `tests/fixtures`.

use anyhow::anyhow;
use data_cleaner::ai::{AIProvider, ApiKey};
use data_cleaner::{
    CancellationToken, CleanerConfig, CleanerError, CleaningPipeline, CleaningSession,
    CleaningStage, CleaningStep, DatasetLoader, ErrorKind, NO_STEPS_SENTINEL, ProgressUpdate,
    ReportRequester, Upload, build_report_prompt, to_csv_bytes, write_outputs,
};
use polars::prelude::*;
use pretty_assertions::assert_eq;
use rust_xlsxwriter::Workbook;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn upload(filename: &str) -> Upload {
    let bytes = std::fs::read(fixtures_path().join(filename)).expect("Failed to read fixture");
    Upload::new(filename, bytes)
}

fn load_csv(filename: &str) -> DataFrame {
    DatasetLoader::load_path(fixtures_path().join(filename)).expect("Failed to load fixture")
}

fn default_pipeline() -> CleaningPipeline {
    CleaningPipeline::builder().build().unwrap()
}

fn output_config(tmp: &TempDir) -> CleanerConfig {
    CleanerConfig::builder()
        .output_dir(tmp.path().join("outputs"))
        .build()
        .unwrap()
}

/// Records every prompt it receives and answers with a fixed text.
struct RecordingProvider {
    prompts: Mutex<Vec<String>>,
}

impl RecordingProvider {
    fn new() -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
        }
    }
}

impl AIProvider for RecordingProvider {
    fn generate_text(&self, prompt: &str) -> anyhow::Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok("The dataset was cleaned.\n".to_string())
    }

    fn name(&self) -> &str {
        "Recording"
    }
}

/// Simulates an unreachable service.
struct UnreachableProvider;

impl AIProvider for UnreachableProvider {
    fn generate_text(&self, _prompt: &str) -> anyhow::Result<String> {
        Err(anyhow!("Failed to send request to Gemini: connection refused"))
    }

    fn name(&self) -> &str {
        "Unreachable"
    }
}

fn str_values(df: &DataFrame, col: &str) -> Vec<Option<String>> {
    df.column(col)
        .unwrap()
        .as_materialized_series()
        .cast(&DataType::String)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect()
}

// ============================================================================
// Session Tests
// ============================================================================

#[test]
fn test_scenario_duplicate_and_missing_text() {
    let provider = Arc::new(RecordingProvider::new());
    let session = CleaningSession::new(
        default_pipeline(),
        Some(ReportRequester::new(provider.clone())),
    );

    let outcome = session.run(&upload("scenario_a.csv")).unwrap();
    let cleaning = &outcome.cleaning;

    assert_eq!(cleaning.before.rows, 3);
    assert_eq!(cleaning.after.rows, 2);
    assert_eq!(
        cleaning.steps,
        vec![
            CleaningStep::DuplicatesRemoved { count: 1 },
            CleaningStep::ModeImputed {
                column: "label".to_string(),
                missing: 1,
                value: "a".to_string(),
            },
        ]
    );
    assert_eq!(
        str_values(&cleaning.cleaned, "label"),
        vec![Some("a".to_string()), Some("a".to_string())]
    );

    // The original stays available for the "before" preview
    assert_eq!(outcome.original.height(), 3);

    let report = outcome.report_ok().expect("report should be produced");
    assert_eq!(report.text, "The dataset was cleaned.\n");
    assert_eq!(report.provider, "Recording");

    let prompts = provider.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("The dataset had 3 rows and 2 columns."));
    assert!(prompts[0].contains("After cleaning, it has 2 rows and 2 columns."));
    assert!(prompts[0].contains("Removed 1 duplicate rows.\nFilled 1 missing values in **label** with mode ('a')."));
}

#[test]
fn test_full_session_passengers() {
    let session = CleaningSession::new(default_pipeline(), None);
    let outcome = session.run(&upload("passengers.csv")).unwrap();
    let cleaning = &outcome.cleaning;

    assert!(outcome.report.is_none());
    assert_eq!(cleaning.before.rows, 7);
    assert_eq!(cleaning.after.rows, 6);
    assert_eq!(cleaning.after.columns, 7);

    let columns: Vec<Option<&str>> = cleaning.steps.iter().map(|s| s.column()).collect();
    assert_eq!(
        columns,
        vec![None, Some("age"), Some("embarked"), Some("notes")]
    );

    match &cleaning.steps[1] {
        CleaningStep::MeanImputed { missing, mean, .. } => {
            assert_eq!(*missing, 2);
            assert!((mean - 32.5).abs() < 1e-12);
        }
        other => panic!("expected a mean step, got {:?}", other),
    }
    assert_eq!(
        cleaning.steps[2],
        CleaningStep::ModeImputed {
            column: "embarked".to_string(),
            missing: 1,
            value: "S".to_string(),
        }
    );

    // No numeric or textual column keeps a missing value
    for col in cleaning.cleaned.get_columns() {
        assert_eq!(col.null_count(), 0, "column '{}' still has nulls", col.name());
    }

    // Untouched columns keep their dtype
    assert_eq!(
        cleaning.cleaned.column("survived").unwrap().dtype(),
        &DataType::Boolean
    );
    assert_eq!(
        cleaning.cleaned.column("passenger_id").unwrap().dtype(),
        &DataType::Int64
    );

    assert_eq!(cleaning.summary.duplicates_removed, 1);
    assert_eq!(cleaning.summary.missing_after, 0);
    assert_eq!(
        cleaning.summary.imputed_columns,
        vec!["age", "embarked", "notes"]
    );
}

#[test]
fn test_all_missing_column_gets_fallback() {
    let session = CleaningSession::new(default_pipeline(), None);
    let outcome = session.run(&upload("passengers.csv")).unwrap();

    let notes = str_values(&outcome.cleaning.cleaned, "notes");
    assert!(notes.iter().all(|v| v.as_deref() == Some("Unknown")));

    let step = outcome
        .cleaning
        .steps
        .iter()
        .find(|s| s.column() == Some("notes"))
        .expect("fallback step should be logged");
    assert_eq!(
        step.description(),
        "Filled 6 missing values in **notes** with mode ('Unknown')."
    );
}

#[test]
fn test_no_nulls_dataset_needs_no_cleaning() {
    let provider = Arc::new(RecordingProvider::new());
    let session = CleaningSession::new(
        default_pipeline(),
        Some(ReportRequester::new(provider.clone())),
    );

    let outcome = session.run(&upload("no_nulls.csv")).unwrap();

    assert!(outcome.cleaning.steps.is_empty());
    assert!(outcome.cleaning.cleaned.equals_missing(&outcome.original));

    let prompts = provider.prompts.lock().unwrap();
    assert!(prompts[0].contains(NO_STEPS_SENTINEL));
}

#[test]
fn test_missing_markers_are_imputed() {
    let session = CleaningSession::new(default_pipeline(), None);
    let outcome = session.run(&upload("missing_markers.csv")).unwrap();

    assert_eq!(
        outcome.cleaning.step_descriptions(),
        vec![
            "Filled 2 missing values in **reading** with mean (1.88).".to_string(),
            "Filled 2 missing values in **status** with mode ('ok').".to_string(),
        ]
    );
}

#[test]
fn test_report_failure_keeps_cleaned_data_and_export() {
    let session = CleaningSession::new(
        default_pipeline(),
        Some(ReportRequester::new(Arc::new(UnreachableProvider))),
    );

    let outcome = session.run(&upload("scenario_a.csv")).unwrap();

    let err = outcome.report.as_ref().unwrap().as_ref().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ReportGeneration);
    assert!(err.is_report_only());
    assert!(outcome.report_ok().is_none());
    assert_eq!(outcome.cleaning.after.rows, 2);

    let tmp = tempfile::tempdir().unwrap();
    let config = output_config(&tmp);
    let paths = write_outputs(&config, &outcome.cleaning.cleaned, outcome.report_ok()).unwrap();

    assert!(paths.report.is_none());
    let reloaded = DatasetLoader::load_path(&paths.cleaned_csv).unwrap();
    assert!(reloaded.equals_missing(&outcome.cleaning.cleaned));
    assert_eq!(
        str_values(&reloaded, "label"),
        vec![Some("a".to_string()), Some("a".to_string())]
    );
}

#[test]
fn test_export_round_trip_through_loader() {
    let cleaned = default_pipeline()
        .process(&load_csv("passengers.csv"))
        .unwrap()
        .cleaned;

    let tmp = tempfile::tempdir().unwrap();
    let config = output_config(&tmp);
    let paths = write_outputs(&config, &cleaned, None).unwrap();

    let reloaded = DatasetLoader::load_path(&paths.cleaned_csv).unwrap();
    assert_eq!(reloaded.get_column_names(), cleaned.get_column_names());
    assert!(reloaded.equals_missing(&cleaned));
}

#[test]
fn test_excel_upload() {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "product").unwrap();
    sheet.write_string(0, 1, "price").unwrap();
    sheet.write_string(1, 0, "pen").unwrap();
    sheet.write_number(1, 1, 1.5).unwrap();
    sheet.write_string(2, 0, "pen").unwrap();
    sheet.write_number(2, 1, 1.5).unwrap();
    sheet.write_string(3, 0, "ink").unwrap();
    sheet.write_string(4, 0, "pad").unwrap();
    sheet.write_number(4, 1, 2.0).unwrap();
    let bytes = workbook.save_to_buffer().unwrap();

    let session = CleaningSession::new(default_pipeline(), None);
    let outcome = session.run(&Upload::new("Stock.XLSX", bytes)).unwrap();

    assert_eq!(
        outcome.cleaning.step_descriptions(),
        vec![
            "Removed 1 duplicate rows.".to_string(),
            "Filled 1 missing values in **price** with mean (1.75).".to_string(),
        ]
    );
    let csv = String::from_utf8(to_csv_bytes(&outcome.cleaning.cleaned).unwrap()).unwrap();
    let rows: Vec<&str> = csv.lines().skip(1).collect();
    assert_eq!(rows, vec!["\"pen\",1.5", "\"ink\",1.75", "\"pad\",2.0"]);
}

#[test]
fn test_excel_round_trip_keeps_digit_strings_as_text() {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "code").unwrap();
    sheet.write_string(0, 1, "n").unwrap();
    for (row, code) in ["007", "008", "007"].into_iter().enumerate() {
        sheet.write_string(row as u32 + 1, 0, code).unwrap();
    }
    sheet.write_number(1, 1, 1.0).unwrap();
    sheet.write_number(3, 1, 3.0).unwrap();
    let bytes = workbook.save_to_buffer().unwrap();

    let session = CleaningSession::new(default_pipeline(), None);
    let outcome = session.run(&Upload::new("codes.xlsx", bytes)).unwrap();
    let cleaned = &outcome.cleaning.cleaned;
    assert_eq!(cleaned.column("code").unwrap().dtype(), &DataType::String);

    let tmp = tempfile::tempdir().unwrap();
    let paths = write_outputs(&output_config(&tmp), cleaned, None).unwrap();
    let reloaded = DatasetLoader::load_path(&paths.cleaned_csv).unwrap();

    assert_eq!(reloaded.column("code").unwrap().dtype(), &DataType::String);
    assert_eq!(
        str_values(&reloaded, "code"),
        vec![
            Some("007".to_string()),
            Some("008".to_string()),
            Some("007".to_string())
        ]
    );
    assert!(reloaded.equals_missing(cleaned));
}

// ============================================================================
// Error Tests
// ============================================================================

#[test]
fn test_unsupported_extension_is_load_error() {
    let session = CleaningSession::new(default_pipeline(), None);
    let err = session.run(&upload("notes.txt")).unwrap_err();

    assert!(matches!(err, CleanerError::UnsupportedFormat(_)));
    assert_eq!(err.kind(), ErrorKind::Load);
    assert!(err.guidance().contains("CSV or Excel"));
}

#[test]
fn test_garbage_workbook_is_load_error() {
    let session = CleaningSession::new(default_pipeline(), None);
    let err = session
        .run(&Upload::new("broken.xlsx", b"definitely not a zip".to_vec()))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Load);
}

#[test]
fn test_blank_credential_is_rejected() {
    for token in ["", "   ", "\n"] {
        let err = ApiKey::new(token).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Credential);
    }
    assert!(ApiKey::new("  AIzaSyExample  ").is_ok());
}

#[test]
fn test_prompt_without_steps_uses_sentinel() {
    let df = load_csv("no_nulls.csv");
    let result = default_pipeline().process(&df).unwrap();
    let prompt = build_report_prompt(result.before, result.after, &result.steps);

    assert_eq!(
        prompt,
        "You are an AI Data Cleaner. The dataset had 3 rows and 3 columns.\n\
         After cleaning, it has 3 rows and 3 columns.\n\
         \n\
         Cleaning steps performed:\n\
         No cleaning was required.\n\
         \n\
         Write a clear, human-like summary report explaining what was cleaned and why."
    );
}

// ============================================================================
// Cancellation Tests
// ============================================================================

#[test]
fn test_pipeline_cancellation_before_start() {
    let df = load_csv("passengers.csv");
    let token = CancellationToken::new();

    // Cancel immediately before processing
    token.cancel();

    let result = CleaningPipeline::builder()
        .cancellation_token(token)
        .build()
        .unwrap()
        .process(&df);

    assert!(matches!(result.unwrap_err(), CleanerError::Cancelled));
}

#[test]
fn test_pipeline_cancellation_token_reset() {
    let token = CancellationToken::new();
    token.cancel();
    assert!(token.is_cancelled());

    token.reset();
    assert!(!token.is_cancelled());

    let result = CleaningPipeline::builder()
        .cancellation_token(token)
        .build()
        .unwrap()
        .process(&load_csv("scenario_a.csv"));
    assert!(result.is_ok());
}

// ============================================================================
// Progress Reporting Tests
// ============================================================================

#[test]
fn test_pipeline_progress_reporting_invoked() {
    let call_count = Arc::new(AtomicUsize::new(0));
    let call_count_clone = call_count.clone();

    let result = CleaningPipeline::builder()
        .on_progress(move |_update| {
            call_count_clone.fetch_add(1, Ordering::SeqCst);
        })
        .build()
        .unwrap()
        .process(&load_csv("passengers.csv"));

    assert!(result.is_ok());
    assert!(
        call_count.load(Ordering::SeqCst) > 0,
        "Progress callback should have been invoked at least once"
    );
}

#[test]
fn test_pipeline_progress_stages_reported() {
    let stages_seen = Arc::new(Mutex::new(Vec::new()));
    let stages_clone = stages_seen.clone();

    let result = CleaningPipeline::builder()
        .on_progress(move |update: ProgressUpdate| {
            stages_clone.lock().unwrap().push(update.stage);
        })
        .build()
        .unwrap()
        .process(&load_csv("passengers.csv"));

    assert!(result.is_ok());

    let stages = stages_seen.lock().unwrap();
    let dedup_at = stages.iter().position(|s| *s == CleaningStage::Deduplicated);
    let impute_at = stages.iter().position(|s| *s == CleaningStage::Imputed);
    assert!(dedup_at.is_some() && impute_at.is_some());
    assert!(dedup_at < impute_at, "Duplicates must be resolved before imputation");
    assert_eq!(stages.last(), Some(&CleaningStage::Complete));
}

#[test]
fn test_pipeline_progress_cancelled_stage() {
    let token = CancellationToken::new();
    let stages_seen = Arc::new(Mutex::new(Vec::new()));
    let stages_clone = stages_seen.clone();

    token.cancel();

    let _ = CleaningPipeline::builder()
        .cancellation_token(token)
        .on_progress(move |update: ProgressUpdate| {
            stages_clone.lock().unwrap().push(update.stage);
        })
        .build()
        .unwrap()
        .process(&load_csv("passengers.csv"));

    let stages = stages_seen.lock().unwrap();
    assert!(
        stages.contains(&CleaningStage::Cancelled),
        "Should report Cancelled stage when cancelled"
    );
}

// ============================================================================
// Summary Accuracy Tests
// ============================================================================

#[test]
fn test_summary_row_counts() {
    let result = default_pipeline()
        .process(&load_csv("passengers.csv"))
        .unwrap();

    assert_eq!(result.summary.before.rows, 7);
    assert_eq!(result.summary.after.rows, 6);
    assert_eq!(result.summary.rows_removed(), 1);
    assert!((result.summary.rows_removed_percentage() - 100.0 / 7.0).abs() < 1e-9);
    assert_eq!(result.summary.steps, result.step_descriptions());
}

#[test]
fn test_cleaning_is_idempotent() {
    let pipeline = default_pipeline();
    let once = pipeline.process(&load_csv("passengers.csv")).unwrap();
    let twice = pipeline.process(&once.cleaned).unwrap();

    assert!(twice.steps.is_empty());
    assert!(twice.cleaned.equals_missing(&once.cleaned));
}
