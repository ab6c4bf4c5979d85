//! Dataset Cleaning Library
//!
//! Deterministic cleaning of tabular datasets with an LLM-written report,
//! built with Rust and Polars.
//!
//! # Overview
//!
//! A cleaning session runs four stages on one uploaded file:
//!
//! - **Loading**: CSV or Excel (first sheet) into a [`polars::prelude::DataFrame`]
//! - **Deduplication**: exact duplicate rows are removed, first occurrence kept
//! - **Imputation**: numeric columns get the mean, everything else the mode,
//!   and columns with no values at all get `"Unknown"`
//! - **Reporting**: the applied steps are sent to a text-generation service
//!   (Google Gemini by default) which explains them in plain language
//!
//! The cleaned dataset and the report can then be exported as
//! `cleaned_dataset.csv` and `cleaning_report.txt`.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use data_cleaner::{CleaningPipeline, CleaningSession, ReportRequester, Upload};
//! use data_cleaner::ai::{ApiKey, GeminiProvider};
//! use std::sync::Arc;
//!
//! // The key stays inside the provider and is dropped with the session
//! let provider = GeminiProvider::new(ApiKey::new(token)?)?;
//! let requester = ReportRequester::new(Arc::new(provider));
//!
//! let pipeline = CleaningPipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?;
//!
//! let session = CleaningSession::new(pipeline, Some(requester));
//! let outcome = session.run(&Upload::new("titanic.csv", std::fs::read("titanic.csv")?))?;
//!
//! for step in &outcome.cleaning.steps {
//!     println!("{}", step);
//! }
//! if let Some(report) = outcome.report_ok() {
//!     println!("{}", report.text);
//! }
//! ```
//!
//! # Without a report
//!
//! The pipeline is pure and needs no credential:
//!
//! ```rust,ignore
//! use data_cleaner::{CleaningPipeline, DatasetFormat, DatasetLoader};
//!
//! let df = DatasetLoader::load(&bytes, DatasetFormat::Csv)?;
//! let result = CleaningPipeline::builder().build()?.process(&df)?;
//! println!("{} -> {}", result.before, result.after);
//! ```
//!
//! # Cancellation
//!
//! Both the pipeline and the report request accept a [`CancellationToken`]:
//!
//! ```rust,ignore
//! use data_cleaner::{CancellationToken, CleanerError, CleaningPipeline};
//!
//! let token = CancellationToken::new();
//! let pipeline = CleaningPipeline::builder()
//!     .cancellation_token(token.clone())
//!     .build()?;
//!
//! match pipeline.process(&df) {
//!     Ok(result) => println!("Success!"),
//!     Err(CleanerError::Cancelled) => println!("Cancelled by user"),
//!     Err(e) => println!("Error: {}", e),
//! }
//! ```

pub mod ai;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod export;
pub mod imputers;
pub mod loader;
pub mod pipeline;
pub mod reporting;
pub mod session;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::DuplicateResolver;
pub use config::{CleanerConfig, CleanerConfigBuilder, ConfigValidationError};
pub use error::{CleanerError, ErrorKind, Result as CleanerResult, ResultExt};
pub use export::{ExportPaths, to_csv_bytes, write_outputs};
pub use imputers::{FALLBACK_FILL_VALUE, StatisticalImputer};
pub use loader::{DatasetFormat, DatasetLoader};
pub use pipeline::{
    CancellationToken, CleaningPipeline, CleaningPipelineBuilder, CleaningResult, CleaningStage,
    ClosureProgressReporter, ProgressReporter, ProgressUpdate,
};
pub use reporting::{CleaningReport, NO_STEPS_SENTINEL, ReportRequester, build_report_prompt};
pub use session::{CleaningSession, SessionOutcome, Upload};
pub use types::{
    CleaningStep, CleaningSummary, ColumnDescriptor, ColumnKind, ShapeMetric, describe_columns,
};
