//! Error types for the cleaning workflow.
//!
//! This module provides a single error enum built with `thiserror`. Every
//! variant belongs to one [`ErrorKind`], which tells the interactive layer
//! what failed and what the user can do about it:
//!
//! - [`ErrorKind::Credential`] halts before any file is read
//! - [`ErrorKind::Load`] halts before cleaning
//! - [`ErrorKind::Cleaning`] halts the pipeline with no partial output
//! - [`ErrorKind::ReportGeneration`] only affects the report; the cleaned
//!   dataset and its export stay available
//!
//! Errors are serializable so they can be embedded in the JSON session summary.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the cleaning workflow.
#[derive(Error, Debug)]
pub enum CleanerError {
    /// The run was cancelled by the surrounding interaction.
    #[error("Operation cancelled")]
    Cancelled,

    /// The credential is missing or malformed.
    #[error("Invalid credential: {0}")]
    Credential(String),

    /// The uploaded file has an extension we cannot read.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// The uploaded file could not be parsed into a table.
    #[error("Could not parse dataset: {0}")]
    Load(String),

    /// A column has a type the imputation engine cannot handle.
    #[error("Column '{column}' has unsupported type {dtype}")]
    UnsupportedColumnType { column: String, dtype: String },

    /// Deduplication or imputation failed.
    #[error("Failed to clean data: {0}")]
    Cleaning(String),

    /// The text-generation service failed to produce a report.
    #[error("Failed to generate report: {0}")]
    ReportGeneration(String),

    /// Writing the cleaned dataset or report failed.
    #[error("Failed to export results: {0}")]
    Export(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<CleanerError>,
    },
}

/// Coarse classification of a [`CleanerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Credential,
    Load,
    Cleaning,
    ReportGeneration,
    Export,
    Cancelled,
}

impl CleanerError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        CleanerError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code for machine-readable output.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Cancelled => "CANCELLED",
            Self::Credential(_) => "CREDENTIAL_ERROR",
            Self::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            Self::Load(_) => "LOAD_ERROR",
            Self::UnsupportedColumnType { .. } => "UNSUPPORTED_COLUMN_TYPE",
            Self::Cleaning(_) => "CLEANING_ERROR",
            Self::ReportGeneration(_) => "REPORT_GENERATION_ERROR",
            Self::Export(_) => "EXPORT_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// The taxonomy class this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Credential(_) => ErrorKind::Credential,
            Self::UnsupportedFormat(_) | Self::Load(_) | Self::Io(_) => ErrorKind::Load,
            Self::UnsupportedColumnType { .. } | Self::Cleaning(_) | Self::Polars(_) => {
                ErrorKind::Cleaning
            }
            Self::ReportGeneration(_) => ErrorKind::ReportGeneration,
            Self::Export(_) => ErrorKind::Export,
            Self::WithContext { source, .. } => source.kind(),
        }
    }

    /// A short hint telling the user how to recover.
    pub fn guidance(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Credential => {
                "Provide your Gemini API key with --api-key or the GEMINI_API_KEY environment variable."
            }
            ErrorKind::Load => "Please make sure your file is a valid CSV or Excel file.",
            ErrorKind::Cleaning => {
                "The dataset could not be cleaned. Check that every column holds numbers or text, then try again."
            }
            ErrorKind::ReportGeneration => {
                "The cleaned dataset is still available. Check your API key and network connection, then re-run to get a report."
            }
            ErrorKind::Export => "Check that the output directory exists and is writable.",
            ErrorKind::Cancelled => "Re-run the command to start over.",
        }
    }

    /// Check if this error represents a cancellation.
    pub fn is_cancelled(&self) -> bool {
        self.kind() == ErrorKind::Cancelled
    }

    /// Whether the cleaned dataset is still usable after this error.
    pub fn is_report_only(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::ReportGeneration | ErrorKind::Cancelled
        )
    }
}

impl Serialize for CleanerError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("CleanerError", 3)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("kind", &self.kind())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for cleaning operations.
pub type Result<T> = std::result::Result<T, CleanerError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| CleanerError::Polars(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::io::Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| CleanerError::Io(e).with_context(context))
    }
}
