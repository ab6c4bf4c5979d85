//! Configuration types for the cleaning workflow.
//!
//! Only the surroundings of a run are configurable: where results are written
//! and how much of each table is previewed. The cleaning rules themselves
//! (duplicate removal, mean/mode imputation) are fixed.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default file name for the exported cleaned dataset.
pub const DEFAULT_CLEANED_FILE_NAME: &str = "cleaned_dataset.csv";

/// Default file name for the exported report.
pub const DEFAULT_REPORT_FILE_NAME: &str = "cleaning_report.txt";

/// Default number of rows shown in the before/after previews.
pub const DEFAULT_PREVIEW_ROWS: usize = 10;

/// Configuration for a cleaning session.
///
/// Use [`CleanerConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use data_cleaner::config::CleanerConfig;
///
/// let config = CleanerConfig::builder()
///     .output_dir("results")
///     .preview_rows(5)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanerConfig {
    /// Directory the cleaned dataset and report are written to.
    /// Default: "output"
    pub output_dir: PathBuf,

    /// File name of the exported cleaned dataset.
    /// Default: "cleaned_dataset.csv"
    pub cleaned_file_name: String,

    /// File name of the exported report.
    /// Default: "cleaning_report.txt"
    pub report_file_name: String,

    /// Number of rows shown in the original/cleaned previews.
    /// Default: 10
    pub preview_rows: usize,

    /// Whether to write the exports to disk.
    /// When false, results are kept in memory only.
    /// Default: true
    pub save_to_disk: bool,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            cleaned_file_name: DEFAULT_CLEANED_FILE_NAME.to_owned(),
            report_file_name: DEFAULT_REPORT_FILE_NAME.to_owned(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
            save_to_disk: true,
        }
    }
}

impl CleanerConfig {
    /// Create a new configuration builder.
    pub fn builder() -> CleanerConfigBuilder {
        CleanerConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.preview_rows == 0 {
            return Err(ConfigValidationError::InvalidPreviewRows(self.preview_rows));
        }

        for (field, name) in [
            ("cleaned_file_name", &self.cleaned_file_name),
            ("report_file_name", &self.report_file_name),
        ] {
            if name.trim().is_empty() || name.contains(['/', '\\']) {
                return Err(ConfigValidationError::InvalidFileName {
                    field: field.to_string(),
                    value: name.clone(),
                });
            }
        }

        if self.cleaned_file_name == self.report_file_name {
            return Err(ConfigValidationError::ConflictingFileNames(
                self.cleaned_file_name.clone(),
            ));
        }

        Ok(())
    }

    /// Full path of the exported cleaned dataset.
    pub fn cleaned_path(&self) -> PathBuf {
        self.output_dir.join(&self.cleaned_file_name)
    }

    /// Full path of the exported report.
    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(&self.report_file_name)
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid preview rows: {0} (must be at least 1)")]
    InvalidPreviewRows(usize),

    #[error("Invalid file name for '{field}': '{value}' (must be non-empty and contain no path separators)")]
    InvalidFileName { field: String, value: String },

    #[error("Cleaned dataset and report cannot share the file name '{0}'")]
    ConflictingFileNames(String),
}

/// Builder for [`CleanerConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct CleanerConfigBuilder {
    output_dir: Option<PathBuf>,
    cleaned_file_name: Option<String>,
    report_file_name: Option<String>,
    preview_rows: Option<usize>,
    save_to_disk: Option<bool>,
}

impl CleanerConfigBuilder {
    /// Set the output directory for the exports.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Set the file name of the exported cleaned dataset.
    pub fn cleaned_file_name(mut self, name: impl Into<String>) -> Self {
        self.cleaned_file_name = Some(name.into());
        self
    }

    /// Set the file name of the exported report.
    pub fn report_file_name(mut self, name: impl Into<String>) -> Self {
        self.report_file_name = Some(name.into());
        self
    }

    /// Set how many rows the previews show.
    pub fn preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = Some(rows);
        self
    }

    /// Enable or disable writing the exports to disk.
    pub fn save_to_disk(mut self, save: bool) -> Self {
        self.save_to_disk = Some(save);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `CleanerConfig` or an error if validation fails.
    pub fn build(self) -> Result<CleanerConfig, ConfigValidationError> {
        let config = CleanerConfig {
            output_dir: self.output_dir.unwrap_or_else(|| PathBuf::from("output")),
            cleaned_file_name: self
                .cleaned_file_name
                .unwrap_or_else(|| DEFAULT_CLEANED_FILE_NAME.to_owned()),
            report_file_name: self
                .report_file_name
                .unwrap_or_else(|| DEFAULT_REPORT_FILE_NAME.to_owned()),
            preview_rows: self.preview_rows.unwrap_or(DEFAULT_PREVIEW_ROWS),
            save_to_disk: self.save_to_disk.unwrap_or(true),
        };

        config.validate()?;
        Ok(config)
    }
}
