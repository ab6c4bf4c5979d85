//! Writing the cleaned dataset and the report.

use crate::config::CleanerConfig;
use crate::error::{CleanerError, Result};
use crate::reporting::CleaningReport;
use polars::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Paths written by [`write_outputs`].
#[derive(Debug, Clone, Serialize)]
pub struct ExportPaths {
    /// The cleaned dataset.
    pub cleaned_csv: PathBuf,
    /// The report, when one was available.
    pub report: Option<PathBuf>,
}

/// Serialize a table as comma-separated text with a header row.
///
/// Missing cells become empty fields. Text fields are always quoted so
/// values such as `"007"` reload as text rather than numbers.
pub fn to_csv_bytes(df: &DataFrame) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut df = df.clone();

    CsvWriter::new(&mut buffer)
        .include_header(true)
        .with_separator(b',')
        .with_quote_style(QuoteStyle::NonNumeric)
        .finish(&mut df)
        .map_err(|e| CleanerError::Export(format!("could not serialize dataset: {}", e)))?;

    Ok(buffer)
}

/// Write the cleaned dataset and, when present, the report text.
///
/// The output directory is created if needed. The report is written
/// exactly as the provider returned it.
pub fn write_outputs(
    config: &CleanerConfig,
    cleaned: &DataFrame,
    report: Option<&CleaningReport>,
) -> Result<ExportPaths> {
    fs::create_dir_all(&config.output_dir).map_err(|e| {
        CleanerError::Export(format!(
            "could not create '{}': {}",
            config.output_dir.display(),
            e
        ))
    })?;

    let cleaned_csv = config.cleaned_path();
    fs::write(&cleaned_csv, to_csv_bytes(cleaned)?).map_err(|e| {
        CleanerError::Export(format!("could not write '{}': {}", cleaned_csv.display(), e))
    })?;
    info!("Saved cleaned dataset to {}", cleaned_csv.display());

    let report_path = match report {
        Some(report) => {
            let path = config.report_path();
            fs::write(&path, &report.text).map_err(|e| {
                CleanerError::Export(format!("could not write '{}': {}", path.display(), e))
            })?;
            info!("Saved report to {}", path.display());
            Some(path)
        }
        None => None,
    };

    Ok(ExportPaths {
        cleaned_csv,
        report: report_path,
    })
}
