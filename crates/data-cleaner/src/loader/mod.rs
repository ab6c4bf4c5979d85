//! Dataset loading.
//!
//! Turns uploaded bytes into a [`DataFrame`]. The format is picked from the
//! file extension; column order and header names are kept as given.

mod csv;
mod excel;

use crate::error::{CleanerError, Result, ResultExt};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

pub use csv::CSV_NULL_MARKERS;

/// File formats the loader accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetFormat {
    /// Comma-separated text with a header row.
    Csv,
    /// A spreadsheet workbook (`.xlsx`, `.xlsm`, `.xlsb` or `.xls`).
    Excel,
}

impl DatasetFormat {
    /// Resolve the format from a file name's extension, ignoring case.
    pub fn from_file_name(name: &str) -> Result<Self> {
        let extension = Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" | "xlsm" | "xlsb" | "xls" => Ok(Self::Excel),
            _ => Err(CleanerError::UnsupportedFormat(format!(
                "'{}' (expected .csv, .xlsx, .xlsm, .xlsb or .xls)",
                name
            ))),
        }
    }
}

impl fmt::Display for DatasetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => write!(f, "CSV"),
            Self::Excel => write!(f, "Excel"),
        }
    }
}

/// Parses uploaded bytes into a table.
pub struct DatasetLoader;

impl DatasetLoader {
    /// Parse `bytes` as a table in the given format.
    ///
    /// # Errors
    ///
    /// Returns [`CleanerError::Load`] for empty input, malformed content or a
    /// workbook with no worksheets.
    pub fn load(bytes: &[u8], format: DatasetFormat) -> Result<DataFrame> {
        if bytes.is_empty() {
            return Err(CleanerError::Load("the file is empty".to_string()));
        }

        let df = match format {
            DatasetFormat::Csv => csv::read_csv_bytes(bytes)?,
            DatasetFormat::Excel => excel::read_first_sheet(bytes)?,
        };

        info!(
            "Loaded {} dataset: {} rows x {} columns",
            format,
            df.height(),
            df.width()
        );
        Ok(df)
    }

    /// Read a file from disk, picking the format from its name.
    pub fn load_path(path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        let format = DatasetFormat::from_file_name(file_name)?;

        debug!("Reading {}", path.display());
        let bytes = std::fs::read(path).context(format!("Reading '{}'", path.display()))?;

        Self::load(&bytes, format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_format_from_file_name() {
        assert_eq!(DatasetFormat::from_file_name("data.csv").unwrap(), DatasetFormat::Csv);
        assert_eq!(DatasetFormat::from_file_name("DATA.CSV").unwrap(), DatasetFormat::Csv);
        for name in ["a.xlsx", "b.XLSM", "c.xlsb", "d.xls"] {
            assert_eq!(DatasetFormat::from_file_name(name).unwrap(), DatasetFormat::Excel);
        }
    }

    #[test]
    fn test_unsupported_extension_is_load_error() {
        for name in ["notes.txt", "archive.csv.gz", "no_extension"] {
            let err = DatasetFormat::from_file_name(name).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Load);
            assert_eq!(err.error_code(), "UNSUPPORTED_FORMAT");
        }
    }

    #[test]
    fn test_empty_input_is_load_error() {
        let err = DatasetLoader::load(b"", DatasetFormat::Csv).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Load);
    }

    #[test]
    fn test_load_path_missing_file() {
        let err = DatasetLoader::load_path("does/not/exist.csv").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Load);
        assert_eq!(err.error_code(), "IO_ERROR");
        assert!(err.to_string().contains("does/not/exist.csv"));
    }
}
