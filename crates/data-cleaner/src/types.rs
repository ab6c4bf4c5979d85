//! Core data model shared across the cleaning workflow.

use crate::error::{CleanerError, Result};
use crate::utils::is_numeric_dtype;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Column Descriptors
// ============================================================================

/// Declared type of a column, used to pick the imputation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Integer or floating point values; missing cells get the mean.
    Numeric,
    /// Text, booleans, categories and dates; missing cells get the mode.
    Textual,
}

impl ColumnKind {
    /// Classify a polars dtype.
    ///
    /// Returns `None` for nested or binary types the imputation engine
    /// has no strategy for.
    pub fn from_dtype(dtype: &DataType) -> Option<Self> {
        if is_numeric_dtype(dtype) {
            return Some(Self::Numeric);
        }
        match dtype {
            DataType::String
            | DataType::Boolean
            | DataType::Categorical(_, _)
            | DataType::Date
            | DataType::Datetime(_, _)
            | DataType::Time
            | DataType::Duration(_)
            | DataType::Null => Some(Self::Textual),
            _ => None,
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric => write!(f, "numeric"),
            Self::Textual => write!(f, "textual"),
        }
    }
}

/// Name, declared kind and missing-value count of one column.
///
/// Computed once per table by [`describe_columns`] and handed to the
/// imputation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub kind: ColumnKind,
    pub missing_count: usize,
}

impl ColumnDescriptor {
    /// Whether this column needs imputation.
    pub fn has_missing(&self) -> bool {
        self.missing_count > 0
    }
}

/// Describe every column of a table, in column order.
///
/// # Errors
///
/// Returns [`CleanerError::UnsupportedColumnType`] when a column holds
/// nested or binary data.
pub fn describe_columns(df: &DataFrame) -> Result<Vec<ColumnDescriptor>> {
    df.get_columns()
        .iter()
        .map(|col| {
            let kind = ColumnKind::from_dtype(col.dtype()).ok_or_else(|| {
                CleanerError::UnsupportedColumnType {
                    column: col.name().to_string(),
                    dtype: col.dtype().to_string(),
                }
            })?;
            Ok(ColumnDescriptor {
                name: col.name().to_string(),
                kind,
                missing_count: col.null_count(),
            })
        })
        .collect()
}

// ============================================================================
// Cleaning Steps
// ============================================================================

/// One atomic transformation applied to the dataset.
///
/// Steps are produced in the order they were applied; that order is the
/// narrative the report is written from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CleaningStep {
    /// Exact duplicate rows were dropped, keeping the first occurrence.
    DuplicatesRemoved { count: usize },
    /// Missing numeric cells were filled with the column mean.
    MeanImputed {
        column: String,
        missing: usize,
        mean: f64,
    },
    /// Missing cells were filled with the column mode (or the "Unknown" fallback).
    ModeImputed {
        column: String,
        missing: usize,
        value: String,
    },
}

impl CleaningStep {
    /// Human-readable description used in the report prompt.
    pub fn description(&self) -> String {
        match self {
            Self::DuplicatesRemoved { count } => format!("Removed {} duplicate rows.", count),
            Self::MeanImputed {
                column,
                missing,
                mean,
            } => format!(
                "Filled {} missing values in **{}** with mean ({:.2}).",
                missing, column, mean
            ),
            Self::ModeImputed {
                column,
                missing,
                value,
            } => format!(
                "Filled {} missing values in **{}** with mode ('{}').",
                missing, column, value
            ),
        }
    }

    /// Column affected by this step, if it targets a single column.
    pub fn column(&self) -> Option<&str> {
        match self {
            Self::DuplicatesRemoved { .. } => None,
            Self::MeanImputed { column, .. } | Self::ModeImputed { column, .. } => Some(column),
        }
    }
}

impl fmt::Display for CleaningStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

// ============================================================================
// Shape Metrics
// ============================================================================

/// (rows, columns) snapshot of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeMetric {
    pub rows: usize,
    pub columns: usize,
}

impl ShapeMetric {
    pub fn of(df: &DataFrame) -> Self {
        Self {
            rows: df.height(),
            columns: df.width(),
        }
    }
}

impl fmt::Display for ShapeMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rows × {} columns", self.rows, self.columns)
    }
}

// ============================================================================
// Cleaning Summary
// ============================================================================

/// Machine-readable summary of one cleaning run.
///
/// # Example
///
/// ```rust,ignore
/// let result = CleaningPipeline::builder().build()?.process(&df)?;
/// println!("Cleaned {} in {}ms", result.summary.after, result.summary.duration_ms);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningSummary {
    /// Total execution time in milliseconds.
    pub duration_ms: u64,

    /// Shape before cleaning.
    pub before: ShapeMetric,
    /// Shape after cleaning.
    pub after: ShapeMetric,

    /// Number of exact duplicate rows removed.
    pub duplicates_removed: usize,

    /// Missing cells before imputation (after deduplication).
    pub missing_before: usize,
    /// Missing cells left after imputation.
    pub missing_after: usize,

    /// Columns that received a fill value, in column order.
    pub imputed_columns: Vec<String>,

    /// Descriptions of every step, in the order applied.
    pub steps: Vec<String>,
}

impl CleaningSummary {
    /// Number of rows removed by cleaning.
    pub fn rows_removed(&self) -> usize {
        self.before.rows.saturating_sub(self.after.rows)
    }

    /// Percentage of rows removed by cleaning.
    pub fn rows_removed_percentage(&self) -> f64 {
        if self.before.rows == 0 {
            0.0
        } else {
            (self.rows_removed() as f64 / self.before.rows as f64) * 100.0
        }
    }
}
