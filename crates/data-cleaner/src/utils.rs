//! Shared utilities for the cleaning workflow.
//!
//! This module contains dtype checks, column statistics and null-filling
//! helpers used by the duplicate resolver and the imputation engine.

use polars::prelude::*;
use std::collections::BTreeMap;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Total number of null cells in a DataFrame.
pub fn total_missing(df: &DataFrame) -> usize {
    df.get_columns().iter().map(|col| col.null_count()).sum()
}

// =============================================================================
// Series Statistics Utilities
// =============================================================================

/// Calculate the mean of the non-null values of a numeric Series.
///
/// Returns `None` when the series has no non-null values.
pub fn numeric_mean(series: &Series) -> Option<f64> {
    if series.null_count() == series.len() {
        return None;
    }
    series.mean()
}

/// Calculate the mode (most frequent non-null value) of a Series as a string.
///
/// Ties resolve to the smallest value in ascending string order, so the
/// result never depends on hash iteration order.
pub fn string_mode(series: &Series) -> PolarsResult<Option<String>> {
    let non_null = series.drop_nulls();
    if non_null.is_empty() {
        return Ok(None);
    }

    let str_series = non_null.cast(&DataType::String)?;
    let mut value_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for val in str_series.str()?.into_iter().flatten() {
        *value_counts.entry(val).or_insert(0) += 1;
    }

    // BTreeMap iterates in ascending order; strict `>` keeps the first of any tie.
    let mut best: Option<(&str, usize)> = None;
    for (val, count) in value_counts {
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((val, count));
        }
    }

    Ok(best.map(|(val, _)| val.to_string()))
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Fill null values in a numeric Series with a specific value.
///
/// The result is always `Float64`.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let floats = series.cast(&DataType::Float64)?;
    let filled: Vec<f64> = floats
        .f64()?
        .into_iter()
        .map(|val| val.unwrap_or(fill_value))
        .collect();

    Ok(Series::new(series.name().clone(), filled))
}

/// Fill null values in a Series with a string value.
///
/// Non-null values are converted to their string form, so the result is
/// always `String`.
pub fn fill_string_nulls(series: &Series, fill_value: &str) -> PolarsResult<Series> {
    let strings = series.cast(&DataType::String)?;
    let filled: Vec<&str> = strings
        .str()?
        .into_iter()
        .map(|val| val.unwrap_or(fill_value))
        .collect();

    Ok(Series::new(series.name().clone(), filled))
}

/// Fill null values in a Boolean Series, keeping the Boolean dtype.
pub fn fill_bool_nulls(series: &Series, fill_value: bool) -> PolarsResult<Series> {
    let filled: Vec<bool> = series
        .bool()?
        .into_iter()
        .map(|val| val.unwrap_or(fill_value))
        .collect();

    Ok(Series::new(series.name().clone(), filled))
}

// =============================================================================
// Tests
// =============================================================================
