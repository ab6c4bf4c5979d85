//! Spreadsheet parsing with calamine.
//!
//! Only the first worksheet is read. Its first row is the header; every
//! following row is a record.

use crate::error::{CleanerError, Result};
use crate::loader::CSV_NULL_MARKERS;
use calamine::{Data, DataType as _, Reader, open_workbook_auto_from_rs};
use polars::prelude::*;
use std::collections::HashSet;
use std::io::Cursor;
use tracing::debug;

/// Read the first worksheet of a workbook into a table.
pub(crate) fn read_first_sheet(bytes: &[u8]) -> Result<DataFrame> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| CleanerError::Load(format!("unable to open the workbook: {}", e)))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| CleanerError::Load("the workbook does not contain any worksheets".to_string()))?;

    let range = workbook.worksheet_range(&sheet_name).map_err(|e| {
        CleanerError::Load(format!("unable to read worksheet '{}': {}", sheet_name, e))
    })?;
    debug!("Reading worksheet '{}' ({:?})", sheet_name, range.get_size());

    let mut rows = range.rows();
    let header_row = rows
        .next()
        .ok_or_else(|| CleanerError::Load(format!("worksheet '{}' is empty", sheet_name)))?;
    let headers = header_names(header_row);

    let empty = Data::Empty;
    let mut cells: Vec<Vec<&Data>> = vec![Vec::new(); headers.len()];
    for row in rows {
        for (idx, column) in cells.iter_mut().enumerate() {
            column.push(row.get(idx).unwrap_or(&empty));
        }
    }

    let columns: Vec<Column> = headers
        .iter()
        .zip(&cells)
        .map(|(name, values)| build_series(name, values).into())
        .collect();

    DataFrame::new(columns).map_err(|e| CleanerError::Load(e.to_string()))
}

/// Header names as strings, with blanks and repeats made unique.
fn header_names(row: &[Data]) -> Vec<String> {
    let mut seen = HashSet::new();
    row.iter()
        .enumerate()
        .map(|(idx, cell)| {
            let base = match cell_text(cell) {
                Some(text) if !text.trim().is_empty() => text,
                _ => format!("column_{}", idx + 1),
            };
            let mut name = base.clone();
            let mut suffix = 0;
            while !seen.insert(name.clone()) {
                name = format!("{}_duplicated_{}", base, suffix);
                suffix += 1;
            }
            name
        })
        .collect()
}

/// Whether a cell holds no usable value.
fn is_missing(cell: &Data) -> bool {
    match cell {
        Data::Empty | Data::Error(_) => true,
        Data::String(s) => s.trim().is_empty() || CSV_NULL_MARKERS.contains(&s.as_str()),
        _ => false,
    }
}

fn as_number(cell: &Data) -> Option<f64> {
    match cell {
        Data::Int(value) => Some(*value as f64),
        Data::Float(value) => Some(*value),
        _ => None,
    }
}

fn is_integer_valued(cell: &Data) -> bool {
    match cell {
        Data::Int(_) => true,
        Data::Float(value) => value.fract() == 0.0 && value.abs() < i64::MAX as f64,
        _ => false,
    }
}

/// Text form of a cell. Datetimes render in ISO 8601.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(value) | Data::DateTimeIso(value) | Data::DurationIso(value) => {
            Some(value.clone())
        }
        Data::Bool(value) => Some(value.to_string()),
        Data::Int(value) => Some(value.to_string()),
        Data::Float(value) => Some(value.to_string()),
        other => other.as_datetime().map(|dt| {
            if dt.time() == chrono::NaiveTime::MIN {
                dt.date().to_string()
            } else {
                dt.format("%Y-%m-%dT%H:%M:%S").to_string()
            }
        }),
    }
}

/// Build one typed column from its cells.
fn build_series(name: &str, cells: &[&Data]) -> Series {
    let present: Vec<&Data> = cells.iter().copied().filter(|c| !is_missing(c)).collect();
    let name: PlSmallStr = name.into();

    if !present.is_empty() && present.iter().all(|c| is_integer_valued(c)) {
        let values: Vec<Option<i64>> = cells
            .iter()
            .map(|c| if is_missing(c) { None } else { as_number(c).map(|v| v as i64) })
            .collect();
        return Series::new(name, values);
    }

    if !present.is_empty() && present.iter().all(|c| as_number(c).is_some()) {
        let values: Vec<Option<f64>> = cells
            .iter()
            .map(|c| if is_missing(c) { None } else { as_number(c) })
            .collect();
        return Series::new(name, values);
    }

    if !present.is_empty() && present.iter().all(|c| matches!(c, Data::Bool(_))) {
        let values: Vec<Option<bool>> = cells
            .iter()
            .map(|c| match c {
                Data::Bool(value) => Some(*value),
                _ => None,
            })
            .collect();
        return Series::new(name, values);
    }

    let values: Vec<Option<String>> = cells
        .iter()
        .map(|c| if is_missing(c) { None } else { cell_text(c) })
        .collect();
    Series::new(name, values)
}
