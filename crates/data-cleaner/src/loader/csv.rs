//! CSV parsing.

use crate::error::{CleanerError, Result};
use polars::prelude::*;
use std::io::Cursor;

/// Cell contents read as missing, in addition to empty fields.
pub const CSV_NULL_MARKERS: [&str; 8] = ["NA", "N/A", "n/a", "NaN", "nan", "null", "NULL", "#N/A"];

/// Read CSV bytes with a header row.
///
/// Column types are inferred from the first 1000 rows.
pub(crate) fn read_csv_bytes(bytes: &[u8]) -> Result<DataFrame> {
    let null_values = NullValues::AllColumns(
        CSV_NULL_MARKERS
            .iter()
            .map(|marker| PlSmallStr::from(*marker))
            .collect(),
    );

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(1000))
        .with_parse_options(
            CsvParseOptions::default()
                .with_quote_char(Some(b'"'))
                .with_null_values(Some(null_values)),
        )
        .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
        .finish()
        .map_err(|e| CleanerError::Load(e.to_string()))
}
