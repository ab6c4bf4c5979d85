//! Imputation module for handling missing values.
//!
//! Numeric columns are filled with their mean, textual columns with their
//! mode. Columns with no observed values fall back to `"Unknown"`.

mod statistical;

pub use statistical::{FALLBACK_FILL_VALUE, StatisticalImputer};
