//! Duplicate row removal.
//!
//! Two rows are duplicates when every column holds the same value, with
//! null equal to null. The first occurrence of each row is kept and the
//! surviving rows keep their original relative order.

use crate::error::{Result, ResultExt};
use crate::types::CleaningStep;
use polars::prelude::*;
use tracing::debug;

/// Finds and removes exact-duplicate rows.
pub struct DuplicateResolver;

impl DuplicateResolver {
    /// Remove every row that repeats an earlier row.
    ///
    /// Returns the reduced table and the number of rows removed. The input
    /// table is left untouched.
    pub fn resolve(&self, df: &DataFrame) -> Result<(DataFrame, usize)> {
        if df.height() == 0 {
            return Ok((df.clone(), 0));
        }

        let deduplicated = first_occurrences(df).context("Removing duplicate rows")?;
        let removed = df.height() - deduplicated.height();

        if removed > 0 {
            debug!("Removed {} duplicate rows", removed);
        } else {
            debug!("No duplicate rows found");
        }

        Ok((deduplicated, removed))
    }

    /// Count the rows [`resolve`](Self::resolve) would remove.
    pub fn count_duplicates(&self, df: &DataFrame) -> Result<usize> {
        if df.height() == 0 {
            return Ok(0);
        }
        let distinct = first_occurrences(df).context("Counting duplicate rows")?;
        Ok(df.height() - distinct.height())
    }

    /// The step to log for a resolution, or `None` when nothing was removed.
    pub fn step_for(removed: usize) -> Option<CleaningStep> {
        (removed > 0).then_some(CleaningStep::DuplicatesRemoved { count: removed })
    }
}

/// First occurrence of every distinct row, in original order.
fn first_occurrences(df: &DataFrame) -> PolarsResult<DataFrame> {
    df.unique_stable(None, UniqueKeepStrategy::First, None)
}
