//! Mean and mode imputation.

use crate::error::{Result, ResultExt};
use crate::types::{CleaningStep, ColumnDescriptor, ColumnKind};
use crate::utils::{
    fill_bool_nulls, fill_numeric_nulls, fill_string_nulls, numeric_mean, string_mode,
};
use polars::prelude::*;
use tracing::debug;

/// Fill value for columns whose values are all missing.
pub const FALLBACK_FILL_VALUE: &str = "Unknown";

/// Fills every missing cell of a table, one column at a time.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Fill the missing cells of every column described in `descriptors`.
    ///
    /// Returns the filled table and one step per column that had missing
    /// values, in column order. The input table is left untouched.
    pub fn impute(
        &self,
        df: &DataFrame,
        descriptors: &[ColumnDescriptor],
    ) -> Result<(DataFrame, Vec<CleaningStep>)> {
        let mut filled = df.clone();
        let mut steps = Vec::new();

        for descriptor in descriptors.iter().filter(|d| d.has_missing()) {
            let step = Self::impute_column(&mut filled, descriptor)
                .context(format!("Filling missing values in '{}'", descriptor.name))?;
            debug!("{}", step);
            steps.push(step);
        }

        Ok((filled, steps))
    }

    fn impute_column(df: &mut DataFrame, descriptor: &ColumnDescriptor) -> PolarsResult<CleaningStep> {
        let col_name = descriptor.name.as_str();
        let series = df.column(col_name)?.as_materialized_series().clone();
        let missing = series.null_count();

        if missing == series.len() {
            return Self::apply_fallback(df, col_name, &series);
        }

        match descriptor.kind {
            ColumnKind::Numeric => Self::apply_numeric_mean(df, col_name, &series),
            ColumnKind::Textual => Self::apply_mode_imputation(df, col_name, &series),
        }
    }

    fn apply_numeric_mean(
        df: &mut DataFrame,
        col_name: &str,
        series: &Series,
    ) -> PolarsResult<CleaningStep> {
        let Some(mean) = numeric_mean(series) else {
            return Self::apply_fallback(df, col_name, series);
        };

        let filled = fill_numeric_nulls(series, mean)?;
        df.replace(col_name, filled)?;

        Ok(CleaningStep::MeanImputed {
            column: col_name.to_string(),
            missing: series.null_count(),
            mean,
        })
    }

    fn apply_mode_imputation(
        df: &mut DataFrame,
        col_name: &str,
        series: &Series,
    ) -> PolarsResult<CleaningStep> {
        let Some(mode) = string_mode(series)? else {
            return Self::apply_fallback(df, col_name, series);
        };

        let filled = match (series.dtype(), mode.as_str()) {
            (DataType::Boolean, "true") => fill_bool_nulls(series, true)?,
            (DataType::Boolean, "false") => fill_bool_nulls(series, false)?,
            _ => fill_string_nulls(series, &mode)?,
        };
        df.replace(col_name, filled)?;

        Ok(CleaningStep::ModeImputed {
            column: col_name.to_string(),
            missing: series.null_count(),
            value: mode,
        })
    }

    fn apply_fallback(
        df: &mut DataFrame,
        col_name: &str,
        series: &Series,
    ) -> PolarsResult<CleaningStep> {
        let filled = fill_string_nulls(series, FALLBACK_FILL_VALUE)?;
        df.replace(col_name, filled)?;

        Ok(CleaningStep::ModeImputed {
            column: col_name.to_string(),
            missing: series.null_count(),
            value: FALLBACK_FILL_VALUE.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::describe_columns;

    fn impute(df: &DataFrame) -> (DataFrame, Vec<CleaningStep>) {
        let descriptors = describe_columns(df).unwrap();
        StatisticalImputer.impute(df, &descriptors).unwrap()
    }

    fn strings(df: &DataFrame, col: &str) -> Vec<Option<String>> {
        df.column(col)
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect()
    }

    #[test]
    fn test_numeric_mean_fill() {
        let df = df![
            "values" => [Some(1.0), None, Some(5.0)],
        ]
        .unwrap();

        let (filled, steps) = impute(&df);

        let values = filled.column("values").unwrap();
        assert_eq!(values.null_count(), 0);
        assert_eq!(values.get(1).unwrap().try_extract::<f64>().unwrap(), 3.0);
        assert_eq!(
            steps,
            vec![CleaningStep::MeanImputed {
                column: "values".into(),
                missing: 1,
                mean: 3.0,
            }]
        );
    }

    #[test]
    fn test_integer_column_becomes_float() {
        let df = df![
            "age" => [Some(1i64), Some(2), None],
        ]
        .unwrap();

        let (filled, steps) = impute(&df);
        let ages = filled.column("age").unwrap();
        assert_eq!(ages.dtype(), &DataType::Float64);
        assert_eq!(ages.get(2).unwrap().try_extract::<f64>().unwrap(), 1.5);
        assert_eq!(steps[0].description(), "Filled 1 missing values in **age** with mean (1.50).");
    }

    #[test]
    fn test_mean_is_preserved_after_fill() {
        let df = df![
            "score" => [Some(3.0), None, Some(4.5), None, Some(10.25)],
        ]
        .unwrap();
        let before = numeric_mean(df.column("score").unwrap().as_materialized_series()).unwrap();

        let (filled, _) = impute(&df);
        let after = numeric_mean(filled.column("score").unwrap().as_materialized_series()).unwrap();

        assert!((before - after).abs() < 1e-9);
    }

    #[test]
    fn test_textual_mode_fill() {
        let df = df![
            "city" => [Some("Paris"), None, Some("Rome"), Some("Paris"), None],
        ]
        .unwrap();

        let (filled, steps) = impute(&df);

        assert_eq!(
            strings(&filled, "city"),
            vec![
                Some("Paris".to_string()),
                Some("Paris".to_string()),
                Some("Rome".to_string()),
                Some("Paris".to_string()),
                Some("Paris".to_string()),
            ]
        );
        assert_eq!(
            steps[0].description(),
            "Filled 2 missing values in **city** with mode ('Paris')."
        );
    }

    #[test]
    fn test_boolean_column_keeps_dtype() {
        let df = df![
            "active" => [Some(false), None, Some(false), Some(true)],
        ]
        .unwrap();

        let (filled, steps) = impute(&df);
        let active = filled.column("active").unwrap();

        assert_eq!(active.dtype(), &DataType::Boolean);
        assert_eq!(active.null_count(), 0);
        assert!(matches!(
            &steps[0],
            CleaningStep::ModeImputed { value, .. } if value == "false"
        ));
    }

    #[test]
    fn test_all_missing_columns_fall_back_to_unknown() {
        let df = df![
            "id" => [1i64, 2, 3],
            "empty_num" => [None::<f64>, None, None],
            "empty_text" => [None::<&str>, None, None],
        ]
        .unwrap();

        let (filled, steps) = impute(&df);

        assert_eq!(steps.len(), 2);
        for (step, col) in steps.iter().zip(["empty_num", "empty_text"]) {
            assert_eq!(
                step,
                &CleaningStep::ModeImputed {
                    column: col.to_string(),
                    missing: 3,
                    value: "Unknown".to_string(),
                }
            );
            assert_eq!(strings(&filled, col), vec![Some("Unknown".to_string()); 3]);
        }
    }

    #[test]
    fn test_columns_without_missing_values_are_untouched() {
        let df = df![
            "a" => [1i64, 2, 3],
            "b" => ["x", "y", "z"],
        ]
        .unwrap();

        let (filled, steps) = impute(&df);

        assert!(steps.is_empty());
        assert!(filled.equals_missing(&df));
        assert_eq!(filled.column("a").unwrap().dtype(), &DataType::Int64);
    }

    #[test]
    fn test_steps_follow_column_order() {
        let df = df![
            "z_text" => [Some("q"), None],
            "a_num" => [Some(2.0), None],
        ]
        .unwrap();

        let (_, steps) = impute(&df);
        let columns: Vec<_> = steps.iter().filter_map(|s| s.column()).collect();
        assert_eq!(columns, vec!["z_text", "a_num"]);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let df = df![
            "values" => [Some(1.0), None],
        ]
        .unwrap();

        let _ = impute(&df);
        assert_eq!(df.column("values").unwrap().null_count(), 1);
    }

    #[test]
    fn test_stale_descriptor_reports_polars_error_with_context() {
        let df = df!["present" => [Some(1.0), None]].unwrap();
        let descriptors = vec![ColumnDescriptor {
            name: "gone".to_string(),
            kind: ColumnKind::Numeric,
            missing_count: 1,
        }];

        let err = StatisticalImputer.impute(&df, &descriptors).unwrap_err();

        assert_eq!(err.kind(), crate::error::ErrorKind::Cleaning);
        assert_eq!(err.error_code(), "POLARS_ERROR");
        assert!(err.to_string().contains("Filling missing values in 'gone'"));
    }
}
