//! Cleaning pipeline and its builder.
//!
//! The pipeline runs the fixed cleaning sequence over a private copy of the
//! loaded table: remove duplicates, fill missing values, summarize.

use crate::cleaner::DuplicateResolver;
use crate::config::CleanerConfig;
use crate::error::{CleanerError, Result};
use crate::imputers::StatisticalImputer;
use crate::pipeline::progress::{
    CancellationToken, ClosureProgressReporter, CleaningStage, ProgressReporter, ProgressUpdate,
};
use crate::types::{CleaningStep, CleaningSummary, ShapeMetric, describe_columns};
use crate::utils::total_missing;
use polars::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Output of one cleaning run.
#[derive(Debug, Clone)]
pub struct CleaningResult {
    /// The cleaned table.
    pub cleaned: DataFrame,
    /// Every transformation applied, in order.
    pub steps: Vec<CleaningStep>,
    /// Shape of the table handed to the pipeline.
    pub before: ShapeMetric,
    /// Shape of the cleaned table.
    pub after: ShapeMetric,
    /// Serializable summary of the run.
    pub summary: CleaningSummary,
}

impl CleaningResult {
    /// Descriptions of every step, in order.
    pub fn step_descriptions(&self) -> Vec<String> {
        self.steps.iter().map(CleaningStep::description).collect()
    }
}

/// The cleaning pipeline.
///
/// Use [`CleaningPipeline::builder()`] to create one.
///
/// # Example
///
/// ```rust,ignore
/// use data_cleaner::{CancellationToken, CleaningPipeline};
///
/// let token = CancellationToken::new();
///
/// let result = CleaningPipeline::builder()
///     .cancellation_token(token.clone())
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .process(&dataframe)?;
///
/// println!("{} -> {}", result.before, result.after);
/// ```
pub struct CleaningPipeline {
    config: CleanerConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    cancellation_token: CancellationToken,
    resolver: DuplicateResolver,
    imputer: StatisticalImputer,
}

static_assertions::assert_impl_all!(CleaningPipeline: Send);

impl CleaningPipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> CleaningPipelineBuilder {
        CleaningPipelineBuilder::default()
    }

    /// The configuration this pipeline was built with.
    pub fn config(&self) -> &CleanerConfig {
        &self.config
    }

    /// Clean a table.
    ///
    /// The input is never modified. On error no partial result is returned.
    ///
    /// # Errors
    ///
    /// Returns `Err(CleanerError::Cancelled)` if the cancellation token was
    /// set before a stage started, or a cleaning error if a column could
    /// not be processed.
    pub fn process(&self, df: &DataFrame) -> Result<CleaningResult> {
        match self.process_internal(df) {
            Ok(result) => {
                self.report_progress(ProgressUpdate::complete("Cleaning completed successfully"));
                Ok(result)
            }
            Err(e) => {
                if e.is_cancelled() {
                    self.report_progress(ProgressUpdate::cancelled());
                } else {
                    self.report_progress(ProgressUpdate::failed(e.to_string()));
                }
                error!("Cleaning error: {}", e);
                Err(e)
            }
        }
    }

    /// Check if cancellation has been requested.
    fn check_cancelled(&self) -> Result<()> {
        if self.cancellation_token.is_cancelled() {
            return Err(CleanerError::Cancelled);
        }
        Ok(())
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn process_internal(&self, df: &DataFrame) -> Result<CleaningResult> {
        let start_time = Instant::now();
        let before = ShapeMetric::of(df);

        self.check_cancelled()?;
        info!("Starting cleaning of {}", before);
        let working = df.clone();
        self.report_progress(ProgressUpdate::new(
            CleaningStage::Loaded,
            1.0,
            format!("Dataset loaded: {}", before),
        ));

        // Stage 1: duplicates
        self.check_cancelled()?;
        self.report_progress(ProgressUpdate::new(
            CleaningStage::Deduplicated,
            0.0,
            "Removing duplicate rows...",
        ));
        let (deduplicated, duplicates_removed) = self.resolver.resolve(&working)?;
        let mut steps: Vec<CleaningStep> = DuplicateResolver::step_for(duplicates_removed)
            .into_iter()
            .collect();
        info!("Removed {} duplicate rows", duplicates_removed);
        self.report_progress(ProgressUpdate::new(
            CleaningStage::Deduplicated,
            1.0,
            format!("Removed {} duplicate rows", duplicates_removed),
        ));

        // Stage 2: missing values
        self.check_cancelled()?;
        self.report_progress(ProgressUpdate::new(
            CleaningStage::Imputed,
            0.0,
            "Filling missing values...",
        ));
        let descriptors = describe_columns(&deduplicated)?;
        for descriptor in &descriptors {
            debug!(
                "  {}: {} ({} missing)",
                descriptor.name, descriptor.kind, descriptor.missing_count
            );
        }
        let missing_before = total_missing(&deduplicated);
        let (cleaned, imputation_steps) = self.imputer.impute(&deduplicated, &descriptors)?;
        let missing_after = total_missing(&cleaned);
        if missing_after > 0 {
            return Err(CleanerError::Cleaning(format!(
                "{} missing values remain after imputation",
                missing_after
            )));
        }
        info!(
            "Filled {} missing values across {} columns",
            missing_before,
            imputation_steps.len()
        );
        steps.extend(imputation_steps);
        self.report_progress(ProgressUpdate::new(
            CleaningStage::Imputed,
            1.0,
            format!("Filled {} missing values", missing_before),
        ));

        // Stage 3: summary
        self.check_cancelled()?;
        let after = ShapeMetric::of(&cleaned);
        let summary = CleaningSummary {
            duration_ms: start_time.elapsed().as_millis() as u64,
            before,
            after,
            duplicates_removed,
            missing_before,
            missing_after,
            imputed_columns: steps
                .iter()
                .filter_map(|step| step.column().map(str::to_string))
                .collect(),
            steps: steps.iter().map(CleaningStep::description).collect(),
        };
        self.report_progress(ProgressUpdate::new(
            CleaningStage::Summarized,
            1.0,
            format!("Cleaned dataset: {}", after),
        ));
        info!("Cleaning finished in {}ms: {}", summary.duration_ms, after);

        Ok(CleaningResult {
            cleaned,
            steps,
            before,
            after,
            summary,
        })
    }
}

/// Builder for creating a [`CleaningPipeline`] instance.
///
/// Use [`CleaningPipeline::builder()`] to get started.
#[derive(Default)]
pub struct CleaningPipelineBuilder {
    config: Option<CleanerConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    cancellation_token: Option<CancellationToken>,
}

static_assertions::assert_impl_all!(CleaningPipelineBuilder: Send);

impl CleaningPipelineBuilder {
    /// Set the configuration.
    pub fn config(mut self, config: CleanerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during processing.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// This is a convenience method for simple progress handling.
    /// For more complex scenarios, use [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Set a cancellation token for stopping the pipeline between stages.
    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<CleaningPipeline, crate::config::ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(CleaningPipeline {
            config,
            progress_reporter: self.progress_reporter,
            cancellation_token: self.cancellation_token.unwrap_or_default(),
            resolver: DuplicateResolver,
            imputer: StatisticalImputer,
        })
    }
}
