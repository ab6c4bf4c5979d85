//! One user interaction, from upload to report.
//!
//! A session owns nothing between runs. The credential lives inside the
//! requester's provider and goes away with the session.

use crate::error::Result;
use crate::loader::{DatasetFormat, DatasetLoader};
use crate::pipeline::{CleaningPipeline, CleaningResult};
use crate::reporting::{CleaningReport, ReportRequester};
use polars::prelude::DataFrame;
use tracing::{info, warn};

/// An uploaded file: its name (for the format) and its content.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }
}

/// Everything a finished run produced.
#[derive(Debug)]
pub struct SessionOutcome {
    /// The table as loaded, for the "before" preview.
    pub original: DataFrame,
    /// The cleaning result.
    pub cleaning: CleaningResult,
    /// The report, or why it could not be produced.
    ///
    /// `None` when the session has no requester.
    pub report: Option<Result<CleaningReport>>,
}

impl SessionOutcome {
    /// The report, if one was produced.
    pub fn report_ok(&self) -> Option<&CleaningReport> {
        self.report.as_ref().and_then(|r| r.as_ref().ok())
    }
}

/// Runs load, clean and report for one upload.
pub struct CleaningSession {
    pipeline: CleaningPipeline,
    requester: Option<ReportRequester>,
}

impl CleaningSession {
    pub fn new(pipeline: CleaningPipeline, requester: Option<ReportRequester>) -> Self {
        Self {
            pipeline,
            requester,
        }
    }

    /// The pipeline used for cleaning.
    pub fn pipeline(&self) -> &CleaningPipeline {
        &self.pipeline
    }

    /// Load and clean an upload, then ask for a report.
    ///
    /// # Errors
    ///
    /// Load and cleaning errors stop the run. A report failure does not:
    /// it is returned inside [`SessionOutcome::report`].
    pub fn run(&self, upload: &Upload) -> Result<SessionOutcome> {
        let format = DatasetFormat::from_file_name(&upload.file_name)?;
        let original = DatasetLoader::load(&upload.bytes, format)?;
        info!("Session loaded '{}'", upload.file_name);

        let cleaning = self.pipeline.process(&original)?;

        let report = self.requester.as_ref().map(|requester| {
            let report = requester.request(cleaning.before, cleaning.after, &cleaning.steps);
            if report.is_err() {
                warn!("Cleaned dataset is available without a report");
            }
            report
        });

        Ok(SessionOutcome {
            original,
            cleaning,
            report,
        })
    }
}
