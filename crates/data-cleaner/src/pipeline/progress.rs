//! Progress reporting and cancellation support for the cleaning pipeline.
//!
//! # Example
//!
//! ```rust,ignore
//! use data_cleaner::{CancellationToken, CleaningPipeline};
//!
//! let token = CancellationToken::new();
//! let token_clone = token.clone();
//!
//! // In another thread
//! std::thread::spawn(move || token_clone.cancel());
//!
//! let result = CleaningPipeline::builder()
//!     .cancellation_token(token)
//!     .on_progress(|update| {
//!         println!("[{:?}] {}", update.stage, update.message);
//!     })
//!     .build()?
//!     .process(&df);
//! ```

use serde::{Deserialize, Serialize};
use signal_hook::consts::SIGINT;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Stages of a cleaning run, in the order they happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleaningStage {
    /// The original table has been received and copied
    Loaded,
    /// Exact duplicate rows have been removed
    Deduplicated,
    /// Missing values have been filled
    Imputed,
    /// Shapes and the step log have been collected
    Summarized,
    /// Run completed successfully
    Complete,
    /// Run was cancelled
    Cancelled,
    /// Run failed with an error
    Failed,
}

impl CleaningStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Loaded => "Loading Data",
            Self::Deduplicated => "Removing Duplicates",
            Self::Imputed => "Imputing Values",
            Self::Summarized => "Summarizing",
            Self::Complete => "Complete",
            Self::Cancelled => "Cancelled",
            Self::Failed => "Failed",
        }
    }

    /// Share of the overall run spent in this stage (0.0 - 1.0).
    pub fn weight(&self) -> f32 {
        match self {
            Self::Loaded => 0.05,
            Self::Deduplicated => 0.40,
            Self::Imputed => 0.45,
            Self::Summarized => 0.10,
            Self::Complete | Self::Cancelled | Self::Failed => 0.0,
        }
    }

    /// Cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Loaded => 0.0,
            Self::Deduplicated => 0.05,
            Self::Imputed => 0.45,
            Self::Summarized => 0.90,
            Self::Complete => 1.0,
            Self::Cancelled | Self::Failed => 0.0,
        }
    }
}

/// A single progress notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Current stage
    pub stage: CleaningStage,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Progress within current stage (0.0 - 1.0)
    pub stage_progress: f32,

    /// Human-readable message describing current activity
    pub message: String,
}

impl ProgressUpdate {
    /// Creates a new progress update for a stage.
    pub fn new(stage: CleaningStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let progress = stage.base_progress() + (stage.weight() * stage_progress);
        Self {
            stage,
            progress: progress.clamp(0.0, 1.0),
            stage_progress: stage_progress.clamp(0.0, 1.0),
            message: message.into(),
        }
    }

    /// Creates a completion progress update.
    pub fn complete(message: impl Into<String>) -> Self {
        Self {
            stage: CleaningStage::Complete,
            progress: 1.0,
            stage_progress: 1.0,
            message: message.into(),
        }
    }

    /// Creates a cancelled progress update.
    pub fn cancelled() -> Self {
        Self {
            stage: CleaningStage::Cancelled,
            progress: 0.0,
            stage_progress: 0.0,
            message: "Cleaning cancelled".to_string(),
        }
    }

    /// Creates a failed progress update.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stage: CleaningStage::Failed,
            progress: 0.0,
            stage_progress: 0.0,
            message: message.into(),
        }
    }
}

/// Trait for receiving progress updates during cleaning.
///
/// Implementations must be `Send + Sync` so a run can be moved to a
/// worker thread while the caller keeps listening.
pub trait ProgressReporter: Send + Sync {
    /// Called at every stage transition.
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    /// Creates a new closure-based progress reporter.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

/// Token for cancelling a cleaning run or a pending report request.
///
/// Clones share one atomic flag, so [`cancel()`](Self::cancel) may be
/// called from any thread. The pipeline checks the token between stages
/// and the report requester polls it while waiting for the provider; both
/// return [`CleanerError::Cancelled`](crate::error::CleanerError::Cancelled).
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

static_assertions::assert_impl_all!(CancellationToken: Send, Sync);
static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);

impl CancellationToken {
    /// Creates a new cancellation token.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation has been requested on this token or any clone.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Clear the flag so the token can be reused for another run.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }

    /// Cancel this token when the process receives Ctrl-C.
    ///
    /// A second Ctrl-C while the token is already cancelled exits with
    /// status 130.
    pub fn cancel_on_interrupt(&self) -> std::io::Result<()> {
        signal_hook::flag::register_conditional_shutdown(
            SIGINT,
            130,
            Arc::clone(&self.cancelled),
        )?;
        signal_hook::flag::register(SIGINT, Arc::clone(&self.cancelled))?;
        Ok(())
    }
}
