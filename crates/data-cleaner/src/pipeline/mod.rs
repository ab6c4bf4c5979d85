//! Pipeline module.
//!
//! This module provides the cleaning pipeline and its progress plumbing.

mod builder;
pub mod progress;

pub use builder::{CleaningPipeline, CleaningPipelineBuilder, CleaningResult};
pub use progress::{
    CancellationToken, ClosureProgressReporter, CleaningStage, ProgressReporter, ProgressUpdate,
};
