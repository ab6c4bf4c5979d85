use crate::ai::AIProvider;
use crate::error::{CleanerError, Result};
use crate::pipeline::CancellationToken;
use crate::types::{CleaningStep, ShapeMetric};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Step list used when the dataset needed no cleaning.
pub const NO_STEPS_SENTINEL: &str = "No cleaning was required.";

/// How often a pending request checks its cancellation token.
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Generated prose describing one cleaning run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningReport {
    /// The provider's response, verbatim.
    pub text: String,
    /// Name of the provider that wrote it.
    pub provider: String,
    /// Model that wrote it, when the provider exposes one.
    pub model: Option<String>,
    /// Local timestamp of the response.
    pub generated_at: String,
}

/// Build the report prompt for a cleaning run.
///
/// The result depends only on its inputs.
pub fn build_report_prompt(
    before: ShapeMetric,
    after: ShapeMetric,
    steps: &[CleaningStep],
) -> String {
    let steps_text = if steps.is_empty() {
        NO_STEPS_SENTINEL.to_string()
    } else {
        steps
            .iter()
            .map(CleaningStep::description)
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "You are an AI Data Cleaner. The dataset had {} rows and {} columns.\n\
         After cleaning, it has {} rows and {} columns.\n\
         \n\
         Cleaning steps performed:\n\
         {}\n\
         \n\
         Write a clear, human-like summary report explaining what was cleaned and why.",
        before.rows, before.columns, after.rows, after.columns, steps_text
    )
}

/// Sends the report prompt to a provider.
///
/// Each call to [`request`](Self::request) makes exactly one provider call.
/// Failures never touch the cleaned table; they come back as
/// [`CleanerError::ReportGeneration`].
pub struct ReportRequester {
    provider: Arc<dyn AIProvider>,
    cancellation_token: Option<CancellationToken>,
}

static_assertions::assert_impl_all!(ReportRequester: Send, Sync);

impl ReportRequester {
    /// Create a requester around a provider.
    pub fn new(provider: Arc<dyn AIProvider>) -> Self {
        Self {
            provider,
            cancellation_token: None,
        }
    }

    /// Let `token` abandon a pending request.
    ///
    /// With a token the provider call runs on a helper thread and the
    /// caller polls the token while it waits.
    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Name of the underlying provider.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Ask the provider for a report on a finished cleaning run.
    ///
    /// # Errors
    ///
    /// - [`CleanerError::ReportGeneration`] when the provider fails or
    ///   returns nothing
    /// - [`CleanerError::Cancelled`] when the token is set before the
    ///   response arrives
    pub fn request(
        &self,
        before: ShapeMetric,
        after: ShapeMetric,
        steps: &[CleaningStep],
    ) -> Result<CleaningReport> {
        let prompt = build_report_prompt(before, after, steps);
        info!("Requesting cleaning report from {}", self.provider.name());
        debug!("Report prompt has {} steps", steps.len());

        let outcome = match &self.cancellation_token {
            Some(token) => self.generate_cancellable(prompt, token),
            None => self
                .provider
                .generate_text(&prompt)
                .map_err(|e| CleanerError::ReportGeneration(format!("{:#}", e))),
        };

        let text = outcome.and_then(|text| {
            if text.trim().is_empty() {
                Err(CleanerError::ReportGeneration(
                    "the provider returned an empty response".to_string(),
                ))
            } else {
                Ok(text)
            }
        });

        match text {
            Ok(text) => {
                info!("Report received ({} characters)", text.len());
                Ok(CleaningReport {
                    text,
                    provider: self.provider.name().to_string(),
                    model: self.provider.model().map(str::to_string),
                    generated_at: Local::now().to_rfc3339(),
                })
            }
            Err(e) => {
                warn!("Report generation failed: {}", e);
                Err(e)
            }
        }
    }

    fn generate_cancellable(&self, prompt: String, token: &CancellationToken) -> Result<String> {
        if token.is_cancelled() {
            return Err(CleanerError::Cancelled);
        }

        let (tx, rx) = mpsc::channel();
        let provider = Arc::clone(&self.provider);
        thread::spawn(move || {
            // The receiver is gone if the wait was cancelled
            let _ = tx.send(provider.generate_text(&prompt));
        });

        loop {
            match rx.recv_timeout(CANCEL_POLL_INTERVAL) {
                Ok(result) => {
                    return result.map_err(|e| CleanerError::ReportGeneration(format!("{:#}", e)));
                }
                Err(RecvTimeoutError::Timeout) => {
                    if token.is_cancelled() {
                        debug!("Report request cancelled while waiting");
                        return Err(CleanerError::Cancelled);
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(CleanerError::ReportGeneration(
                        "the provider stopped without a response".to_string(),
                    ));
                }
            }
        }
    }
}
