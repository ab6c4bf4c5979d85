//! AI provider trait for abstracting LLM interactions.
//!
//! The report requester only needs "prompt in, text out", so any backend
//! (a hosted API, a local model, a canned test double) can stand behind
//! this trait without touching the cleaning code.

use anyhow::Result;

/// Trait for providers that turn a prompt into prose.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the requester runs the call on a
/// helper thread so the caller can cancel the wait.
///
/// # Error Handling
///
/// Implementations return meaningful errors via `anyhow::Result`. The
/// requester maps every failure to a report-generation error; there is no
/// retry and no fallback text.
pub trait AIProvider: Send + Sync {
    /// Send `prompt` once and return the generated text verbatim.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The service cannot be reached or times out
    /// - The request is rejected (bad credential, quota, any non-2xx status)
    /// - The response is empty or was blocked
    fn generate_text(&self, prompt: &str) -> Result<String>;

    /// Get the provider name for logging and the report header.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// assert_eq!(provider.name(), "Gemini");
    /// ```
    fn name(&self) -> &str;

    /// Get the model being used by this provider.
    ///
    /// Returns `None` if the provider doesn't expose model information.
    fn model(&self) -> Option<&str> {
        None
    }
}
