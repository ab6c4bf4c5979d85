//! Google Gemini AI provider implementation.
//!
//! This module provides the [`GeminiProvider`] which implements the [`AIProvider`]
//! trait for Google's Gemini API (<https://ai.google.dev/>).

use std::time::Duration;

use super::{AIProvider, ApiKey};
use anyhow::{Result, anyhow};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default Gemini API endpoint.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models/";

/// Default model used for the cleaning report.
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Default timeout for API requests in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default temperature (moderate, the report is prose).
const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Default max tokens for responses.
const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Header carrying the credential.
const API_KEY_HEADER: &str = "x-goog-api-key";

// Gemini API request structures
#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

// Gemini API response structures
#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<Part>>,
}

#[derive(Deserialize)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

impl GeminiResponse {
    /// Concatenated text of the first candidate.
    fn into_text(self) -> Result<String> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(anyhow!("Gemini blocked the prompt: {}", reason));
        }

        let candidate = self
            .candidates
            .and_then(|candidates| candidates.into_iter().next())
            .ok_or_else(|| anyhow!("No response content from Gemini API"))?;

        if let Some(reason) = &candidate.finish_reason
            && (reason == "SAFETY" || reason == "BLOCKED")
        {
            return Err(anyhow!("Gemini blocked the response: {}", reason));
        }

        let text: String = candidate
            .content
            .and_then(|content| content.parts)
            .unwrap_or_default()
            .into_iter()
            .map(|part| part.text)
            .collect();

        if text.trim().is_empty() {
            return Err(anyhow!("Gemini returned an empty response"));
        }
        Ok(text)
    }
}

/// Configuration for the Gemini provider.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// The model to use (e.g., "gemini-1.5-flash", "gemini-2.0-flash").
    pub model: String,
    /// Temperature for response generation (0.0 - 2.0).
    pub temperature: f32,
    /// Maximum tokens in the response.
    pub max_tokens: u32,
    /// Request timeout in seconds. This bounds the whole report wait.
    pub timeout_secs: u64,
    /// Base URL for the API (useful for proxies or custom endpoints).
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_owned(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            base_url: DEFAULT_BASE_URL.to_owned(),
        }
    }
}

impl GeminiConfig {
    /// Create a new configuration builder.
    pub fn builder() -> GeminiConfigBuilder {
        GeminiConfigBuilder::default()
    }
}

/// Builder for [`GeminiConfig`].
#[derive(Default)]
pub struct GeminiConfigBuilder {
    model: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    timeout_secs: Option<u64>,
    base_url: Option<String>,
}

impl GeminiConfigBuilder {
    /// Set the model to use.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the temperature (0.0 - 2.0).
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the maximum tokens.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the request timeout in seconds.
    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    /// Set a custom base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Build the configuration.
    pub fn build(self) -> GeminiConfig {
        GeminiConfig {
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_owned()),
            temperature: self.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            timeout_secs: self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            base_url: self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
        }
    }
}

/// Google Gemini provider for writing the cleaning report.
///
/// # Example
///
/// ```rust,ignore
/// use data_cleaner::ai::{ApiKey, GeminiConfig, GeminiProvider};
///
/// // Simple usage with defaults
/// let provider = GeminiProvider::new(ApiKey::new(token)?)?;
///
/// // With custom configuration
/// let config = GeminiConfig::builder()
///     .model("gemini-2.0-flash")
///     .timeout_secs(30)
///     .build();
/// let provider = GeminiProvider::with_config(ApiKey::new(token)?, config)?;
/// ```
pub struct GeminiProvider {
    api_key: ApiKey,
    config: GeminiConfig,
    client: Client,
}

impl GeminiProvider {
    /// Create a new Gemini provider with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(api_key: ApiKey) -> Result<Self> {
        Self::with_config(api_key, GeminiConfig::default())
    }

    /// Create a new Gemini provider with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_config(api_key: ApiKey, config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            api_key,
            config,
            client,
        })
    }

    /// The configuration in use.
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        // {base_url}{model}:generateContent; the key travels in a header
        format!("{}{}:generateContent", self.config.base_url, self.config.model)
    }

    fn call_api(&self, prompt: &str) -> Result<String> {
        let request = GeminiRequest {
            contents: vec![Content {
                role: "user".to_owned(),
                parts: vec![Part {
                    text: prompt.to_owned(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_tokens,
            },
        };

        debug!("Requesting report from {}", self.config.model);
        let response = self
            .client
            .post(self.endpoint())
            .header("Content-Type", "application/json")
            .header(API_KEY_HEADER, self.api_key.expose())
            .json(&request)
            .send()?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Gemini API error {}: {}",
                response.status(),
                response.text()?
            ));
        }

        let result: GeminiResponse = response.json()?;
        result.into_text()
    }
}

impl AIProvider for GeminiProvider {
    fn generate_text(&self, prompt: &str) -> Result<String> {
        self.call_api(prompt)
    }

    fn name(&self) -> &str {
        "Gemini"
    }

    fn model(&self) -> Option<&str> {
        Some(&self.config.model)
    }
}

// ============================================================================
// Tests
// ============================================================================
