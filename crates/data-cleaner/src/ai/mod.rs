//! Text-generation providers used to write the cleaning report.
//!
//! # Feature Flag
//!
//! The concrete [`GeminiProvider`] requires the `ai` feature flag. The
//! [`AIProvider`] trait and [`ApiKey`] are always available, so custom or
//! offline providers can be plugged in without it.
//!
//! ```toml
//! # Enable Gemini support (default)
//! data-cleaner = { version = "0.1", features = ["ai"] }
//!
//! # Cleaning only, no HTTP client
//! data-cleaner = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use data_cleaner::ai::{ApiKey, GeminiProvider};
//! use data_cleaner::reporting::ReportRequester;
//! use std::sync::Arc;
//!
//! let key = ApiKey::new(user_supplied_token)?;
//! let provider = Arc::new(GeminiProvider::new(key)?);
//! let requester = ReportRequester::new(provider);
//! ```

mod credential;
mod provider;

pub use credential::ApiKey;
pub use provider::AIProvider;

#[cfg(feature = "ai")]
mod gemini;

#[cfg(feature = "ai")]
pub use gemini::{GeminiConfig, GeminiConfigBuilder, GeminiProvider};
