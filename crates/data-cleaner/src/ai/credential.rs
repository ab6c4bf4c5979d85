//! The user-supplied API key.

use crate::error::{CleanerError, Result};
use std::fmt;

/// An opaque credential for the text-generation service.
///
/// The value is only readable inside the crate, where the provider puts it
/// in a request header. `Debug` and `Display` never print it.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Validate and wrap a raw token.
    ///
    /// Surrounding whitespace is trimmed. An empty token, or one with
    /// whitespace inside, fails with [`CleanerError::Credential`].
    pub fn new(token: impl AsRef<str>) -> Result<Self> {
        let token = token.as_ref().trim();

        if token.is_empty() {
            return Err(CleanerError::Credential("API key is empty".to_string()));
        }
        if token.chars().any(char::is_whitespace) {
            return Err(CleanerError::Credential(
                "API key must not contain whitespace".to_string(),
            ));
        }

        Ok(Self(token.to_string()))
    }

    #[cfg_attr(not(feature = "ai"), allow(dead_code))]
    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}
