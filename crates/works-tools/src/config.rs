//! Connection settings for the Works API.

use crate::error::{Result, WorksToolsError};
use std::fmt;
use url::Url;

/// Public Works API host every tool talks to unless overridden.
pub const DEFAULT_BASE_URL: &str = "https://www.worksapis.com/v1.0";

/// Environment variable holding the bearer token.
pub const TOKEN_ENV: &str = "WORKS_API_TOKEN";

/// Immutable, validated settings shared by every tool call.
#[derive(Clone)]
pub struct WorksApiConfig {
    base_url: Url,
    token: String,
}

impl WorksApiConfig {
    /// Build a config from a base URL and a bearer token.
    ///
    /// # Errors
    ///
    /// Returns a config error if the token is blank, or if the base URL does not parse or is not
    /// `http(s)`.
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(WorksToolsError::Config(format!(
                "{TOKEN_ENV} must be set to a non-empty bearer token"
            )));
        }

        let base_url = Url::parse(base_url.trim()).map_err(|e| {
            WorksToolsError::Config(format!("Invalid base URL '{base_url}': {e}"))
        })?;
        let scheme = base_url.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(WorksToolsError::Config(format!(
                "Invalid base URL '{base_url}': unsupported scheme '{scheme}'"
            )));
        }

        Ok(Self {
            base_url,
            token: token.trim().to_string(),
        })
    }

    /// Build a config against [`DEFAULT_BASE_URL`].
    ///
    /// # Errors
    ///
    /// Returns a config error if the token is blank.
    pub fn with_token(token: impl Into<String>) -> Result<Self> {
        Self::new(DEFAULT_BASE_URL, token)
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for WorksApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorksApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("token", &"***REDACTED***")
            .finish()
    }
}
