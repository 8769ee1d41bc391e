//! Error types for `works-tools`.

use thiserror::Error;

/// Main error type for Works API tools.
#[derive(Error, Debug)]
pub enum WorksToolsError {
    /// Caller input (or an upstream payload) failed local validation.
    ///
    /// Validation errors are raised before any request is sent.
    #[error("validation error: {0}")]
    Validation(String),

    /// The remote API answered with a non-2xx status.
    #[error("API returned {status} {reason}: {body}")]
    Http {
        status: u16,
        reason: String,
        body: serde_json::Value,
    },

    /// Connection, timeout or body decoding failures (URLs redacted).
    #[error("http transport error: {0}")]
    Transport(String),

    /// Invalid configuration (missing token, bad base URL).
    #[error("config error: {0}")]
    Config(String),

    /// Dispatch to a tool name the catalog does not know.
    #[error("unknown tool: {0}")]
    UnknownTool(String),
}

impl WorksToolsError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// HTTP status of a remote failure, if this error came from one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for WorksToolsError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(crate::client::sanitize_reqwest_error(&value))
    }
}

/// Result type alias for Works tool operations.
pub type Result<T> = std::result::Result<T, WorksToolsError>;
