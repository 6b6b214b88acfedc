//! Error types for the provider layer.

use thiserror::Error;

/// Result type alias using the provider error type.
pub type Result<T> = std::result::Result<T, LlmError>;

/// Errors produced while constructing or invoking a chat-model backend.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Required configuration is missing or invalid (e.g. no credential in
    /// the process environment).
    #[error("configuration error: {0}")]
    Config(String),

    /// The model identifier does not belong to any supported model family.
    #[error("unsupported model: {0}")]
    UnsupportedModel(String),

    /// The HTTP request to the provider failed.
    #[error("network error: {0}")]
    Network(String),

    /// The provider returned a non-success status.
    #[error("provider returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The provider response could not be interpreted.
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),

    /// Internal failure in the backend itself.
    #[error("backend error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        LlmError::Network(err.to_string())
    }
}

/// Whether a failed request is worth retrying.
///
/// Configuration and model-resolution problems are permanent; network
/// failures and provider 5xx/429 responses are transient.
pub fn is_retryable(error: &LlmError) -> bool {
    match error {
        LlmError::Network(_) => true,
        LlmError::Api { status, .. } => *status == 429 || *status >= 500,
        LlmError::Config(_)
        | LlmError::UnsupportedModel(_)
        | LlmError::InvalidResponse(_)
        | LlmError::Internal(_) => false,
    }
}
