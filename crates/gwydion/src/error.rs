//! Request-level faults.
//!
//! Only configuration and resolution problems become faults; tool and
//! chain outcomes are reported as data inside the response envelope.

use thiserror::Error;

/// Result type alias using the service error type.
pub type Result<T> = std::result::Result<T, ServiceError>;

/// A request-level fault that aborts the operation.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Model construction or invocation failed.
    #[error(transparent)]
    Model(#[from] gwydion_llm::LlmError),

    /// The agent kind is not one of the supported kinds.
    #[error("unknown agent type: {0}")]
    UnknownAgentKind(String),

    /// A required request field is missing or malformed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use gwydion_llm::LlmError;

    #[test]
    fn test_model_errors_pass_through_display() {
        let err = ServiceError::from(LlmError::UnsupportedModel("llama".into()));
        assert_eq!(err.to_string(), "unsupported model: llama");
    }

    #[test]
    fn test_unknown_kind_display() {
        let err = ServiceError::UnknownAgentKind("autonomous".into());
        assert_eq!(err.to_string(), "unknown agent type: autonomous");
    }
}
