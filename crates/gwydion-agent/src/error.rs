//! Error types for the agent crate.

use thiserror::Error;

/// Result type alias using the agent error type.
pub type Result<T> = std::result::Result<T, AgentError>;

/// Error type for agent operations.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Model backend error.
    #[error("LLM error: {0}")]
    Llm(#[from] gwydion_llm::LlmError),

    /// Tool execution error.
    #[error("Tool error: {0}")]
    Tool(#[from] crate::tool::ToolError),

    /// The agent kind is not recognized.
    #[error("Unknown agent kind: {0}")]
    UnknownKind(String),

    /// Maximum iterations exceeded without a final answer.
    #[error("Maximum iterations exceeded: {0}")]
    MaxIterations(u32),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
