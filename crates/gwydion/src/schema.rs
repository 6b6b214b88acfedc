//! Request and response types for the operation surface.
//!
//! Every operation takes one request type and produces one response type;
//! both serialize cleanly so a transport layer can expose them unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ─────────────────────────────────────────────────────────────────────────────
// Service Introspection
// ─────────────────────────────────────────────────────────────────────────────

/// Response to the health operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Fixed "healthy" while the process is serving.
    pub status: String,
    /// When the check ran.
    pub timestamp: DateTime<Utc>,
    /// Whether initialization has completed.
    pub initialized: bool,
}

/// Response to the version operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionResponse {
    /// Minimum language runtime version the service was built against.
    pub runtime_version: String,
    /// Version of the model-provider layer.
    pub toolkit_version: String,
    /// Version of this service.
    pub service_version: String,
}

/// Response to the package-check operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageCheckResponse {
    /// Whether the named component is part of this build.
    pub installed: bool,
    /// Its version, when installed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Response to the initialize operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitializeResponse {
    pub success: bool,
    pub message: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Chat
// ─────────────────────────────────────────────────────────────────────────────

/// One role-tagged message in a chat request.
///
/// The role is a free string at the boundary; unrecognized roles are
/// dropped during dispatch rather than rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    /// Create a message with the given role and content.
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// Request for the chat operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model to chat with; the service default is used when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Conversation context, oldest first.
    pub messages: Vec<ChatMessage>,
    /// Tool names; accepted for surface compatibility, ignored by chat.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<String>,
    /// Memory type; accepted for surface compatibility, ignored by chat.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_type: Option<String>,
    /// Free-form options; accepted for surface compatibility, ignored by
    /// chat.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub config: HashMap<String, serde_json::Value>,
}

/// Response from the chat operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Generated text.
    pub content: String,
    /// The model that produced it.
    pub model: String,
    /// Generation timestamp.
    pub timestamp: DateTime<Utc>,
    /// Token usage, when the provider reports it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<gwydion_llm::Usage>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tool & Chain Envelopes
// ─────────────────────────────────────────────────────────────────────────────

/// Request for the tool-call operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolRequest {
    /// Registered name of the tool to invoke.
    pub tool_name: String,
    /// Named arguments, flattened to a single string before invocation.
    #[serde(default)]
    pub arguments: serde_json::Map<String, serde_json::Value>,
}

/// Soft-failure envelope returned by the tool and chain operations.
///
/// A failed tool or chain is still a successful request; the caller
/// branches on `success` rather than on a protocol fault.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Envelope {
    /// A successful outcome carrying the output text.
    pub fn ok(result: impl Into<String>) -> Self {
        Self {
            success: true,
            result: Some(result.into()),
            error: None,
        }
    }

    /// A soft failure carrying a description of what went wrong.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error.into()),
        }
    }
}

/// Request for the chain-run operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainRequest {
    /// Free-form chain configuration; must carry a `type` discriminator.
    #[serde(default)]
    pub chain_config: serde_json::Map<String, serde_json::Value>,
    /// Model to run the chain against; the service default when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Agent Lifecycle
// ─────────────────────────────────────────────────────────────────────────────

/// Request for the create-agent operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentCreateRequest {
    /// Caller-chosen identifier for the new agent.
    pub agent_id: String,
    /// Agent kind: `conversational` or `tool_using`.
    pub agent_type: String,
    /// Model to bind; the service default when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Names of tools to bind, resolved against the registry.
    #[serde(default)]
    pub tools: Vec<String>,
    /// Memory type; accepted but the memory shape is determined by the
    /// agent kind.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_type: Option<String>,
    /// Free-form options kept with the record.
    #[serde(default)]
    pub config: HashMap<String, serde_json::Value>,
}

/// Response from the create-agent operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentCreateResponse {
    pub success: bool,
    pub agent_id: String,
}

/// Response from the delete-agent operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDeleteResponse {
    pub success: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Preloading
// ─────────────────────────────────────────────────────────────────────────────

/// Response from the preload-model operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPreloadResponse {
    pub success: bool,
    pub model: String,
}

/// Response from the preload-tool operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolPreloadResponse {
    pub success: bool,
    pub tool: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
