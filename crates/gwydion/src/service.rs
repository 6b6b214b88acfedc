//! The dispatch layer.
//!
//! [`Service`] owns the three process-wide registries (model cache, tool
//! registry, agent store) and exposes the operation surface over them.
//! It is an explicitly constructed context object: a transport layer
//! creates one at process start and routes every request through it.

use chrono::Utc;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use gwydion_agent::{
    AgentInstance, AgentKind, AgentRecord, AgentStore, CalculatorTool, ConversationMemory,
    SearchTool, ToolAgent, ToolRegistry, WeatherTool,
};
use gwydion_llm::{
    BackendFactory, CompletionRequest, Message, ModelCache, OpenAiFactory, Role,
};

use crate::chain::ChainConfig;
use crate::error::{Result, ServiceError};
use crate::schema::{
    AgentCreateRequest, AgentCreateResponse, AgentDeleteResponse, ChainRequest, ChatRequest,
    ChatResponse, Envelope, HealthResponse, InitializeResponse, ModelPreloadResponse,
    PackageCheckResponse, ToolPreloadResponse, ToolRequest, VersionResponse,
};

/// Model used when a request does not name one.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Workspace components reported by the package-check operation.
const COMPONENTS: &[(&str, &str)] = &[
    ("gwydion", env!("CARGO_PKG_VERSION")),
    ("gwydion-llm", gwydion_llm::VERSION),
    ("gwydion-agent", gwydion_agent::VERSION),
];

// ─────────────────────────────────────────────────────────────────────────────
// Service
// ─────────────────────────────────────────────────────────────────────────────

/// The orchestration façade.
///
/// All state is in-memory and process-scoped; nothing survives a restart.
pub struct Service {
    models: ModelCache,
    tools: RwLock<ToolRegistry>,
    agents: AgentStore,
    initialized: AtomicBool,
}

impl Service {
    /// Create a service resolving models through the default provider.
    pub fn new() -> Self {
        Self::with_factory(Arc::new(OpenAiFactory::new()))
    }

    /// Create a service with a custom backend factory.
    pub fn with_factory(factory: Arc<dyn BackendFactory>) -> Self {
        Self {
            models: ModelCache::new(factory),
            tools: RwLock::new(ToolRegistry::new()),
            agents: AgentStore::new(),
            initialized: AtomicBool::new(false),
        }
    }

    /// The agent store, exposed for lifecycle inspection.
    pub fn agents(&self) -> &AgentStore {
        &self.agents
    }

    /// Register a tool, replacing any existing registration with the same
    /// name.
    pub async fn register_tool(&self, tool: gwydion_agent::SharedTool) {
        self.tools.write().await.register_shared(tool);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Introspection
    // ─────────────────────────────────────────────────────────────────────

    /// Report liveness.
    pub fn health(&self) -> HealthResponse {
        HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
            initialized: self.initialized.load(Ordering::SeqCst),
        }
    }

    /// Report runtime, toolkit, and service versions.
    pub fn version(&self) -> VersionResponse {
        VersionResponse {
            runtime_version: env!("CARGO_PKG_RUST_VERSION").to_string(),
            toolkit_version: gwydion_llm::VERSION.to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Whether a named component is part of this build.
    pub fn check_package(&self, package_name: &str) -> PackageCheckResponse {
        match COMPONENTS.iter().find(|(name, _)| *name == package_name) {
            Some((_, version)) => PackageCheckResponse {
                installed: true,
                version: Some(version.to_string()),
            },
            None => PackageCheckResponse {
                installed: false,
                version: None,
            },
        }
    }

    /// Register built-in tools and warm the default model.
    ///
    /// Model preloading is best effort; a missing credential at this point
    /// is logged and initialization still succeeds.
    pub async fn initialize(&self) -> InitializeResponse {
        {
            let mut tools = self.tools.write().await;
            tools.register(CalculatorTool);
            tools.register(SearchTool);
            tools.register(WeatherTool);
        }

        if let Err(e) = self.models.resolve(DEFAULT_MODEL).await {
            tracing::warn!(model = DEFAULT_MODEL, error = %e, "Default model preload failed");
        }

        self.initialized.store(true, Ordering::SeqCst);
        let count = self.tools.read().await.len();
        tracing::info!(tools = count, "Service initialized");

        InitializeResponse {
            success: true,
            message: format!("initialized with {count} tools"),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Chat
    // ─────────────────────────────────────────────────────────────────────

    /// Run a chat completion over the given message sequence.
    ///
    /// Messages with unrecognized roles are dropped from the context, not
    /// rejected. Backend failures are request-level faults.
    pub async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let model = request.model.as_deref().unwrap_or(DEFAULT_MODEL);
        let handle = self.models.resolve(model).await?;

        let mut messages = Vec::with_capacity(request.messages.len());
        for message in &request.messages {
            match Role::from_str(&message.role) {
                Some(role) => messages.push(Message {
                    role,
                    content: message.content.clone(),
                }),
                None => {
                    tracing::debug!(role = %message.role, "Dropped message with unrecognized role");
                }
            }
        }

        let completion = handle
            .backend
            .complete(CompletionRequest::new(&handle.identifier, messages))
            .await
            .map_err(|e| {
                tracing::error!(operation = "chat", model = %handle.identifier, error = %e, "Chat failed");
                e
            })?;

        Ok(ChatResponse {
            content: completion.content,
            model: handle.identifier.clone(),
            timestamp: Utc::now(),
            usage: completion.usage,
        })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Tool Calls
    // ─────────────────────────────────────────────────────────────────────

    /// Invoke a registered tool.
    ///
    /// An unknown tool name and a failing tool are both soft failures; the
    /// request itself always succeeds.
    pub async fn tool(&self, request: ToolRequest) -> Envelope {
        let tool = match self.tools.read().await.get(&request.tool_name) {
            Some(tool) => tool,
            None => {
                tracing::warn!(
                    operation = "tool",
                    tool = %request.tool_name,
                    "Unknown tool requested"
                );
                return Envelope::failure(format!("unknown tool: '{}'", request.tool_name));
            }
        };

        let input = flatten_arguments(&request.arguments);
        match tool.call(&input) {
            Ok(result) => Envelope::ok(result),
            Err(e) => {
                tracing::warn!(
                    operation = "tool",
                    tool = %request.tool_name,
                    error = %e,
                    "Tool execution failed"
                );
                Envelope::failure(e.to_string())
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Chains
    // ─────────────────────────────────────────────────────────────────────

    /// Run a chain described by a free-form configuration mapping.
    ///
    /// Configuration problems and execution failures are soft failures;
    /// only model resolution faults the request.
    pub async fn chain(&self, request: ChainRequest) -> Result<Envelope> {
        let config = match ChainConfig::from_map(&request.chain_config) {
            Ok(config) => config,
            Err(description) => {
                tracing::warn!(operation = "chain", error = %description, "Invalid chain config");
                return Ok(Envelope::failure(description));
            }
        };

        let model = request.model.as_deref().unwrap_or(DEFAULT_MODEL);
        let handle = self.models.resolve(model).await?;

        let messages = match &config {
            ChainConfig::Llm { prompt, input } => {
                vec![Message::user(ChainConfig::render_prompt(prompt, input))]
            }
            ChainConfig::Conversation { input } => {
                let mut memory = ConversationMemory::new();
                memory.push_user(input.clone());
                memory.messages().to_vec()
            }
        };

        let completion = handle
            .backend
            .complete(CompletionRequest::new(&handle.identifier, messages))
            .await;

        match completion {
            Ok(response) => Ok(Envelope::ok(response.content)),
            Err(e) => {
                tracing::warn!(
                    operation = "chain",
                    model = %handle.identifier,
                    error = %e,
                    "Chain execution failed"
                );
                Ok(Envelope::failure(e.to_string()))
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Agent Lifecycle
    // ─────────────────────────────────────────────────────────────────────

    /// Create a named agent, overwriting any existing record with the same
    /// identifier.
    ///
    /// Tool names that do not resolve are dropped silently; an unknown
    /// agent kind faults the request.
    pub async fn create_agent(&self, request: AgentCreateRequest) -> Result<AgentCreateResponse> {
        let kind = AgentKind::from_str(&request.agent_type).ok_or_else(|| {
            tracing::error!(
                operation = "agent.create",
                agent_type = %request.agent_type,
                "Unknown agent type"
            );
            ServiceError::UnknownAgentKind(request.agent_type.clone())
        })?;

        let model = request.model.as_deref().unwrap_or(DEFAULT_MODEL);
        let handle = self.models.resolve(model).await?;

        let mut bound_tools = Vec::new();
        let mut bound_names = Vec::new();
        {
            let registry = self.tools.read().await;
            for name in &request.tools {
                match registry.get(name) {
                    Some(tool) => {
                        bound_names.push(name.clone());
                        bound_tools.push(tool);
                    }
                    None => {
                        tracing::debug!(tool = %name, "Dropped unresolved tool name");
                    }
                }
            }
        }

        let instance = match kind {
            AgentKind::Conversational => AgentInstance::Conversational {
                memory: ConversationMemory::new(),
            },
            AgentKind::ToolUsing => AgentInstance::ToolUsing {
                agent: ToolAgent::new(Arc::clone(&handle), bound_tools),
            },
        };

        self.agents
            .insert(
                request.agent_id.clone(),
                AgentRecord {
                    model: handle,
                    tools: bound_names,
                    config: request.config,
                    instance,
                },
            )
            .await;

        Ok(AgentCreateResponse {
            success: true,
            agent_id: request.agent_id,
        })
    }

    /// Delete a named agent. Deleting an absent identifier succeeds.
    pub async fn delete_agent(&self, agent_id: &str) -> AgentDeleteResponse {
        self.agents.remove(agent_id).await;
        AgentDeleteResponse { success: true }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Preloading
    // ─────────────────────────────────────────────────────────────────────

    /// Eagerly resolve a model so later operations hit the cache.
    pub async fn preload_model(&self, model: &str) -> Result<ModelPreloadResponse> {
        self.models.resolve(model).await?;
        Ok(ModelPreloadResponse {
            success: true,
            model: model.to_string(),
        })
    }

    /// Acknowledge a tool preload request.
    ///
    /// Tools are constructed at registration, so there is nothing to warm;
    /// unknown names are noted but still acknowledged.
    pub async fn preload_tool(&self, tool: &str) -> ToolPreloadResponse {
        if !self.tools.read().await.contains(tool) {
            tracing::warn!(tool = %tool, "Preload requested for unknown tool");
        }
        ToolPreloadResponse {
            success: true,
            tool: tool.to_string(),
        }
    }
}

impl Default for Service {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Argument Flattening
// ─────────────────────────────────────────────────────────────────────────────

/// Flatten named arguments into the single string a tool accepts.
///
/// One argument passes its value directly; zero or several pass the whole
/// mapping as compact JSON. Multi-argument tools parse their own input.
fn flatten_arguments(arguments: &Map<String, Value>) -> String {
    if arguments.len() == 1 {
        match arguments.values().next() {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    } else {
        Value::Object(arguments.clone()).to_string()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_flatten_single_string_argument() {
        assert_eq!(flatten_arguments(&map(json!({"x": "5"}))), "5");
    }

    #[test]
    fn test_flatten_single_non_string_argument() {
        assert_eq!(flatten_arguments(&map(json!({"x": 5}))), "5");
        assert_eq!(flatten_arguments(&map(json!({"x": [1, 2]}))), "[1,2]");
    }

    #[test]
    fn test_flatten_multiple_arguments_serializes_mapping() {
        let flattened = flatten_arguments(&map(json!({"x": "5", "y": "6"})));
        let parsed: Value = serde_json::from_str(&flattened).unwrap();
        assert_eq!(parsed, json!({"x": "5", "y": "6"}));
    }

    #[test]
    fn test_flatten_empty_arguments() {
        assert_eq!(flatten_arguments(&Map::new()), "{}");
    }

    #[test]
    fn test_check_package() {
        let service = Service::new();
        let check = service.check_package("gwydion-llm");
        assert!(check.installed);
        assert!(check.version.is_some());

        let check = service.check_package("numpy");
        assert!(!check.installed);
        assert!(check.version.is_none());
    }

    #[test]
    fn test_health_reports_initialization_state() {
        let service = Service::new();
        assert!(!service.health().initialized);
    }

    #[test]
    fn test_version_fields_are_populated() {
        let version = Service::new().version();
        assert!(!version.runtime_version.is_empty());
        assert!(!version.toolkit_version.is_empty());
        assert!(!version.service_version.is_empty());
    }
}
