//! Gwydion: a stateful orchestration façade for chat models, tools,
//! prompt chains, and agents.
//!
//! The crate centers on [`Service`], an explicitly constructed context
//! object owning three process-wide registries:
//!
//! - a model cache handing out one shared handle per model identifier
//! - a tool registry of named string-to-string capabilities
//! - an agent store of named, long-lived agent instances
//!
//! Each operation resolves what it needs from those registries,
//! constructing and caching on first use, then invokes the capability and
//! normalizes the outcome. Configuration and resolution problems fault the
//! request; tool and chain outcomes are data the caller branches on.
//!
//! # Example
//!
//! ```rust,ignore
//! use gwydion::{Service, ToolRequest};
//!
//! let service = Service::new();
//! service.initialize().await;
//!
//! let mut arguments = serde_json::Map::new();
//! arguments.insert("expression".into(), "2+2*3".into());
//! let envelope = service.tool(ToolRequest {
//!     tool_name: "calculator".into(),
//!     arguments,
//! }).await;
//! assert_eq!(envelope.result.as_deref(), Some("8"));
//! ```

pub mod chain;
pub mod error;
pub mod schema;
pub mod service;

pub use chain::ChainConfig;
pub use error::{Result, ServiceError};
pub use schema::{
    AgentCreateRequest, AgentCreateResponse, AgentDeleteResponse, ChainRequest, ChatMessage,
    ChatRequest, ChatResponse, Envelope, HealthResponse, InitializeResponse, ModelPreloadResponse,
    PackageCheckResponse, ToolPreloadResponse, ToolRequest, VersionResponse,
};
pub use service::{DEFAULT_MODEL, Service};
