//! Chat-model provider layer for Gwydion.
//!
//! This crate defines the narrow interface the rest of the system uses to
//! talk to a chat-completion provider, plus the cache that hands out one
//! reusable client handle per model identifier.
//!
//! # Core Components
//!
//! - [`ChatBackend`]: the provider seam, `complete(request) -> response`
//! - [`OpenAiBackend`]: OpenAI-compatible HTTP implementation
//! - [`MockBackend`]: scripted backend for deterministic tests
//! - [`ModelCache`]: lazy, idempotent model-identifier → handle resolution

pub mod backend;
pub mod cache;
pub mod error;
pub mod openai;
pub mod types;

pub use backend::{ChatBackend, MockBackend, SharedBackend, with_retry};
pub use cache::{BackendFactory, ModelCache, ModelHandle};
pub use error::{LlmError, Result};
pub use openai::{OpenAiBackend, OpenAiConfig, OpenAiFactory, SUPPORTED_MODEL_PREFIXES};
pub use types::{CompletionRequest, CompletionResponse, Message, Role, Usage};

/// Version of this crate, reported as the toolkit version at the boundary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
