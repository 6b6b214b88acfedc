//! Agent core for Gwydion.
//!
//! This crate provides the pieces the dispatch layer composes into agents:
//!
//! - [`Tool`] and [`ToolRegistry`]: named string-to-string capabilities
//! - Built-in tools: [`CalculatorTool`], [`SearchTool`], [`WeatherTool`]
//! - [`ConversationMemory`]: ordered history for conversational agents
//! - [`ToolAgent`]: the iterative reason/act loop over a model and tools
//! - [`AgentStore`]: named agent instances with their configuration

pub mod agent;
pub mod error;
pub mod memory;
pub mod store;
pub mod tool;
pub mod tools;

pub use agent::ToolAgent;
pub use error::{AgentError, Result};
pub use memory::ConversationMemory;
pub use store::{AgentInstance, AgentKind, AgentRecord, AgentStore};
pub use tool::{SharedTool, Tool, ToolError, ToolRegistry};
pub use tools::{CalculatorTool, SearchTool, WeatherTool};

/// Version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
