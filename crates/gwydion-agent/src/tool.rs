//! Tool trait and registry.
//!
//! Tools are named string-to-string capabilities: they receive one input
//! string and produce one output string. Anything richer (structured
//! arguments, multiple parameters) is flattened to a string by the caller
//! before it reaches the tool.

use std::collections::HashMap;
use std::sync::Arc;

// ─────────────────────────────────────────────────────────────────────────────
// Tool Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Error raised by a tool that could not complete its work.
///
/// Tools that can describe a problem in their output text should do so and
/// return `Ok`; this error is for genuine execution failures.
#[derive(Debug, thiserror::Error)]
#[error("tool '{tool}' failed: {message}")]
pub struct ToolError {
    /// Name of the failing tool.
    pub tool: String,
    /// What went wrong.
    pub message: String,
}

impl ToolError {
    /// Create a new tool error.
    pub fn new(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            message: message.into(),
        }
    }
}

/// A named capability an agent can invoke.
pub trait Tool: Send + Sync {
    /// Unique name used to look the tool up and to present it to the model.
    fn name(&self) -> &str;

    /// One-line description shown to the model when choosing tools.
    fn description(&self) -> &str;

    /// Run the tool on a single input string.
    fn call(&self, input: &str) -> Result<String, ToolError>;
}

/// A tool that can be shared across agents and threads.
pub type SharedTool = Arc<dyn Tool>;

// ─────────────────────────────────────────────────────────────────────────────
// Tool Registry
// ─────────────────────────────────────────────────────────────────────────────

/// Registry of available tools, keyed by name.
///
/// Registration is last-write-wins: registering a name that already exists
/// replaces the previous tool.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, SharedTool>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under its own name.
    pub fn register(&mut self, tool: impl Tool + 'static) {
        self.register_shared(Arc::new(tool));
    }

    /// Register an already-shared tool under its own name.
    pub fn register_shared(&mut self, tool: SharedTool) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_some() {
            tracing::debug!(tool = %name, "Replaced existing tool registration");
        } else {
            tracing::debug!(tool = %name, "Registered tool");
        }
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<SharedTool> {
        self.tools.get(name).cloned()
    }

    /// Whether a tool with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Names of all registered tools, sorted for stable output.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
