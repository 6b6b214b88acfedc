//! Named agent instances and their lifecycle.
//!
//! An agent is created under a caller-chosen identifier and lives until it
//! is deleted or the process exits. There is no update transition;
//! reconfiguring an agent means delete and recreate.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use gwydion_llm::ModelHandle;

use crate::agent::ToolAgent;
use crate::memory::ConversationMemory;

// ─────────────────────────────────────────────────────────────────────────────
// Agent Kinds
// ─────────────────────────────────────────────────────────────────────────────

/// The two supported agent kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentKind {
    /// Chat with persistent conversation memory, no tools.
    Conversational,
    /// Iterative reasoning over a set of tools.
    ToolUsing,
}

impl AgentKind {
    /// Wire name for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::Conversational => "conversational",
            AgentKind::ToolUsing => "tool_using",
        }
    }

    /// Parse a kind from its wire name. Unknown names return `None`.
    pub fn from_str(name: &str) -> Option<Self> {
        match name {
            "conversational" => Some(AgentKind::Conversational),
            "tool_using" => Some(AgentKind::ToolUsing),
            _ => None,
        }
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The kind-specific half of an agent record.
pub enum AgentInstance {
    /// A conversational agent and its memory.
    Conversational { memory: ConversationMemory },
    /// A tool-using agent.
    ToolUsing { agent: ToolAgent },
}

impl AgentInstance {
    /// The kind of this instance.
    pub fn kind(&self) -> AgentKind {
        match self {
            AgentInstance::Conversational { .. } => AgentKind::Conversational,
            AgentInstance::ToolUsing { .. } => AgentKind::ToolUsing,
        }
    }
}

impl std::fmt::Debug for AgentInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AgentInstance::{:?}", self.kind())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Agent Record
// ─────────────────────────────────────────────────────────────────────────────

/// Everything the store keeps about one named agent.
///
/// The model is a shared handle into the model cache; deleting the agent
/// releases this reference but never tears down the model itself.
#[derive(Debug)]
pub struct AgentRecord {
    /// The model this agent is bound to.
    pub model: Arc<ModelHandle>,

    /// Names of the tools bound at creation, in creation order.
    pub tools: Vec<String>,

    /// Free-form configuration supplied at creation.
    pub config: HashMap<String, serde_json::Value>,

    /// The kind-specific instance.
    pub instance: AgentInstance,
}

// ─────────────────────────────────────────────────────────────────────────────
// Agent Store
// ─────────────────────────────────────────────────────────────────────────────

/// Process-wide store of named agents.
#[derive(Default)]
pub struct AgentStore {
    agents: RwLock<HashMap<String, AgentRecord>>,
}

impl AgentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record under `agent_id`, overwriting any existing record.
    pub async fn insert(&self, agent_id: impl Into<String>, record: AgentRecord) {
        let agent_id = agent_id.into();
        let mut agents = self.agents.write().await;
        if agents.insert(agent_id.clone(), record).is_some() {
            tracing::warn!(agent_id = %agent_id, "Overwrote existing agent");
        } else {
            tracing::info!(agent_id = %agent_id, "Created agent");
        }
    }

    /// Remove the record under `agent_id`.
    ///
    /// Returns whether a record was actually removed; removing an absent
    /// identifier is not an error.
    pub async fn remove(&self, agent_id: &str) -> bool {
        let removed = self.agents.write().await.remove(agent_id).is_some();
        if removed {
            tracing::info!(agent_id = %agent_id, "Deleted agent");
        } else {
            tracing::debug!(agent_id = %agent_id, "Delete of absent agent ignored");
        }
        removed
    }

    /// Whether a record exists under `agent_id`.
    pub async fn contains(&self, agent_id: &str) -> bool {
        self.agents.read().await.contains_key(agent_id)
    }

    /// Read a field of a stored record through `f`.
    pub async fn with_record<T>(
        &self,
        agent_id: &str,
        f: impl FnOnce(&AgentRecord) -> T,
    ) -> Option<T> {
        self.agents.read().await.get(agent_id).map(f)
    }

    /// Number of stored agents.
    pub async fn len(&self) -> usize {
        self.agents.read().await.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.agents.read().await.is_empty()
    }
}

impl std::fmt::Debug for AgentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentStore").finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use gwydion_llm::MockBackend;

    fn record(model: &str) -> AgentRecord {
        AgentRecord {
            model: Arc::new(ModelHandle::new(
                model,
                Arc::new(MockBackend::with_text("ok")),
            )),
            tools: vec![],
            config: HashMap::new(),
            instance: AgentInstance::Conversational {
                memory: ConversationMemory::new(),
            },
        }
    }

    #[test]
    fn test_agent_kind_parsing() {
        assert_eq!(
            AgentKind::from_str("conversational"),
            Some(AgentKind::Conversational)
        );
        assert_eq!(AgentKind::from_str("tool_using"), Some(AgentKind::ToolUsing));
        assert_eq!(AgentKind::from_str("autonomous"), None);
        assert_eq!(AgentKind::from_str(""), None);
    }

    #[tokio::test]
    async fn test_insert_and_remove() {
        let store = AgentStore::new();
        assert!(store.is_empty().await);

        store.insert("a1", record("gpt-4")).await;
        assert!(store.contains("a1").await);
        assert_eq!(store.len().await, 1);

        assert!(store.remove("a1").await);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let store = AgentStore::new();
        store.insert("a1", record("gpt-4")).await;

        assert!(store.remove("a1").await);
        assert!(!store.remove("a1").await);
        assert!(!store.remove("never-existed").await);
    }

    #[tokio::test]
    async fn test_insert_overwrites_existing() {
        let store = AgentStore::new();
        store.insert("a1", record("gpt-3.5-turbo")).await;
        store.insert("a1", record("gpt-4")).await;

        assert_eq!(store.len().await, 1);
        let model = store
            .with_record("a1", |r| r.model.identifier.clone())
            .await
            .unwrap();
        assert_eq!(model, "gpt-4");
    }
}
