//! Chain configuration parsing and prompt templating.
//!
//! Chain configurations arrive as free-form JSON mappings; they are
//! validated into [`ChainConfig`] at the boundary, before any model is
//! resolved. Parse problems are descriptions, not faults: the dispatcher
//! turns them into soft-failure envelopes.

use serde_json::{Map, Value};

/// Placeholder the prompt template substitutes the input into.
const INPUT_PLACEHOLDER: &str = "{input}";

/// A validated chain configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ChainConfig {
    /// Single-turn templated prompt.
    Llm {
        /// Template with an optional `{input}` placeholder. Absent means
        /// pass the input through unchanged.
        prompt: Option<String>,
        /// Input substituted into the template.
        input: String,
    },
    /// Multi-turn exchange seeded with a fresh, request-scoped memory.
    Conversation {
        /// The user's turn.
        input: String,
    },
}

impl ChainConfig {
    /// Validate a free-form configuration mapping.
    ///
    /// Requires a `type` discriminator of `llm` or `conversation`; the
    /// type-specific fields default to empty when absent.
    pub fn from_map(config: &Map<String, Value>) -> Result<Self, String> {
        let chain_type = match config.get("type").and_then(Value::as_str) {
            Some(t) => t,
            None => return Err("chain config is missing a 'type' discriminator".to_string()),
        };

        let input = string_field(config, "input");

        match chain_type {
            "llm" => Ok(ChainConfig::Llm {
                prompt: config
                    .get("prompt")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                input,
            }),
            "conversation" => Ok(ChainConfig::Conversation { input }),
            other => Err(format!("unsupported chain type: '{other}'")),
        }
    }

    /// Render the prompt an llm chain sends to the model.
    pub fn render_prompt(prompt: &Option<String>, input: &str) -> String {
        match prompt {
            Some(template) => template.replace(INPUT_PLACEHOLDER, input),
            None => input.to_string(),
        }
    }
}

fn string_field(config: &Map<String, Value>, key: &str) -> String {
    config
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
