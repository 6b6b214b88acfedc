//! Iterative reason/act loop over a model and a set of tools.
//!
//! The agent presents its tools to the model and runs a plain-text
//! protocol: each model turn either names an action to take or gives a
//! final answer. Tool output is fed back as an observation and the loop
//! continues until the model concludes or the iteration cap is hit.

use std::sync::Arc;

use gwydion_llm::{CompletionRequest, Message, ModelHandle};

use crate::error::{AgentError, Result};
use crate::tool::SharedTool;

/// Default cap on reasoning iterations.
const DEFAULT_MAX_ITERATIONS: u32 = 8;

// ─────────────────────────────────────────────────────────────────────────────
// Protocol Parsing
// ─────────────────────────────────────────────────────────────────────────────

/// A parsed model turn.
#[derive(Debug, PartialEq)]
enum Step {
    /// The model wants to invoke a tool with the given input.
    Action { tool: String, input: String },
    /// The model is done.
    FinalAnswer(String),
}

/// Interpret one model response.
///
/// A `Final Answer:` marker wins over any action in the same response. A
/// response with neither marker is treated as a final answer; models often
/// skip the scaffolding when no tool is needed.
fn parse_step(text: &str) -> Step {
    if let Some(idx) = text.find("Final Answer:") {
        let answer = text[idx + "Final Answer:".len()..].trim();
        return Step::FinalAnswer(answer.to_string());
    }

    let mut tool = None;
    let mut input = None;
    for line in text.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("Action:") {
            tool = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("Action Input:") {
            input = Some(rest.trim().to_string());
        }
    }

    match tool {
        Some(tool) if !tool.is_empty() => Step::Action {
            tool,
            input: input.unwrap_or_default(),
        },
        _ => Step::FinalAnswer(text.trim().to_string()),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tool Agent
// ─────────────────────────────────────────────────────────────────────────────

/// An agent that can call tools while answering an instruction.
pub struct ToolAgent {
    model: Arc<ModelHandle>,
    tools: Vec<SharedTool>,
    max_iterations: u32,
}

impl ToolAgent {
    /// Create an agent over the given model and tools.
    pub fn new(model: Arc<ModelHandle>, tools: Vec<SharedTool>) -> Self {
        Self {
            model,
            tools,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Override the iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Names of the tools available to this agent.
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    fn system_prompt(&self) -> String {
        let mut prompt = String::from(
            "You are a helpful assistant that can use tools to answer questions.\n\
             Available tools:\n",
        );
        for tool in &self.tools {
            prompt.push_str(&format!("- {}: {}\n", tool.name(), tool.description()));
        }
        prompt.push_str(
            "\nTo use a tool, respond with exactly:\n\
             Action: <tool name>\n\
             Action Input: <input>\n\
             \n\
             You will receive the result as an observation. When you know the\n\
             answer, respond with:\n\
             Final Answer: <your answer>\n",
        );
        prompt
    }

    /// Run the loop on a single instruction and return the final answer.
    pub async fn run(&self, instruction: &str) -> Result<String> {
        let mut messages = vec![
            Message::system(self.system_prompt()),
            Message::user(instruction),
        ];

        for iteration in 0..self.max_iterations {
            let request = CompletionRequest::new(&self.model.identifier, messages.clone());
            let response = self.model.backend.complete(request).await?;

            match parse_step(&response.content) {
                Step::FinalAnswer(answer) => {
                    tracing::debug!(iterations = iteration + 1, "Agent reached final answer");
                    return Ok(answer);
                }
                Step::Action { tool, input } => {
                    let observation = self.invoke_tool(&tool, &input);
                    tracing::debug!(
                        iteration = iteration + 1,
                        tool = %tool,
                        "Agent invoked tool"
                    );
                    messages.push(Message::assistant(response.content.clone()));
                    messages.push(Message::user(format!("Observation: {observation}")));
                }
            }
        }

        Err(AgentError::MaxIterations(self.max_iterations))
    }

    /// Invoke a tool, turning every problem into observation text.
    ///
    /// The model can recover from a wrong tool name or a failing tool only
    /// if it sees what happened.
    fn invoke_tool(&self, name: &str, input: &str) -> String {
        let Some(tool) = self.tools.iter().find(|t| t.name() == name) else {
            let known = self.tool_names().join(", ");
            return format!("error: unknown tool '{name}'. Available tools: {known}");
        };

        match tool.call(input) {
            Ok(output) => output,
            Err(e) => format!("error: {e}"),
        }
    }
}

impl std::fmt::Debug for ToolAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolAgent")
            .field("model", &self.model.identifier)
            .field("tools", &self.tool_names())
            .field("max_iterations", &self.max_iterations)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::CalculatorTool;
    use gwydion_llm::{CompletionResponse, MockBackend};

    fn handle(mock: Arc<MockBackend>) -> Arc<ModelHandle> {
        Arc::new(ModelHandle::new("mock-model", mock))
    }

    #[test]
    fn test_parse_final_answer() {
        let step = parse_step("I know this one.\nFinal Answer: 42");
        assert_eq!(step, Step::FinalAnswer("42".to_string()));
    }

    #[test]
    fn test_parse_action() {
        let step = parse_step("I should calculate.\nAction: calculator\nAction Input: 2+2");
        assert_eq!(
            step,
            Step::Action {
                tool: "calculator".to_string(),
                input: "2+2".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_bare_response_is_final_answer() {
        let step = parse_step("Just a plain reply.");
        assert_eq!(step, Step::FinalAnswer("Just a plain reply.".to_string()));
    }

    #[test]
    fn test_final_answer_wins_over_action() {
        let step = parse_step("Action: calculator\nAction Input: 1+1\nFinal Answer: 2");
        assert_eq!(step, Step::FinalAnswer("2".to_string()));
    }

    #[tokio::test]
    async fn test_agent_uses_tool_then_answers() {
        let mock = Arc::new(MockBackend::new(vec![
            CompletionResponse::new("mock-model", "Action: calculator\nAction Input: 2+2*3"),
            CompletionResponse::new("mock-model", "Final Answer: The result is 8."),
        ]));
        let agent = ToolAgent::new(handle(mock.clone()), vec![Arc::new(CalculatorTool)]);

        let answer = agent.run("what is 2+2*3?").await.unwrap();
        assert_eq!(answer, "The result is 8.");

        let requests = mock.requests();
        assert_eq!(requests.len(), 2);
        // The second request carries the tool output back as an observation.
        let last = requests[1].messages.last().unwrap();
        assert_eq!(last.content, "Observation: 8");
    }

    #[tokio::test]
    async fn test_agent_reports_unknown_tool_as_observation() {
        let mock = Arc::new(MockBackend::new(vec![
            CompletionResponse::new("mock-model", "Action: telescope\nAction Input: mars"),
            CompletionResponse::new("mock-model", "Final Answer: never mind"),
        ]));
        let agent = ToolAgent::new(handle(mock.clone()), vec![Arc::new(CalculatorTool)]);

        agent.run("look at mars").await.unwrap();

        let requests = mock.requests();
        let observation = &requests[1].messages.last().unwrap().content;
        assert!(observation.contains("unknown tool 'telescope'"));
        assert!(observation.contains("calculator"));
    }

    #[tokio::test]
    async fn test_agent_iteration_cap() {
        // The model never concludes.
        let mock = Arc::new(MockBackend::repeating(
            "Action: calculator\nAction Input: 1+1",
        ));
        let agent = ToolAgent::new(handle(mock), vec![Arc::new(CalculatorTool)])
            .with_max_iterations(3);

        let result = agent.run("loop forever").await;
        assert!(matches!(result, Err(AgentError::MaxIterations(3))));
    }

    #[tokio::test]
    async fn test_agent_direct_answer_without_tools() {
        let mock = Arc::new(MockBackend::with_text("Paris."));
        let agent = ToolAgent::new(handle(mock), vec![Arc::new(CalculatorTool)]);

        let answer = agent.run("capital of France?").await.unwrap();
        assert_eq!(answer, "Paris.");
    }
}
