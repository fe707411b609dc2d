//! Conversation orchestrator: the tool-use loop
//!
//! Drives one conversation to completion: model call, tool round,
//! results appended, repeat. Tool failures become payload data, never
//! loop faults; the only aborts are the turn bound and model errors.

use crate::agent::state::{LoopEvent, LoopState};
use crate::errors::Result;
use crate::models::ModelClient;
use crate::tools::ToolRegistry;
use crate::types::{ContentBlock, ConversationState, Turn, Usage};
use std::sync::Arc;

/// Default conversation length bound, counted in turns
pub const DEFAULT_MAX_TURNS: usize = 20;

/// Fixed reply when the turn bound trips
pub const CONVERSATION_LIMIT_MESSAGE: &str =
    "Maximum conversation length reached. Please start a new conversation.";

const ARGS_PREVIEW_CHARS: usize = 100;
const RESULT_PREVIEW_CHARS: usize = 200;

/// Loop configuration
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Maximum conversation length before the loop refuses to continue
    pub max_turns: usize,

    /// Trace model/tool activity to stderr
    pub verbose: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_turns: DEFAULT_MAX_TURNS,
            verbose: false,
        }
    }
}

/// The copilot agent: model seam, tool registry, conversation state
pub struct Copilot {
    client: Arc<dyn ModelClient>,
    registry: ToolRegistry,
    system_prompt: String,
    state: ConversationState,
    loop_state: LoopState,
    config: AgentConfig,
    total_usage: Usage,
}

impl Copilot {
    /// Create an agent over a model client and a tool registry
    pub fn new(
        client: Arc<dyn ModelClient>,
        registry: ToolRegistry,
        system_prompt: impl Into<String>,
        config: AgentConfig,
    ) -> Self {
        Self {
            client,
            registry,
            system_prompt: system_prompt.into(),
            state: ConversationState::new(),
            loop_state: LoopState::Done,
            config,
            total_usage: Usage::default(),
        }
    }

    /// Run one user message through the loop to a final answer
    ///
    /// Appends the user turn, then alternates model calls and tool
    /// rounds until the model answers in plain text or the turn bound
    /// trips. Every tool invocation gets a matching result, in
    /// emission order, in a single appended user turn.
    pub async fn chat(&mut self, user_message: &str) -> Result<String> {
        self.state.push(Turn::user(user_message));
        self.loop_state = LoopState::AwaitModel;

        loop {
            if self.state.len() > self.config.max_turns {
                if self.config.verbose {
                    eprintln!(
                        "[AGENT] Turn bound hit: {} turns (max {})",
                        self.state.len(),
                        self.config.max_turns
                    );
                }
                self.loop_state = LoopState::Done;
                return Ok(CONVERSATION_LIMIT_MESSAGE.to_string());
            }

            let schemas = self.registry.schemas();
            let response = self
                .client
                .send(&self.system_prompt, &self.state, &schemas)
                .await?;
            self.total_usage.input_tokens += response.usage.input_tokens;
            self.total_usage.output_tokens += response.usage.output_tokens;

            if !response.wants_tools() {
                self.transition(LoopEvent::FinalAnswer)?;
                let text = response.joined_text();
                self.state.push(Turn::assistant(text.clone()));
                return Ok(text);
            }

            self.transition(LoopEvent::ToolsRequested)?;
            if self.config.verbose {
                eprintln!("[AGENT] Using {} tool(s)", response.tool_uses().len());
            }
            self.state.push(Turn::assistant_blocks(response.content.clone()));

            let mut results = Vec::new();
            for block in &response.content {
                if let ContentBlock::ToolUse { id, name, input } = block {
                    if self.config.verbose {
                        eprintln!(
                            "[TOOL] {}({})",
                            name,
                            preview(&input.to_string(), ARGS_PREVIEW_CHARS)
                        );
                    }
                    let payload = self.registry.execute(name, input);
                    if self.config.verbose {
                        eprintln!("[TOOL]   result: {}", preview(&payload, RESULT_PREVIEW_CHARS));
                    }
                    results.push(ContentBlock::tool_result(id.clone(), payload));
                }
            }
            self.state.push(Turn::user_blocks(results));
            self.transition(LoopEvent::ResultsAppended)?;
        }
    }

    fn transition(&mut self, event: LoopEvent) -> Result<()> {
        let next = self.loop_state.transition(event)?;
        if self.config.verbose && next != self.loop_state {
            eprintln!(
                "[STATE] {} -> {}",
                self.loop_state.display_name(),
                next.display_name()
            );
        }
        self.loop_state = next;
        Ok(())
    }

    /// Drop the conversation; registry and retrieval state survive
    pub fn reset(&mut self) {
        self.state.clear();
        self.loop_state = LoopState::Done;
        if self.config.verbose {
            eprintln!("[AGENT] Conversation cleared");
        }
    }

    /// Current conversation, in append order
    pub fn conversation(&self) -> &ConversationState {
        &self.state
    }

    /// Current loop state
    pub fn loop_state(&self) -> LoopState {
        self.loop_state
    }

    /// Registered tools
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Token usage accumulated over the process lifetime
    pub fn total_usage(&self) -> Usage {
        self.total_usage
    }
}

/// Char-safe prefix with an ellipsis marker when truncated
fn preview(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        text.to_string()
    } else {
        let prefix: String = text.chars().take(limit).collect();
        format!("{}...", prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::scripted::{tool_call, tool_call_with_id};
    use crate::models::ScriptedClient;
    use crate::tools::ToolSchema;
    use crate::types::{ModelResponse, Role, StopReason, TurnContent};
    use serde_json::{json, Value};

    fn echo_registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(
            ToolSchema::new(
                "echo",
                "Echo the text argument",
                json!({
                    "type": "object",
                    "properties": {"text": {"type": "string"}},
                    "required": ["text"]
                }),
            ),
            Box::new(|args| Ok(format!("echo:{}", args["text"].as_str().unwrap_or("")))),
        );
        registry
    }

    fn agent(responses: Vec<ModelResponse>) -> Copilot {
        Copilot::new(
            Arc::new(ScriptedClient::new(responses)),
            echo_registry(),
            "test system prompt",
            AgentConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_plain_answer_completes_in_one_call() {
        let mut copilot = agent(vec![ModelResponse::text("The minimum width is 18nm.")]);

        let answer = copilot.chat("What is the minimum Metal1 width?").await.unwrap();

        assert_eq!(answer, "The minimum width is 18nm.");
        assert_eq!(copilot.loop_state(), LoopState::Done);
        assert_eq!(copilot.conversation().len(), 2);
        assert_eq!(copilot.conversation().turns()[1].role, Role::Assistant);
    }

    #[tokio::test]
    async fn test_tool_round_pairs_result_with_invocation_id() {
        let mut copilot = agent(vec![
            tool_call_with_id("toolu_42", "echo", json!({"text": "ping"})),
            ModelResponse::text("done"),
        ]);

        let answer = copilot.chat("use the tool").await.unwrap();
        assert_eq!(answer, "done");

        let turns = copilot.conversation().turns();
        assert_eq!(turns.len(), 4);
        assert_eq!(turns[1].role, Role::Assistant);
        assert_eq!(turns[2].role, Role::User);

        match &turns[2].content {
            TurnContent::Blocks(blocks) => match &blocks[0] {
                ContentBlock::ToolResult { tool_use_id, content } => {
                    assert_eq!(tool_use_id, "toolu_42");
                    assert_eq!(content, "echo:ping");
                }
                other => panic!("expected tool result, got {:?}", other),
            },
            other => panic!("expected blocks, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_multiple_tools_one_round_preserve_order() {
        let round = ModelResponse {
            content: vec![
                ContentBlock::text("Running both."),
                ContentBlock::tool_use("toolu_a", "echo", json!({"text": "one"})),
                ContentBlock::tool_use("toolu_b", "echo", json!({"text": "two"})),
            ],
            stop_reason: StopReason::ToolUse,
            usage: Usage::default(),
        };
        let mut copilot = agent(vec![round, ModelResponse::text("done")]);

        copilot.chat("run two").await.unwrap();

        let turns = copilot.conversation().turns();
        let results = match &turns[2].content {
            TurnContent::Blocks(blocks) => blocks.clone(),
            other => panic!("expected blocks, got {:?}", other),
        };
        assert_eq!(results.len(), 2);
        match (&results[0], &results[1]) {
            (
                ContentBlock::ToolResult { tool_use_id: first, .. },
                ContentBlock::ToolResult { tool_use_id: second, .. },
            ) => {
                assert_eq!(first, "toolu_a");
                assert_eq!(second, "toolu_b");
            }
            other => panic!("expected two tool results, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_tool_becomes_error_payload() {
        let mut copilot = agent(vec![
            tool_call_with_id("toolu_7", "not_registered", json!({})),
            ModelResponse::text("recovered"),
        ]);

        let answer = copilot.chat("go").await.unwrap();
        assert_eq!(answer, "recovered");

        let turns = copilot.conversation().turns();
        match &turns[2].content {
            TurnContent::Blocks(blocks) => match &blocks[0] {
                ContentBlock::ToolResult { content, .. } => {
                    let parsed: Value = serde_json::from_str(content).unwrap();
                    assert_eq!(parsed["error"], "Unknown tool: not_registered");
                }
                other => panic!("expected tool result, got {:?}", other),
            },
            other => panic!("expected blocks, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_turn_bound_returns_fixed_message() {
        let client = Arc::new(ScriptedClient::repeating(tool_call(
            "echo",
            json!({"text": "again"}),
        )));
        let config = AgentConfig {
            max_turns: 6,
            verbose: false,
        };
        let mut copilot = Copilot::new(client.clone(), echo_registry(), "system", config);

        let answer = copilot.chat("loop forever").await.unwrap();

        assert_eq!(answer, CONVERSATION_LIMIT_MESSAGE);
        assert_eq!(copilot.loop_state(), LoopState::Done);
        // 1 user turn + 3 rounds of (assistant, tool results) = 7 turns
        assert_eq!(copilot.conversation().len(), 7);
        assert_eq!(client.calls(), 3);
    }

    #[tokio::test]
    async fn test_reset_clears_conversation_only() {
        let mut copilot = agent(vec![ModelResponse::text("hi")]);
        copilot.chat("hello").await.unwrap();
        assert_eq!(copilot.conversation().len(), 2);

        let tools_before = copilot.registry().len();
        copilot.reset();

        assert!(copilot.conversation().is_empty());
        assert_eq!(copilot.registry().len(), tools_before);
    }

    #[tokio::test]
    async fn test_usage_accumulates_across_calls() {
        let with_usage = |text: &str, input: u64, output: u64| ModelResponse {
            content: vec![ContentBlock::text(text)],
            stop_reason: StopReason::EndTurn,
            usage: Usage {
                input_tokens: input,
                output_tokens: output,
            },
        };
        let mut copilot = agent(vec![with_usage("a", 100, 10), with_usage("b", 200, 20)]);

        copilot.chat("first").await.unwrap();
        copilot.chat("second").await.unwrap();

        assert_eq!(copilot.total_usage().input_tokens, 300);
        assert_eq!(copilot.total_usage().output_tokens, 30);
    }

    #[tokio::test]
    async fn test_model_error_propagates() {
        let mut copilot = agent(vec![]);
        let result = copilot.chat("anything").await;
        assert!(result.is_err());
    }

    #[test]
    fn test_preview_truncation() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("0123456789abc", 10), "0123456789...");
        // multi-byte safe
        assert_eq!(preview("ééééé", 3), "ééé...");
    }
}
