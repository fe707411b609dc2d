//! Scripted model double for tests and the demo runner
//!
//! Deterministic, offline stand-in: responses are dequeued (or
//! repeated) instead of generated, and each call is recorded so tests
//! can assert on what the orchestrator sent.

use crate::errors::{CopilotError, Result};
use crate::models::ModelClient;
use crate::tools::ToolSchema;
use crate::types::{ContentBlock, ConversationState, ModelResponse, StopReason, Usage};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

enum Script {
    /// Responses consumed front to back; exhausted queue is an error
    Queue(VecDeque<ModelResponse>),
    /// The same response every call, forever
    Repeat(ModelResponse),
}

/// Canned-response `ModelClient`
pub struct ScriptedClient {
    script: Mutex<Script>,
    calls: AtomicUsize,
    seen_tool_counts: Mutex<Vec<usize>>,
}

impl ScriptedClient {
    /// Play back `responses` in order
    pub fn new(responses: Vec<ModelResponse>) -> Self {
        Self {
            script: Mutex::new(Script::Queue(responses.into())),
            calls: AtomicUsize::new(0),
            seen_tool_counts: Mutex::new(Vec::new()),
        }
    }

    /// Return a clone of `response` on every call
    pub fn repeating(response: ModelResponse) -> Self {
        Self {
            script: Mutex::new(Script::Repeat(response)),
            calls: AtomicUsize::new(0),
            seen_tool_counts: Mutex::new(Vec::new()),
        }
    }

    /// Number of model calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Tool-schema counts observed per call, in call order
    pub fn seen_tool_counts(&self) -> Vec<usize> {
        self.seen_tool_counts
            .lock()
            .map(|counts| counts.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ModelClient for ScriptedClient {
    async fn send(
        &self,
        _system: &str,
        _state: &ConversationState,
        tools: &[ToolSchema],
    ) -> Result<ModelResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut counts) = self.seen_tool_counts.lock() {
            counts.push(tools.len());
        }

        let mut script = self
            .script
            .lock()
            .map_err(|_| CopilotError::Generic("scripted client lock poisoned".to_string()))?;
        match &mut *script {
            Script::Queue(queue) => queue
                .pop_front()
                .ok_or_else(|| CopilotError::ModelApi("scripted responses exhausted".to_string())),
            Script::Repeat(response) => Ok(response.clone()),
        }
    }
}

/// Tool-request response with a generated `toolu_` id
pub fn tool_call(name: impl Into<String>, input: Value) -> ModelResponse {
    tool_call_with_id(format!("toolu_{}", Uuid::new_v4().simple()), name, input)
}

/// Tool-request response with a caller-chosen id
pub fn tool_call_with_id(
    id: impl Into<String>,
    name: impl Into<String>,
    input: Value,
) -> ModelResponse {
    ModelResponse {
        content: vec![ContentBlock::tool_use(id, name, input)],
        stop_reason: StopReason::ToolUse,
        usage: Usage::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_queue_plays_in_order() {
        let client = ScriptedClient::new(vec![
            ModelResponse::text("first"),
            ModelResponse::text("second"),
        ]);
        let state = ConversationState::new();

        let one = client.send("", &state, &[]).await.unwrap();
        let two = client.send("", &state, &[]).await.unwrap();
        assert_eq!(one.joined_text(), "first");
        assert_eq!(two.joined_text(), "second");
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn test_exhausted_queue_is_model_error() {
        let client = ScriptedClient::new(vec![]);
        let state = ConversationState::new();

        let err = client.send("", &state, &[]).await.unwrap_err();
        assert!(matches!(err, CopilotError::ModelApi(_)));
    }

    #[tokio::test]
    async fn test_repeating_never_exhausts() {
        let client = ScriptedClient::repeating(tool_call("list_design_rules", json!({})));
        let state = ConversationState::new();

        for _ in 0..50 {
            let response = client.send("", &state, &[]).await.unwrap();
            assert!(response.wants_tools());
        }
        assert_eq!(client.calls(), 50);
    }

    #[tokio::test]
    async fn test_tool_counts_recorded() {
        let client = ScriptedClient::repeating(ModelResponse::text("ok"));
        let state = ConversationState::new();
        let tools = vec![ToolSchema::new("a", "b", json!({}))];

        client.send("", &state, &tools).await.unwrap();
        client.send("", &state, &[]).await.unwrap();
        assert_eq!(client.seen_tool_counts(), vec![1, 0]);
    }

    #[test]
    fn test_tool_call_ids_are_unique() {
        let a = tool_call("analyze_circuit", json!({"netlist": ""}));
        let b = tool_call("analyze_circuit", json!({"netlist": ""}));

        let id_of = |r: &ModelResponse| match &r.content[0] {
            ContentBlock::ToolUse { id, .. } => id.clone(),
            _ => panic!("expected tool use"),
        };
        assert_ne!(id_of(&a), id_of(&b));
        assert!(id_of(&a).starts_with("toolu_"));
    }
}
