//! Message types for the conversation loop
//!
//! Defines the turn/content-block structures exchanged between the
//! orchestrator, the model service, and the tool layer.

use serde::{Deserialize, Serialize};

/// Who authored a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One typed block inside a turn's content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Freeform text
    Text { text: String },
    /// Model-requested tool invocation
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    /// Outcome of a tool invocation, keyed back by id
    ToolResult { tool_use_id: String, content: String },
}

impl ContentBlock {
    /// Create a text block
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    /// Create a tool use block
    pub fn tool_use(
        id: impl Into<String>,
        name: impl Into<String>,
        input: serde_json::Value,
    ) -> Self {
        ContentBlock::ToolUse {
            id: id.into(),
            name: name.into(),
            input,
        }
    }

    /// Create a tool result block
    pub fn tool_result(tool_use_id: impl Into<String>, content: impl Into<String>) -> Self {
        ContentBlock::ToolResult {
            tool_use_id: tool_use_id.into(),
            content: content.into(),
        }
    }

    /// True for tool use blocks
    pub fn is_tool_use(&self) -> bool {
        matches!(self, ContentBlock::ToolUse { .. })
    }
}

/// Turn content: plain text or a list of typed blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TurnContent {
    /// Simple text content
    Text(String),
    /// Structured content blocks
    Blocks(Vec<ContentBlock>),
}

impl From<String> for TurnContent {
    fn from(s: String) -> Self {
        TurnContent::Text(s)
    }
}

impl From<&str> for TurnContent {
    fn from(s: &str) -> Self {
        TurnContent::Text(s.to_string())
    }
}

impl From<Vec<ContentBlock>> for TurnContent {
    fn from(blocks: Vec<ContentBlock>) -> Self {
        TurnContent::Blocks(blocks)
    }
}

/// One role-tagged entry in the conversation sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: TurnContent,
}

impl Turn {
    /// Create a plain-text user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: TurnContent::Text(content.into()),
        }
    }

    /// Create a plain-text assistant turn
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: TurnContent::Text(content.into()),
        }
    }

    /// Create a user turn carrying structured blocks (tool results)
    pub fn user_blocks(blocks: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::User,
            content: TurnContent::Blocks(blocks),
        }
    }

    /// Create an assistant turn carrying structured blocks (raw model content)
    pub fn assistant_blocks(blocks: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content: TurnContent::Blocks(blocks),
        }
    }

    /// Tool use blocks inside this turn, in emission order
    pub fn tool_uses(&self) -> Vec<&ContentBlock> {
        match &self.content {
            TurnContent::Text(_) => Vec::new(),
            TurnContent::Blocks(blocks) => blocks.iter().filter(|b| b.is_tool_use()).collect(),
        }
    }
}

/// Ordered, append-only sequence of turns
///
/// Appended turns are never reordered or mutated; the sequence alone
/// is the full context sent on every model call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationState {
    turns: Vec<Turn>,
}

impl ConversationState {
    /// Create an empty conversation
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// All turns, in append order
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Number of turns
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// True when no turns exist
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Discard all turns (session reset)
    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

/// Why the model stopped generating
///
/// Opaque to the loop logic; unrecognized values map to `Other` so a
/// new API stop reason never fails response parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Model finished naturally
    #[default]
    EndTurn,
    /// Model wants tool results before continuing
    ToolUse,
    /// Hit the output token cap
    MaxTokens,
    /// Hit a stop sequence
    StopSequence,
    /// Any stop reason this build does not know
    #[serde(other)]
    Other,
}

/// Token usage counters, opaque to the loop logic
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl Usage {
    /// Total tokens for this call
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

/// One complete model response: ordered content blocks plus observability fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelResponse {
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: StopReason,
    #[serde(default)]
    pub usage: Usage,
}

impl ModelResponse {
    /// Create a plain-text response
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::text(text)],
            stop_reason: StopReason::EndTurn,
            usage: Usage::default(),
        }
    }

    /// Tool use blocks in emission order
    pub fn tool_uses(&self) -> Vec<&ContentBlock> {
        self.content.iter().filter(|b| b.is_tool_use()).collect()
    }

    /// True when the response requests at least one tool
    pub fn wants_tools(&self) -> bool {
        self.content.iter().any(|b| b.is_tool_use())
    }

    /// Concatenated text of all text blocks, in order
    pub fn joined_text(&self) -> String {
        self.content
            .iter()
            .filter_map(|b| match b {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }
}
