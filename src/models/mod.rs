//! Model service: the one seam that talks to a language model
//!
//! - `ModelClient` trait: conversation state in, one response out
//! - `AnthropicClient`: HTTP implementation over the Messages API
//! - `ScriptedClient`: canned responses for tests and the demo runner

pub mod client;
pub mod scripted;

pub use client::AnthropicClient;
pub use scripted::ScriptedClient;

use crate::errors::Result;
use crate::tools::ToolSchema;
use crate::types::{ConversationState, ModelResponse};
use async_trait::async_trait;

/// Injection seam over the model API
///
/// The orchestrator only ever sees this trait; swapping the HTTP
/// client for a scripted double changes nothing else.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// One synchronous model call: full conversation, system
    /// instructions, and the advertised tool schemas
    async fn send(
        &self,
        system: &str,
        state: &ConversationState,
        tools: &[ToolSchema],
    ) -> Result<ModelResponse>;
}
