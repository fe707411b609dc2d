//! Anthropic Messages API client
//!
//! Thin HTTP wrapper: serialize the conversation, POST once, map the
//! response body into `ModelResponse`. No retries, no streaming.

use crate::errors::{CopilotError, Result};
use crate::models::ModelClient;
use crate::tools::ToolSchema;
use crate::types::{ContentBlock, ConversationState, ModelResponse, StopReason, Turn, Usage};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Messages API endpoint
pub const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Default model when none is configured
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// API version header value
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Output token cap per call
const MAX_TOKENS: u32 = 4096;

/// Per-request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    #[serde(skip_serializing_if = "<[ToolSchema]>::is_empty")]
    tools: &'a [ToolSchema],
    messages: &'a [Turn],
}

#[derive(Deserialize)]
struct MessagesReply {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<StopReason>,
    #[serde(default)]
    usage: Usage,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    #[serde(rename = "type")]
    kind: String,
    message: String,
}

/// HTTP client for the Anthropic Messages API
#[derive(Debug)]
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
}

impl AnthropicClient {
    /// Create a client with an explicit key and model
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_API_URL.to_string(),
            max_tokens: MAX_TOKENS,
        })
    }

    /// Create a client from the environment
    ///
    /// Reads the key from `ANTHROPIC_API_KEY`; `model` falls back to
    /// the default when `None`.
    pub fn from_env(model: Option<String>) -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| CopilotError::MissingApiKey(API_KEY_ENV.to_string()))?;
        Self::new(api_key, model.unwrap_or_else(|| DEFAULT_MODEL.to_string()))
    }

    /// Override the endpoint (proxies, test servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the response token cap
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Configured model name
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ModelClient for AnthropicClient {
    async fn send(
        &self,
        system: &str,
        state: &ConversationState,
        tools: &[ToolSchema],
    ) -> Result<ModelResponse> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system,
            tools,
            messages: state.turns(),
        };

        let response = self
            .client
            .post(&self.base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = match serde_json::from_str::<ApiErrorBody>(&body) {
                Ok(parsed) => format!("{}: {}", parsed.error.kind, parsed.error.message),
                Err(_) => body,
            };
            return Err(CopilotError::ModelApi(format!("{} ({})", detail, status)));
        }

        let reply: MessagesReply = response.json().await?;
        Ok(ModelResponse {
            content: reply.content,
            stop_reason: reply.stop_reason.unwrap_or_default(),
            usage: reply.usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_creation() {
        let client = AnthropicClient::new("sk-test", DEFAULT_MODEL).unwrap();
        assert_eq!(client.model(), "claude-sonnet-4-20250514");
        assert_eq!(client.base_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_base_url_override() {
        let client = AnthropicClient::new("sk-test", "custom-model")
            .unwrap()
            .with_base_url("http://localhost:9999/v1/messages");
        assert_eq!(client.base_url, "http://localhost:9999/v1/messages");
    }

    #[test]
    fn test_max_tokens_override() {
        let client = AnthropicClient::new("sk-test", DEFAULT_MODEL)
            .unwrap()
            .with_max_tokens(1024);
        assert_eq!(client.max_tokens, 1024);
    }

    #[test]
    fn test_request_serialization_shape() {
        let mut state = ConversationState::new();
        state.push(Turn::user("What is the minimum Metal1 width?"));

        let tools = vec![ToolSchema::new(
            "query_design_rule",
            "Query a rule",
            json!({"type": "object", "properties": {}, "required": []}),
        )];
        let request = MessagesRequest {
            model: "claude-sonnet-4-20250514",
            max_tokens: MAX_TOKENS,
            system: "You are an EDA copilot.",
            tools: &tools,
            messages: state.turns(),
        };

        let wire = serde_json::to_value(&request).unwrap();
        assert_eq!(wire["model"], "claude-sonnet-4-20250514");
        assert_eq!(wire["messages"][0]["role"], "user");
        assert_eq!(wire["tools"][0]["name"], "query_design_rule");
        assert!(wire["tools"][0]["input_schema"].is_object());
    }

    #[test]
    fn test_empty_tools_omitted_from_wire() {
        let state = ConversationState::new();
        let request = MessagesRequest {
            model: DEFAULT_MODEL,
            max_tokens: MAX_TOKENS,
            system: "",
            tools: &[],
            messages: state.turns(),
        };

        let wire = serde_json::to_value(&request).unwrap();
        assert!(wire.get("tools").is_none());
    }

    #[test]
    fn test_reply_deserialization() {
        let body = json!({
            "id": "msg_01",
            "type": "message",
            "role": "assistant",
            "content": [
                {"type": "text", "text": "Checking the DRM."},
                {"type": "tool_use", "id": "toolu_01", "name": "query_design_rule",
                 "input": {"layer": "M1", "rule_type": "min_width"}}
            ],
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 420, "output_tokens": 55}
        });

        let reply: MessagesReply = serde_json::from_value(body).unwrap();
        assert_eq!(reply.content.len(), 2);
        assert_eq!(reply.stop_reason, Some(StopReason::ToolUse));
        assert_eq!(reply.usage.total(), 475);
    }

    #[test]
    fn test_reply_null_stop_reason_defaults() {
        let body = json!({
            "content": [{"type": "text", "text": "ok"}],
            "stop_reason": null,
            "usage": {"input_tokens": 1, "output_tokens": 1}
        });

        let reply: MessagesReply = serde_json::from_value(body).unwrap();
        assert_eq!(reply.stop_reason, None);
    }

    #[test]
    fn test_missing_key_error() {
        // Run with the variable scrubbed so from_env must fail
        if std::env::var(API_KEY_ENV).is_ok() {
            return;
        }
        let err = AnthropicClient::from_env(None).unwrap_err();
        assert!(matches!(err, CopilotError::MissingApiKey(_)));
    }
}
