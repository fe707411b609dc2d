//! Error types for the edapilot agent system.

use thiserror::Error;

/// Main error type for the copilot
#[derive(Error, Debug)]
pub enum CopilotError {
    /// Agent loop state machine errors
    #[error("Invalid state transition from {from:?} to {to:?}: {reason}")]
    InvalidTransition {
        from: String,
        to: String,
        reason: String,
    },

    /// Conversation safety bound tripped
    #[error("Conversation length limit reached: {turns} turns >= {max} turns")]
    ConversationLimit { turns: usize, max: usize },

    /// Model API errors (non-2xx responses, malformed bodies)
    #[error("Model API error: {0}")]
    ModelApi(String),

    /// Missing or unusable credentials
    #[error("Missing API key: set the {0} environment variable")]
    MissingApiKey(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic errors with context
    #[error("Copilot error: {0}")]
    Generic(String),
}

/// Result type alias for copilot operations
pub type Result<T> = std::result::Result<T, CopilotError>;

/// Convert anyhow errors to CopilotError
impl From<anyhow::Error> for CopilotError {
    fn from(err: anyhow::Error) -> Self {
        CopilotError::Generic(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CopilotError::ConversationLimit { turns: 21, max: 20 };
        assert!(err.to_string().contains("21"));
        assert!(err.to_string().contains("20"));
    }

    #[test]
    fn test_invalid_transition_error() {
        let err = CopilotError::InvalidTransition {
            from: "Done".to_string(),
            to: "ToolRound".to_string(),
            reason: "terminal state".to_string(),
        };
        assert!(err.to_string().contains("Done"));
        assert!(err.to_string().contains("ToolRound"));
    }

    #[test]
    fn test_model_api_error_display() {
        let err = CopilotError::ModelApi("overloaded".to_string());
        assert!(err.to_string().contains("overloaded"));
    }
}
