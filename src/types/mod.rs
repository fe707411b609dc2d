//! Type definitions module
//!
//! Core types for the conversation loop and the model wire format.

pub mod messages;

// Re-export commonly used types
pub use messages::{
    ContentBlock, ConversationState, ModelResponse, Role, StopReason, Turn, TurnContent, Usage,
};
