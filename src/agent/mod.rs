//! Agent loop: state machine plus orchestrator

pub mod orchestrator;
pub mod state;

pub use orchestrator::{AgentConfig, Copilot, CONVERSATION_LIMIT_MESSAGE, DEFAULT_MAX_TURNS};
pub use state::{LoopEvent, LoopState};
