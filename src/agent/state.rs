//! Conversation loop state machine
//!
//! Deterministic finite state machine for the tool-use loop:
//! - Safety: no invalid states reachable
//! - Liveness: every conversation ends in Done (or the safety bound trips)
//! - Determinism: unique next state per event

use crate::errors::{CopilotError, Result};
use serde::{Deserialize, Serialize};

/// Loop states for one conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoopState {
    /// Waiting on the model call (the only suspension point)
    AwaitModel,

    /// Executing the tool invocations from the last response
    ToolRound,

    /// Final answer produced (terminal)
    Done,
}

/// Events that trigger loop transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopEvent {
    /// Model response contained one or more tool invocations
    ToolsRequested,

    /// Model response contained only text
    FinalAnswer,

    /// Tool results appended to the conversation
    ResultsAppended,
}

impl LoopState {
    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoopState::Done)
    }

    /// Attempt state transition with validation
    ///
    /// Valid transitions:
    /// 1. AwaitModel → ToolRound  (on: ToolsRequested)
    /// 2. AwaitModel → Done       (on: FinalAnswer)
    /// 3. ToolRound  → AwaitModel (on: ResultsAppended)
    /// 4. Done       → Done       (terminal state)
    pub fn transition(&self, event: LoopEvent) -> Result<LoopState> {
        use LoopEvent::*;
        use LoopState::*;

        let next_state = match (self, event) {
            (AwaitModel, ToolsRequested) => ToolRound,
            (AwaitModel, FinalAnswer) => Done,
            (ToolRound, ResultsAppended) => AwaitModel,

            // Terminal state (self-loop)
            (Done, _) => Done,

            // Invalid transitions
            (from, event) => {
                return Err(CopilotError::InvalidTransition {
                    from: format!("{:?}", from),
                    to: format!("(via {:?})", event),
                    reason: format!("No valid transition from {:?} on {:?}", from, event),
                });
            }
        };

        Ok(next_state)
    }

    /// Get all valid events from this state
    pub fn valid_events(&self) -> Vec<LoopEvent> {
        use LoopEvent::*;
        use LoopState::*;

        match self {
            AwaitModel => vec![ToolsRequested, FinalAnswer],
            ToolRound => vec![ResultsAppended],
            Done => vec![],
        }
    }

    /// Human-readable state name
    pub fn display_name(&self) -> &'static str {
        match self {
            LoopState::AwaitModel => "Awaiting Model",
            LoopState::ToolRound => "Executing Tools",
            LoopState::Done => "Done",
        }
    }
}
