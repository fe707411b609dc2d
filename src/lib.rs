//! EDA Copilot - Tool-using AI assistant for analog circuit design
//!
//! An agentic loop over the Anthropic Messages API with a registry of
//! EDA domain tools (design rule lookup, netlist analysis, SKILL code
//! generation) and a small retrieval engine over the ASAP7 rule deck.
//!
//! # Architecture
//!
//! - `agent`: conversation loop and its state machine
//! - `models`: the `ModelClient` seam, HTTP client, scripted client
//! - `tools`: execute-by-name registry and the domain tools
//! - `rag`: deck loader, embedder, vector index, retriever

pub mod errors;
pub mod types;
pub mod agent;
pub mod models;
pub mod tools;
pub mod rag;

// Re-export commonly used types
pub use errors::{CopilotError, Result};

// Interface layer
pub mod cli;
pub mod config;
pub mod prompt;
pub mod repl;

// Offline scenario runner
pub mod demo;
