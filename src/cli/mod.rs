//! CLI module for EDA Copilot
//!
//! Handles command-line argument parsing and mode selection.

pub mod args;

pub use args::{Args, Mode, Verbosity};
