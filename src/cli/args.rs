//! Command-line argument parsing for EDA Copilot
//!
//! Provides clap-based CLI with mode selection and verbosity control.

use clap::Parser;
use std::path::PathBuf;

/// EDA Copilot - AI assistant for analog circuit designers
#[derive(Parser, Debug)]
#[command(name = "edapilot")]
#[command(version = "0.3.0")]
#[command(about = "Tool-using AI copilot for analog/RF circuit design", long_about = None)]
pub struct Args {
    /// Ask a single question and exit
    #[arg(short, long, value_name = "QUESTION")]
    pub prompt: Option<String>,

    /// Model to use (overrides the configured default)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Load a design rule deck from a file instead of the built-in one
    #[arg(long, value_name = "FILE")]
    pub corpus: Option<PathBuf>,

    /// Run canned demo scenarios (optionally a single scenario number)
    #[arg(long, value_name = "SCENARIO", num_args = 0..=1, default_missing_value = "0")]
    pub demo: Option<usize>,

    /// Maximum conversation length in turns
    #[arg(long, value_name = "N")]
    pub max_turns: Option<usize>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress banners and tracing)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execution mode resolved from the flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Answer one prompt and exit
    OneShot(String),
    /// Run demo scenarios; `None` runs them all
    Demo(Option<usize>),
    /// Interactive shell
    Repl,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }

    /// Resolve the execution mode
    pub fn mode(&self) -> Mode {
        if let Some(prompt) = &self.prompt {
            Mode::OneShot(prompt.clone())
        } else {
            match self.demo {
                Some(0) => Mode::Demo(None),
                Some(n) => Mode::Demo(Some(n)),
                None => Mode::Repl,
            }
        }
    }

    /// Check flag combinations
    pub fn validate(&self) -> Result<(), String> {
        if self.prompt.is_some() && self.demo.is_some() {
            return Err("Cannot combine --prompt with --demo.".to_string());
        }

        Ok(())
    }
}

impl Verbosity {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Normal => "normal",
            Verbosity::Verbose => "verbose",
            Verbosity::VeryVerbose => "very_verbose",
        }
    }

    /// Check if should show the banner and status lines
    pub fn show_banner(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }

    /// Check if agent/tool tracing should be on
    pub fn show_events(&self) -> bool {
        matches!(self, Verbosity::Verbose | Verbosity::VeryVerbose)
    }
}
