//! Display manager for the interactive shell
//!
//! Colored banner, replies, notices and a thinking spinner while a
//! model call is in flight.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const BANNER_WIDTH: usize = 60;

/// Display manager for shell output
pub struct DisplayManager {
    spinner: Option<ProgressBar>,
    update_interval: Duration,
}

impl DisplayManager {
    /// Create new display manager
    pub fn new() -> Self {
        DisplayManager {
            spinner: None,
            update_interval: Duration::from_millis(100),
        }
    }

    /// Show welcome banner
    pub fn show_banner(&self, model: &str) {
        let rule = "=".repeat(BANNER_WIDTH).cyan();

        println!("\n{}", rule);
        println!("{}", "  EDA COPILOT".bold().cyan());
        println!("{}", "  AI Assistant for Analog Circuit Design".dimmed());
        println!("{}", format!("  Model: {}", model).dimmed());
        println!("{}", rule);
        println!("\n{}", "Commands:".bold());
        println!("  {} - Clear conversation history", "'reset'".green());
        println!("  {} or {} - End session", "'quit'".green(), "'exit'".green());
        println!("\n{}", "Example queries:".bold());
        println!("  - \"What is the minimum Metal1 spacing?\"");
        println!("  - \"Generate SKILL code to count transistors\"");
        println!("  - \"Analyze this netlist: M1 out in vss vss nmos w=1u l=100n\"");
        println!("{}\n", rule);
    }

    /// Start the thinking spinner
    pub fn start_thinking(&mut self) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message("thinking...");
        pb.enable_steady_tick(self.update_interval);

        self.spinner = Some(pb);
    }

    /// Stop and clear the thinking spinner
    pub fn finish_thinking(&mut self) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }
    }

    /// Display a copilot reply
    pub fn show_reply(&self, text: &str) {
        println!("\n{} {}\n", "Copilot:".green().bold(), text);
    }

    /// Display a session notice
    pub fn show_notice(&self, text: &str) {
        println!("{}", text.yellow());
    }

    /// Display error message
    pub fn show_error(&self, error: &str) {
        println!("{} {}", "Error:".red().bold(), error.red());
    }

    /// Display help information
    pub fn show_help(&self) {
        println!("\n{}", "Available Commands:".bold().cyan());
        println!("{}", "-".repeat(BANNER_WIDTH).cyan());

        let commands = [
            ("help", "Show this help message"),
            ("reset", "Clear conversation history"),
            ("quit, exit", "End session"),
        ];

        for (cmd, desc) in commands {
            println!("  {:<14} {}", cmd.green(), desc);
        }

        println!("\nAnything else is sent to the copilot as a question.\n");
    }

    /// Display farewell
    pub fn show_goodbye(&self) {
        println!("\n{}", "Goodbye! Happy designing!".green());
    }
}

impl Default for DisplayManager {
    fn default() -> Self {
        Self::new()
    }
}
