//! Interactive shell session
//!
//! Reads lines with rustyline, dispatches the built-in commands and
//! sends everything else through the agent loop.

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::agent::Copilot;
use crate::repl::display::DisplayManager;

const PROMPT: &str = "You: ";

/// Built-in shell commands; anything else is a question for the agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Reset,
    Quit,
    Chat(String),
}

/// Parse a trimmed input line into a command
pub fn parse(input: &str) -> Command {
    let trimmed = input.trim();
    match trimmed.to_lowercase().as_str() {
        "help" | "?" => Command::Help,
        "reset" => Command::Reset,
        "quit" | "exit" => Command::Quit,
        _ => Command::Chat(trimmed.to_string()),
    }
}

/// Interactive session over an agent
pub struct ReplSession {
    editor: DefaultEditor,
    copilot: Copilot,
    display: DisplayManager,
    model_label: String,
}

impl ReplSession {
    /// Create a session around a ready agent
    pub fn new(copilot: Copilot, model_label: impl Into<String>) -> Result<Self> {
        let editor = DefaultEditor::new()?;

        Ok(ReplSession {
            editor,
            copilot,
            display: DisplayManager::new(),
            model_label: model_label.into(),
        })
    }

    /// Run the shell until quit, Ctrl-C or Ctrl-D
    pub async fn run(&mut self) -> Result<()> {
        self.display.show_banner(&self.model_label);

        loop {
            match self.editor.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim().to_string();
                    if line.is_empty() {
                        continue;
                    }
                    let _ = self.editor.add_history_entry(&line);

                    if !self.dispatch(&line).await {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                    self.display.show_goodbye();
                    break;
                }
                Err(err) => {
                    self.display.show_error(&format!("Readline error: {}", err));
                    break;
                }
            }
        }

        Ok(())
    }

    /// Handle one input line; returns false when the session should end
    pub async fn dispatch(&mut self, line: &str) -> bool {
        match parse(line) {
            Command::Help => {
                self.display.show_help();
                true
            }
            Command::Reset => {
                self.copilot.reset();
                self.display.show_notice("Conversation cleared.");
                true
            }
            Command::Quit => {
                self.display.show_goodbye();
                false
            }
            Command::Chat(message) => {
                self.display.start_thinking();
                let outcome = self.copilot.chat(&message).await;
                self.display.finish_thinking();

                match outcome {
                    Ok(reply) => self.display.show_reply(&reply),
                    Err(err) => self.display.show_error(&err.to_string()),
                }
                true
            }
        }
    }

    /// Access the underlying agent
    pub fn copilot(&self) -> &Copilot {
        &self.copilot
    }
}
