//! Configuration management
//!
//! TOML-based configuration with defaults. Every field is optional;
//! unset fields fall back to CLI flags or built-in constants.
//! Location: ~/.edapilot/config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Complete on-disk configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub agent: AgentSection,
    #[serde(default)]
    pub retrieval: RetrievalSection,
}

/// Model selection and response sizing
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ModelsConfig {
    pub default: Option<String>,
    pub max_tokens: Option<u32>,
}

/// Agent loop behavior
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AgentSection {
    pub max_turns: Option<usize>,
    pub verbose: Option<bool>,
}

/// Documentation retrieval behavior
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RetrievalSection {
    pub n_results: Option<usize>,
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            // Create default config
            let config = Config::default();
            config.save()?;
            return Ok(config);
        }

        let contents = fs::read_to_string(&config_path)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents)
            .context("Failed to parse config file")?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let toml_string = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        fs::write(&config_path, toml_string)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .context("Could not determine home directory")?;

        Ok(home.join(".edapilot").join("config.toml"))
    }

    /// Set the default model
    pub fn set_default_model(&mut self, name: String) {
        self.models.default = Some(name);
    }

    /// Get the default model
    pub fn get_default_model(&self) -> Option<&str> {
        self.models.default.as_deref()
    }

    /// Clear the default model
    pub fn clear_default_model(&mut self) {
        self.models.default = None;
    }

    /// Get the configured response token cap, if any
    pub fn max_tokens(&self) -> Option<u32> {
        self.models.max_tokens
    }

    /// Get the configured conversation turn limit, if any
    pub fn max_turns(&self) -> Option<usize> {
        self.agent.max_turns
    }

    /// Whether verbose tracing defaults to on
    pub fn verbose_default(&self) -> bool {
        self.agent.verbose.unwrap_or(false)
    }

    /// Get the configured documentation retrieval count, if any
    pub fn doc_results(&self) -> Option<usize> {
        self.retrieval.n_results
    }
}
