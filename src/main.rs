//! EDA Copilot - Main CLI Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;

use edapilot::agent::{AgentConfig, Copilot, DEFAULT_MAX_TURNS};
use edapilot::cli::{Args, Mode};
use edapilot::config::Config;
use edapilot::demo;
use edapilot::models::{AnthropicClient, ModelClient};
use edapilot::prompt::SYSTEM_PROMPT;
use edapilot::rag::{HashedBagEmbedder, RuleRetriever, BUILTIN_RULES};
use edapilot::repl::ReplSession;
use edapilot::tools::{default_registry, DEFAULT_DOC_RESULTS};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Err(message) = args.validate() {
        eprintln!("{}", message);
        std::process::exit(2);
    }

    let config = Config::load().context("Failed to load configuration")?;
    let corpus = load_corpus(&args)?;

    match args.mode() {
        Mode::Demo(selection) => {
            demo::run(selection, &corpus).await?;
        }
        Mode::OneShot(prompt) => {
            let (mut copilot, _) = build_copilot(&args, &config, &corpus)?;
            let answer = copilot.chat(&prompt).await?;
            println!("{}", answer);
        }
        Mode::Repl => {
            let (copilot, model_label) = build_copilot(&args, &config, &corpus)?;
            let mut session = ReplSession::new(copilot, model_label)?;
            session.run().await?;
        }
    }

    Ok(())
}

/// Load the rule deck: the embedded one, or a file named by --corpus
fn load_corpus(args: &Args) -> Result<String> {
    match &args.corpus {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rule deck: {}", path.display())),
        None => Ok(BUILTIN_RULES.to_string()),
    }
}

/// Assemble the agent: API client, retriever, tool registry
///
/// Flags beat the config file; the config file beats built-in
/// defaults. Returns the agent and the resolved model name.
fn build_copilot(args: &Args, config: &Config, corpus: &str) -> Result<(Copilot, String)> {
    let model = args
        .model
        .clone()
        .or_else(|| config.get_default_model().map(String::from));

    let mut client = AnthropicClient::from_env(model)?;
    if let Some(max_tokens) = config.max_tokens() {
        client = client.with_max_tokens(max_tokens);
    }
    let model_label = client.model().to_string();

    let verbose = args.verbosity().show_events() || config.verbose_default();

    let embedder = Arc::new(HashedBagEmbedder::default());
    let retriever =
        Arc::new(RuleRetriever::new(corpus, embedder).context("Failed to index rule deck")?);
    if verbose {
        eprintln!("[RAG] Indexed {} rule(s) from the deck", retriever.len());
    }
    let doc_results = config.doc_results().unwrap_or(DEFAULT_DOC_RESULTS);
    let registry = default_registry(retriever, doc_results);

    let agent_config = AgentConfig {
        max_turns: args
            .max_turns
            .or_else(|| config.max_turns())
            .unwrap_or(DEFAULT_MAX_TURNS),
        verbose,
    };

    let client: Arc<dyn ModelClient> = Arc::new(client);
    let copilot = Copilot::new(client, registry, SYSTEM_PROMPT, agent_config);

    Ok((copilot, model_label))
}
