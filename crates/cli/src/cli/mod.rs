pub mod ask;
pub mod chat;
pub mod config;
pub mod kbs;
pub mod render;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rc_backend::HttpBackend;
use rc_domain::config::Config;
use rc_sessions::{CancelToken, ChatSession};

/// ragchat: ask questions against a retrieval-augmented QA backend.
#[derive(Debug, Parser)]
#[command(name = "ragchat", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive chat (default when no subcommand is given).
    Chat {
        /// Knowledge base to start with (defaults to the first one listed).
        #[arg(long)]
        kb: Option<String>,
        /// Retrieval strategy override (e.g. "hybrid-search").
        #[arg(long)]
        strategy: Option<String>,
    },
    /// Ask a single question and print the answer.
    Ask {
        /// The question to send.
        question: String,
        /// Knowledge base to query (defaults to the first one listed).
        #[arg(long)]
        kb: Option<String>,
        /// Print the answer, context and citations as JSON.
        #[arg(long)]
        json: bool,
        /// Retrieval strategy override.
        #[arg(long)]
        strategy: Option<String>,
    },
    /// List the knowledge bases the backend offers.
    Kbs {
        /// Retrieval strategy override.
        #[arg(long)]
        strategy: Option<String>,
    },
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path in `RAGCHAT_CONFIG` (or
/// `config.toml` by default).  Returns the parsed [`Config`] and the
/// path that was used.
pub fn load_config() -> anyhow::Result<(Config, String)> {
    let config_path = std::env::var("RAGCHAT_CONFIG").unwrap_or_else(|_| "config.toml".into());
    let config = load_config_from(Path::new(&config_path))?;
    Ok((config, config_path))
}

/// Parse `path`, falling back to defaults when the file does not exist.
pub fn load_config_from(path: &Path) -> anyhow::Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

/// Apply a `--strategy` flag on top of the file config.
pub fn override_strategy(config: &mut Config, strategy: Option<String>) {
    if let Some(strategy) = strategy.filter(|s| !s.trim().is_empty()) {
        config.backend.strategy = strategy;
    }
}

// ── Session helpers ───────────────────────────────────────────────────

/// A session talking to the configured HTTP backend.  The knowledge-base
/// directory is not loaded yet.
pub fn new_session(config: &Config) -> anyhow::Result<ChatSession> {
    let backend = HttpBackend::new(&config.backend).context("building HTTP client")?;
    Ok(ChatSession::new(Arc::new(backend), &config.chat))
}

/// Select `kb` if given; otherwise keep the directory's default.
pub fn pick_knowledge_base(session: &mut ChatSession, kb: Option<&str>) -> anyhow::Result<()> {
    if let Some(name) = kb {
        session.select_knowledge_base(name).with_context(|| {
            format!(
                "available knowledge bases: {}",
                session.knowledge_bases().join(", ")
            )
        })?;
    }
    Ok(())
}

/// Cancel `token` when Ctrl-C arrives.  Abort the returned task once the
/// exchange is over.
pub fn cancel_on_ctrl_c(token: CancelToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::debug!("interrupt received, cancelling exchange");
            token.cancel();
        }
    })
}
