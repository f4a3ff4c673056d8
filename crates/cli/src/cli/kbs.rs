//! `ragchat kbs`: list the knowledge-base directory.

use rc_backend::{HttpBackend, QaBackend};
use rc_domain::config::Config;

pub async fn run(config: &Config) -> anyhow::Result<()> {
    let backend = HttpBackend::new(&config.backend)?;
    let names = backend.knowledge_bases().await?;

    if names.is_empty() {
        eprintln!("No knowledge bases available at {}", config.backend.strategy_url());
        return Ok(());
    }
    for (i, name) in names.iter().enumerate() {
        let marker = if i == 0 { " (default)" } else { "" };
        println!("{name}{marker}");
    }
    Ok(())
}
