use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use rc_cli::cli::{Cli, Command, ConfigCommand};
use rc_domain::config::ObservabilityConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        // Default to chat when no subcommand is given.
        None => {
            let (config, _) = rc_cli::cli::load_config()?;
            init_tracing(&config.observability);
            rc_cli::cli::chat::chat(Arc::new(config), None).await
        }
        Some(Command::Chat { kb, strategy }) => {
            let (mut config, _) = rc_cli::cli::load_config()?;
            init_tracing(&config.observability);
            rc_cli::cli::override_strategy(&mut config, strategy);
            rc_cli::cli::chat::chat(Arc::new(config), kb).await
        }
        Some(Command::Ask { question, kb, json, strategy }) => {
            let (mut config, _) = rc_cli::cli::load_config()?;
            init_tracing(&config.observability);
            rc_cli::cli::override_strategy(&mut config, strategy);
            rc_cli::cli::ask::run(Arc::new(config), question, kb, json).await
        }
        Some(Command::Kbs { strategy }) => {
            let (mut config, _) = rc_cli::cli::load_config()?;
            init_tracing(&config.observability);
            rc_cli::cli::override_strategy(&mut config, strategy);
            rc_cli::cli::kbs::run(&config).await
        }
        Some(Command::Config(ConfigCommand::Validate)) => {
            let (config, config_path) = rc_cli::cli::load_config()?;
            let valid = rc_cli::cli::config::validate(&config, &config_path);
            if !valid {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Command::Config(ConfigCommand::Show)) => {
            let (config, _config_path) = rc_cli::cli::load_config()?;
            rc_cli::cli::config::show(&config)
        }
        Some(Command::Version) => {
            println!("ragchat {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Initialize stderr-only tracing so stdout carries nothing but answers.
///
/// `RUST_LOG` wins over `observability.default_filter`.
fn init_tracing(obs: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&obs.default_filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if obs.json_logs {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}
