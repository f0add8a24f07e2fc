//! swingwatch CLI application.

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;
use swing_monitor::setup_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging falls back to the config file when flags are absent
    let file_config = swing_config::load_config(&cli.config).ok();
    let log_level = match cli.log_level {
        Some(level) => level.as_str().to_string(),
        None => file_config
            .as_ref()
            .map(|c| c.logging.level.clone())
            .unwrap_or_else(|| "info".to_string()),
    };
    let json_logs = cli.json_logs || file_config.as_ref().is_some_and(|c| c.logging.is_json());
    let log_file = file_config.as_ref().and_then(|c| c.logging.file.clone());
    let _guard = setup_logging(&log_level, json_logs, log_file.as_deref().map(Path::new));

    match cli.command {
        Commands::Analyze(args) => cli::commands::analyze::run(args, &cli.config).await,
        Commands::Replay(args) => cli::commands::replay::run(args, &cli.config).await,
        Commands::Monitor(args) => cli::commands::monitor::run(args, &cli.config).await,
        Commands::ValidateConfig(args) => cli::commands::validate::run(args, &cli.config).await,
    }
}
