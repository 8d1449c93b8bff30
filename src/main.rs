use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use dblapi::adapters::client::DblClient;
use dblapi::commands::{self, Cli};
use dblapi::config::load_config;

fn find_config_path() -> PathBuf {
    // Check common locations for config file
    let candidates = [PathBuf::from("dblapi.yaml"), exe_dir().join("dblapi.yaml")];

    for path in &candidates {
        if path.exists() {
            return path.clone();
        }
    }

    candidates[0].clone()
}

fn exe_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(find_config_path);
    let config = load_config(&config_path)?;

    let mut client = DblClient::new(&cli.token, config)?;
    if let Some(bot_id) = cli.command.vote_bot_id() {
        client = client.with_bot_id(bot_id);
    }

    tracing::debug!(command = ?cli.command, "Running command");
    let output = commands::run(&client, &cli.command).await?;
    print!("{output}");

    client.shutdown();
    Ok(())
}
