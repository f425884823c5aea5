//! meihua: command-line front end for the plum-blossom divination engine
//!
//! Casts divinations from numbers or a moment, browses the hexagram
//! interpretations and optionally asks an LLM for a written reading.

mod cli;
mod config;

use std::path::PathBuf;

use clap::Parser;
use tracing::{debug, info};

use cli::Commands;
use config::AppConfig;
use meihua_core::DivinationEngine;

#[derive(Parser)]
#[command(name = "meihua")]
#[command(about = "Plum-blossom (Meihua Yishu) divination")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "meihua.yaml", env = "MEIHUA_CONFIG")]
    config: PathBuf,

    /// Largest number accepted by number casts (overrides config file)
    #[arg(long, env = "MEIHUA_MAX_NUMBER")]
    max_number: Option<u32>,

    /// Owner recorded on saved casts (overrides config file)
    #[arg(long, env = "MEIHUA_OWNER")]
    owner: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("meihua=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load(&cli.config)?;

    // Apply CLI overrides
    if let Some(max_number) = cli.max_number {
        config.engine.max_number = max_number;
    }
    if let Some(owner) = cli.owner {
        config.owner_id = owner;
    }

    debug!(config = ?config, "Configuration loaded");

    let engine = DivinationEngine::with_config(config.engine.clone());
    info!(command = ?cli.command, "Running");

    let output = cli::execute(cli.command, &engine, &config).await?;
    print!("{output}");
    Ok(())
}
