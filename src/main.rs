// src/main.rs
//! sui-kit 命令行入口
use anyhow::{Context, Result};
use clap::Parser;
use sui_kit::cli::{self, Cli};
use sui_kit::core::config::KitConfig;
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    init_logging()?;

    let config = KitConfig::load().context("failed to load configuration")?;
    debug!(
        "network: {}, fullnodes: {:?}",
        config.network.as_str(),
        config.resolved_fullnode_urls()
    );

    let output = cli::run(args.command, &config).await?;
    println!("{}", output);
    Ok(())
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,reqwest=warn"));

    // Logs go to stderr so command output stays pipeable
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
