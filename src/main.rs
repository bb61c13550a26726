//! Expenseweb main entry point

use anyhow::Context;
use clap::Parser;
use expenseweb_api::start_server;
use expenseweb_config::Config;
use expenseweb_core::LedgerStore;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tokio::sync::RwLock;

#[derive(Parser, Debug)]
#[command(name = "expenseweb")]
#[command(version = "0.1.0")]
#[command(about = "A lightweight single-page expense tracking dashboard", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Print the default configuration and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let config = Config::load_or_default(&args.config)
        .map_err(|e| anyhow::anyhow!("{}", e.to_details()))
        .with_context(|| format!("Failed to load configuration from {}", args.config.display()))?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    // load_or_default warned before the logger existed
    if !args.config.exists() {
        log::warn!("Config file {} not found, using defaults", args.config.display());
    }
    log::info!(
        "Config loaded: storage={}, key={}",
        config.storage.path.display(),
        config.storage.key
    );

    let store = LedgerStore::from_config(&config);
    log::info!("Ledger ready with {} entries", store.len());

    let rt = Runtime::new().context("Failed to start async runtime")?;
    rt.block_on(start_server(config, Arc::new(RwLock::new(store))))
}
