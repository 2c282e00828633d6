//! File server binary
//!
//! Usage:
//!   fstore-server [--config <CONFIG>] [--bind <ADDR>] [--storage <DIR>]
//!
//! Example:
//!   fstore-server --config /etc/fstore.toml --bind 0.0.0.0:9000

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use fstore::config::Config;
use fstore::{FileServer, FileStore};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fstore-server")]
#[command(about = "Line-protocol TCP file server", long_about = None)]
struct Args {
    /// Path to configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address (e.g., 0.0.0.0:9000)
    #[arg(short, long)]
    bind: Option<String>,

    /// Storage directory path
    #[arg(short, long)]
    storage: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(storage) = args.storage {
        config.server.storage_root = storage;
    }
    if let Some(level) = args.log_level {
        config.server.log_level = level;
    }
    config.validate().context("invalid configuration")?;

    // RUST_LOG still wins over the configured level
    env_logger::Builder::from_env(Env::default().default_filter_or(config.server.log_level.as_str()))
        .init();

    log::info!("fstore server v{}", env!("CARGO_PKG_VERSION"));
    log::info!("  Bind address: {}", config.server.bind);
    let store = FileStore::new(&config.server.storage_root)
        .with_context(|| {
            format!(
                "failed to create storage root {}",
                config.server.storage_root.display()
            )
        })?
        .with_sync_writes(config.server.sync_writes);

    log::info!("  Storage path: {}", store.root().display());
    if let Some(timeout) = config.server.read_timeout() {
        log::info!("  Read timeout: {:?}", timeout);
    }

    let server = FileServer::bind(&config.server, store)
        .with_context(|| format!("failed to bind {}", config.server.bind))?;

    server.run().context("server error")?;

    Ok(())
}
