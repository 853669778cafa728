//! Ethereum balance proxy.
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!   GET /eth/balance/..  │  http ──▶ balance ──▶ cache (fresh? return)  │
//!  ─────────────────────▶│              │                               │
//!                        │              ▼                               │
//!                        │        load_balancer (round robin, healthy)  │──▶ Node A
//!                        │              │                               │──▶ Node B
//!                        │              ▼                               │──▶ Node C
//!                        │        upstream (JSON-RPC, deadline)         │
//!                        │                                              │
//!                        │  health: one probe loop per node + cooldown  │
//!                        └──────────────────────────────────────────────┘
//! ```
//!
//! Configuration comes from an optional TOML file plus environment
//! variables (`ALCHEMY_ENDPOINT`, `MAX_RETRIES`, ...), resolved once here.
//! Outside `APP_ENV=production` a local `.env` file seeds the environment.

use clap::Parser;
use std::path::{Path, PathBuf};
use tokio::net::TcpListener;

use eth_proxy::config::loader::{DOTENV_FILE, ENV_APP_ENV};
use eth_proxy::config::{load_config, load_dotenv};
use eth_proxy::lifecycle::signals;
use eth_proxy::observability::{logging, metrics};
use eth_proxy::Proxy;

#[derive(Parser)]
#[command(name = "eth-proxy")]
#[command(about = "Load-balancing proxy for Ethereum balance queries", long_about = None)]
struct Cli {
    /// TOML configuration file. Environment variables override it.
    #[arg(short, long, env = "ETH_PROXY_CONFIG")]
    config: Option<PathBuf>,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let app_env = std::env::var(ENV_APP_ENV).ok();
    let dotenv_loaded = match load_dotenv(Path::new(DOTENV_FILE), app_env.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Failed to load {}: {}", DOTENV_FILE, e);
            std::process::exit(1);
        }
    };

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    logging::init(&config.observability)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "eth-proxy starting");
    if dotenv_loaded {
        tracing::info!(file = DOTENV_FILE, "Loaded environment file");
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        nodes = config.nodes.len(),
        health_checks = config.health_check.enabled,
        "Configuration loaded"
    );

    if cli.check {
        tracing::info!("Configuration is valid");
        return Ok(());
    }

    let metrics = if config.observability.metrics_enabled {
        match metrics::install() {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::error!(error = %e, "Failed to install metrics recorder");
                None
            }
        }
    } else {
        None
    };

    let proxy = Proxy::new(config.clone())?;
    tokio::spawn(signals::forward_to(proxy.shutdown()));

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    proxy.run(listener, metrics).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
