//! Flight Booking Bridge
//!
//! ```text
//!     HTTP client
//!         │
//!         ▼
//!  ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//!  │ http server  │───▶│   booking    │───▶│  blockchain  │───▶ chain node
//!  │  handlers    │    │FlightService │    │ TxBuilder +  │     (JSON-RPC)
//!  └──────┬───────┘    └──────────────┘    │ ChainClient  │
//!         │                                └──────────────┘
//!         ▼
//!  ┌──────────────┐    ┌──────────────┐
//!  │  registry    │    │   config     │
//!  │flights/ticket│    │  reference   │
//!  └──────────────┘    └──────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use flight_bridge::blockchain::ChainClient;
use flight_bridge::config::load_config;
use flight_bridge::observability::{logging, metrics};
use flight_bridge::{HttpServer, Shutdown};

#[derive(Parser, Debug)]
#[command(name = "flight-bridge", version, about = "Flight ticket booking bridge")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "bridge.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(&args.config)?;

    logging::init_logging(&config.observability);
    tracing::info!(
        config = %args.config.display(),
        "flight-bridge v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    tracing::info!(
        bind_address = %config.listener.bind_address,
        rpc_url = %config.blockchain.rpc_url,
        chain_id = config.blockchain.chain_id,
        accounts = config.accounts.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let chain = Arc::new(ChainClient::new(config.blockchain.clone()).await?);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config, chain)?;

    let shutdown = Shutdown::new();
    shutdown.trigger_on_ctrl_c();
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
