//! Example to run the CARDCHESS server standalone
//!
//! Run with: cargo run -p cardchess-server --example run_server

use cardchess_server::{run_server, ServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::default();

    println!("Starting CARDCHESS server on port {}", config.port);
    println!("Try: curl -X POST http://localhost:{}/api/games", config.port);

    run_server(config).await
}
